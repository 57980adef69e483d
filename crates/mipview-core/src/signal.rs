//! Signal/slot notifications for mipview.
//!
//! A [`Signal<Args>`] is a list of connected slots (closures) that are invoked
//! synchronously, on the emitting thread, every time the signal is emitted.
//! The canvas uses signals to tell its host window about zoom changes, pointer
//! movement and navigation requests.
//!
//! # Example
//!
//! ```
//! use mipview_core::Signal;
//!
//! let zoom_changed = Signal::<i32>::new();
//!
//! let conn_id = zoom_changed.connect(|zoom| {
//!     println!("zoom is now {}", zoom);
//! });
//!
//! zoom_changed.emit(2);
//!
//! zoom_changed.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Connected slots plus their connection order.
///
/// The slot map reuses freed keys, so its iteration order is not the order
/// of `connect` calls.
struct Connections<Args> {
    slots: SlotMap<ConnectionId, Slot<Args>>,
    order: Vec<ConnectionId>,
}

/// A type-safe notification with any number of connected slots.
///
/// Slots run in connection order. The connection list lock is released before
/// any slot runs, so a slot may connect to or disconnect from the signal that
/// is invoking it; such changes take effect from the next emission.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<Connections<Args>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

impl<Args> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(Connections {
                slots: SlotMap::with_key(),
                order: Vec::new(),
            }),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let mut connections = self.connections.lock();
        let id = connections.slots.insert(Arc::new(slot));
        connections.order.push(id);
        id
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.lock();
        if connections.slots.remove(id).is_none() {
            return false;
        }
        connections.order.retain(|&existing| existing != id);
        true
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        let mut connections = self.connections.lock();
        connections.slots.clear();
        connections.order.clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().slots.len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` will do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in order.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "mipview_core::signal", "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = {
            let connections = self.connections.lock();
            connections
                .order
                .iter()
                .filter_map(|&id| connections.slots.get(id).cloned())
                .collect()
        };
        tracing::trace!(target: "mipview_core::signal", connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}
