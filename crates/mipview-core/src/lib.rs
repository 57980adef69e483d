//! Core systems for mipview.
//!
//! This crate provides the small foundation shared by the mipview crates:
//!
//! - **Signal/Slot System**: synchronous notifications from the canvas to its host
//! - **Logging**: tracing target and span names, plus a timing guard
//!
//! # Signal/Slot Example
//!
//! ```
//! use mipview_core::Signal;
//!
//! let navigate_next = Signal::<()>::new();
//! let conn_id = navigate_next.connect(|_| println!("next image"));
//!
//! navigate_next.emit(());
//! navigate_next.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
