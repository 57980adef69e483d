//! Packed-lane ("SIMD within a register") helpers.
//!
//! A packed `0xAARRGGBB` pixel is widened into a `u64` holding four 16-bit
//! lanes, `0x00AA_00RR_00GG_00BB`. With 8 spare bits per lane, all four
//! channels can be summed, multiplied by an 8-bit factor or divided by 255 in
//! a handful of word-sized operations with no carry crossing a lane.

/// The low byte of every lane.
pub(crate) const LANE_LOW: u64 = 0x00FF_00FF_00FF_00FF;
/// The value 1 in every lane.
pub(crate) const LANE_ONE: u64 = 0x0001_0001_0001_0001;
/// The alpha lane.
pub(crate) const ALPHA_LANE: u64 = 0xFFFF_0000_0000_0000;
/// Alpha lane holding 255.
pub(crate) const ALPHA_OPAQUE: u64 = 0x00FF_0000_0000_0000;

/// Spread the four bytes of a pixel into four 16-bit lanes.
#[inline(always)]
pub(crate) fn widen(pixel: u32) -> u64 {
    let mut v = pixel as u64;
    v = (v | (v << 16)) & 0x0000_FFFF_0000_FFFF;
    (v | (v << 8)) & LANE_LOW
}

/// Collapse four lanes (each `<= 255`) back into a packed pixel.
#[inline(always)]
pub(crate) fn narrow(lanes: u64) -> u32 {
    let mut v = lanes & LANE_LOW;
    v = (v | (v >> 8)) & 0x0000_FFFF_0000_FFFF;
    (v | (v >> 16)) as u32
}

/// Per-lane `x / 255` (truncating) for lanes `<= 65025`.
///
/// `(x + 1 + (x >> 8)) >> 8` is exact over that whole range, and the
/// intermediate never exceeds 16 bits.
#[inline(always)]
pub(crate) fn div255(x: u64) -> u64 {
    ((x + LANE_ONE + ((x >> 8) & LANE_LOW)) >> 8) & LANE_LOW
}

/// Saturate lanes holding values `<= 511` to 255.
#[inline(always)]
pub(crate) fn saturate(v: u64) -> u64 {
    let overflow = (v >> 8) & LANE_ONE;
    (v | (overflow * 0xFF)) & LANE_LOW
}

/// Blend the lanes of `color` against `background_lanes` using the alpha
/// lane, then force alpha to 255.
///
/// `background_lanes` must have an empty alpha lane.
#[inline(always)]
pub(crate) fn bake_lanes(color: u64, background_lanes: u64) -> u64 {
    let alpha = color >> 48;
    let residual = div255(background_lanes * (255 - alpha));
    (saturate(color + residual) & !ALPHA_LANE) | ALPHA_OPAQUE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_narrow() {
        let p = 0x8012_34FE;
        assert_eq!(widen(p), 0x0080_0012_0034_00FE);
        assert_eq!(narrow(widen(p)), p);
    }

    #[test]
    fn test_div255_exact() {
        for x in (0u64..=65025).step_by(7).chain([254, 255, 256, 65024, 65025]) {
            let lanes = x * LANE_ONE;
            assert_eq!(div255(lanes), (x / 255) * LANE_ONE, "x = {x}");
        }
    }

    #[test]
    fn test_saturate() {
        let v = 0x0100_00FF_01FF_0000;
        assert_eq!(saturate(v), 0x00FF_00FF_00FF_0000);
    }
}
