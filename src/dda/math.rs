//! Integer helpers for the planner.
//!
//! Distances are approximated with octagonal norms instead of a square root.
//! The coefficients are scaled by 1024, so every result is rounded with
//! `(approx + 512) >> 10`. Products are taken in 64 bits; with inputs below
//! 2^32 µm (4.29 km) none of them can overflow.

/// Approximate `sqrt(dx² + dy²)`.
///
/// Within about 2% of the true length.
pub fn approx_distance_2d(dx: u32, dy: u32) -> u32 {
    let (min, max) = if dx < dy {
        (dx as u64, dy as u64)
    } else {
        (dy as u64, dx as u64)
    };

    let mut approx = max * 1007 + min * 441;
    if max < (min << 4) {
        approx -= max * 40;
    }

    ((approx + 512) >> 10) as u32
}

/// Approximate `sqrt(dx² + dy² + dz²)`.
pub fn approx_distance_3d(dx: u32, dy: u32, dz: u32) -> u32 {
    let mut sorted = [dx as u64, dy as u64, dz as u64];
    sorted.sort_unstable();
    let [min, med, max] = sorted;

    let mut approx = max * 860 + med * 851 + min * 520;
    if max < (med << 1) {
        approx -= max * 294;
    }
    if max < (min << 2) {
        approx -= max * 113;
    }
    if med < (min << 2) {
        approx -= med * 40;
    }

    ((approx + 512) >> 10) as u32
}

/// Integer square root, rounded down.
///
/// Digit-by-digit method, two bits per iteration.
pub fn int_sqrt(value: u64) -> u64 {
    let mut x = value;
    let mut root = 0u64;
    // highest power of four representable
    let mut bit = 1u64 << 62;

    while bit > x {
        bit >>= 2;
    }

    while bit != 0 {
        if x >= root + bit {
            x -= root + bit;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }

    root
}

/// Narrow a 64-bit intermediate, saturating at `u32::MAX`.
#[inline]
pub fn saturate(value: u64) -> u32 {
    value.min(u32::MAX as u64) as u32
}

/// Index of the most significant set bit, 0 for both 0 and 1.
#[inline]
pub fn msb_index(value: u32) -> u32 {
    if value == 0 {
        0
    } else {
        31 - value.leading_zeros()
    }
}
