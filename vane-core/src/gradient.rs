//! Temperature-driven background palettes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// One of four temperature buckets. Thresholds are half-open: the boundary
/// value belongs to the warmer bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Palette {
    /// Below 5 °C.
    Cold2,
    /// 5 °C up to 15 °C.
    Cold1,
    /// 15 °C up to 30 °C.
    Warm1,
    /// 30 °C and above.
    Hot,
}

impl Palette {
    pub const fn all() -> &'static [Palette] {
        &[Palette::Cold2, Palette::Cold1, Palette::Warm1, Palette::Hot]
    }

    /// Gradient stops, top to bottom.
    pub fn colors(&self) -> &'static [Rgb] {
        match self {
            Palette::Cold2 => &[Rgb(0x1e, 0x3c, 0x72), Rgb(0x2a, 0x52, 0x98)],
            Palette::Cold1 => &[Rgb(0x36, 0x7f, 0xc4), Rgb(0x6d, 0xd5, 0xed)],
            Palette::Warm1 => &[Rgb(0xf7, 0xb7, 0x33), Rgb(0xfc, 0x4a, 0x1a)],
            Palette::Hot => &[Rgb(0xe5, 0x2d, 0x27), Rgb(0xb3, 0x12, 0x17)],
        }
    }
}

pub fn select(temperature_c: i32) -> Palette {
    match temperature_c {
        t if t < 5 => Palette::Cold2,
        t if t < 15 => Palette::Cold1,
        t if t < 30 => Palette::Warm1,
        _ => Palette::Hot,
    }
}
