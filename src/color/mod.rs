//! Color models used by the distance metrics.
//!
//! A [`ColorModel`] selects one channel group (RGB or HSL, never both) and a
//! non-empty subset of its three channels. Pixels are projected into a
//! tagged [`Color`] before distances are taken, so callers never have to
//! guess what a raw channel triple means.
//!
//! The HSL group reuses the raw RGB bytes as if they already were H, S and L
//! unless [`HslConversion::Converted`] is selected. Tolerance presets assume
//! the raw reuse.

use crate::util::{StripJoinError, StripJoinResult};

/// Legacy mask bit for hue.
pub const HUE_BIT: u32 = 0x1;
/// Legacy mask bit for saturation.
pub const SATURATION_BIT: u32 = 0x2;
/// Legacy mask bit for lightness.
pub const LIGHT_BIT: u32 = 0x4;
/// Legacy mask bit for red.
pub const RED_BIT: u32 = 0x10000;
/// Legacy mask bit for green.
pub const GREEN_BIT: u32 = 0x20000;
/// Legacy mask bit for blue.
pub const BLUE_BIT: u32 = 0x40000;

const HSL_BITS: u32 = HUE_BIT | SATURATION_BIT | LIGHT_BIT;
const RGB_BITS: u32 = RED_BIT | GREEN_BIT | BLUE_BIT;

/// Channel group a color model draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Rgb,
    Hsl,
}

/// Non-empty subset of the three channels of a color space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelMask(u8);

impl ChannelMask {
    /// First channel (red or hue).
    pub const FIRST: Self = Self(0b001);
    /// Second channel (green or saturation).
    pub const SECOND: Self = Self(0b010);
    /// Third channel (blue or lightness).
    pub const THIRD: Self = Self(0b100);
    /// All three channels.
    pub const ALL: Self = Self(0b111);

    /// Creates a mask from the low three bits.
    pub fn new(bits: u8) -> StripJoinResult<Self> {
        if bits == 0 || bits > 0b111 {
            return Err(StripJoinError::InvalidInput(
                "channel mask must select 1 to 3 channels",
            ));
        }
        Ok(Self(bits))
    }

    /// Returns the raw bits.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns true when channel `idx` (0, 1 or 2) is selected.
    pub fn contains(self, idx: usize) -> bool {
        idx < 3 && self.0 & (1 << idx) != 0
    }

    /// Index of the lowest selected channel.
    pub fn first_channel(self) -> usize {
        self.0.trailing_zeros() as usize
    }

    /// Returns the union of two masks.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// How HSL-group models obtain their channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HslConversion {
    /// Reuse the RGB bytes unchanged as H, S, L.
    #[default]
    Raw,
    /// Convert RGB to HSL, each component scaled to `0..=255`.
    Converted,
}

/// Channel group, selected channels, and HSL strategy for one comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorModel {
    space: ColorSpace,
    mask: ChannelMask,
    hsl: HslConversion,
}

impl ColorModel {
    /// Full Euclidean RGB distance.
    pub const RGB: Self = Self::rgb(ChannelMask::ALL);
    /// Red channel only.
    pub const RED: Self = Self::rgb(ChannelMask::FIRST);
    /// Green channel only.
    pub const GREEN: Self = Self::rgb(ChannelMask::SECOND);
    /// Blue channel only.
    pub const BLUE: Self = Self::rgb(ChannelMask::THIRD);
    /// All three HSL channels.
    pub const HSL: Self = Self::hsl(ChannelMask::ALL);
    /// Hue only.
    pub const HUE: Self = Self::hsl(ChannelMask::FIRST);
    /// Saturation only.
    pub const SATURATION: Self = Self::hsl(ChannelMask::SECOND);
    /// Lightness only.
    pub const LIGHTNESS: Self = Self::hsl(ChannelMask::THIRD);

    /// RGB-group model over the given channels.
    pub const fn rgb(mask: ChannelMask) -> Self {
        Self {
            space: ColorSpace::Rgb,
            mask,
            hsl: HslConversion::Raw,
        }
    }

    /// HSL-group model over the given channels.
    pub const fn hsl(mask: ChannelMask) -> Self {
        Self {
            space: ColorSpace::Hsl,
            mask,
            hsl: HslConversion::Raw,
        }
    }

    /// Parses the historical bit layout (`0x1..0x4` HSL, `0x10000..0x40000` RGB).
    ///
    /// Mixing both groups, an empty mask, or unknown bits are rejected.
    pub fn from_legacy_bits(bits: u32) -> StripJoinResult<Self> {
        if bits & !(HSL_BITS | RGB_BITS) != 0 {
            return Err(StripJoinError::InvalidInput("unknown color model bits"));
        }
        let hsl = bits & HSL_BITS;
        let rgb = (bits & RGB_BITS) >> 16;
        match (hsl, rgb) {
            (0, 0) => Err(StripJoinError::InvalidInput("color model selects no channel")),
            (h, 0) => Ok(Self::hsl(ChannelMask::new(h as u8)?)),
            (0, r) => Ok(Self::rgb(ChannelMask::new(r as u8)?)),
            _ => Err(StripJoinError::InvalidInput(
                "color model mixes RGB and HSL channels",
            )),
        }
    }

    /// Returns the model in the historical bit layout.
    pub fn legacy_bits(self) -> u32 {
        let bits = u32::from(self.mask.bits());
        match self.space {
            ColorSpace::Hsl => bits,
            ColorSpace::Rgb => bits << 16,
        }
    }

    /// Switches HSL-group models to a different channel strategy.
    pub fn with_hsl_conversion(mut self, hsl: HslConversion) -> Self {
        self.hsl = hsl;
        self
    }

    /// Returns the active channel group.
    pub fn space(self) -> ColorSpace {
        self.space
    }

    /// Returns the selected channels.
    pub fn mask(self) -> ChannelMask {
        self.mask
    }

    /// Returns the HSL channel strategy.
    pub fn hsl_conversion(self) -> HslConversion {
        self.hsl
    }

    /// Interprets an RGB pixel in this model's color space.
    pub fn project(self, rgb: [u8; 3]) -> Color {
        let channels = match (self.space, self.hsl) {
            (ColorSpace::Hsl, HslConversion::Converted) => rgb_to_hsl(rgb),
            _ => rgb,
        };
        Color {
            space: self.space,
            channels,
        }
    }

    /// Euclidean distance between two RGB pixels over the selected channels.
    #[inline]
    pub fn pixel_distance(self, a: [u8; 3], b: [u8; 3]) -> f64 {
        let a = self.project(a);
        let b = self.project(b);
        let mut sum = 0.0f64;
        for idx in 0..3 {
            if self.mask.contains(idx) {
                let d = f64::from(a.channels[idx]) - f64::from(b.channels[idx]);
                sum += d * d;
            }
        }
        sum.sqrt()
    }

    /// Value of the lowest selected channel of `rgb` in this model.
    #[inline]
    pub fn primary_component(self, rgb: [u8; 3]) -> u8 {
        self.project(rgb).channels[self.mask.first_channel()]
    }
}

impl Default for ColorModel {
    fn default() -> Self {
        Self::RGB
    }
}

/// A pixel value tagged with the color space its channels belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub space: ColorSpace,
    pub channels: [u8; 3],
}

/// Converts RGB8 to HSL with every component scaled to `0..=255`.
pub fn rgb_to_hsl(rgb: [u8; 3]) -> [u8; 3] {
    let r = f32::from(rgb[0]) / 255.0;
    let g = f32::from(rgb[1]) / 255.0;
    let b = f32::from(rgb[2]) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let light = (max + min) / 2.0;
    let delta = max - min;

    if delta <= f32::EPSILON {
        return [0, 0, to_byte(light)];
    }

    let sat = if light > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };
    let sector = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    let hue = sector / 6.0;

    [to_byte(hue), to_byte(sat), to_byte(light)]
}

fn to_byte(unit: f32) -> u8 {
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_bits_round_trip_presets() {
        for model in [
            ColorModel::RGB,
            ColorModel::RED,
            ColorModel::HUE,
            ColorModel::HSL,
        ] {
            assert_eq!(ColorModel::from_legacy_bits(model.legacy_bits()), Ok(model));
        }
        assert_eq!(ColorModel::RGB.legacy_bits(), RED_BIT | GREEN_BIT | BLUE_BIT);
    }

    #[test]
    fn legacy_bits_reject_mixed_and_empty() {
        assert!(ColorModel::from_legacy_bits(HUE_BIT | RED_BIT).is_err());
        assert!(ColorModel::from_legacy_bits(0).is_err());
        assert!(ColorModel::from_legacy_bits(0x8).is_err());
    }

    #[test]
    fn raw_hsl_reuses_rgb_bytes() {
        let color = ColorModel::HUE.project([10, 20, 30]);
        assert_eq!(color.space, ColorSpace::Hsl);
        assert_eq!(color.channels, [10, 20, 30]);
        assert_eq!(ColorModel::HUE.pixel_distance([10, 0, 0], [13, 99, 99]), 3.0);
    }

    #[test]
    fn converted_hsl_matches_known_colors() {
        assert_eq!(rgb_to_hsl([255, 0, 0]), [0, 255, 128]);
        assert_eq!(rgb_to_hsl([0, 0, 255]), [170, 255, 128]);
        assert_eq!(rgb_to_hsl([128, 128, 128]), [0, 0, 128]);

        let model = ColorModel::LIGHTNESS.with_hsl_conversion(HslConversion::Converted);
        assert_eq!(model.primary_component([0, 0, 0]), 0);
        assert_eq!(model.primary_component([255, 255, 255]), 255);
    }

    #[test]
    fn subset_distance_ignores_unselected_channels() {
        let a = [0, 0, 0];
        let b = [3, 4, 100];
        let rg = ColorModel::rgb(ChannelMask::FIRST.union(ChannelMask::SECOND));
        assert_eq!(rg.pixel_distance(a, b), 5.0);
        assert_eq!(ColorModel::BLUE.pixel_distance(a, b), 100.0);
    }
}
