//! Color math for palette generation.
//!
//! Everything here is pure arithmetic on HSL triples: the variation family
//! transforms (shade/base/tint), hex conversion, and the derived background
//! and label-strip colors. Inputs are pre-clamped by the caller; outputs are
//! always inside visually valid ranges.

/// A color in HSL space. `h` in degrees [0,360), `s` and `l` in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// Six-digit uppercase hex string, no alpha.
    pub fn to_hex(&self) -> String {
        hsl_to_hex(self.h, self.s, self.l)
    }
}

/// Palette-wide darkening/lightening treatment. Chosen once per palette and
/// applied uniformly to all five entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variation {
    /// Darker version (add black).
    Shade,
    /// Unmodified color.
    Base,
    /// Lighter version (add white).
    Tint,
}

impl Variation {
    pub const ALL: [Variation; 3] = [Variation::Shade, Variation::Base, Variation::Tint];

    pub fn name(&self) -> &'static str {
        match self {
            Variation::Shade => "shade",
            Variation::Base => "base",
            Variation::Tint => "tint",
        }
    }
}

impl Default for Variation {
    fn default() -> Self {
        Variation::Base
    }
}

/// Apply a variation family to a raw HSL color.
///
/// `intensity` runs -1..1; the four main palette colors get intensities
/// linearly spaced across that range and the accent always gets 1 (maximal
/// push). Saturation and lightness are clamped so every output stays visible.
pub fn create_variation(
    hue: f32,
    saturation: f32,
    lightness: f32,
    variation: Variation,
    intensity: f32,
) -> Hsl {
    match variation {
        Variation::Shade => {
            // 0.4..0.8 lightness multiplier across the intensity range
            let shade = 0.6 + intensity * 0.2;
            Hsl {
                h: hue,
                s: (saturation * (1.1 + intensity * 0.1)).min(100.0),
                l: (lightness * shade).max(15.0),
            }
        }
        Variation::Tint => {
            // 1.2..1.6 lightness multiplier across the intensity range
            let tint = 1.4 + intensity * 0.2;
            Hsl {
                h: hue,
                s: (saturation * (0.9 - intensity * 0.1)).max(30.0),
                l: (lightness * tint).min(85.0),
            }
        }
        Variation::Base => Hsl {
            h: hue,
            s: (saturation * (1.0 + intensity * 0.1)).min(100.0),
            l: (lightness * (1.0 + intensity * 0.1)).clamp(20.0, 80.0),
        },
    }
}

/// Standard HSL→RGB conversion, rounded to bytes and formatted as `#RRGGBB`.
pub fn hsl_to_hex(h: f32, s: f32, l: f32) -> String {
    let l = l / 100.0;
    let a = s * l.min(1.0 - l) / 100.0;
    let f = |n: f32| -> u8 {
        let k = (n + h / 30.0).rem_euclid(12.0);
        let c = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (255.0 * c).round() as u8
    };
    format!("#{:02X}{:02X}{:02X}", f(0.0), f(8.0), f(4.0))
}

/// Window background for the current palette: a very dark wash of the base
/// hue, slightly different per family so regenerations read as scene changes.
pub fn background_color(base_hue: f32, variation: Variation) -> Hsl {
    match variation {
        Variation::Shade => Hsl::new(base_hue, 30.0, 8.0),
        Variation::Base => Hsl::new(base_hue, 12.0, 12.0),
        Variation::Tint => Hsl::new(base_hue, 10.0, 16.0),
    }
}

/// Darkened strip behind a swatch's hex label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStrip {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
    /// Tint palettes are light enough that the label reads better in black.
    pub black_text: bool,
}

/// Derive the label strip color from a swatch's hex string.
pub fn label_strip(hex: &str, variation: Variation) -> LabelStrip {
    let byte = |range: std::ops::Range<usize>| -> u8 {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    let (r, g, b) = (byte(1..3), byte(3..5), byte(5..7));

    let (darken, alpha, black_text) = match variation {
        Variation::Shade => (0.6, 0.95, false),
        Variation::Tint => (0.8, 0.85, true),
        Variation::Base => (0.7, 0.9, false),
    };

    LabelStrip {
        r: (r as f32 * darken) as u8,
        g: (g as f32 * darken) as u8,
        b: (b as f32 * darken) as u8,
        alpha,
        black_text,
    }
}
