//! Palette generation.
//!
//! The pure heart of a regeneration: roll a base hue, pick a variation
//! family, then derive four main colors plus one accent, each paired with a
//! pentatonic note frequency.

use rand::Rng;

use crate::audio::scales::{self, Key};
use crate::color::{create_variation, Hsl, Variation};

/// Tunable generation ranges, loaded from config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteParams {
    /// Hue spread (degrees) for the four main colors, centered on the base hue.
    pub main_hue_range: f32,
    /// Hue spread (degrees) for the accent, applied as a full +/- offset.
    pub accent_hue_range: f32,
    pub base_saturation: f32,
    pub base_lightness: f32,
}

impl Default for PaletteParams {
    fn default() -> Self {
        Self {
            main_hue_range: 30.0,
            accent_hue_range: 60.0,
            base_saturation: 70.0,
            base_lightness: 50.0,
        }
    }
}

/// One swatch: final color plus the note it plays when clicked.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    pub hex: String,
    pub hsl: Hsl,
    pub frequency: f32,
    pub variation: Variation,
}

/// A generated five-color palette and the musical context it was born in.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub entries: Vec<PaletteEntry>,
    pub base_hue: f32,
    pub key: Key,
    pub warm: bool,
    pub variation: Variation,
}

impl Palette {
    pub fn accent(&self) -> &PaletteEntry {
        &self.entries[4]
    }
}

/// Position i of the four mains gets intensity (i - 1.5) / 1.5, spacing the
/// family transform linearly across -1..1. The accent always gets 1.
fn main_intensity(index: usize) -> f32 {
    (index as f32 - 1.5) / 1.5
}

pub fn generate(params: &PaletteParams, rng: &mut impl Rng) -> Palette {
    let base_hue = rng.gen_range(0..360) as f32;
    let variation = Variation::ALL[rng.gen_range(0..Variation::ALL.len())];

    let key = scales::key_from_hue(base_hue);
    let warm = scales::is_warm(base_hue);
    let frequencies = scales::scale_frequencies(key, warm, variation);

    let mut entries = Vec::with_capacity(5);
    for i in 0..4 {
        let hue = (base_hue + rng.gen::<f32>() * params.main_hue_range
            - params.main_hue_range / 2.0)
            .rem_euclid(360.0);
        let saturation = params.base_saturation + (rng.gen::<f32>() * 20.0 - 10.0);
        let lightness = params.base_lightness + (rng.gen::<f32>() * 20.0 - 10.0);
        let hsl = create_variation(hue, saturation, lightness, variation, main_intensity(i));
        entries.push(PaletteEntry {
            hex: hsl.to_hex(),
            hsl,
            frequency: frequencies[i],
            variation,
        });
    }

    let accent_hue = (base_hue + rng.gen::<f32>() * params.accent_hue_range * 2.0
        - params.accent_hue_range)
        .rem_euclid(360.0);
    let accent_saturation = params.base_saturation + (rng.gen::<f32>() * 20.0 - 10.0);
    let accent_lightness = params.base_lightness + (rng.gen::<f32>() * 20.0 - 10.0);
    let hsl = create_variation(accent_hue, accent_saturation, accent_lightness, variation, 1.0);
    entries.push(PaletteEntry {
        hex: hsl.to_hex(),
        hsl,
        frequency: frequencies[4],
        variation,
    });

    Palette {
        entries,
        base_hue,
        key,
        warm,
        variation,
    }
}

// ---------- tests ----------
#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn produces_five_entries_in_one_family() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let palette = generate(&PaletteParams::default(), &mut rng);
            assert_eq!(palette.entries.len(), 5);
            for entry in &palette.entries {
                assert_eq!(entry.variation, palette.variation);
            }
        }
    }

    #[test]
    fn hex_strings_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(2);
        let palette = generate(&PaletteParams::default(), &mut rng);
        for entry in &palette.entries {
            assert_eq!(entry.hex.len(), 7);
            assert!(entry.hex.starts_with('#'));
            assert!(entry.hex[1..].chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(entry.hex, entry.hex.to_uppercase());
        }
    }

    #[test]
    fn frequencies_match_the_palette_scale() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let palette = generate(&PaletteParams::default(), &mut rng);
            let expected =
                scales::scale_frequencies(palette.key, palette.warm, palette.variation);
            for (entry, freq) in palette.entries.iter().zip(expected) {
                assert_eq!(entry.frequency, freq);
            }
        }
    }

    #[test]
    fn key_and_warmth_derive_from_base_hue() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            let palette = generate(&PaletteParams::default(), &mut rng);
            assert_eq!(palette.key, scales::key_from_hue(palette.base_hue));
            assert_eq!(palette.warm, scales::is_warm(palette.base_hue));
        }
    }

    #[test]
    fn intensities_space_the_mains() {
        assert_eq!(main_intensity(0), -1.0);
        assert_eq!(main_intensity(3), 1.0);
        assert!((main_intensity(1) + 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn outputs_stay_inside_visible_ranges() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let palette = generate(&PaletteParams::default(), &mut rng);
            for entry in &palette.entries {
                assert!(entry.hsl.s <= 100.0);
                assert!(entry.hsl.l >= 15.0 && entry.hsl.l <= 85.0, "l={}", entry.hsl.l);
                assert!(entry.hsl.h >= 0.0 && entry.hsl.h < 360.0);
            }
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate(&PaletteParams::default(), &mut StdRng::seed_from_u64(99));
        let b = generate(&PaletteParams::default(), &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
