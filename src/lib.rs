//! palettone — generative color palettes you can hear.
//!
//! Every click rolls a fresh five-color palette: a base hue picks a musical
//! key off the circle of fifths, a variation family (shade/base/tint) sets
//! the treatment, and each swatch lands on one degree of a pentatonic scale.
//! The pure logic (color math, key selection, layout choice, palette
//! generation) lives in plain modules with no Bevy types so it tests
//! headless; the renderer and the rodio tone engine sit on top.
//!
//! # Example
//! ```
//! use palettone::palette::{generate, PaletteParams};
//! use rand::SeedableRng;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let palette = generate(&PaletteParams::default(), &mut rng);
//! assert_eq!(palette.entries.len(), 5);
//! ```

pub mod audio;
pub mod clipboard;
pub mod color;
pub mod config;
pub mod layout;
pub mod palette;
pub mod swatch_renderer;
pub mod ui;

// Main exports
pub use audio::{Key, ToneEngine};
pub use color::{Hsl, Variation};
pub use config::Config;
pub use layout::{LayoutId, LayoutSelector, LayoutTemplate};
pub use palette::{Palette, PaletteEntry, PaletteParams};
