pub mod engine;
pub mod scales;

pub use engine::ToneEngine;
pub use scales::{key_from_hue, is_warm, scale_frequencies, Key};
