//! Grid layout templates and selection.
//!
//! Four fixed five-area grid compositions. Each regeneration picks one based
//! on the window's aspect ratio, with a hard guarantee that the same template
//! never shows twice in a row.

use rand::Rng;

pub const GOLDEN_RATIO: f32 = 1.618;
pub const INVERSE_GOLDEN_RATIO: f32 = 0.618;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutId {
    GoldenRatio,
    RuleOfThirds,
    DynamicSplit,
    FocalPoint,
}

impl LayoutId {
    pub fn name(self) -> &'static str {
        match self {
            LayoutId::GoldenRatio => "goldenRatio",
            LayoutId::RuleOfThirds => "ruleOfThirds",
            LayoutId::DynamicSplit => "dynamicSplit",
            LayoutId::FocalPoint => "focalPoint",
        }
    }
}

/// One named grid area as line/span placement. Lines are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaSpan {
    pub column: i16,
    pub column_span: u16,
    pub row: i16,
    pub row_span: u16,
}

const fn area(column: i16, column_span: u16, row: i16, row_span: u16) -> AreaSpan {
    AreaSpan {
        column,
        column_span,
        row,
        row_span,
    }
}

/// A complete grid composition: fractional track sizes plus the placement of
/// the five swatch areas (index 4 is the accent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutTemplate {
    pub id: LayoutId,
    pub columns: &'static [f32],
    pub rows: &'static [f32],
    pub areas: [AreaSpan; 5],
    pub gap: f32,
}

const GAP: f32 = 8.0;

/// All templates, in selection-pool order.
///
/// goldenRatio      ruleOfThirds     dynamicSplit     focalPoint
///   a b c            a a b            a b              a b
///   a d e            c d e            a c              a c
///                                     d e              d e
pub static LAYOUTS: [LayoutTemplate; 4] = [
    LayoutTemplate {
        id: LayoutId::GoldenRatio,
        columns: &[GOLDEN_RATIO, 1.0, 1.0],
        rows: &[1.0, 1.0],
        areas: [
            area(1, 1, 1, 2),
            area(2, 1, 1, 1),
            area(3, 1, 1, 1),
            area(2, 1, 2, 1),
            area(3, 1, 2, 1),
        ],
        gap: GAP,
    },
    LayoutTemplate {
        id: LayoutId::RuleOfThirds,
        columns: &[1.0, 1.0, 1.0],
        rows: &[2.0, 1.0],
        areas: [
            area(1, 2, 1, 1),
            area(3, 1, 1, 1),
            area(1, 1, 2, 1),
            area(2, 1, 2, 1),
            area(3, 1, 2, 1),
        ],
        gap: GAP,
    },
    LayoutTemplate {
        id: LayoutId::DynamicSplit,
        columns: &[2.0, 1.0],
        rows: &[1.0, 1.0, 1.0],
        areas: [
            area(1, 1, 1, 2),
            area(2, 1, 1, 1),
            area(2, 1, 2, 1),
            area(1, 1, 3, 1),
            area(2, 1, 3, 1),
        ],
        gap: GAP,
    },
    LayoutTemplate {
        id: LayoutId::FocalPoint,
        columns: &[GOLDEN_RATIO, 1.0],
        // the third track carries the bottom pair of areas
        rows: &[INVERSE_GOLDEN_RATIO, 1.0, 1.0],
        areas: [
            area(1, 1, 1, 2),
            area(2, 1, 1, 1),
            area(2, 1, 2, 1),
            area(1, 1, 3, 1),
            area(2, 1, 3, 1),
        ],
        gap: GAP,
    },
];

pub fn template(id: LayoutId) -> &'static LayoutTemplate {
    // LAYOUTS is declared in enum order
    &LAYOUTS[id as usize]
}

/// Picks the next layout. Wide windows lean on the horizontal templates,
/// tall windows on the vertical ones, with a 30% chance of breaking out of
/// the preferred pool. Never returns the previous pick.
#[derive(Debug, Default)]
pub struct LayoutSelector {
    last: Option<LayoutId>,
}

impl LayoutSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<LayoutId> {
        self.last
    }

    pub fn select(&mut self, aspect_ratio: f32, rng: &mut impl Rng) -> &'static LayoutTemplate {
        let preferred: &[LayoutId] = if aspect_ratio > 1.2 {
            &[LayoutId::GoldenRatio, LayoutId::RuleOfThirds]
        } else if aspect_ratio < 0.8 {
            &[LayoutId::DynamicSplit, LayoutId::FocalPoint]
        } else {
            &[]
        };

        let from_pool = preferred.iter().copied().find(|&id| Some(id) != self.last);
        let id = match from_pool {
            Some(id) if rng.gen::<f32>() <= 0.7 => id,
            _ => self.random_except(rng),
        };

        self.last = Some(id);
        template(id)
    }

    fn random_except(&self, rng: &mut impl Rng) -> LayoutId {
        let pool: Vec<LayoutId> = LAYOUTS
            .iter()
            .map(|t| t.id)
            .filter(|&id| Some(id) != self.last)
            .collect();
        pool[rng.gen_range(0..pool.len())]
    }
}

// ---------- tests ----------
#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cells_covered(t: &LayoutTemplate) -> usize {
        t.areas
            .iter()
            .map(|a| a.column_span as usize * a.row_span as usize)
            .sum()
    }

    #[test]
    fn template_lookup_matches_enum_order() {
        for id in [
            LayoutId::GoldenRatio,
            LayoutId::RuleOfThirds,
            LayoutId::DynamicSplit,
            LayoutId::FocalPoint,
        ] {
            assert_eq!(template(id).id, id);
        }
    }

    #[test]
    fn every_template_tiles_its_grid() {
        for t in &LAYOUTS {
            assert_eq!(cells_covered(t), t.columns.len() * t.rows.len());
            for a in &t.areas {
                assert!(a.column >= 1);
                assert!(a.row >= 1);
                assert!((a.column as usize - 1) + a.column_span as usize <= t.columns.len());
                assert!((a.row as usize - 1) + a.row_span as usize <= t.rows.len());
            }
        }
    }

    #[test]
    fn areas_never_overlap() {
        for t in &LAYOUTS {
            let mut occupied = Vec::new();
            for a in &t.areas {
                for c in 0..a.column_span {
                    for r in 0..a.row_span {
                        let cell = (a.column + c as i16, a.row + r as i16);
                        assert!(!occupied.contains(&cell), "{:?} overlaps at {:?}", t.id, cell);
                        occupied.push(cell);
                    }
                }
            }
        }
    }

    #[test]
    fn never_repeats_the_previous_layout() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut selector = LayoutSelector::new();
        let mut last = None;
        for i in 0..1000 {
            let aspect = match i % 3 {
                0 => 1.6,
                1 => 0.6,
                _ => 1.0,
            };
            let picked = selector.select(aspect, &mut rng).id;
            assert_ne!(Some(picked), last);
            last = Some(picked);
        }
    }

    #[test]
    fn wide_windows_prefer_horizontal_templates() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut selector = LayoutSelector::new();
        let mut horizontal = 0;
        for _ in 0..1000 {
            let id = selector.select(1.8, &mut rng).id;
            if matches!(id, LayoutId::GoldenRatio | LayoutId::RuleOfThirds) {
                horizontal += 1;
            }
        }
        assert!(horizontal > 600, "only {horizontal}/1000 horizontal picks");
    }

    #[test]
    fn balanced_windows_draw_from_everything() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut selector = LayoutSelector::new();
        let mut seen = Vec::new();
        for _ in 0..200 {
            let id = selector.select(1.0, &mut rng).id;
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        assert_eq!(seen.len(), 4);
    }
}
