//! Swatch grid rendering and animation.
//!
//! Each regeneration despawns the previous grid subtree and spawns a fresh
//! one from the palette and the chosen layout template. Swatches enter with
//! a staggered scale/fade, in the same order their notes play.

use bevy::prelude::*;

use crate::color::{label_strip, Variation};
use crate::layout::LayoutTemplate;
use crate::palette::Palette;

/// Seconds between one swatch's entrance and the next.
pub const SWATCH_STAGGER: f32 = 0.1;
/// Length of the entrance scale/fade.
pub const ENTRANCE_SECS: f32 = 0.5;
/// Length of the click pulse.
pub const PULSE_SECS: f32 = 0.2;

const GRID_PADDING: f32 = 32.0;
const SWATCH_RADIUS: f32 = 12.0;

/// Marker for the grid container. The whole subtree under it is rebuilt on
/// every regeneration.
#[derive(Component)]
pub struct PaletteGrid;

#[derive(Component)]
pub struct Swatch {
    pub index: usize,
    pub hex: String,
    pub frequency: f32,
    pub color: Color,
}

/// Staggered entrance: wait out `delay`, then run `entrance`.
#[derive(Component)]
pub struct SwatchAnimation {
    pub delay: Timer,
    pub entrance: Timer,
}

/// Short scale dip after a click.
#[derive(Component)]
pub struct ClickPulse {
    pub timer: Timer,
}

fn smooth_step(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Spawn the grid for a palette. The caller despawns the old grid first.
pub fn spawn_palette_grid(
    commands: &mut Commands,
    palette: &Palette,
    template: &'static LayoutTemplate,
) {
    let columns: Vec<RepeatedGridTrack> =
        template.columns.iter().map(|&fr| GridTrack::fr(fr)).collect();
    let rows: Vec<RepeatedGridTrack> =
        template.rows.iter().map(|&fr| GridTrack::fr(fr)).collect();

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                display: Display::Grid,
                padding: UiRect::all(Val::Px(GRID_PADDING)),
                grid_template_columns: columns,
                grid_template_rows: rows,
                row_gap: Val::Px(template.gap),
                column_gap: Val::Px(template.gap),
                ..default()
            },
            Name::new(template.id.name()),
            PaletteGrid,
        ))
        .with_children(|parent| {
            for (index, entry) in palette.entries.iter().enumerate() {
                let area = template.areas[index];
                let color = Color::hsl(entry.hsl.h, entry.hsl.s / 100.0, entry.hsl.l / 100.0);
                parent
                    .spawn((
                        Button,
                        Node {
                            grid_column: GridPlacement::start_span(area.column, area.column_span),
                            grid_row: GridPlacement::start_span(area.row, area.row_span),
                            justify_content: JustifyContent::Center,
                            align_items: AlignItems::FlexEnd,
                            padding: UiRect::all(Val::Px(8.0)),
                            ..default()
                        },
                        BackgroundColor(color.with_alpha(0.0)),
                        BorderRadius::all(Val::Px(SWATCH_RADIUS)),
                        Swatch {
                            index,
                            hex: entry.hex.clone(),
                            frequency: entry.frequency,
                            color,
                        },
                        SwatchAnimation {
                            delay: Timer::from_seconds(index as f32 * SWATCH_STAGGER, TimerMode::Once),
                            entrance: Timer::from_seconds(ENTRANCE_SECS, TimerMode::Once),
                        },
                    ))
                    .with_children(|swatch| {
                        spawn_label(swatch, &entry.hex, entry.variation);
                    });
            }
        });
}

/// The darkened strip holding the hex code at the bottom of a swatch.
fn spawn_label(parent: &mut ChildBuilder, hex: &str, variation: Variation) {
    let strip = label_strip(hex, variation);
    let text_color = if strip.black_text {
        Color::BLACK
    } else {
        Color::WHITE
    };
    parent
        .spawn((
            Node {
                padding: UiRect::axes(Val::Px(10.0), Val::Px(4.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(
                strip.r as f32 / 255.0,
                strip.g as f32 / 255.0,
                strip.b as f32 / 255.0,
                strip.alpha,
            )),
            BorderRadius::all(Val::Px(6.0)),
        ))
        .with_children(|label| {
            label.spawn((
                Text::new(hex),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(text_color),
            ));
        });
}

/// Drive the staggered entrances. Alpha and scale follow the same smoothed
/// progress so late swatches pop in exactly like the early ones.
pub fn animate_swatch_entrances(
    mut commands: Commands,
    time: Res<Time>,
    mut swatches: Query<(
        Entity,
        &Swatch,
        &mut SwatchAnimation,
        &mut BackgroundColor,
        &mut Transform,
    )>,
) {
    for (entity, swatch, mut anim, mut background, mut transform) in swatches.iter_mut() {
        anim.delay.tick(time.delta());
        if !anim.delay.finished() {
            continue;
        }
        anim.entrance.tick(time.delta());

        let progress = smooth_step(anim.entrance.fraction());
        background.0 = swatch.color.with_alpha(progress);
        transform.scale = Vec3::splat(0.8 + 0.2 * progress);

        if anim.entrance.finished() {
            background.0 = swatch.color;
            transform.scale = Vec3::ONE;
            commands.entity(entity).remove::<SwatchAnimation>();
        }
    }
}

/// Scale dip and recovery on click.
pub fn animate_click_pulses(
    mut commands: Commands,
    time: Res<Time>,
    mut pulses: Query<(Entity, &mut ClickPulse, &mut Transform), Without<SwatchAnimation>>,
) {
    for (entity, mut pulse, mut transform) in pulses.iter_mut() {
        pulse.timer.tick(time.delta());
        let t = pulse.timer.fraction();
        transform.scale = Vec3::splat(1.0 - 0.06 * (t * std::f32::consts::PI).sin());
        if pulse.timer.finished() {
            transform.scale = Vec3::ONE;
            commands.entity(entity).remove::<ClickPulse>();
        }
    }
}

// ---------- tests ----------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_step_endpoints_and_midpoint() {
        assert_eq!(smooth_step(0.0), 0.0);
        assert_eq!(smooth_step(1.0), 1.0);
        assert_eq!(smooth_step(0.5), 0.5);
        assert_eq!(smooth_step(-1.0), 0.0);
        assert_eq!(smooth_step(2.0), 1.0);
    }

    #[test]
    fn smooth_step_eases_both_ends() {
        // slower than linear near the edges, faster in the middle
        assert!(smooth_step(0.1) < 0.1);
        assert!(smooth_step(0.9) > 0.9);
    }

    #[test]
    fn stagger_orders_swatch_entrances() {
        let delays: Vec<f32> = (0..5).map(|i| i as f32 * SWATCH_STAGGER).collect();
        for pair in delays.windows(2) {
            assert!((pair[1] - pair[0] - SWATCH_STAGGER).abs() < 1e-6);
        }
        assert_eq!(delays[4], 0.4);
    }
}
