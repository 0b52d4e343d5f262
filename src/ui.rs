//! Overlay UI: the copy-confirmation toast and the palette status line.

use bevy::prelude::*;

use crate::audio::scales::Key;
use crate::color::Variation;
use crate::layout::LayoutId;

const FEEDBACK_HOLD_SECS: f32 = 1.5;
const FEEDBACK_SLIDE_SECS: f32 = 0.3;
const FEEDBACK_FADE_SECS: f32 = 0.3;
const FEEDBACK_RISE_PX: f32 = 60.0;

/// "Color copied!" toast at the bottom of the window. Spawning a new one
/// replaces any toast still on screen.
#[derive(Component)]
pub struct CopyFeedback {
    pub hold: Timer,
    pub fade: Timer,
}

#[derive(Component)]
pub struct StatusText;

/// Data the status line shows for the current palette.
#[derive(Resource, Default)]
pub struct StatusReadout {
    pub base_hue: f32,
    pub key: Key,
    pub warm: bool,
    pub variation: Variation,
    pub layout: Option<LayoutId>,
}

pub fn setup_status_line(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgba(1.0, 1.0, 1.0, 0.55)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            bottom: Val::Px(8.0),
            ..default()
        },
        StatusText,
    ));
}

pub fn update_status_line(
    readout: Res<StatusReadout>,
    mut query: Query<&mut Text, With<StatusText>>,
) {
    if !readout.is_changed() {
        return;
    }
    let Ok(mut text) = query.get_single_mut() else {
        return;
    };
    let scale = if readout.warm { "major" } else { "minor" };
    let layout = readout.layout.map(LayoutId::name).unwrap_or("-");
    **text = format!(
        "hue {:.0}  {} {} pentatonic  {}  {}",
        readout.base_hue,
        readout.key.name(),
        scale,
        readout.variation.name(),
        layout,
    );
}

/// Replace any visible toast with a fresh one.
pub fn spawn_copy_feedback(commands: &mut Commands, existing: &Query<Entity, With<CopyFeedback>>) {
    for entity in existing.iter() {
        commands.entity(entity).despawn_recursive();
    }
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Percent(0.0),
                right: Val::Percent(0.0),
                bottom: Val::Px(24.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
            CopyFeedback {
                hold: Timer::from_seconds(FEEDBACK_HOLD_SECS, TimerMode::Once),
                fade: Timer::from_seconds(FEEDBACK_FADE_SECS, TimerMode::Once),
            },
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        padding: UiRect::axes(Val::Px(16.0), Val::Px(8.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.8)),
                    BorderRadius::all(Val::Px(20.0)),
                ))
                .with_children(|pill| {
                    pill.spawn((
                        Text::new("Color copied!"),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                });
        });
}

/// Slide the toast up while it appears, hold, then fade it out and despawn.
pub fn animate_copy_feedback(
    mut commands: Commands,
    time: Res<Time>,
    mut toasts: Query<(Entity, &mut CopyFeedback, &mut Transform, &Children)>,
    mut pills: Query<&mut BackgroundColor>,
) {
    for (entity, mut toast, mut transform, children) in toasts.iter_mut() {
        if !toast.hold.finished() {
            toast.hold.tick(time.delta());
            let rise = 1.0 - (toast.hold.elapsed_secs() / FEEDBACK_SLIDE_SECS).min(1.0);
            transform.translation.y = FEEDBACK_RISE_PX * rise;
            continue;
        }

        toast.fade.tick(time.delta());
        let alpha = 1.0 - toast.fade.fraction();
        transform.translation.y = -20.0 * toast.fade.fraction();
        for child in children.iter() {
            if let Ok(mut background) = pills.get_mut(*child) {
                background.0 = background.0.with_alpha(0.8 * alpha);
            }
        }
        if toast.fade.finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

// ---------- tests ----------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_formats_palette_facts() {
        let readout = StatusReadout {
            base_hue: 210.0,
            key: Key::FSharp,
            warm: false,
            variation: Variation::Tint,
            layout: Some(LayoutId::DynamicSplit),
        };
        let scale = if readout.warm { "major" } else { "minor" };
        let line = format!(
            "hue {:.0}  {} {} pentatonic  {}  {}",
            readout.base_hue,
            readout.key.name(),
            scale,
            readout.variation.name(),
            readout.layout.map(LayoutId::name).unwrap_or("-"),
        );
        assert_eq!(line, "hue 210  F# minor pentatonic  tint  dynamicSplit");
    }
}
