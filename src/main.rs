use bevy::{prelude::*, window::PrimaryWindow};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use palettone::audio::ToneEngine;
use palettone::clipboard;
use palettone::color::background_color;
use palettone::config::Config;
use palettone::layout::LayoutSelector;
use palettone::palette::{self, PaletteParams};
use palettone::swatch_renderer::{
    animate_click_pulses, animate_swatch_entrances, spawn_palette_grid, ClickPulse, PaletteGrid,
    Swatch, PULSE_SECS, SWATCH_STAGGER,
};
use palettone::ui::{
    animate_copy_feedback, setup_status_line, spawn_copy_feedback, update_status_line,
    CopyFeedback, StatusReadout,
};

#[derive(Parser, Debug)]
#[command(name = "palettone", about = "Generative color palettes you can hear")]
struct Cli {
    /// Path to a TOML config file (default: palettone.toml)
    #[arg(long)]
    config: Option<String>,
    /// Seed for reproducible palettes
    #[arg(long)]
    seed: Option<u64>,
    /// Master audio volume, 0.0 to 1.0
    #[arg(long)]
    volume: Option<f32>,
}

/// Generation ranges, fixed for the session once config and CLI are merged.
#[derive(Resource)]
struct Settings {
    params: PaletteParams,
}

/// Single RNG behind every random decision, seedable for reproducible runs.
#[derive(Resource)]
struct PaletteRng(StdRng);

#[derive(Resource, Default)]
struct LayoutState(LayoutSelector);

#[derive(Event)]
struct Regenerate;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // Load configuration from file, CLI flags win
    let mut config = Config::load(cli.config.as_deref());
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(volume) = cli.volume {
        config.audio_volume = volume.clamp(0.0, 1.0);
    }

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Palettone".into(),
                resolution: (1200.0, 800.0).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(Settings {
            params: config.params(),
        })
        .insert_resource(PaletteRng(rng))
        .init_resource::<LayoutState>()
        .init_resource::<StatusReadout>()
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)))
        .insert_non_send_resource(ToneEngine::new(config.audio_volume))
        .add_event::<Regenerate>()
        .add_systems(Startup, (setup_camera, setup_status_line, request_first_palette))
        .add_systems(
            Update,
            (
                trigger_regeneration,
                regenerate_palette.after(trigger_regeneration),
                handle_swatch_clicks,
                animate_swatch_entrances,
                animate_click_pulses,
                animate_copy_feedback,
                update_status_line,
            ),
        )
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn request_first_palette(mut events: EventWriter<Regenerate>) {
    events.send(Regenerate);
}

/// Click anywhere that is not a swatch rolls a new palette.
fn trigger_regeneration(
    mouse: Res<ButtonInput<MouseButton>>,
    swatches: Query<&Interaction, With<Swatch>>,
    mut events: EventWriter<Regenerate>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let over_swatch = swatches.iter().any(|i| !matches!(i, Interaction::None));
    if !over_swatch {
        events.send(Regenerate);
    }
}

/// The whole regeneration: new palette, new layout, new background, retuned
/// drone, one staggered note per swatch.
#[allow(clippy::too_many_arguments)]
fn regenerate_palette(
    mut events: EventReader<Regenerate>,
    mut commands: Commands,
    settings: Res<Settings>,
    mut rng: ResMut<PaletteRng>,
    mut layouts: ResMut<LayoutState>,
    mut readout: ResMut<StatusReadout>,
    mut clear_color: ResMut<ClearColor>,
    engine: NonSend<ToneEngine>,
    windows: Query<&Window, With<PrimaryWindow>>,
    grids: Query<Entity, With<PaletteGrid>>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();

    let aspect = windows
        .get_single()
        .map(|w| w.width() / w.height())
        .unwrap_or(1.5);

    let generated = palette::generate(&settings.params, &mut rng.0);
    let template = layouts.0.select(aspect, &mut rng.0);

    for entity in grids.iter() {
        commands.entity(entity).despawn_recursive();
    }
    spawn_palette_grid(&mut commands, &generated, template);

    let bg = background_color(generated.base_hue, generated.variation);
    clear_color.0 = Color::hsl(bg.h, bg.s / 100.0, bg.l / 100.0);

    engine.retune(generated.key);
    for (i, entry) in generated.entries.iter().enumerate() {
        engine.play_note(entry.frequency, i as f32 * SWATCH_STAGGER);
    }

    info!(
        "palette: {} {} in {} ({})",
        generated.key.name(),
        if generated.warm { "major" } else { "minor" },
        template.id.name(),
        generated.variation.name(),
    );

    *readout = StatusReadout {
        base_hue: generated.base_hue,
        key: generated.key,
        warm: generated.warm,
        variation: generated.variation,
        layout: Some(template.id),
    };
}

/// Pressing a swatch replays its note, copies the hex code and pulses the
/// tile. Copy failures only skip the toast.
fn handle_swatch_clicks(
    mut commands: Commands,
    engine: NonSend<ToneEngine>,
    interactions: Query<(Entity, &Interaction, &Swatch), Changed<Interaction>>,
    toasts: Query<Entity, With<CopyFeedback>>,
) {
    for (entity, interaction, swatch) in interactions.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }
        debug!("swatch {} clicked: {}", swatch.index, swatch.hex);
        engine.play_note(swatch.frequency, 0.0);
        if clipboard::copy_or_warn(&swatch.hex) {
            spawn_copy_feedback(&mut commands, &toasts);
        }
        commands.entity(entity).insert(ClickPulse {
            timer: Timer::from_seconds(PULSE_SECS, TimerMode::Once),
        });
    }
}
