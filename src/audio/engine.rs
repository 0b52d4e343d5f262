//! Tone engine: a background drone that tracks the palette's key plus
//! one-shot note voices for the swatches, mixed through a small reverb.
//!
//! Everything renders inside a single infinite mono [`Source`] owned by the
//! rodio sink. The app thread talks to it over a channel; master volume is a
//! shared atomic so it applies without a round-trip.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use atomic_float::AtomicF32;
use crossbeam_channel::{Receiver, Sender};
use log::warn;
use rodio::{OutputStream, Sink, Source};

use super::scales::Key;

pub const SAMPLE_RATE: u32 = 44100;

pub const DRONE_VOLUME: f32 = 0.095;
pub const NOTE_VOLUME: f32 = 0.08;
pub const FILTER_FREQUENCY: f32 = 300.0;
pub const FILTER_Q: f32 = 3.0;
/// Seconds of full-level drone before the fade-out starts.
pub const DRONE_FADE_TIME: f32 = 1.5;
/// Seconds the fade-out takes once started.
pub const DRONE_FADE_DURATION: f32 = 2.0;

const RETUNE_TAU: f32 = 0.1;
const NOTE_ATTACK: f32 = 0.1;
const NOTE_RELEASE: f32 = 0.8;
const NOTE_CUTOFF: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineCommand {
    /// Glide the drone to a new root and restart its fade cycle.
    Retune { frequency: f32 },
    /// Schedule a one-shot sine note `delay` seconds from now.
    PlayNote { frequency: f32, delay: f32 },
}

/// Handle owned by the app. Holds the output stream alive and feeds the
/// mixer. If no audio device is available the handle still works, it just
/// does nothing, so the toy stays usable on silent machines.
pub struct ToneEngine {
    inner: Option<EngineInner>,
    volume: Arc<AtomicF32>,
}

struct EngineInner {
    _stream: OutputStream,
    _sink: Sink,
    commands: Sender<EngineCommand>,
}

impl ToneEngine {
    pub fn new(volume: f32) -> Self {
        let volume = Arc::new(AtomicF32::new(volume));

        let inner = match OutputStream::try_default() {
            Ok((stream, handle)) => {
                let (tx, rx) = crossbeam_channel::unbounded();
                let source = BusSource::new(rx, Arc::clone(&volume));
                match Sink::try_new(&handle) {
                    Ok(sink) => {
                        sink.append(source);
                        Some(EngineInner {
                            _stream: stream,
                            _sink: sink,
                            commands: tx,
                        })
                    }
                    Err(e) => {
                        warn!("audio sink unavailable, running silent: {e}");
                        None
                    }
                }
            }
            Err(e) => {
                warn!("no audio output device, running silent: {e}");
                None
            }
        };

        Self { inner, volume }
    }

    /// An engine with no output, for headless use.
    pub fn disabled(volume: f32) -> Self {
        Self {
            inner: None,
            volume: Arc::new(AtomicF32::new(volume)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_some()
    }

    /// Move the drone to the palette's key, two octaves below the root.
    pub fn retune(&self, key: Key) {
        self.send(EngineCommand::Retune {
            frequency: key.frequency() / 4.0,
        });
    }

    pub fn play_note(&self, frequency: f32, delay: f32) {
        self.send(EngineCommand::PlayNote { frequency, delay });
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume.store(volume.clamp(0.0, 1.0), Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        self.volume.load(Ordering::Relaxed)
    }

    fn send(&self, cmd: EngineCommand) {
        if let Some(inner) = &self.inner {
            if inner.commands.send(cmd).is_err() {
                warn!("audio mixer stopped accepting commands");
            }
        }
    }
}

/// One-pole smoother, the sample-domain version of an exponential approach
/// with time constant `tau`.
#[derive(Debug, Clone, Copy)]
struct Smoothed {
    current: f32,
    target: f32,
    coeff: f32,
}

impl Smoothed {
    fn new(value: f32, tau: f32, sample_rate: f32) -> Self {
        Self {
            current: value,
            target: value,
            coeff: 1.0 - (-1.0 / (tau * sample_rate)).exp(),
        }
    }

    fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    fn next(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }
}

/// Drone fade lifecycle, counted in samples so it lives entirely inside the
/// mixer. Each retune replaces the state wholesale, which is what cancels a
/// pending fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fade {
    /// Full level, counting down to the fade start.
    Armed { countdown: u32 },
    /// Ramping to silence.
    Fading { remaining: u32, total: u32 },
    Done,
}

impl Fade {
    fn armed(sample_rate: u32) -> Self {
        Fade::Armed {
            countdown: (DRONE_FADE_TIME * sample_rate as f32) as u32,
        }
    }

    /// Gain for the current sample, then advance one sample.
    fn gain(&mut self, sample_rate: u32) -> f32 {
        match *self {
            Fade::Armed { countdown } => {
                if countdown == 0 {
                    let total = (DRONE_FADE_DURATION * sample_rate as f32) as u32;
                    *self = Fade::Fading {
                        remaining: total,
                        total,
                    };
                    DRONE_VOLUME
                } else {
                    *self = Fade::Armed {
                        countdown: countdown - 1,
                    };
                    DRONE_VOLUME
                }
            }
            Fade::Fading { remaining, total } => {
                if remaining == 0 {
                    *self = Fade::Done;
                    0.0
                } else {
                    *self = Fade::Fading {
                        remaining: remaining - 1,
                        total,
                    };
                    DRONE_VOLUME * remaining as f32 / total as f32
                }
            }
            Fade::Done => 0.0,
        }
    }
}

/// 4-pole resonant low-pass in ladder form. Cutoff moves per sample so the
/// retune glide stays clickless.
#[derive(Debug, Clone, Copy)]
struct LadderFilter {
    resonance: f32,
    state: [f32; 4],
}

impl LadderFilter {
    fn new(q: f32) -> Self {
        // map the biquad-style Q into ladder feedback territory
        Self {
            resonance: (q / 5.0).min(0.9),
            state: [0.0; 4],
        }
    }

    fn process(&mut self, input: f32, cutoff: f32, sample_rate: f32) -> f32 {
        let f = (cutoff * 2.0 * std::f32::consts::PI / sample_rate).min(0.99);
        let fb = self.resonance + self.resonance / (1.0 - f);

        self.state[0] += f * (input - self.state[0] + fb * (self.state[0] - self.state[1]));
        self.state[1] += f * (self.state[0] - self.state[1]);
        self.state[2] += f * (self.state[1] - self.state[2]);
        self.state[3] += f * (self.state[2] - self.state[3]);

        self.state[3]
    }
}

/// Triangle drone with glide, filter and the armed/fading gain cycle.
#[derive(Debug)]
struct DroneSynth {
    phase: f32,
    frequency: Smoothed,
    cutoff: Smoothed,
    filter: LadderFilter,
    fade: Fade,
    sample_rate: u32,
}

impl DroneSynth {
    fn new(sample_rate: u32) -> Self {
        let root = Key::C.frequency() / 4.0;
        let sr = sample_rate as f32;
        Self {
            phase: 0.0,
            frequency: Smoothed::new(root, RETUNE_TAU, sr),
            cutoff: Smoothed::new(
                (root * 4.0).min(FILTER_FREQUENCY),
                RETUNE_TAU,
                sr,
            ),
            filter: LadderFilter::new(FILTER_Q),
            fade: Fade::armed(sample_rate),
            sample_rate,
        }
    }

    fn retune(&mut self, frequency: f32) {
        self.frequency.set_target(frequency);
        self.cutoff.set_target((frequency * 4.0).min(FILTER_FREQUENCY));
        self.fade = Fade::armed(self.sample_rate);
    }

    fn next_sample(&mut self) -> f32 {
        let gain = self.fade.gain(self.sample_rate);
        let freq = self.frequency.next();
        let cutoff = self.cutoff.next();

        let tri = if self.phase < 0.5 {
            4.0 * self.phase - 1.0
        } else {
            3.0 - 4.0 * self.phase
        };
        self.phase = (self.phase + freq / self.sample_rate as f32).fract();

        self.filter.process(tri, cutoff, self.sample_rate as f32) * gain
    }

    fn silent(&self) -> bool {
        self.fade == Fade::Done
    }
}

/// One-shot sine voice with the swatch envelope: linear rise to peak over
/// 0.1 s, linear fall to zero by 0.8 s, hard stop at 1 s.
#[derive(Debug, Clone, Copy)]
struct NoteVoice {
    frequency: f32,
    delay_samples: u32,
    elapsed: u32,
    phase: f32,
    sample_rate: u32,
}

impl NoteVoice {
    fn new(frequency: f32, delay: f32, sample_rate: u32) -> Self {
        Self {
            frequency,
            delay_samples: (delay.max(0.0) * sample_rate as f32) as u32,
            elapsed: 0,
            phase: 0.0,
            sample_rate,
        }
    }

    fn envelope(&self) -> f32 {
        let t = self.elapsed as f32 / self.sample_rate as f32;
        if t < NOTE_ATTACK {
            NOTE_VOLUME * t / NOTE_ATTACK
        } else if t < NOTE_RELEASE {
            NOTE_VOLUME * (NOTE_RELEASE - t) / (NOTE_RELEASE - NOTE_ATTACK)
        } else {
            0.0
        }
    }

    fn next_sample(&mut self) -> f32 {
        if self.delay_samples > 0 {
            self.delay_samples -= 1;
            return 0.0;
        }
        let sample = (self.phase * 2.0 * std::f32::consts::PI).sin() * self.envelope();
        self.phase = (self.phase + self.frequency / self.sample_rate as f32).fract();
        self.elapsed += 1;
        sample
    }

    fn finished(&self) -> bool {
        self.delay_samples == 0
            && self.elapsed as f32 / self.sample_rate as f32 >= NOTE_CUTOFF
    }
}

/// Small hall: four damped delay lines with a sign-flip feedback matrix.
/// Returns the wet signal only; the bus does the dry/wet split.
#[derive(Debug)]
struct Reverb {
    lines: [ReverbLine; 4],
}

#[derive(Debug)]
struct ReverbLine {
    buffer: Vec<f32>,
    write_pos: usize,
    damp_state: f32,
}

const REVERB_TIMES: [f32; 4] = [0.029, 0.037, 0.047, 0.059];
const REVERB_FEEDBACK: [[f32; 4]; 4] = [
    [0.5, 0.5, 0.5, 0.5],
    [0.5, -0.5, 0.5, -0.5],
    [0.5, 0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5, 0.5],
];
const REVERB_DECAY: f32 = 0.65;
const REVERB_DAMPING: f32 = 0.3;

impl Reverb {
    fn new(sample_rate: u32) -> Self {
        let lines = REVERB_TIMES.map(|time| ReverbLine {
            buffer: vec![0.0; (sample_rate as f32 * time) as usize],
            write_pos: 0,
            damp_state: 0.0,
        });
        Self { lines }
    }

    fn process(&mut self, input: f32) -> f32 {
        let mut taps = [0.0f32; 4];
        for (tap, line) in taps.iter_mut().zip(&self.lines) {
            *tap = line.buffer[line.write_pos];
        }

        for (i, line) in self.lines.iter_mut().enumerate() {
            let mut sum = input;
            for j in 0..4 {
                sum += taps[j] * REVERB_FEEDBACK[i][j] * REVERB_DECAY;
            }
            line.damp_state += REVERB_DAMPING * (sum - line.damp_state);
            line.buffer[line.write_pos] = line.damp_state;
            line.write_pos = (line.write_pos + 1) % line.buffer.len();
        }

        taps.iter().sum::<f32>() / 4.0
    }
}

/// The mixer itself: an endless mono stream the sink pulls from.
pub struct BusSource {
    commands: Receiver<EngineCommand>,
    volume: Arc<AtomicF32>,
    drone: DroneSynth,
    voices: Vec<NoteVoice>,
    reverb: Reverb,
    sample_rate: u32,
}

impl BusSource {
    pub fn new(commands: Receiver<EngineCommand>, volume: Arc<AtomicF32>) -> Self {
        Self {
            commands,
            volume,
            drone: DroneSynth::new(SAMPLE_RATE),
            voices: Vec::new(),
            reverb: Reverb::new(SAMPLE_RATE),
            sample_rate: SAMPLE_RATE,
        }
    }

    fn drain_commands(&mut self) {
        while let Ok(cmd) = self.commands.try_recv() {
            match cmd {
                EngineCommand::Retune { frequency } => self.drone.retune(frequency),
                EngineCommand::PlayNote { frequency, delay } => {
                    self.voices.push(NoteVoice::new(frequency, delay, self.sample_rate));
                }
            }
        }
    }
}

impl Iterator for BusSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        self.drain_commands();

        let mut dry = self.drone.next_sample();
        for voice in &mut self.voices {
            dry += voice.next_sample();
        }
        self.voices.retain(|v| !v.finished());

        let wet = self.reverb.process(dry);
        let master = self.volume.load(Ordering::Relaxed);
        Some((dry * 0.5 + wet * 0.5) * master)
    }
}

impl Source for BusSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }
    fn channels(&self) -> u16 {
        1
    }
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

// ---------- tests ----------
#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: f32) -> u32 {
        (n * SAMPLE_RATE as f32) as u32
    }

    #[test]
    fn smoothed_converges_on_target() {
        let mut s = Smoothed::new(0.0, RETUNE_TAU, SAMPLE_RATE as f32);
        s.set_target(100.0);
        let mut prev = 0.0;
        for _ in 0..secs(0.5) {
            let v = s.next();
            assert!(v >= prev);
            prev = v;
        }
        assert!((prev - 100.0).abs() < 1.0);
    }

    #[test]
    fn fade_holds_then_ramps_to_silence() {
        let mut fade = Fade::armed(SAMPLE_RATE);
        for _ in 0..secs(DRONE_FADE_TIME) {
            assert_eq!(fade.gain(SAMPLE_RATE), DRONE_VOLUME);
        }
        let mut last = DRONE_VOLUME;
        for _ in 0..=secs(DRONE_FADE_DURATION) {
            let g = fade.gain(SAMPLE_RATE);
            assert!(g <= last);
            last = g;
        }
        assert_eq!(fade.gain(SAMPLE_RATE), 0.0);
        assert_eq!(fade, Fade::Done);
    }

    #[test]
    fn retune_rearms_a_finished_fade() {
        let mut drone = DroneSynth::new(SAMPLE_RATE);
        for _ in 0..secs(DRONE_FADE_TIME + DRONE_FADE_DURATION + 0.1) {
            drone.next_sample();
        }
        assert!(drone.silent());
        drone.retune(110.0);
        assert!(!drone.silent());
        let loud: f32 = (0..secs(0.2)).map(|_| drone.next_sample().abs()).sum();
        assert!(loud > 0.0);
    }

    #[test]
    fn retune_moves_the_filter_with_the_root() {
        let mut drone = DroneSynth::new(SAMPLE_RATE);
        drone.retune(50.0);
        assert_eq!(drone.cutoff.target, 200.0);
        drone.retune(110.0);
        // capped at the filter ceiling
        assert_eq!(drone.cutoff.target, FILTER_FREQUENCY);
    }

    #[test]
    fn note_envelope_rises_peaks_and_dies() {
        let mut voice = NoteVoice::new(440.0, 0.0, SAMPLE_RATE);
        assert_eq!(voice.envelope(), 0.0);

        for _ in 0..secs(NOTE_ATTACK) {
            voice.next_sample();
        }
        assert!((voice.envelope() - NOTE_VOLUME).abs() < 1e-3);

        for _ in 0..secs(NOTE_RELEASE - NOTE_ATTACK) {
            voice.next_sample();
        }
        assert!(voice.envelope() < 1e-3);
        assert!(!voice.finished());

        for _ in 0..secs(NOTE_CUTOFF - NOTE_RELEASE) {
            voice.next_sample();
        }
        assert!(voice.finished());
    }

    #[test]
    fn delayed_voice_stays_silent_until_its_slot() {
        let mut voice = NoteVoice::new(440.0, 0.3, SAMPLE_RATE);
        for _ in 0..secs(0.3) {
            assert_eq!(voice.next_sample(), 0.0);
        }
        let audible: f32 = (0..secs(0.2)).map(|_| voice.next_sample().abs()).sum();
        assert!(audible > 0.0);
    }

    #[test]
    fn bus_mixes_notes_and_retires_finished_voices() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut bus = BusSource::new(rx, Arc::new(AtomicF32::new(1.0)));

        // let the drone fade out completely first
        for _ in 0..secs(DRONE_FADE_TIME + DRONE_FADE_DURATION + 1.0) {
            bus.next();
        }

        tx.send(EngineCommand::PlayNote {
            frequency: 440.0,
            delay: 0.0,
        })
        .unwrap();
        let heard: f32 = (0..secs(0.5)).map(|_| bus.next().unwrap().abs()).sum();
        assert!(heard > 0.0);
        assert_eq!(bus.voices.len(), 1);

        for _ in 0..secs(1.0) {
            bus.next();
        }
        assert!(bus.voices.is_empty());
    }

    #[test]
    fn master_volume_scales_the_bus() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let volume = Arc::new(AtomicF32::new(0.0));
        let mut bus = BusSource::new(rx, Arc::clone(&volume));
        tx.send(EngineCommand::PlayNote {
            frequency: 440.0,
            delay: 0.0,
        })
        .unwrap();
        for _ in 0..secs(0.5) {
            assert_eq!(bus.next(), Some(0.0));
        }
    }

    #[test]
    fn bus_is_an_infinite_mono_source() {
        let (_tx, rx) = crossbeam_channel::unbounded();
        let bus = BusSource::new(rx, Arc::new(AtomicF32::new(1.0)));
        assert_eq!(bus.channels(), 1);
        assert_eq!(bus.sample_rate(), SAMPLE_RATE);
        assert_eq!(bus.current_frame_len(), None);
        assert_eq!(bus.total_duration(), None);
    }

    #[test]
    fn disabled_engine_swallows_everything() {
        let engine = ToneEngine::disabled(0.7);
        assert!(!engine.is_running());
        engine.retune(Key::A);
        engine.play_note(440.0, 0.0);
        engine.set_volume(0.4);
        assert_eq!(engine.volume(), 0.4);
    }
}
