//! Audio Engine Module
//!
//! This module provides decoding, storage and real-time mixing of sounds.
//! It is organized into sub-modules, each with a specific responsibility:
//!
//! - [`audio_stream`]: CPAL output stream that drives [`Mixer::render`]
//! - [`config`]: Output format validation
//! - [`constants`]: Capacities and scale factors
//! - [`decoder`]: Compressed audio decoding
//! - [`errors`]: Audio-specific error types
//! - [`mixer`]: Lock-free mixing core
//! - [`resample`]: Box-filter rate and channel conversion
//! - [`sample_buffer`]: Growable decoder output buffer
//! - [`sound_bank`]: Fixed-capacity sound storage
//! - [`track`]: Playback slots and handles
//!
//! The main [`Mixer`] struct puts the mixing core behind a single mutex so the
//! control context and the render context can share it.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::audio_engine::config::MixerConfig;
use crate::audio_engine::constants::MAX_SOUNDS;
use crate::audio_engine::decoder::decode_to_samples;
use crate::audio_engine::errors::{MixerError, SoundLoadError};
use crate::audio_engine::mixer::{RtMixer, clamp_output};
use crate::audio_engine::sound_bank::{SoundAsset, SoundId};
use crate::audio_engine::track::{PlayFlags, TrackHandle, TrackState};

pub mod audio_stream;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod errors;
pub mod mixer;
pub mod resample;
pub mod sample_buffer;
pub mod sound_bank;
pub mod track;

/// Mixer shared between a control context and a real-time render context.
///
/// Every command and every [`render`](Mixer::render) call takes the same
/// lock for a scan over the fixed track table. Sound decoding happens
/// before the lock is taken.
pub struct Mixer {
    config: MixerConfig,
    state: Mutex<RtMixer>,
}

impl Mixer {
    /// Creates a mixer producing `channels` interleaved channels at `sample_rate`.
    ///
    /// All sounds loaded later are converted to this format.
    pub fn setup(sample_rate: u32, channels: u16) -> Result<Self, MixerError> {
        let config = MixerConfig::new(sample_rate, channels)?;
        log::info!(
            "Mixer ready ({} ch@{} Hz)",
            config.channels(),
            config.sample_rate()
        );

        Ok(Self {
            config,
            state: Mutex::new(RtMixer::new()),
        })
    }

    pub fn config(&self) -> MixerConfig {
        self.config
    }

    fn lock_state(&self) -> MutexGuard<'_, RtMixer> {
        self.state.lock().unwrap_or_else(|poisoned| {
            log::warn!("Mixer lock poisoned, recovering state");
            poisoned.into_inner()
        })
    }

    /// Decodes a compressed sound and stores it in the sound bank.
    ///
    /// Returns [`SoundId::SENTINEL`] on any failure; the cause is logged.
    pub fn load(&self, bytes: impl Into<Vec<u8>>) -> SoundId {
        self.try_load(bytes).unwrap_or_else(|err| {
            log::error!("Cannot load sound: {err}");
            SoundId::SENTINEL
        })
    }

    /// Like [`load`](Mixer::load), but reports why loading failed.
    pub fn try_load(&self, bytes: impl Into<Vec<u8>>) -> Result<SoundId, SoundLoadError> {
        self.load_bytes(bytes.into(), None)
    }

    fn load_bytes(
        &self,
        bytes: Vec<u8>,
        extension: Option<&str>,
    ) -> Result<SoundId, SoundLoadError> {
        if self.lock_state().sound_bank().is_full() {
            return Err(SoundLoadError::BankFull {
                capacity: MAX_SOUNDS,
            });
        }

        let samples = decode_to_samples(
            bytes,
            extension,
            self.config.channels(),
            self.config.sample_rate(),
        )?;

        let id = self
            .lock_state()
            .sound_bank_mut()
            .insert(SoundAsset::new(samples))?;
        log::debug!("Loaded sound {id}");
        Ok(id)
    }

    /// Reads and loads a sound file. Returns [`SoundId::SENTINEL`] on failure.
    pub fn load_file(&self, path: impl AsRef<Path>) -> SoundId {
        let path = path.as_ref();
        self.try_load_file(path).unwrap_or_else(|err| {
            log::error!("Cannot load sound '{}': {err}", path.display());
            SoundId::SENTINEL
        })
    }

    /// Like [`load_file`](Mixer::load_file), but reports why loading failed.
    ///
    /// The file extension is passed to the decoder as a format hint.
    pub fn try_load_file(&self, path: impl AsRef<Path>) -> Result<SoundId, SoundLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| SoundLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path.extension().and_then(|ext| ext.to_str());
        self.load_bytes(bytes, extension)
    }

    /// Number of loaded sounds.
    pub fn sound_count(&self) -> usize {
        self.lock_state().sound_bank().len()
    }

    /// Interleaved sample count of a loaded sound.
    pub fn sound_sample_count(&self, sound_id: SoundId) -> Option<usize> {
        self.lock_state()
            .sound_bank()
            .get(sound_id)
            .map(SoundAsset::sample_count)
    }

    /// Starts a new track playing `sound_id`.
    ///
    /// Returns the handle used by every other track command. When all track
    /// slots are busy the request is dropped and `None` is returned.
    pub fn play(&self, sound_id: SoundId, flags: PlayFlags, volume: f32) -> Option<TrackHandle> {
        self.lock_state().play(sound_id, flags, volume)
    }

    /// Pauses a track. Returns whether the handle was found.
    pub fn pause(&self, handle: TrackHandle) -> bool {
        self.lock_state().pause(handle)
    }

    /// Resumes a track. Returns whether the handle was found.
    pub fn resume(&self, handle: TrackHandle) -> bool {
        self.lock_state().resume(handle)
    }

    /// Stops a track and frees its slot. Returns whether the handle was found.
    pub fn remove(&self, handle: TrackHandle) -> bool {
        self.lock_state().remove(handle)
    }

    /// Sets a track's volume. Returns whether the handle was found.
    pub fn set_volume(&self, handle: TrackHandle, volume: f32) -> bool {
        self.lock_state().set_volume(handle, volume)
    }

    pub fn pause_all(&self) {
        self.lock_state().pause_all();
    }

    pub fn resume_all(&self) {
        self.lock_state().resume_all();
    }

    pub fn toggle_all(&self) {
        self.lock_state().toggle_all();
    }

    /// Removes every track. Loaded sounds stay in the bank.
    pub fn clear_all(&self) {
        self.lock_state().clear_tracks();
    }

    pub fn active_tracks(&self) -> usize {
        self.lock_state().active_tracks()
    }

    /// Current state of a track, or `None` once it has ended or been removed.
    pub fn track_state(&self, handle: TrackHandle) -> Option<TrackState> {
        self.lock_state().track_state(handle)
    }

    /// Fills `output` with the mix of every playing track.
    ///
    /// `output` holds interleaved samples in the configured channel layout.
    /// The result is hard-clipped to `[-1.0, 1.0]`.
    pub fn render(&self, output: &mut [f32]) {
        output.fill(0.0);
        self.lock_state().mix_into(output);
        clamp_output(output);
    }

    /// Removes every track and releases every loaded sound.
    pub fn teardown(&self) {
        self.lock_state().teardown();
        log::info!("Mixer torn down");
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::*;
    use crate::audio_engine::decoder::tests::pcm16_wav;
    use crate::audio_engine::mixer::sample_to_f32;

    fn tone(frames: usize, channels: u16) -> Vec<u8> {
        let samples: Vec<i16> = (0..frames * usize::from(channels))
            .map(|i| ((i % 64) as i16 - 32) * 256)
            .collect();
        pcm16_wav(channels, 44_100, &samples)
    }

    fn render(mixer: &Mixer, len: usize) -> Vec<f32> {
        let mut output = vec![0.5; len];
        mixer.render(&mut output);
        output
    }

    #[test]
    fn test_setup_rejects_bad_config() {
        assert!(Mixer::setup(0, 2).is_err());
        assert!(Mixer::setup(44_100, 0).is_err());
    }

    #[test]
    fn test_load_returns_sequential_ids() {
        let mixer = Mixer::setup(44_100, 2).unwrap();
        let first = mixer.load(tone(100, 2));
        let second = mixer.load(tone(50, 1));

        assert_eq!(first.raw(), 1);
        assert_eq!(second.raw(), 2);
        assert_eq!(mixer.sound_sample_count(first), Some(200));
        assert_eq!(mixer.sound_sample_count(second), Some(100));
    }

    #[test]
    fn test_load_failure_returns_sentinel() {
        let mixer = Mixer::setup(44_100, 2).unwrap();
        assert_eq!(mixer.load(b"not an ogg file".to_vec()), SoundId::SENTINEL);
        assert_eq!(mixer.sound_count(), 0);

        let id = mixer.load(tone(10, 2));
        assert_eq!(id.raw(), 1);
    }

    #[test]
    fn test_try_load_reports_decode_error() {
        let mixer = Mixer::setup(44_100, 2).unwrap();
        let result = mixer.try_load(vec![0u8; 16]);
        assert!(matches!(result, Err(SoundLoadError::Decode(_))));
    }

    #[test]
    fn test_bank_capacity_keeps_earlier_sounds() {
        let mixer = Mixer::setup(44_100, 1).unwrap();
        let first = mixer.load(pcm16_wav(1, 44_100, &[1_000, 2_000, 3_000]));
        for _ in 1..MAX_SOUNDS - 1 {
            assert!(mixer.load(tone(4, 1)).is_valid());
        }
        assert_eq!(mixer.sound_count(), MAX_SOUNDS - 1);

        assert_eq!(mixer.load(tone(4, 1)), SoundId::SENTINEL);
        assert!(matches!(
            mixer.try_load(tone(4, 1)),
            Err(SoundLoadError::BankFull { .. })
        ));
        assert_eq!(mixer.sound_count(), MAX_SOUNDS - 1);

        mixer.play(first, PlayFlags::empty(), 1.0).unwrap();
        let output = render(&mixer, 3);
        assert!((output[0] - sample_to_f32(1_000)).abs() < 1e-4);
        assert!((output[2] - sample_to_f32(3_000)).abs() < 1e-4);
    }

    #[test]
    fn test_load_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tone.wav");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&tone(32, 2)).unwrap();
        drop(file);

        let mixer = Mixer::setup(44_100, 2).unwrap();
        assert_eq!(mixer.load_file(&path).raw(), 1);
        assert_eq!(mixer.load_file(tmp.path().join("missing.ogg")), SoundId::SENTINEL);
        assert!(matches!(
            mixer.try_load_file(tmp.path().join("missing.ogg")),
            Err(SoundLoadError::Io { .. })
        ));
    }

    #[test]
    fn test_load_ogg_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("silence.ogg");
        std::fs::write(&path, include_bytes!("../../testdata/silence.ogg")).unwrap();

        let mixer = Mixer::setup(44_100, 2).unwrap();
        let id = mixer.load_file(&path);
        assert_eq!(id.raw(), 1);

        let len = mixer.sound_sample_count(id).unwrap();
        let handle = mixer.play(id, PlayFlags::empty(), 1.0).unwrap();
        assert!(render(&mixer, len + 16).iter().all(|&s| s == 0.0));
        assert!(mixer.track_state(handle).is_none());
    }

    #[test]
    fn test_one_shot_second_of_audio() {
        let mixer = Mixer::setup(44_100, 2).unwrap();
        let id = mixer.load(tone(22_050, 2));
        let handle = mixer.play(id, PlayFlags::empty(), 1.0).unwrap();

        let output = render(&mixer, 88_200);
        assert!(output[..44_100].iter().any(|&s| s != 0.0));
        assert!(output[44_100..].iter().all(|&s| s == 0.0));

        assert!(mixer.track_state(handle).is_none());
        assert!(!mixer.pause(handle));
    }

    #[test]
    fn test_pause_twice_then_resume_continues() {
        let mixer = Mixer::setup(44_100, 1).unwrap();
        let id = mixer.load(pcm16_wav(1, 44_100, &[1_000, 2_000, 3_000, 4_000, 5_000, 6_000]));
        let handle = mixer.play(id, PlayFlags::empty(), 1.0).unwrap();

        let before = render(&mixer, 2);
        assert!(mixer.pause(handle));
        assert!(mixer.pause(handle));
        assert!(render(&mixer, 2).iter().all(|&s| s == 0.0));
        assert_eq!(mixer.track_state(handle).unwrap().cursor, 2);

        assert!(mixer.resume(handle));
        assert!(mixer.resume(handle));
        let after = render(&mixer, 2);
        assert!(before[1] < after[0]);
        assert!((after[0] - sample_to_f32(3_000)).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_handle_mutates_nothing() {
        let mixer = Mixer::setup(44_100, 1).unwrap();
        let id = mixer.load(tone(8, 1));
        let stale = mixer.play(id, PlayFlags::LOOP, 1.0).unwrap();
        mixer.clear_all();

        let live = mixer.play(id, PlayFlags::LOOP, 0.5).unwrap();
        let before = mixer.track_state(live).unwrap();

        assert!(!mixer.pause(stale));
        assert!(!mixer.resume(stale));
        assert!(!mixer.set_volume(stale, 2.0));
        assert!(!mixer.remove(stale));
        assert_eq!(mixer.track_state(live), Some(before));
        assert_eq!(mixer.active_tracks(), 1);
    }

    #[test]
    fn test_handle_from_other_mixer_is_ignored() {
        let first = Mixer::setup(44_100, 1).unwrap();
        let second = Mixer::setup(44_100, 1).unwrap();
        let first_id = first.load(tone(8, 1));
        let second_id = second.load(tone(8, 1));

        let foreign = first.play(first_id, PlayFlags::LOOP, 1.0).unwrap();
        let own = second.play(second_id, PlayFlags::LOOP, 0.5).unwrap();
        assert_eq!(foreign.slot(), own.slot());
        let before = second.track_state(own).unwrap();

        assert!(!second.pause(foreign));
        assert!(!second.resume(foreign));
        assert!(!second.set_volume(foreign, 2.0));
        assert!(!second.remove(foreign));
        assert!(second.track_state(foreign).is_none());
        assert_eq!(second.track_state(own), Some(before));
        assert_eq!(second.active_tracks(), 1);

        assert!(first.pause(foreign));
        assert!(!first.pause(own));
    }

    #[test]
    fn test_loop_output_matches_between_laps() {
        let mixer = Mixer::setup(44_100, 2).unwrap();
        let id = mixer.load(tone(30, 2));
        let len = mixer.sound_sample_count(id).unwrap();
        let handle = mixer.play(id, PlayFlags::LOOP, 0.5).unwrap();

        let first = render(&mixer, len);
        let second = render(&mixer, len);
        assert_eq!(first, second);
        assert!(mixer.track_state(handle).is_some());
    }

    #[test]
    fn test_teardown_releases_sounds() {
        let mixer = Mixer::setup(44_100, 2).unwrap();
        let id = mixer.load(tone(30, 2));
        mixer.play(id, PlayFlags::LOOP, 1.0).unwrap();

        mixer.teardown();
        assert_eq!(mixer.sound_count(), 0);
        assert_eq!(mixer.active_tracks(), 0);
        assert!(render(&mixer, 16).iter().all(|&s| s == 0.0));
        assert_eq!(mixer.load(tone(30, 2)).raw(), 1);
    }

    #[test]
    fn test_render_and_commands_from_two_threads() {
        let mixer = Arc::new(Mixer::setup(44_100, 2).unwrap());
        let id = mixer.load(tone(256, 2));

        let render_mixer = Arc::clone(&mixer);
        let renderer = thread::spawn(move || {
            let mut buffer = vec![0.0f32; 128];
            for _ in 0..500 {
                render_mixer.render(&mut buffer);
                assert!(buffer.iter().all(|s| (-1.0..=1.0).contains(s)));
            }
        });

        for i in 0..500 {
            let flags = if i % 3 == 0 {
                PlayFlags::LOOP
            } else {
                PlayFlags::empty()
            };
            if let Some(handle) = mixer.play(id, flags, 1.5) {
                mixer.set_volume(handle, 0.75);
                if i % 5 == 0 {
                    mixer.remove(handle);
                }
            }
            if i % 7 == 0 {
                mixer.toggle_all();
            }
        }

        renderer.join().unwrap();
        mixer.clear_all();
        assert_eq!(mixer.active_tracks(), 0);
    }

    #[test]
    fn test_load_while_rendering() {
        let mixer = Arc::new(Mixer::setup(44_100, 2).unwrap());
        let done = Arc::new(AtomicBool::new(false));

        let render_mixer = Arc::clone(&mixer);
        let render_done = Arc::clone(&done);
        let renderer = thread::spawn(move || {
            let mut buffer = vec![0.0f32; 256];
            while !render_done.load(Ordering::Acquire) {
                render_mixer.render(&mut buffer);
                assert!(buffer.iter().all(|s| (-1.0..=1.0).contains(s)));
            }
        });

        let load_mixer = Arc::clone(&mixer);
        let loader = thread::spawn(move || {
            (0..32)
                .map(|i| {
                    let id = load_mixer.load(tone(64 + i, 2));
                    load_mixer.play(id, PlayFlags::empty(), 0.5);
                    id
                })
                .collect::<Vec<_>>()
        });

        let ids = loader.join().unwrap();
        done.store(true, Ordering::Release);
        renderer.join().unwrap();

        let raw: Vec<u32> = ids.iter().map(|id| id.raw()).collect();
        assert_eq!(raw, (1..=32).collect::<Vec<u32>>());
        assert_eq!(mixer.sound_count(), 32);
    }

    #[test]
    fn test_concurrent_loads_race_for_last_slot() {
        const LOADERS: usize = 8;

        let mixer = Arc::new(Mixer::setup(44_100, 1).unwrap());
        for _ in 0..MAX_SOUNDS - 2 {
            assert!(mixer.load(tone(4, 1)).is_valid());
        }

        let barrier = Arc::new(Barrier::new(LOADERS));
        let loaders: Vec<_> = (0..LOADERS)
            .map(|_| {
                let mixer = Arc::clone(&mixer);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let bytes = tone(4, 1);
                    barrier.wait();
                    mixer.try_load(bytes)
                })
            })
            .collect();

        let results: Vec<_> = loaders
            .into_iter()
            .map(|loader| loader.join().unwrap())
            .collect();

        let winners: Vec<SoundId> = results
            .iter()
            .filter_map(|result| result.as_ref().ok().copied())
            .collect();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].raw() as usize, MAX_SOUNDS - 1);
        assert!(
            results
                .iter()
                .filter(|r| r.is_err())
                .all(|r| matches!(r, Err(SoundLoadError::BankFull { .. })))
        );
        assert_eq!(mixer.sound_count(), MAX_SOUNDS - 1);
    }
}
