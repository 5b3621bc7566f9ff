//! Real-time mixer core.
//!
//! This module provides the [`RtMixer`] struct, which owns the
//! [`SoundBank`] and the fixed table of [`Track`] slots and mixes every
//! audible track into an interleaved output buffer.
//!
//! `RtMixer` itself does no locking; [`Mixer`](crate::Mixer) keeps it behind
//! a mutex shared by the control and render contexts.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::audio_engine::constants::{MAX_TRACKS, SAMPLE_SCALE};
use crate::audio_engine::sound_bank::{SoundBank, SoundId};
use crate::audio_engine::track::{PlayFlags, Track, TrackHandle, TrackState};

/// Source of the per-mixer id stamped into every [`TrackHandle`].
static NEXT_MIXER_ID: AtomicU32 = AtomicU32::new(1);

/// Converts a stored sample back to the mixer's float range.
#[inline]
pub fn sample_to_f32(sample: i16) -> f32 {
    f32::from(sample) / SAMPLE_SCALE
}

/// Hard-clips every output sample to `[-1.0, 1.0]`.
pub fn clamp_output(output: &mut [f32]) {
    for sample in output.iter_mut() {
        *sample = sample.clamp(-1.0, 1.0);
    }
}

/// Accumulates a looping track, wrapping its cursor at the end of the sound.
fn mix_looping(track: &mut Track, samples: &[i16], output: &mut [f32]) {
    let len = samples.len();
    let mut cursor = track.cursor % len;
    for out in output.iter_mut() {
        *out += sample_to_f32(samples[cursor]) * track.volume;
        cursor = (cursor + 1) % len;
    }
    track.cursor = cursor;
}

/// Accumulates a one-shot track and retires it once the sound is exhausted.
fn mix_one_shot(track: &mut Track, samples: &[i16], output: &mut [f32]) {
    let remaining = samples.get(track.cursor..).unwrap_or_default();
    let mixed = remaining.len().min(output.len());
    for (out, &sample) in output.iter_mut().zip(remaining) {
        *out += sample_to_f32(sample) * track.volume;
    }

    let cursor = track.cursor + mixed;
    if cursor >= samples.len() {
        track.retire();
    } else {
        track.cursor = cursor;
    }
}

/// Sound bank plus track table, mixed without any synchronisation.
pub struct RtMixer {
    /// Unique per instance; handles carrying another id are ignored.
    id: u32,

    /// Sample storage addressed by [`SoundId`].
    sound_bank: SoundBank,

    /// Playback slots with MAX_TRACKS entries.
    tracks: [Track; MAX_TRACKS],
}

impl RtMixer {
    /// Creates a mixer with an empty sound bank and every track slot invalid.
    pub fn new() -> Self {
        Self {
            id: NEXT_MIXER_ID.fetch_add(1, Ordering::Relaxed),
            sound_bank: SoundBank::new(),
            tracks: std::array::from_fn(|_| Track::new()),
        }
    }

    pub fn sound_bank(&self) -> &SoundBank {
        &self.sound_bank
    }

    pub fn sound_bank_mut(&mut self) -> &mut SoundBank {
        &mut self.sound_bank
    }

    /// Starts playback of a loaded sound in the first free slot.
    ///
    /// Returns `None` when the sound is not loaded, the volume is not finite,
    /// or every slot is busy; in the last case the request is simply dropped.
    pub fn play(&mut self, sound_id: SoundId, flags: PlayFlags, volume: f32) -> Option<TrackHandle> {
        if !volume.is_finite() {
            log::warn!("Refusing to play sound {sound_id} with volume {volume}");
            return None;
        }

        if self.sound_bank.get(sound_id).is_none() {
            log::warn!("Refusing to play unknown sound {sound_id}");
            return None;
        }

        for (slot, track) in self.tracks.iter_mut().enumerate() {
            if track.is_invalid() {
                let generation = track.start(sound_id, flags, volume);
                return Some(TrackHandle::new(self.id, slot, generation));
            }
        }

        // No free track slot: drop deterministically.
        log::debug!("All {MAX_TRACKS} tracks busy, dropping sound {sound_id}");
        None
    }

    fn track(&self, handle: TrackHandle) -> Option<&Track> {
        if handle.mixer_id() != self.id {
            return None;
        }
        self.tracks
            .get(handle.slot())
            .filter(|track| track.is_bound_to(handle))
    }

    fn track_mut(&mut self, handle: TrackHandle) -> Option<&mut Track> {
        if handle.mixer_id() != self.id {
            return None;
        }
        self.tracks
            .get_mut(handle.slot())
            .filter(|track| track.is_bound_to(handle))
    }

    pub fn pause(&mut self, handle: TrackHandle) -> bool {
        self.track_mut(handle).map(Track::pause).is_some()
    }

    pub fn resume(&mut self, handle: TrackHandle) -> bool {
        self.track_mut(handle).map(Track::resume).is_some()
    }

    pub fn remove(&mut self, handle: TrackHandle) -> bool {
        self.track_mut(handle).map(Track::retire).is_some()
    }

    /// Overwrites a track's volume. Non-finite volumes are rejected.
    pub fn set_volume(&mut self, handle: TrackHandle, volume: f32) -> bool {
        if !volume.is_finite() {
            log::warn!("Ignoring non-finite track volume {volume}");
            return false;
        }

        match self.track_mut(handle) {
            Some(track) => {
                track.volume = volume;
                true
            }
            None => false,
        }
    }

    fn valid_tracks_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut().filter(|track| !track.is_invalid())
    }

    pub fn pause_all(&mut self) {
        self.valid_tracks_mut().for_each(Track::pause);
    }

    pub fn resume_all(&mut self) {
        self.valid_tracks_mut().for_each(Track::resume);
    }

    /// Pauses playing tracks and resumes paused ones.
    pub fn toggle_all(&mut self) {
        self.valid_tracks_mut().for_each(Track::toggle_pause);
    }

    /// Invalidates every track slot.
    pub fn clear_tracks(&mut self) {
        self.tracks.iter_mut().for_each(Track::retire);
    }

    /// Stops every track and drops every loaded sound.
    pub fn teardown(&mut self) {
        self.clear_tracks();
        self.sound_bank.clear();
    }

    /// Number of slots currently holding a track, paused or not.
    pub fn active_tracks(&self) -> usize {
        self.tracks.iter().filter(|track| !track.is_invalid()).count()
    }

    pub fn track_state(&self, handle: TrackHandle) -> Option<TrackState> {
        self.track(handle).map(Track::state)
    }

    /// Adds every audible track into `output`.
    ///
    /// `output` holds interleaved samples and is accumulated into, not
    /// cleared; one-shot tracks that reach the end of their sound are retired.
    pub fn mix_into(&mut self, output: &mut [f32]) {
        for track in &mut self.tracks {
            if !track.is_audible() {
                continue;
            }

            let Some(sound) = self.sound_bank.get(track.sound_id) else {
                track.retire();
                continue;
            };

            let samples = sound.samples();
            if samples.is_empty() {
                track.retire();
                continue;
            }

            if track.looping {
                mix_looping(track, samples, output);
            } else {
                mix_one_shot(track, samples, output);
            }
        }
    }
}

impl Default for RtMixer {
    fn default() -> Self {
        Self::new()
    }
}
