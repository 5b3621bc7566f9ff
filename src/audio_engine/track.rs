//! Playback slots and the handles that address them.

use bitflags::bitflags;

use crate::audio_engine::sound_bank::SoundId;

bitflags! {
    /// Options accepted by [`Mixer::play`](crate::Mixer::play).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PlayFlags: u8 {
        /// Wrap to the start instead of stopping at the end of the sound.
        const LOOP = 0b0000_0010;
        /// Install the track without starting it.
        const PAUSED = 0b0000_0100;
    }
}

/// Identity of one playing track: owning mixer, slot index and the slot's
/// generation.
///
/// A slot's generation changes every time it is reused, so a handle stops
/// matching as soon as its track ends, even if the slot plays something else.
/// Handles issued by one mixer never match tracks of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackHandle {
    mixer: u32,
    slot: u16,
    generation: u32,
}

impl TrackHandle {
    pub(crate) fn new(mixer: u32, slot: usize, generation: u32) -> Self {
        Self {
            mixer,
            slot: slot as u16,
            generation,
        }
    }

    /// Id of the mixer that issued this handle.
    pub(crate) fn mixer_id(self) -> u32 {
        self.mixer
    }

    pub fn slot(self) -> usize {
        usize::from(self.slot)
    }
}

/// Snapshot of a playing track, as seen from the control side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackState {
    pub sound_id: SoundId,
    /// Interleaved sample index of the next sample to mix.
    pub cursor: usize,
    pub volume: f32,
    pub looping: bool,
    pub paused: bool,
}

/// One slot in the track table.
#[derive(Debug, Clone)]
pub struct Track {
    pub sound_id: SoundId,
    pub cursor: usize,
    pub volume: f32,
    pub looping: bool,
    pub paused: bool,
    active: bool,
    generation: u32,
}

impl Track {
    pub fn new() -> Self {
        Self {
            sound_id: SoundId::SENTINEL,
            cursor: 0,
            volume: 0.0,
            looping: false,
            paused: false,
            active: false,
            generation: 0,
        }
    }

    /// Installs a sound in this slot and returns the slot's new generation.
    pub fn start(&mut self, sound_id: SoundId, flags: PlayFlags, volume: f32) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.sound_id = sound_id;
        self.cursor = 0;
        self.volume = volume;
        self.looping = flags.contains(PlayFlags::LOOP);
        self.paused = flags.contains(PlayFlags::PAUSED);
        self.active = true;
        self.generation
    }

    /// Marks the slot invalid. Any handle bound to it stops matching.
    pub fn retire(&mut self) {
        self.active = false;
        self.sound_id = SoundId::SENTINEL;
        self.cursor = 0;
        self.paused = false;
        self.looping = false;
    }

    pub fn is_invalid(&self) -> bool {
        !self.active
    }

    /// Whether the mixer should pull samples from this slot.
    pub fn is_audible(&self) -> bool {
        self.active && !self.paused
    }

    /// Whether `handle`'s generation is currently bound to this slot.
    ///
    /// The slot index and mixer id are checked by the track table.
    pub fn is_bound_to(&self, handle: TrackHandle) -> bool {
        self.active && self.generation == handle.generation
    }

    /// Pause playback: set the paused flag. Does not change the cursor.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume playback: clear the paused flag.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn state(&self) -> TrackState {
        TrackState {
            sound_id: self.sound_id,
            cursor: self.cursor,
            volume: self.volume,
            looping: self.looping,
            paused: self.paused,
        }
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}
