//! Fixed-capacity storage for decoded sounds.

use std::fmt;

use crate::audio_engine::constants::MAX_SOUNDS;
use crate::audio_engine::errors::SoundLoadError;

/// Identifier of a sound in the bank. `SoundId::SENTINEL` (0) never refers to a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SoundId(u32);

impl SoundId {
    /// The reserved "no sound" identifier.
    pub const SENTINEL: SoundId = SoundId(0);

    /// Wraps a raw identifier.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this id can refer to a loaded sound at all.
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One fully decoded, immutable sound.
#[derive(Debug)]
pub struct SoundAsset {
    samples: Box<[i16]>,
}

impl SoundAsset {
    pub fn new(samples: Box<[i16]>) -> Self {
        Self { samples }
    }

    /// Interleaved samples in the mixer's channel layout.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Total interleaved sample count (frames × channels).
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Append-only table of decoded sounds addressed by [`SoundId`].
///
/// Slot 0 is a permanent sentinel; real sounds start at id 1 and keep their
/// id until [`SoundBank::clear`].
#[derive(Debug)]
pub struct SoundBank {
    sounds: Vec<SoundAsset>,
}

impl SoundBank {
    pub fn new() -> Self {
        let mut sounds = Vec::with_capacity(MAX_SOUNDS);
        sounds.push(SoundAsset::new(Box::default()));
        Self { sounds }
    }

    /// Number of loaded sounds, sentinel excluded.
    pub fn len(&self) -> usize {
        self.sounds.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.sounds.len() >= MAX_SOUNDS
    }

    /// Stores a decoded sound in the next free slot.
    ///
    /// # Errors
    ///
    /// Returns [`SoundLoadError::BankFull`] without touching the bank when
    /// every slot is taken.
    pub fn insert(&mut self, asset: SoundAsset) -> Result<SoundId, SoundLoadError> {
        if self.is_full() {
            return Err(SoundLoadError::BankFull {
                capacity: MAX_SOUNDS,
            });
        }

        let id = SoundId(self.sounds.len() as u32);
        self.sounds.push(asset);
        Ok(id)
    }

    /// Looks up a loaded sound. The sentinel and unknown ids resolve to `None`.
    pub fn get(&self, id: SoundId) -> Option<&SoundAsset> {
        if !id.is_valid() {
            return None;
        }
        self.sounds.get(id.index())
    }

    /// Drops every loaded sound, keeping only the sentinel.
    pub fn clear(&mut self) {
        self.sounds.truncate(1);
    }
}

impl Default for SoundBank {
    fn default() -> Self {
        Self::new()
    }
}
