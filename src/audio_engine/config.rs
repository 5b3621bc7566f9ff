//! Output format the mixer is set up with.

use crate::audio_engine::constants::MAX_CHANNELS;
use crate::audio_engine::errors::MixerError;

/// Sample rate and channel count shared by every decoded sound and every
/// rendered buffer. Fixed for the lifetime of a [`Mixer`](crate::Mixer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerConfig {
    sample_rate: u32,
    channels: u16,
}

impl MixerConfig {
    /// Validates and builds a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MixerError`] for a zero sample rate or a channel count
    /// outside `1..=MAX_CHANNELS`.
    pub fn new(sample_rate: u32, channels: u16) -> Result<Self, MixerError> {
        if sample_rate == 0 {
            return Err(MixerError::ZeroSampleRate);
        }

        if channels == 0 || channels > MAX_CHANNELS {
            return Err(MixerError::UnsupportedChannels {
                channels,
                max: MAX_CHANNELS,
            });
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        usize::from(self.channels)
    }
}
