//! Audio-specific error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while decoding a compressed audio buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The container or codec rejected the stream.
    #[error("failed to decode audio stream: {0}")]
    Format(#[from] symphonia::core::errors::Error),

    /// Audio stream has no default track.
    #[error("audio stream has no default track")]
    NoDefaultTrack,

    /// Audio stream is missing sample rate information.
    #[error("audio stream is missing a sample rate")]
    MissingSampleRate,

    /// Audio stream is missing channel information.
    #[error("audio stream is missing channel information")]
    MissingChannels,

    /// Decoding finished without producing a single sample.
    #[error("audio stream decoded to zero samples")]
    Empty,
}

/// Errors that can occur while loading a sound into the bank.
#[derive(Debug, Error)]
pub enum SoundLoadError {
    /// Failed to read the sound file.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to decode the sound bytes.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Every bank slot is already taken.
    #[error("sound bank is full ({capacity} slots)")]
    BankFull {
        /// Total number of bank slots, sentinel included.
        capacity: usize,
    },
}

/// Errors raised when the mixer is configured with unusable parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MixerError {
    /// Sample rate must be non-zero.
    #[error("sample rate must be non-zero")]
    ZeroSampleRate,

    /// Channel count must be within `1..=max`.
    #[error("unsupported channel count {channels} (expected 1..={max})")]
    UnsupportedChannels { channels: u16, max: u16 },
}

/// Errors that can occur while opening the output stream.
#[derive(Debug, Error)]
pub enum AudioStreamError {
    /// The host exposes no default output device.
    #[error("no audio device found")]
    NoDevice,

    /// The device could not report a default output config.
    #[error("no default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    /// The output stream could not be built.
    #[error("failed to build audio stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    /// The output stream could not be started.
    #[error("failed to play audio stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    /// The device config is not usable by the mixer.
    #[error(transparent)]
    Mixer(#[from] MixerError),
}
