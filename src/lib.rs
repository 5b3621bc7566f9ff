//! Real-time mixer for decoded sound clips.
//!
//! Sounds are decoded once into a fixed-capacity bank, then played on a small
//! fixed table of tracks that a render callback mixes into interleaved `f32`
//! buffers.

pub mod audio_engine;

pub use audio_engine::Mixer;
pub use audio_engine::audio_stream::{
    AudioStreamHandle, create_audio_stream, setup_logger, start_stream,
};
pub use audio_engine::config::MixerConfig;
pub use audio_engine::errors::{AudioStreamError, DecodeError, MixerError, SoundLoadError};
pub use audio_engine::sound_bank::SoundId;
pub use audio_engine::track::{PlayFlags, TrackHandle, TrackState};
