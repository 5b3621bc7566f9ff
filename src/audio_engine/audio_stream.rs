//! Audio Stream Module
//!
//! This module connects a [`Mixer`] to the default CPAL output device:
//! - Logger setup
//! - Device and stream configuration
//! - A real-time callback that renders the mix into every device buffer

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Stream, StreamConfig};
use env_logger::{Builder, Env};

use crate::audio_engine::Mixer;
use crate::audio_engine::constants::STREAM_BUFFER_FRAMES;
use crate::audio_engine::errors::AudioStreamError;

/// Handle to the output stream and the mixer feeding it.
pub struct AudioStreamHandle {
    pub stream: Stream,
    pub mixer: Arc<Mixer>,
}

/// Setup and configure the logger for audio operations
pub fn setup_logger() {
    // Users can override via `RUST_LOG`, e.g. `RUST_LOG=debug` to see dropped plays.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init()
        .unwrap_or(()); // Ignore initialization errors
}

/// Create and configure the audio stream
///
/// This function:
/// 1. Sets up the default audio device
/// 2. Sets up a mixer matching the device's sample rate and channel count
/// 3. Builds an output stream whose callback renders the mixer
///
/// The stream is returned paused; see [`start_stream`].
pub fn create_audio_stream() -> Result<AudioStreamHandle, AudioStreamError> {
    setup_logger();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(AudioStreamError::NoDevice)?;

    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate();
    let channels = config.channels();

    log::info!("Starting audio stream... ({} ch@{} Hz)", channels, sample_rate);

    let mixer = Arc::new(Mixer::setup(sample_rate, channels)?);
    let render_mixer = Arc::clone(&mixer);

    let stream_config = StreamConfig {
        channels,
        sample_rate,
        buffer_size: BufferSize::Fixed(STREAM_BUFFER_FRAMES),
    };

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            render_mixer.render(data);
        },
        |err| {
            log::error!("Audio stream error: {}", err);
        },
        None,
    )?;

    Ok(AudioStreamHandle { stream, mixer })
}

/// Start playing the audio stream
pub fn start_stream(stream: &Stream) -> Result<(), AudioStreamError> {
    stream.play()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_setup() {
        // Multiple calls should be safe (though only the first takes effect)
        setup_logger();
        setup_logger();
    }

    #[test]
    fn test_audio_stream_creation() {
        // Actual stream creation requires audio hardware
        if cpal::default_host().default_output_device().is_none() {
            return;
        }

        // Devices without a usable default config are common in CI; only the
        // success path is checked.
        if let Ok(handle) = create_audio_stream() {
            assert_eq!(handle.mixer.active_tracks(), 0);
            assert_eq!(handle.mixer.sound_count(), 0);
        }
    }
}
