//! Mixer configuration constants and limits.

/// Number of sound bank slots, including the reserved sentinel slot 0.
pub const MAX_SOUNDS: usize = 256;

/// Maximum number of tracks that can play simultaneously.
pub const MAX_TRACKS: usize = 16;

/// Maximum number of output channels accepted at setup.
pub const MAX_CHANNELS: u16 = 8;

/// Scale between normalized float samples and stored 16-bit samples.
pub const SAMPLE_SCALE: f32 = 32767.0;

/// Initial decoder output capacity, in frames.
pub const DECODE_INITIAL_FRAMES: usize = 4096;

/// Fixed buffer size requested from the output device, in frames.
pub const STREAM_BUFFER_FRAMES: u32 = 512;
