//! Box-filter sample-rate and channel conversion.
//!
//! Each decoded packet is converted on its own: the packet's planar `f32`
//! channels are averaged (or decimated) into a chunk of interleaved `i16`
//! samples at the mixer's rate and channel count. The filter is not
//! band-limited, so aliasing is expected.

use crate::audio_engine::constants::SAMPLE_SCALE;

/// Number of destination frames produced from a packet of `frame_samples` frames.
pub fn dst_chunk_len(frame_samples: usize, src_rate: u32, dst_rate: u32) -> usize {
    if src_rate == 0 {
        return 0;
    }
    (frame_samples as u64 * u64::from(dst_rate) / u64::from(src_rate)) as usize
}

/// Source window `[start, end)` covered by destination frame `s`.
fn box_window(s: usize, src_rate: u32, dst_rate: u32) -> (usize, usize) {
    let s = s as u64;
    let src = u64::from(src_rate);
    let dst = u64::from(dst_rate);
    let start = s * src / dst;
    let end = (s + 1) * src / dst;
    (start as usize, end as usize)
}

/// Mean of `source[start..end)`, or `source[start]` when the window is empty.
fn box_average(source: &[f32], start: usize, end: usize) -> f32 {
    if end <= start {
        return source[start];
    }

    let window = &source[start..end];
    window.iter().sum::<f32>() / window.len() as f32
}

/// Converts a normalized float sample to a saturated 16-bit sample.
pub fn to_i16(value: f32) -> i16 {
    let scaled = (value * SAMPLE_SCALE) as i32;
    scaled.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Resamples a packet whose channel count matches the destination.
///
/// `dst` holds `dst.len() / planes.len()` interleaved frames; every channel is
/// filtered independently from its own plane.
pub fn resample_chunk_eq_channels(
    dst: &mut [i16],
    planes: &[&[f32]],
    src_rate: u32,
    dst_rate: u32,
) {
    let channels = planes.len();
    if channels == 0 || dst_rate == 0 {
        return;
    }

    for (s, frame) in dst.chunks_exact_mut(channels).enumerate() {
        let (start, end) = box_window(s, src_rate, dst_rate);
        for (out, plane) in frame.iter_mut().zip(planes) {
            *out = to_i16(box_average(plane, start, end));
        }
    }
}

/// Resamples a packet whose channel count differs from the destination.
///
/// All source channels are folded into one mono value per frame, which is
/// then written to every destination channel.
pub fn resample_chunk_mixed_channels(
    dst: &mut [i16],
    planes: &[&[f32]],
    dst_channels: usize,
    src_rate: u32,
    dst_rate: u32,
) {
    if planes.is_empty() || dst_channels == 0 || dst_rate == 0 {
        return;
    }

    let src_channels = planes.len() as f32;
    for (s, frame) in dst.chunks_exact_mut(dst_channels).enumerate() {
        let (start, end) = box_window(s, src_rate, dst_rate);
        let mono = planes
            .iter()
            .map(|plane| box_average(plane, start, end))
            .sum::<f32>()
            / src_channels;

        frame.fill(to_i16(mono));
    }
}
