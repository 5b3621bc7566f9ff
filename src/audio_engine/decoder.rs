//! Compressed audio decoding into mixer-ready sample buffers.
//!
//! This module turns an in-memory compressed stream (Ogg Vorbis in practice,
//! any container Symphonia recognises in general) into interleaved `i16` samples at
//! the mixer's sample rate and channel count.

use std::io::Cursor;

use symphonia::core::{
    audio::SampleBuffer as SymphoniaSampleBuffer, codecs::DecoderOptions,
    errors::Error as SymphoniaError, formats::FormatOptions, io::MediaSourceStream,
    meta::MetadataOptions, probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};

use crate::audio_engine::constants::DECODE_INITIAL_FRAMES;
use crate::audio_engine::errors::DecodeError;
use crate::audio_engine::resample::{
    dst_chunk_len, resample_chunk_eq_channels, resample_chunk_mixed_channels,
};
use crate::audio_engine::sample_buffer::SampleGrowBuffer;

/// Decodes a compressed audio buffer into interleaved 16-bit samples.
///
/// Every decoded packet is box-filtered from the stream's rate to
/// `output_rate_hz`. When the stream's channel count differs from
/// `output_channels`, the packet is downmixed to mono and broadcast.
///
/// # Parameters
///
/// - `bytes`: The whole compressed stream
/// - `extension`: File extension of the source, if known, used as a format hint
/// - `output_channels`: Channel count of the returned buffer
/// - `output_rate_hz`: Sample rate of the returned buffer
///
/// # Errors
///
/// - The container is not recognised or a packet fails to decode
/// - The stream has no default track or lacks a sample rate
/// - The stream decodes to zero samples
pub fn decode_to_samples(
    bytes: Vec<u8>,
    extension: Option<&str>,
    output_channels: usize,
    output_rate_hz: u32,
) -> Result<Box<[i16]>, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = extension {
        hint.with_extension(extension);
    }

    let detected = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = detected.format;

    let track = format.default_track().ok_or(DecodeError::NoDefaultTrack)?;
    let track_id = track.id;
    let src_rate_hz = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::MissingSampleRate)?;

    let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut out = SampleGrowBuffer::with_capacity(output_channels * DECODE_INITIAL_FRAMES);
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(DecodeError::Format(err)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let audio_buf = decoder.decode(&packet)?;
        let spec = *audio_buf.spec();
        let frames = audio_buf.frames();
        if frames == 0 {
            continue;
        }

        let src_channels = spec.channels.count();
        if src_channels == 0 {
            return Err(DecodeError::MissingChannels);
        }

        let mut sample_buf = SymphoniaSampleBuffer::<f32>::new(audio_buf.capacity() as u64, spec);
        sample_buf.copy_planar_ref(audio_buf);
        let planes: Vec<&[f32]> = sample_buf.samples().chunks_exact(frames).collect();

        let chunk_frames = dst_chunk_len(frames, src_rate_hz, output_rate_hz);
        let chunk = out.append_chunk(chunk_frames * output_channels);
        if src_channels == output_channels {
            resample_chunk_eq_channels(chunk, &planes, src_rate_hz, output_rate_hz);
        } else {
            resample_chunk_mixed_channels(
                chunk,
                &planes,
                output_channels,
                src_rate_hz,
                output_rate_hz,
            );
        }
    }

    if out.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok(out.into_boxed_slice())
}
