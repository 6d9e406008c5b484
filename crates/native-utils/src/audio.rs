use ringbuf::HeapRb;
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

pub const REALTIME_API_PCM16_SAMPLE_RATE: f64 = 24000.0;

/// Creates a resampler to convert between audio sample rates.
pub fn create_resampler(
    in_sampling_rate: f64,
    out_sampling_rate: f64,
    chunk_size: usize,
) -> anyhow::Result<FastFixedIn<f32>> {
    let resampler = FastFixedIn::<f32>::new(
        out_sampling_rate / in_sampling_rate,
        1.0,
        PolynomialDegree::Cubic,
        chunk_size,
        1,
    )?;
    Ok(resampler)
}

/// Splits samples into fixed-size chunks, zero-padding the last one.
pub fn split_for_chunks(samples: &[f32], chunk_size: usize) -> Vec<Vec<f32>> {
    samples
        .chunks(chunk_size)
        .map(|chunk| {
            let mut chunk = chunk.to_vec();
            chunk.resize(chunk_size, 0.0);
            chunk
        })
        .collect()
}

/// Resamples whole chunks of `pending` and leaves the remainder in place for
/// the next call.
pub fn resample_available(
    resampler: &mut FastFixedIn<f32>,
    pending: &mut Vec<f32>,
) -> anyhow::Result<Vec<f32>> {
    let mut out = Vec::new();
    loop {
        let chunk_size = resampler.input_frames_next();
        if pending.len() < chunk_size {
            break;
        }
        let resampled = resampler.process(&[&pending[..chunk_size]], None)?;
        if let Some(channel) = resampled.first() {
            out.extend_from_slice(channel);
        }
        pending.drain(..chunk_size);
    }
    Ok(out)
}

/// Resamples everything, padding the tail with silence so no sample is held back.
pub fn resample_all(resampler: &mut FastFixedIn<f32>, samples: &[f32]) -> anyhow::Result<Vec<f32>> {
    let chunk_size = resampler.input_frames_next();
    let mut out = Vec::new();
    for chunk in split_for_chunks(samples, chunk_size) {
        let resampled = resampler.process(&[chunk.as_slice()], None)?;
        if let Some(channel) = resampled.first() {
            out.extend_from_slice(channel);
        }
    }
    Ok(out)
}

/// Creates a new ring buffer on the heap for shared audio data.
pub fn shared_buffer(size: usize) -> HeapRb<f32> {
    HeapRb::new(size.max(1))
}

/// Averages interleaved frames down to one channel.
pub fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    if channels > 1 {
        data.chunks(channels)
            .map(|c| c.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        data.to_vec()
    }
}

/// Interprets little-endian PCM16 bytes as samples in [-1.0, 1.0].
/// A trailing odd byte is ignored.
pub fn pcm16_to_f32(pcm16: &[u8]) -> Vec<f32> {
    pcm16
        .chunks_exact(2)
        .map(|chunk| {
            let v = i16::from_le_bytes([chunk[0], chunk[1]]);
            (v as f32 / 32768.0).clamp(-1.0, 1.0)
        })
        .collect()
}

/// Converts samples to little-endian PCM16 bytes.
pub fn f32_to_pcm16(pcm32: &[f32]) -> Vec<u8> {
    pcm32.to_binary()
}

/// Converts samples to their little-endian PCM16 byte representation.
pub trait ToBinary {
    fn to_binary(&self) -> Vec<u8>;
}

impl ToBinary for [f32] {
    fn to_binary(&self) -> Vec<u8> {
        self.iter()
            .flat_map(|&sample| {
                let v = (sample * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
                v.to_le_bytes()
            })
            .collect()
    }
}
