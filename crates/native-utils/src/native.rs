//! [`AudioDevice`] backed by the host's microphone and speakers through cpal.
//!
//! cpal streams cannot move between threads on every platform, so both
//! streams live on a dedicated thread for the lifetime of the device. The
//! stream callbacks and the async side meet in two ring buffers: captured
//! mono samples flow out through one, playback samples flow in through the
//! other.

use crate::audio::{
    REALTIME_API_PCM16_SAMPLE_RATE, create_resampler, downmix, f32_to_pcm16, pcm16_to_f32,
    resample_all, resample_available, shared_buffer,
};
use crate::device::{get_or_default_input, get_or_default_output};
use anyhow::{Context, Result};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FrameCount, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd};
use rubato::FastFixedIn;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;
use voice_agent_core::AudioDevice;

/// The size of each audio chunk the input stream delivers.
pub const INPUT_CHUNK_SIZE: usize = 1024;
/// The size of each audio chunk the output stream requests.
pub const OUTPUT_CHUNK_SIZE: usize = 1024;
/// Capacity of the capture buffer, in milliseconds of device audio.
pub const INPUT_BUFFER_MS: usize = 5000;
/// Capacity of the playback buffer, in milliseconds of device audio.
pub const OUTPUT_LATENCY_MS: usize = 1000;

const RESAMPLER_CHUNK_SIZE: usize = 100;
const PLAYBACK_POLL: Duration = Duration::from_millis(10);

/// Which devices to open. `None` picks the host default.
#[derive(Debug, Clone, Default)]
pub struct DeviceSelection {
    pub input: Option<String>,
    pub output: Option<String>,
}

struct Streams {
    input_rate: f64,
    output_rate: f64,
    captured: HeapCons<f32>,
    dropped: Arc<AtomicUsize>,
    playback: HeapProd<f32>,
    queued: Arc<AtomicUsize>,
}

struct Capture {
    captured: HeapCons<f32>,
    resampler: FastFixedIn<f32>,
    pending: Vec<f32>,
    /// Samples the input callback could not buffer since the last read.
    dropped: Arc<AtomicUsize>,
}

struct Playback {
    playback: HeapProd<f32>,
    resampler: FastFixedIn<f32>,
    /// Samples pushed but not yet consumed by the output stream.
    queued: Arc<AtomicUsize>,
}

pub struct NativeAudio {
    recording: Arc<AtomicBool>,
    receiving: AtomicBool,
    capture: Mutex<Capture>,
    playback: tokio::sync::Mutex<Playback>,
    shutdown: Mutex<Option<std_mpsc::Sender<()>>>,
    stream_thread: Mutex<Option<JoinHandle<()>>>,
}

impl NativeAudio {
    /// Opens both devices and starts their streams. Capture stays muted
    /// until `start_recording`.
    pub fn open(selection: DeviceSelection) -> Result<Self> {
        let recording = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<Streams>>();
        let (shutdown_tx, shutdown_rx) = std_mpsc::channel::<()>();

        let flag = recording.clone();
        let stream_thread = std::thread::Builder::new()
            .name("audio-streams".to_string())
            .spawn(move || {
                let streams = match build_streams(&selection, flag) {
                    Ok((input_stream, output_stream, streams)) => {
                        let _ = ready_tx.send(Ok(streams));
                        (input_stream, output_stream)
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                // keep the streams alive until close() or the device is dropped
                let _ = shutdown_rx.recv();
                drop(streams);
                tracing::debug!("audio streams stopped");
            })
            .context("Failed to spawn audio thread")?;

        let streams = ready_rx
            .recv()
            .context("Audio thread exited before the streams were ready")??;

        let capture = Capture {
            captured: streams.captured,
            resampler: create_resampler(
                streams.input_rate,
                REALTIME_API_PCM16_SAMPLE_RATE,
                RESAMPLER_CHUNK_SIZE,
            )?,
            pending: Vec::new(),
            dropped: streams.dropped,
        };
        let playback = Playback {
            playback: streams.playback,
            queued: streams.queued,
            resampler: create_resampler(
                REALTIME_API_PCM16_SAMPLE_RATE,
                streams.output_rate,
                RESAMPLER_CHUNK_SIZE,
            )?,
        };

        Ok(Self {
            recording,
            receiving: AtomicBool::new(false),
            capture: Mutex::new(capture),
            playback: tokio::sync::Mutex::new(playback),
            shutdown: Mutex::new(Some(shutdown_tx)),
            stream_thread: Mutex::new(Some(stream_thread)),
        })
    }

    fn clear_capture(&self) {
        let mut capture = self.capture.lock().unwrap_or_else(PoisonError::into_inner);
        while capture.captured.try_pop().is_some() {}
        capture.pending.clear();
        capture.dropped.store(0, Ordering::Release);
    }
}

fn build_streams(
    selection: &DeviceSelection,
    recording: Arc<AtomicBool>,
) -> Result<(cpal::Stream, cpal::Stream, Streams)> {
    let input = get_or_default_input(selection.input.as_deref())
        .context("Failed to get audio input device")?;
    tracing::info!("Using input device: {:?}", input.name()?);
    for config in input.supported_input_configs()? {
        tracing::debug!("Supported input config: {:?}", config);
    }

    let input_config = input
        .default_input_config()
        .context("Failed to get default input config")?;
    let input_config = StreamConfig {
        channels: input_config.channels(),
        sample_rate: input_config.sample_rate(),
        buffer_size: cpal::BufferSize::Fixed(FrameCount::from(INPUT_CHUNK_SIZE as u32)),
    };
    let input_channel_count = input_config.channels as usize;
    let input_rate = input_config.sample_rate.0 as f64;
    tracing::info!("Input stream config: {:?}", &input_config);

    let (mut captured_tx, captured_rx) =
        shared_buffer(input_rate as usize * INPUT_BUFFER_MS / 1000).split();
    let dropped = Arc::new(AtomicUsize::new(0));
    let overflow = dropped.clone();
    // runs on the realtime audio thread: no logging here
    let input_data_fn = move |data: &[f32], _: &cpal::InputCallbackInfo| {
        if !recording.load(Ordering::Acquire) {
            return;
        }
        let mono = downmix(data, input_channel_count);
        push_captured(&mut captured_tx, &mono, &overflow);
    };
    let input_stream = input.build_input_stream(
        &input_config,
        input_data_fn,
        move |err| tracing::error!("An error occurred on input stream: {}", err),
        None,
    )?;
    input_stream.play()?;

    let output = get_or_default_output(selection.output.as_deref())
        .context("Failed to get audio output device")?;
    tracing::info!("Using output device: {:?}", output.name()?);
    let output_config = output
        .default_output_config()
        .context("Failed to get default output config")?;
    let output_config = StreamConfig {
        channels: output_config.channels(),
        sample_rate: output_config.sample_rate(),
        buffer_size: cpal::BufferSize::Fixed(FrameCount::from(OUTPUT_CHUNK_SIZE as u32)),
    };
    let output_channel_count = (output_config.channels as usize).max(1);
    let output_rate = output_config.sample_rate.0 as f64;
    tracing::info!("Output stream config: {:?}", &output_config);

    let (playback_tx, mut playback_rx) =
        shared_buffer(output_rate as usize * OUTPUT_LATENCY_MS / 1000).split();
    let queued = Arc::new(AtomicUsize::new(0));
    let consumed = queued.clone();
    let output_data_fn = move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
        for frame in data.chunks_mut(output_channel_count) {
            let sample = match playback_rx.try_pop() {
                Some(sample) => {
                    consumed.fetch_sub(1, Ordering::AcqRel);
                    sample
                }
                None => 0.0,
            };
            frame.fill(sample);
        }
    };
    let output_stream = output.build_output_stream(
        &output_config,
        output_data_fn,
        move |err| tracing::error!("An error occurred on output stream: {}", err),
        None,
    )?;
    output_stream.play()?;

    Ok((
        input_stream,
        output_stream,
        Streams {
            input_rate,
            output_rate,
            captured: captured_rx,
            dropped,
            playback: playback_tx,
            queued,
        },
    ))
}

/// Buffers `samples`, counting whatever does not fit.
fn push_captured(captured: &mut impl Producer<Item = f32>, samples: &[f32], dropped: &AtomicUsize) {
    let pushed = captured.push_slice(samples);
    if pushed < samples.len() {
        dropped.fetch_add(samples.len() - pushed, Ordering::AcqRel);
    }
}

fn take_dropped(dropped: &AtomicUsize) -> Option<usize> {
    match dropped.swap(0, Ordering::AcqRel) {
        0 => None,
        count => Some(count),
    }
}

#[async_trait]
impl AudioDevice for NativeAudio {
    fn start_recording(&self) {
        self.clear_capture();
        self.recording.store(true, Ordering::Release);
        tracing::debug!("microphone recording");
    }

    fn stop_recording(&self) {
        self.recording.store(false, Ordering::Release);
        tracing::debug!("microphone muted");
    }

    fn start_receiving(&self) {
        self.recording.store(false, Ordering::Release);
        self.receiving.store(true, Ordering::Release);
    }

    fn stop_receiving(&self) {
        self.receiving.store(false, Ordering::Release);
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    fn is_receiving(&self) -> bool {
        self.receiving.load(Ordering::Acquire)
    }

    fn get_audio_data(&self) -> Option<Vec<u8>> {
        let mut capture = self.capture.lock().unwrap_or_else(PoisonError::into_inner);
        let Capture {
            captured,
            resampler,
            pending,
            dropped,
        } = &mut *capture;
        if let Some(count) = take_dropped(dropped) {
            tracing::warn!("Capture buffer full, dropped {} samples", count);
        }
        pending.extend(std::iter::from_fn(|| captured.try_pop()));

        match resample_available(resampler, pending) {
            Ok(samples) if !samples.is_empty() => Some(f32_to_pcm16(&samples)),
            Ok(_) => None,
            Err(e) => {
                tracing::error!("Failed to resample captured audio: {}", e);
                pending.clear();
                None
            }
        }
    }

    async fn play(&self, pcm16: Vec<u8>) -> Result<()> {
        let mut state = self.playback.lock().await;
        let Playback {
            playback,
            resampler,
            queued,
        } = &mut *state;

        let samples = resample_all(resampler, &pcm16_to_f32(&pcm16))
            .context("Failed to resample response audio")?;

        let mut remaining = samples.as_slice();
        while !remaining.is_empty() {
            let pushed = playback.push_slice(remaining);
            queued.fetch_add(pushed, Ordering::AcqRel);
            remaining = &remaining[pushed..];
            if !remaining.is_empty() {
                tokio::time::sleep(PLAYBACK_POLL).await;
            }
        }
        // hold the microphone closed until the speaker has drained
        while queued.load(Ordering::Acquire) > 0 {
            tokio::time::sleep(PLAYBACK_POLL).await;
        }
        Ok(())
    }

    fn close(&self) {
        self.recording.store(false, Ordering::Release);
        self.receiving.store(false, Ordering::Release);
        if let Some(shutdown) = self
            .shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self
            .stream_thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            if thread.join().is_err() {
                tracing::error!("audio thread panicked");
            }
        }
        tracing::info!("audio device closed");
    }
}

impl Drop for NativeAudio {
    fn drop(&mut self) {
        if let Some(shutdown) = self
            .shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let _ = shutdown.send(());
        }
    }
}
