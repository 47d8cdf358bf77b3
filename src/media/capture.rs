//! Audio capture from the microphone

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};

use crate::media::AudioTrack;
use crate::{Error, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// How often the capture thread checks for a stop request
const STOP_POLL: Duration = Duration::from_millis(50);

/// Captures audio from the default input device
///
/// The cpal stream is owned by a dedicated thread (cpal streams are not
/// `Send`), so the track handle itself can be shared across tasks.
pub struct MicrophoneTrack {
    buffer: Arc<Mutex<Vec<f32>>>,
    live: Arc<AtomicBool>,
}

impl MicrophoneTrack {
    /// Open the default input device and start capturing
    ///
    /// # Errors
    ///
    /// Returns error if no input device exists or the stream cannot be built
    pub fn open() -> Result<Self> {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let live = Arc::new(AtomicBool::new(true));

        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<()>>();
        let thread_buffer = Arc::clone(&buffer);
        let thread_live = Arc::clone(&live);

        std::thread::Builder::new()
            .name("maitri-capture".to_string())
            .spawn(move || capture_thread(&thread_buffer, &thread_live, &ready_tx))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { buffer, live }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::Audio(
                "capture thread exited before startup".to_string(),
            )),
        }
    }

    /// Get the captured audio buffer without clearing it
    #[must_use]
    pub fn peek_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    /// Clear the audio buffer
    pub fn clear_buffer(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }

    /// Get the sample rate
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }
}

impl AudioTrack for MicrophoneTrack {
    fn read_samples(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }

    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            tracing::debug!("audio capture stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

impl Drop for MicrophoneTrack {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Owns the cpal stream for the lifetime of the track
fn capture_thread(
    buffer: &Arc<Mutex<Vec<f32>>>,
    live: &Arc<AtomicBool>,
    ready_tx: &std::sync::mpsc::Sender<Result<()>>,
) {
    let stream = match build_input_stream(Arc::clone(buffer)) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(Error::Audio(e.to_string())));
        return;
    }
    let _ = ready_tx.send(Ok(()));

    while live.load(Ordering::SeqCst) {
        std::thread::sleep(STOP_POLL);
    }

    drop(stream);
}

/// Build a mono 16kHz input stream on the default device
fn build_input_stream(buffer: Arc<Mutex<Vec<f32>>>) -> Result<cpal::Stream> {
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .ok_or_else(|| Error::DeviceUnavailable("no input device available".to_string()))?;

    let supported_config = device
        .supported_input_configs()
        .map_err(|e| Error::DeviceUnavailable(e.to_string()))?
        .find(|c| {
            c.channels() == 1
                && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
        })
        .ok_or_else(|| Error::Audio("no suitable audio config found".to_string()))?;

    let config: StreamConfig = supported_config
        .with_sample_rate(SampleRate(SAMPLE_RATE))
        .config();

    tracing::debug!(
        device = device.name().unwrap_or_default(),
        sample_rate = SAMPLE_RATE,
        channels = config.channels,
        "audio capture initialized"
    );

    device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            |err| {
                tracing::error!(error = %err, "audio capture error");
            },
            None,
        )
        .map_err(|e| Error::Audio(e.to_string()))
}

/// Convert f32 samples to WAV bytes
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
