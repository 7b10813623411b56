// Audio engine - cpal output stream driving the piano session
//
// # Sample formats
//
// F32, I16 and U16 devices are supported. Everything is rendered as f32 and
// converted per frame with cpal's `FromSample<f32>`; the mono signal is written
// to every channel.
//
// # Suspended start
//
// The stream is built paused. Nothing (including command handling) runs until
// `resume()` is called, which the UI does before sending the first user command.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::audio::dsp_utils::{OnePoleSmoother, master_sample};
use crate::audio::parameters::AtomicF32;
use crate::audio::timing::AudioTiming;
use crate::config::PianoConfig;
use crate::error::{PianoError, PianoResult};
use crate::messaging::channels::{CommandConsumer, DropCounter, SharedUiUpdateProducer};
use crate::messaging::notification::{Notification, NotificationCategory, UiUpdate};
use crate::session::{ChannelFeedback, PianoSession};

/// Volume glide time, long enough to avoid zipper noise
const VOLUME_SMOOTHING_MS: f32 = 10.0;

pub struct AudioEngine {
    _device: Device,
    stream: Stream,
    sample_rate: f32,
    channels: usize,
    running: AtomicBool,
    dropped_updates: DropCounter,
    pub volume: AtomicF32,
    pub timing: AudioTiming,
}

impl AudioEngine {
    pub fn new(
        config: &PianoConfig,
        command_rx: CommandConsumer,
        ui_tx: SharedUiUpdateProducer,
    ) -> PianoResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PianoError::Audio("No audio device found".to_string()))?;

        log::info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device
            .default_output_config()
            .map_err(|e| PianoError::Audio(format!("Configuration error: {}", e)))?;

        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        log::info!("Audio config: {:?}", supported_config);

        let stream_config: StreamConfig = supported_config.into();

        let volume = AtomicF32::volume(config.volume);
        let timing = AudioTiming::new(sample_rate);
        let dropped_updates = DropCounter::new();
        let feedback = ChannelFeedback::new(ui_tx.clone(), dropped_updates.clone());
        let session = PianoSession::new(config, sample_rate, feedback);

        let parts = CallbackParts {
            session,
            command_rx,
            volume: volume.clone(),
            smoother: OnePoleSmoother::new(volume.get(), VOLUME_SMOOTHING_MS, sample_rate),
            timing: timing.clone(),
            channels,
        };

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &stream_config, parts, ui_tx.clone())
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &stream_config, parts, ui_tx.clone())
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &stream_config, parts, ui_tx.clone())
            }
            _ => {
                return Err(PianoError::Audio(format!(
                    "Unsupported sample format: {:?}. Supported formats: F32, I16, U16",
                    sample_format
                )));
            }
        }?;

        // Some hosts start streams on creation
        if let Err(e) = stream.pause() {
            log::warn!("Could not pause the new stream: {}", e);
        }

        log::info!(
            "Audio engine ready (suspended): {} Hz, {} channels",
            sample_rate,
            channels
        );

        Ok(Self {
            _device: device,
            stream,
            sample_rate,
            channels,
            running: AtomicBool::new(false),
            dropped_updates,
            volume,
            timing,
        })
    }

    /// Start the output stream; calling it again is a no-op
    pub fn resume(&self) -> PianoResult<()> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        if let Err(e) = self.stream.play() {
            self.running.store(false, Ordering::Release);
            return Err(PianoError::Audio(format!("Failed to start stream: {}", e)));
        }

        log::info!("Audio stream resumed");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// UI updates the session could not deliver
    pub fn dropped_updates(&self) -> &DropCounter {
        &self.dropped_updates
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        mut parts: CallbackParts,
        ui_tx: SharedUiUpdateProducer,
    ) -> PianoResult<Stream>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // No blocking, no I/O
                    parts.process(data);
                },
                move |err| {
                    // Runs outside the audio callback
                    log::error!("Audio stream error: {}", err);

                    if let Ok(mut tx) = ui_tx.try_lock() {
                        let notif = Notification::error(
                            NotificationCategory::Audio,
                            format!("Audio stream error: {}", err),
                        );
                        let _ = tx.try_push(UiUpdate::Status(notif));
                    }
                },
                None,
            )
            .map_err(|e| PianoError::Audio(format!("Error in stream creation: {}", e)))
    }
}

/// Everything the data callback owns
struct CallbackParts {
    session: PianoSession<ChannelFeedback>,
    command_rx: CommandConsumer,
    volume: AtomicF32,
    smoother: OnePoleSmoother,
    timing: AudioTiming,
    channels: usize,
}

impl CallbackParts {
    fn process<T>(&mut self, data: &mut [T])
    where
        T: Sample + FromSample<f32>,
    {
        // Commands take effect at the start of the buffer
        self.session.advance_to(self.timing.seconds());
        while let Some(command) = self.command_rx.try_pop() {
            // Rejections are reported by the session itself
            let _ = self.session.apply(command);
        }

        let channels = self.channels.max(1);
        let mut frames = 0;
        for frame in data.chunks_mut(channels) {
            self.session.advance_to(self.timing.seconds_at(frames));
            let gain = self.smoother.process(self.volume.get());
            let sample = master_sample(self.session.next_sample(), gain);
            write_mono_frame(sample, frame);
            frames += 1;
        }

        self.timing.advance(frames);
    }
}

#[inline]
fn write_mono_frame<T>(sample: f32, frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    for channel_sample in frame.iter_mut() {
        *channel_sample = T::from_sample(sample);
    }
}
