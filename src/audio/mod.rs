use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use crate::audio_api::AudioCommand;
use crate::core::ChannelTransport;
use crate::pipeline::Config;

mod bounce;
mod engine;
mod frame;
mod voice;

pub use bounce::{BounceStats, bounce};
pub use engine::{Engine, MAX_VOICES, voicing};
pub use frame::StereoFrame;
pub use voice::Waveform;

const COMMAND_QUEUE: usize = 1024;

// frames rendered per pass inside the callback
const SCRATCH_FRAMES: usize = 512;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    /// A transport feeding this stream. Cheap; make one per caller.
    pub fn transport(&self) -> ChannelTransport {
        ChannelTransport::new(self.tx.clone())
    }
}

pub fn start_audio(config: &Config) -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(COMMAND_QUEUE);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let supported = device.default_output_config().context("no default output config")?;

    let sample_rate: u32 = supported.sample_rate();
    let channels = usize::from(supported.channels());
    anyhow::ensure!(channels > 0, "output device reports zero channels");

    match supported.sample_format() {
        cpal::SampleFormat::F32 => {
            let engine = Engine::for_config(sample_rate, config);
            let stream = build_output_stream_f32(&device, &supported.into(), rx, engine, channels)?;
            stream.play().context("failed to play output stream")?;
            tracing::info!(sample_rate, channels, "audio output started");

            Ok(AudioHandle { tx, _output_stream: stream })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    mut engine: Engine,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let err_fn = |err| tracing::error!("audio output stream error: {err}");
    let mut scratch = [StereoFrame::zero(); SCRATCH_FRAMES];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            // render in scratch-sized pieces, then spread onto however many
            // channels the device has
            for chunk in data.chunks_mut(SCRATCH_FRAMES * channels) {
                let n_frames = chunk.len() / channels;
                let block = &mut scratch[..n_frames];
                engine.render_block(block);
                for (out, frame) in chunk.chunks_mut(channels).zip(block.iter()) {
                    write_frame(out, *frame);
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

fn write_frame(out: &mut [f32], frame: StereoFrame) {
    match out {
        [mono] => *mono = 0.5 * (frame.left + frame.right),
        [left, right, rest @ ..] => {
            *left = frame.left;
            *right = frame.right;
            rest.fill(0.0);
        }
        [] => {}
    }
}
