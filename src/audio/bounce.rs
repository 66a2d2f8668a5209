// Offline render: run the sequencer against the built-in synth on a virtual
// millisecond clock and write what comes out to a 16-bit stereo wav.

use std::path::Path;

use anyhow::Context;
use hound::{SampleFormat, WavSpec, WavWriter};

use super::engine::Engine;
use super::frame::StereoFrame;
use crate::pipeline::Config;
use crate::sequencer::Sequencer;
use crate::shared::STEPS_PER_TRACK;

// let release tails and delayed note-offs finish after the last step
const TAIL_MS: u64 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BounceStats {
    pub frames: u64,
    pub steps: u64,
    pub duration_ms: u64,
}

pub fn bounce(config: &Config, path: &Path, bars: u32) -> anyhow::Result<BounceStats> {
    let mut sequencer = Sequencer::from_config(config).context("invalid config")?;
    let mut engine = Engine::for_config(config.sample_rate, config);

    let spec = WavSpec {
        channels: 2,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer =
        WavWriter::create(path, spec).with_context(|| format!("failed to create {}", path.display()))?;

    let play_ms = u64::from(bars) * STEPS_PER_TRACK as u64 * sequencer.tempo().step_interval_ms();
    tracing::info!(bars, bpm = sequencer.bpm(), play_ms, path = %path.display(), "bouncing");

    let per_ms = config.sample_rate as usize / 1000 + 1;
    let mut scratch = vec![StereoFrame::zero(); per_ms];
    let mut carry = 0u64;
    let mut stats = BounceStats { frames: 0, steps: 1, duration_ms: play_ms + TAIL_MS };

    sequencer.start(0, &mut engine);
    for now in 0..play_ms + TAIL_MS {
        if now == play_ms {
            sequencer.stop(now, &mut engine);
        }
        stats.steps += sequencer.tick(now, &mut engine) as u64;

        // whole frames for this millisecond, remainder rolls over
        carry += u64::from(config.sample_rate);
        let n = (carry / 1000) as usize;
        carry %= 1000;

        let block = &mut scratch[..n];
        engine.render_block(block);
        for frame in block.iter() {
            writer.write_sample(to_i16(frame.left))?;
            writer.write_sample(to_i16(frame.right))?;
        }
        stats.frames += n as u64;
    }

    writer.finalize().context("failed to finalize wav")?;
    tracing::info!(frames = stats.frames, steps = stats.steps, "bounce done");
    Ok(stats)
}

fn to_i16(s: f32) -> i16 {
    (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Preset;

    #[test]
    fn one_bar_of_the_demo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.wav");
        let config = Config { preset: Preset::Demo, sample_rate: 8_000, ..Config::default() };

        let stats = bounce(&config, &path, 1).unwrap();
        // 16 steps of 125 ms, then the tail
        assert_eq!(stats.duration_ms, 2_500);
        assert_eq!(stats.frames, 20_000);
        assert_eq!(stats.steps, 16);

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 8_000);
        assert_eq!(reader.duration(), 20_000);
        let loud = reader.into_samples::<i16>().filter_map(Result::ok).any(|s| s != 0);
        assert!(loud);
    }

    #[test]
    fn fractional_sample_rates_keep_exact_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.wav");
        let config = Config { preset: Preset::Empty, sample_rate: 44_100, bpm: 120.0, ..Config::default() };
        let stats = bounce(&config, &path, 1).unwrap();
        assert_eq!(stats.frames, 44_100 * 5 / 2);
    }
}
