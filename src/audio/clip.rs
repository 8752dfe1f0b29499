// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use hound::WavReader;
use tracing::info;

use crate::error::SonifyError;

/// A WAV file held fully in memory as interleaved f32 samples.
#[derive(Clone, Debug)]
pub struct Clip {
    samples: Arc<Vec<f32>>,
    channels: u16,
    sample_rate: u32,
}

impl Clip {
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Clip {
        Clip {
            samples: Arc::new(samples),
            channels: channels.max(1),
            sample_rate,
        }
    }

    /// Reads an entire WAV file, scaling integer samples to [-1.0, 1.0].
    pub fn load(path: &Path) -> Result<Clip, SonifyError> {
        let unreadable = |source| SonifyError::UnreadableAudio {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = WavReader::open(path).map_err(unreadable)?;
        let spec = reader.spec();
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<f32>, hound::Error>>()
                .map_err(unreadable)?,
            hound::SampleFormat::Int => {
                // Use i64 to avoid overflow for 32-bit samples
                let scale_factor = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|s| s as f32 * scale_factor))
                    .collect::<Result<Vec<f32>, hound::Error>>()
                    .map_err(unreadable)?
            }
        };

        let clip = Clip::new(samples, spec.channels, spec.sample_rate);
        info!(
            path = ?path,
            channels = clip.channels,
            sample_rate = clip.sample_rate,
            duration_ms = clip.duration().as_millis(),
            "Loaded clip"
        );
        Ok(clip)
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Converts the clip to the given rate and channel count using linear
    /// interpolation. Output channels beyond the clip's wrap around its channels,
    /// so a mono clip is copied to every output channel.
    pub fn convert(&self, target_rate: u32, target_channels: u16) -> Vec<f32> {
        let source_channels = self.channels as usize;
        let target_channels = target_channels.max(1) as usize;
        if self.sample_rate == 0 || target_rate == 0 {
            return Vec::new();
        }

        let ratio = target_rate as f64 / self.sample_rate as f64;
        let target_frames = (self.frames() as f64 * ratio).ceil() as usize;
        let mut output = Vec::with_capacity(target_frames * target_channels);

        for target_frame in 0..target_frames {
            let source_pos = target_frame as f64 / ratio;
            let source_frame = source_pos.floor() as usize;
            let frac = source_pos.fract() as f32;

            for channel in 0..target_channels {
                let channel = channel % source_channels;
                let idx0 = source_frame * source_channels + channel;
                let idx1 = (source_frame + 1) * source_channels + channel;

                let s0 = self.samples.get(idx0).copied().unwrap_or(0.0);
                let s1 = self.samples.get(idx1).copied().unwrap_or(s0);
                output.push(s0 + (s1 - s0) * frac);
            }
        }

        output
    }
}
