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
use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::bank::{frames, SampleBank};
use crate::error::SonifyError;

/// A bank that plays a plain sine tone at the key's frequency. Doesn't need any
/// sample files.
pub struct SineBank {
    presets: usize,
    renders: AtomicUsize,
}

impl SineBank {
    pub const AMPLITUDE: f32 = 0.5;

    pub fn new(presets: usize) -> SineBank {
        SineBank {
            presets,
            renders: AtomicUsize::new(0),
        }
    }

    /// Number of notes rendered so far.
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::Relaxed)
    }
}

impl SampleBank for SineBank {
    fn preset_count(&self) -> usize {
        self.presets
    }

    fn render_note(
        &self,
        preset: usize,
        key: u8,
        hold: f64,
        release: f64,
        sample_rate: u32,
    ) -> Result<Vec<f32>, SonifyError> {
        if preset >= self.presets {
            return Err(SonifyError::UnknownPreset {
                path: "sine".into(),
                preset,
            });
        }
        self.renders.fetch_add(1, Ordering::Relaxed);

        let frequency = 440.0 * 2f64.powf((f64::from(key) - 69.0) / 12.0);
        let total = frames(hold, sample_rate) + frames(release, sample_rate);
        Ok((0..total)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                Self::AMPLITUDE * (2.0 * PI * frequency * t).sin() as f32
            })
            .collect())
    }
}
