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

//! Instrument voices and their performance parameters.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::bank::SampleBank;
use crate::error::SonifyError;

/// A linear attack/decay/sustain/release volume envelope. Times are in seconds,
/// sustain is a fraction of full volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Envelope {
            attack: 0.01,
            decay: 0.0,
            sustain: 1.0,
            release: 0.1,
        }
    }
}

impl Envelope {
    /// Gain while the key is held, `t` seconds after the note starts.
    fn held_gain(&self, t: f64) -> f64 {
        if t < self.attack {
            return t / self.attack;
        }
        let t = t - self.attack;
        if t < self.decay {
            return 1.0 - (1.0 - self.sustain) * t / self.decay;
        }
        self.sustain
    }

    /// Gain `t` seconds after the note starts for a note held `note_length` seconds.
    pub fn gain(&self, t: f64, note_length: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }
        if t < note_length {
            return self.held_gain(t);
        }

        let since_release = t - note_length;
        if since_release >= self.release {
            return 0.0;
        }
        self.held_gain(note_length) * (1.0 - since_release / self.release)
    }
}

/// The parameters a caller may tweak on its own copy of a voice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerformanceParams {
    /// How long each note is held before release, in seconds.
    pub note_length: f64,
    pub envelope: Envelope,
}

impl Default for PerformanceParams {
    fn default() -> Self {
        PerformanceParams {
            note_length: 0.5,
            envelope: Envelope::default(),
        }
    }
}

/// A sample-based instrument voice: a preset within a sample bank plus the
/// performance parameters used when playing it.
///
/// Cloning a voice yields an independent copy of the performance parameters.
/// The bank itself is immutable and shared.
#[derive(Clone)]
pub struct Voice {
    name: String,
    bank_path: PathBuf,
    bank: Arc<dyn SampleBank>,
    preset: usize,
    params: PerformanceParams,
}

impl Voice {
    pub fn new(name: &str, bank_path: &Path, bank: Arc<dyn SampleBank>, preset: usize) -> Voice {
        Voice {
            name: name.to_string(),
            bank_path: bank_path.to_path_buf(),
            bank,
            preset,
            params: PerformanceParams::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bank_path(&self) -> &Path {
        &self.bank_path
    }

    pub fn preset(&self) -> usize {
        self.preset
    }

    pub fn params(&self) -> &PerformanceParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut PerformanceParams {
        &mut self.params
    }

    /// Renders a single key through the bank, shaped by this voice's envelope.
    /// The note lasts `note_length + release` seconds.
    pub fn render_key(&self, key: u8, sample_rate: u32) -> Result<Vec<f32>, SonifyError> {
        let PerformanceParams {
            note_length,
            envelope,
        } = self.params;

        let mut samples = self.bank.render_note(
            self.preset,
            key,
            note_length,
            envelope.release,
            sample_rate,
        )?;
        for (i, sample) in samples.iter_mut().enumerate() {
            let t = i as f64 / sample_rate as f64;
            *sample *= envelope.gain(t, note_length) as f32;
        }
        Ok(samples)
    }
}

impl fmt::Debug for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Voice")
            .field("name", &self.name)
            .field("bank_path", &self.bank_path)
            .field("preset", &self.preset)
            .field("params", &self.params)
            .finish()
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, preset {})",
            self.name,
            self.bank_path.display(),
            self.preset
        )
    }
}
