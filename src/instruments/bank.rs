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
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustysynth::{SoundFont, Synthesizer, SynthesizerSettings};
use tracing::debug;

use crate::error::SonifyError;

/// MIDI channel used for rendering. Channel 10 (index 9) is reserved for percussion.
const CHANNEL: i32 = 0;
const VELOCITY: i32 = 100;
const CONTROL_CHANGE: i32 = 0xB0;
const PROGRAM_CHANGE: i32 = 0xC0;
const BANK_SELECT: i32 = 0x00;
/// Rates rustysynth will render at.
const MIN_SAMPLE_RATE: u32 = 16000;
const MAX_SAMPLE_RATE: u32 = 192000;

/// Converts seconds to a whole number of frames at the given rate.
pub fn frames(seconds: f64, sample_rate: u32) -> usize {
    (seconds.max(0.0) * sample_rate as f64).round() as usize
}

/// A source of pre-recorded instrument sounds that can play a single key.
pub trait SampleBank: Send + Sync {
    /// The number of presets available in this bank.
    fn preset_count(&self) -> usize;

    /// Renders one mono note: the key is held for `hold` seconds and then
    /// released for `release` seconds. The result is exactly
    /// `frames(hold) + frames(release)` samples long and carries only the
    /// bank's own sound, not the caller's envelope.
    fn render_note(
        &self,
        preset: usize,
        key: u8,
        hold: f64,
        release: f64,
        sample_rate: u32,
    ) -> Result<Vec<f32>, SonifyError>;
}

/// A SoundFont 2 sample bank.
pub struct SoundFontBank {
    path: PathBuf,
    sound_font: Arc<SoundFont>,
}

impl SoundFontBank {
    /// Parses the SoundFont at the given path.
    pub fn open(path: &Path) -> Result<SoundFontBank, SonifyError> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SonifyError::MissingSampleBank(path.to_path_buf())
            } else {
                SonifyError::UnreadableSampleBank {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                }
            }
        })?;
        let sound_font = SoundFont::new(&mut BufReader::new(file)).map_err(|e| {
            SonifyError::UnreadableSampleBank {
                path: path.to_path_buf(),
                source: Box::new(e),
            }
        })?;

        debug!(
            path = ?path,
            presets = sound_font.get_presets().len(),
            "Parsed SoundFont"
        );

        Ok(SoundFontBank {
            path: path.to_path_buf(),
            sound_font: Arc::new(sound_font),
        })
    }
}

impl SampleBank for SoundFontBank {
    fn preset_count(&self) -> usize {
        self.sound_font.get_presets().len()
    }

    fn render_note(
        &self,
        preset: usize,
        key: u8,
        hold: f64,
        release: f64,
        sample_rate: u32,
    ) -> Result<Vec<f32>, SonifyError> {
        let preset_info =
            self.sound_font
                .get_presets()
                .get(preset)
                .ok_or_else(|| SonifyError::UnknownPreset {
                    path: self.path.clone(),
                    preset,
                })?;

        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(SonifyError::InvalidParameter {
                name: "sample rate",
                value: f64::from(sample_rate),
            });
        }

        let settings = SynthesizerSettings::new(sample_rate as i32);
        let mut synthesizer = Synthesizer::new(&self.sound_font, &settings).map_err(|e| {
            SonifyError::UnreadableSampleBank {
                path: self.path.clone(),
                source: Box::new(e),
            }
        })?;
        synthesizer.process_midi_message(
            CHANNEL,
            CONTROL_CHANGE,
            BANK_SELECT,
            preset_info.get_bank_number(),
        );
        synthesizer.process_midi_message(
            CHANNEL,
            PROGRAM_CHANGE,
            preset_info.get_patch_number(),
            0,
        );

        let hold_frames = frames(hold, sample_rate);
        let total_frames = hold_frames + frames(release, sample_rate);
        let mut left = vec![0.0f32; total_frames];
        let mut right = vec![0.0f32; total_frames];

        synthesizer.note_on(CHANNEL, i32::from(key), VELOCITY);
        synthesizer.render(&mut left[..hold_frames], &mut right[..hold_frames]);
        synthesizer.note_off(CHANNEL, i32::from(key));
        synthesizer.render(&mut left[hold_frames..], &mut right[hold_frames..]);

        Ok(left
            .iter()
            .zip(right.iter())
            .map(|(l, r)| 0.5 * (l + r))
            .collect())
    }
}
