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
use std::path::PathBuf;

use crate::config::error::ConfigError;

/// Every failure the sonification tool can report. Validation variants are raised
/// before any rendering work starts; I/O variants carry the path that failed.
#[derive(Debug, thiserror::Error)]
pub enum SonifyError {
    #[error("unknown scale \"{0}\" (expected one of major, minor, pentatonic, blues, chromatic)")]
    UnknownScale(String),

    #[error("unknown instrument \"{0}\"")]
    UnknownInstrument(String),

    #[error("missing sample bank {}", .0.display())]
    MissingSampleBank(PathBuf),

    #[error("unable to read sample bank {}: {source}", .path.display())]
    UnreadableSampleBank {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("sample bank {} has no preset at index {preset}", .path.display())]
    UnknownPreset { path: PathBuf, preset: usize },

    #[error("empty dataset: {0}")]
    EmptyDataset(&'static str),

    #[error("mismatched array lengths: {pitch} pitch values, {time} time values")]
    MismatchedArrayLengths { pitch: usize, time: usize },

    #[error("non-finite value {value} at index {index} of {name}")]
    NonFiniteValue {
        name: &'static str,
        index: usize,
        value: f64,
    },

    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("percent must be within 1..=100, got {0}")]
    InvalidPercent(i64),

    #[error("unable to write {}: {source}", .path.display())]
    UnwritableOutputPath {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unable to read audio {}: {source}", .path.display())]
    UnreadableAudio {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("playback device error: {0}")]
    PlaybackDeviceError(String),

    #[error("unable to render plot {}: {message}", .path.display())]
    PlotError { path: PathBuf, message: String },

    #[error("invalid spectrum file {}: {message}", .path.display())]
    InvalidSpectrumFile { path: PathBuf, message: String },

    #[error(transparent)]
    ConfigResolutionError(#[from] ConfigError),
}

impl SonifyError {
    /// Wraps an I/O-ish failure on an output path.
    pub(crate) fn unwritable<E>(path: impl Into<PathBuf>, source: E) -> SonifyError
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        SonifyError::UnwritableOutputPath {
            path: path.into(),
            source: source.into(),
        }
    }
}
