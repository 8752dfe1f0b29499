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
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use duration_string::DurationString;
use serde::Deserialize;
use tracing::info;

use super::error::ConfigError;

const DEFAULT_SAMPLE_RATE: u32 = 48000;
/// Rates the SoundFont synthesizer can render at.
const SAMPLE_RATES: RangeInclusive<u32> = 16000..=192000;
const DEFAULT_PLOT_SIZE: (f64, f64) = (8.0, 4.0);
const DEFAULT_AUDIO_DEVICE: &str = "default";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Per-note performance parameters.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SoniParams {
    /// How long each note is held, in seconds.
    pub note_length: f64,
    /// Release time once a note lets go, in seconds.
    #[serde(rename = "R", alias = "r")]
    pub release: f64,
}

/// The settings read from the init file.
#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    /// Directory holding the SoundFont sample banks.
    instruments_dir: PathBuf,

    /// Writable directory for the rendered artifacts.
    output_dir: PathBuf,

    /// Note length and release.
    soni_params: SoniParams,

    /// Render sample rate in Hz (default: 48000).
    sample_rate: Option<u32>,

    /// Placeholder plot size in inches (default: 8x4).
    plot_size: Option<(f64, f64)>,

    /// Output device name, "default", or a name starting with "mock".
    audio_device: Option<String>,

    /// How often playback polls the device (default: 100ms).
    poll_interval: Option<String>,

    /// TTF font used for plot labels.
    font_path: Option<PathBuf>,
}

impl Settings {
    /// Creates settings with defaults for everything but the required fields.
    pub fn new(instruments_dir: &Path, output_dir: &Path, soni_params: SoniParams) -> Settings {
        Settings {
            instruments_dir: instruments_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            soni_params,
            sample_rate: None,
            plot_size: None,
            audio_device: None,
            poll_interval: None,
            font_path: None,
        }
    }

    /// Resolves and loads the init file. A missing flag and a missing file are
    /// both reported rather than falling back to defaults.
    pub fn load(initfile: Option<&Path>) -> Result<Settings, ConfigError> {
        let path = initfile.ok_or(ConfigError::NoInitFile)?;
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        info!(initfile = ?path, "Loading init file");
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("SONIC").separator("__"))
            .build()?
            .try_deserialize::<Settings>()?;
        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let SoniParams {
            note_length,
            release,
        } = self.soni_params;
        if !note_length.is_finite() || note_length < 0.0 {
            return Err(ConfigError::Invalid {
                field: "soni_params.note_length",
                message: format!("must be a non-negative number of seconds, got {}", note_length),
            });
        }
        if !release.is_finite() || release < 0.0 {
            return Err(ConfigError::Invalid {
                field: "soni_params.R",
                message: format!("must be a non-negative number of seconds, got {}", release),
            });
        }
        if !SAMPLE_RATES.contains(&self.sample_rate()) {
            return Err(ConfigError::Invalid {
                field: "sample_rate",
                message: format!(
                    "must be within {}..={} Hz, got {}",
                    SAMPLE_RATES.start(),
                    SAMPLE_RATES.end(),
                    self.sample_rate()
                ),
            });
        }
        let (width, height) = self.plot_size();
        if !(width > 0.0 && height > 0.0) {
            return Err(ConfigError::Invalid {
                field: "plot_size",
                message: format!("must be positive, got {}x{}", width, height),
            });
        }
        self.poll_interval()?;
        Ok(())
    }

    pub fn instruments_dir(&self) -> &Path {
        &self.instruments_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn soni_params(&self) -> SoniParams {
        self.soni_params
    }

    /// Returns the render sample rate (default: 48000).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    /// Returns the plot size in inches (default: 8x4).
    pub fn plot_size(&self) -> (f64, f64) {
        self.plot_size.unwrap_or(DEFAULT_PLOT_SIZE)
    }

    /// Returns the audio device name (default: "default").
    pub fn audio_device(&self) -> &str {
        self.audio_device.as_deref().unwrap_or(DEFAULT_AUDIO_DEVICE)
    }

    /// Returns the playback polling interval (default: 100ms).
    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        match &self.poll_interval {
            Some(poll_interval) => {
                let parsed: Duration = DurationString::from_string(poll_interval.clone())
                    .map_err(|e| ConfigError::Invalid {
                        field: "poll_interval",
                        message: e.to_string(),
                    })?
                    .into();
                if parsed.is_zero() {
                    return Err(ConfigError::Invalid {
                        field: "poll_interval",
                        message: "must be greater than zero".to_string(),
                    });
                }
                Ok(parsed)
            }
            None => Ok(DEFAULT_POLL_INTERVAL),
        }
    }

    pub fn font_path(&self) -> Option<&Path> {
        self.font_path.as_deref()
    }
}
