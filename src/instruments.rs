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

//! Sample-based instruments.
//!
//! This module provides:
//! - The sample bank abstraction and its SoundFont implementation
//! - Voices with per-copy performance parameters
//! - The registry of the fixed instrument set

mod bank;
#[cfg(test)]
pub mod mock;
mod voice;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::SonifyError;

pub use bank::{frames, SampleBank, SoundFontBank};
pub use voice::{Envelope, PerformanceParams, Voice};

/// The registered instruments: name, bank file and preset index within the bank.
const INSTRUMENTS: [(&str, &str, usize); 6] = [
    ("flute", "flute.sf2", 0),
    ("guitar", "guitars.sf2", 10),
    ("piano", "piano.sf2", 1),
    ("choir", "choir.sf2", 1),
    ("cello", "assortment.sf2", 7),
    ("oboe", "assortment.sf2", 31),
];

/// The set of instrument voice templates. Callers always receive copies.
pub struct SamplerRegistry {
    voices: HashMap<String, Voice>,
}

impl SamplerRegistry {
    /// Loads every instrument's SoundFont from the given directory.
    pub fn load(instruments_dir: &Path) -> Result<SamplerRegistry, SonifyError> {
        SamplerRegistry::load_with(instruments_dir, |path| {
            let bank: Arc<dyn SampleBank> = Arc::new(SoundFontBank::open(path)?);
            Ok(bank)
        })
    }

    /// Loads every instrument using the given function to open bank files. Each
    /// bank file is opened once even if several instruments share it.
    pub fn load_with<F>(instruments_dir: &Path, mut open: F) -> Result<SamplerRegistry, SonifyError>
    where
        F: FnMut(&Path) -> Result<Arc<dyn SampleBank>, SonifyError>,
    {
        info!(dir = ?instruments_dir, "Loading instrument samples");

        let mut banks: HashMap<PathBuf, Arc<dyn SampleBank>> = HashMap::new();
        let mut voices = HashMap::new();
        for (name, file, preset) in INSTRUMENTS {
            let path = instruments_dir.join(file);
            if !path.is_file() {
                return Err(SonifyError::MissingSampleBank(path));
            }

            let bank = match banks.get(&path) {
                Some(bank) => {
                    debug!(path = ?path, "Using cached sample bank");
                    bank.clone()
                }
                None => {
                    let bank = open(&path)?;
                    banks.insert(path.clone(), bank.clone());
                    bank
                }
            };
            if preset >= bank.preset_count() {
                return Err(SonifyError::UnknownPreset { path, preset });
            }

            info!(instrument = name, bank = ?path, preset, "Instrument loaded");
            voices.insert(name.to_string(), Voice::new(name, &path, bank, preset));
        }

        Ok(SamplerRegistry { voices })
    }

    /// Returns an independent copy of the named instrument's voice.
    pub fn get(&self, name: &str) -> Result<Voice, SonifyError> {
        self.voices
            .get(name.trim())
            .cloned()
            .ok_or_else(|| SonifyError::UnknownInstrument(name.to_string()))
    }

    /// Returns the registered instrument names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.voices.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;
    use crate::instruments::mock::SineBank;

    const BANK_FILES: [&str; 5] = [
        "flute.sf2",
        "guitars.sf2",
        "piano.sf2",
        "choir.sf2",
        "assortment.sf2",
    ];

    fn instruments_dir(skip: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in BANK_FILES {
            if Some(file) != skip {
                fs::write(dir.path().join(file), b"").unwrap();
            }
        }
        dir
    }

    fn sine_registry(dir: &Path) -> SamplerRegistry {
        SamplerRegistry::load_with(dir, |_| {
            let bank: Arc<dyn SampleBank> = Arc::new(SineBank::new(128));
            Ok(bank)
        })
        .unwrap()
    }

    #[test]
    fn test_load_all_instruments() {
        let dir = instruments_dir(None);
        let registry = sine_registry(dir.path());

        assert_eq!(
            registry.names(),
            vec!["cello", "choir", "flute", "guitar", "oboe", "piano"]
        );

        let guitar = registry.get("guitar").unwrap();
        assert_eq!(guitar.preset(), 10);
        assert_eq!(guitar.bank_path(), dir.path().join("guitars.sf2"));
        assert_eq!(registry.get("flute").unwrap().preset(), 0);
        assert_eq!(registry.get("piano").unwrap().preset(), 1);
        assert_eq!(registry.get("choir").unwrap().preset(), 1);
        assert_eq!(registry.get("cello").unwrap().preset(), 7);
        assert_eq!(registry.get("oboe").unwrap().preset(), 31);
    }

    #[test]
    fn test_shared_bank_opened_once() {
        let dir = instruments_dir(None);
        let mut opened = Vec::new();
        SamplerRegistry::load_with(dir.path(), |path| {
            opened.push(path.to_path_buf());
            let bank: Arc<dyn SampleBank> = Arc::new(SineBank::new(128));
            Ok(bank)
        })
        .unwrap();

        assert_eq!(opened.len(), 5);
        assert_eq!(
            opened
                .iter()
                .filter(|p| p.ends_with("assortment.sf2"))
                .count(),
            1
        );
    }

    #[test]
    fn test_missing_sample_bank() {
        let dir = instruments_dir(Some("piano.sf2"));
        let result = SamplerRegistry::load_with(dir.path(), |_| {
            let bank: Arc<dyn SampleBank> = Arc::new(SineBank::new(128));
            Ok(bank)
        });
        match result {
            Err(SonifyError::MissingSampleBank(path)) => {
                assert_eq!(path, dir.path().join("piano.sf2"))
            }
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("expected a missing sample bank error"),
        }
    }

    #[test]
    fn test_preset_out_of_range() {
        let dir = instruments_dir(None);
        let result = SamplerRegistry::load_with(dir.path(), |_| {
            let bank: Arc<dyn SampleBank> = Arc::new(SineBank::new(8));
            Ok(bank)
        });
        assert!(matches!(
            result,
            Err(SonifyError::UnknownPreset { preset: 10, .. })
        ));
    }

    #[test]
    fn test_real_loader_rejects_empty_files() {
        let dir = instruments_dir(None);
        assert!(matches!(
            SamplerRegistry::load(dir.path()),
            Err(SonifyError::UnreadableSampleBank { .. })
        ));
    }

    #[test]
    fn test_unknown_instrument() {
        let dir = instruments_dir(None);
        let registry = sine_registry(dir.path());
        assert!(matches!(
            registry.get("theremin"),
            Err(SonifyError::UnknownInstrument(name)) if name == "theremin"
        ));
    }

    #[test]
    fn test_get_returns_independent_copies() {
        let dir = instruments_dir(None);
        let registry = sine_registry(dir.path());

        let mut first = registry.get("piano").unwrap();
        let second = registry.get("piano").unwrap();
        first.params_mut().note_length = 4.0;
        first.params_mut().envelope.sustain = 0.1;

        assert_eq!(second.params().note_length, 0.5);
        assert_eq!(second.params().envelope.sustain, 1.0);
        assert_eq!(registry.get("piano").unwrap().params().note_length, 0.5);
    }
}
