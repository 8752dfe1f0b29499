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
use std::{
    fmt, fs,
    path::Path,
    str::FromStr,
};

use tracing::debug;

use crate::error::SonifyError;

/// A column of a spectrum file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    Wavelength,
    Flux,
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wavelength" => Ok(Column::Wavelength),
            "flux" => Ok(Column::Flux),
            other => Err(format!("unknown column {} (expected wavelength or flux)", other)),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Wavelength => f.write_str("wavelength"),
            Column::Flux => f.write_str("flux"),
        }
    }
}

/// A spectrum read from a two column text file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrum {
    wavelength: Vec<f64>,
    flux: Vec<f64>,
}

impl Spectrum {
    /// Loads a spectrum. Each non-empty line not starting with `#` holds a
    /// wavelength and a flux separated by whitespace or a comma.
    pub fn load(path: &Path) -> Result<Spectrum, SonifyError> {
        let invalid = |message: String| SonifyError::InvalidSpectrumFile {
            path: path.to_path_buf(),
            message,
        };

        let contents = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let spectrum = contents.parse::<Spectrum>().map_err(invalid)?;
        if spectrum.is_empty() {
            return Err(invalid("no samples".to_string()));
        }
        debug!(path = ?path, samples = spectrum.len(), "Loaded spectrum");
        Ok(spectrum)
    }

    pub fn wavelength(&self) -> &[f64] {
        &self.wavelength
    }

    pub fn flux(&self) -> &[f64] {
        &self.flux
    }

    pub fn column(&self, column: Column) -> &[f64] {
        match column {
            Column::Wavelength => self.wavelength(),
            Column::Flux => self.flux(),
        }
    }

    pub fn len(&self) -> usize {
        self.flux.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flux.is_empty()
    }
}

impl FromStr for Spectrum {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spectrum = Spectrum::default();
        for (number, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|field| !field.is_empty())
                .collect();
            let [wavelength, flux] = fields[..] else {
                return Err(format!(
                    "line {}: expected 2 columns, found {}",
                    number + 1,
                    fields.len()
                ));
            };

            let parse = |field: &str| {
                field
                    .parse::<f64>()
                    .map_err(|e| format!("line {}: {}: {}", number + 1, field, e))
            };
            spectrum.wavelength.push(parse(wavelength)?);
            spectrum.flux.push(parse(flux)?);
        }
        Ok(spectrum)
    }
}
