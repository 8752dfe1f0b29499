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
use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, warn};

use crate::error::SonifyError;

const BITS_PER_SAMPLE: u16 = 16;

fn partial_path(path: &Path) -> PathBuf {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    PathBuf::from(partial)
}

fn write_samples(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    let scale = f32::from(i16::MAX);
    for sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * scale) as i16)?;
    }
    writer.finalize()
}

/// Writes mono 16-bit PCM. The file is written next to the destination and moved
/// into place once complete, so a failed write never leaves a truncated artifact
/// at `path`.
pub fn write_mono(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), SonifyError> {
    let partial = partial_path(path);
    debug!(path = ?partial, samples = samples.len(), "Writing WAV");

    if let Err(e) = write_samples(&partial, samples, sample_rate) {
        if partial.exists() {
            if let Err(remove_err) = fs::remove_file(&partial) {
                warn!(path = ?partial, err = %remove_err, "Unable to remove partial WAV");
            }
        }
        return Err(SonifyError::unwritable(path, e));
    }

    fs::rename(&partial, path).map_err(|e| SonifyError::unwritable(path, e))
}

#[cfg(test)]
mod test {
    use hound::WavReader;

    use super::*;

    #[test]
    fn test_write_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        write_mono(&path, &[0.0, 0.5, -0.5, 2.0], 8000).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16383, -16383, i16::MAX]);
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn test_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        write_mono(&path, &[0.1; 100], 8000).unwrap();
        write_mono(&path, &[0.1; 10], 8000).unwrap();

        assert_eq!(WavReader::open(&path).unwrap().duration(), 10);
    }

    #[test]
    fn test_unwritable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");

        match write_mono(&path, &[0.0], 8000) {
            Err(SonifyError::UnwritableOutputPath { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected unwritable output path, got {:?}", other),
        }
        assert!(!path.exists());
    }
}
