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

//! Turns a spectrum into a rendered WAV.
//!
//! One data dimension picks the pitch from a scale, the other picks the onset
//! time. Every note is played by a sample-based voice with a short attack and a
//! configurable release, mixed down to mono and written to disk.

pub mod mapping;
mod wav;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rayon::prelude::*;
use tracing::{info, span, Level};

use crate::config::SoniParams;
use crate::error::SonifyError;
use crate::instruments::{frames, Envelope, Voice};
use crate::rescale::data_range;
use crate::scale::{Pitch, Scale};

use self::mapping::{normalize, quantize, PITCH_LIMITS, TIME_LIMITS};

/// File name of the rendered artifact inside the output directory.
pub const OUTPUT_FILE: &str = "spectrum.wav";

/// How far the time mapping reaches past the last note. Playback divides the
/// file duration by this to estimate when the last note is struck.
pub const TIME_PADDING: f64 = TIME_LIMITS.upper / 100.0;

const ATTACK: f64 = 0.01;
const DECAY: f64 = 0.0;
const SUSTAIN: f64 = 0.5;

/// The path of the rendered artifact for an output directory.
pub fn output_path(output_dir: &Path) -> PathBuf {
    output_dir.join(OUTPUT_FILE)
}

/// A single scored note.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    /// Seconds from the start of the piece.
    pub onset: f64,
    pub pitch: Pitch,
}

/// Everything needed for one render.
pub struct Request<'a> {
    pub voice: &'a Voice,
    pub scale: &'a str,
    /// Values mapped onto the scale.
    pub pitch_values: &'a [f64],
    /// Values mapped onto time.
    pub time_values: &'a [f64],
    pub note_length: f64,
    pub release_time: f64,
    pub output_path: &'a Path,
    pub sample_rate: u32,
}

impl<'a> Request<'a> {
    /// Builds a request that takes its performance parameters from the init file.
    pub fn new(
        voice: &'a Voice,
        scale: &'a str,
        pitch_values: &'a [f64],
        time_values: &'a [f64],
        params: SoniParams,
        output_path: &'a Path,
        sample_rate: u32,
    ) -> Request<'a> {
        Request {
            voice,
            scale,
            pitch_values,
            time_values,
            note_length: params.note_length,
            release_time: params.release,
            output_path,
            sample_rate,
        }
    }
}

/// What a render produced.
#[derive(Debug)]
pub struct Rendered {
    pub path: PathBuf,
    pub notes: Vec<Note>,
    pub duration: Duration,
}

fn check_seconds(name: &'static str, value: f64) -> Result<(), SonifyError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SonifyError::InvalidParameter { name, value })
    }
}

/// Places one note per data point. The piece is as many seconds long as the
/// scale has pitches.
pub fn score(pitches: &[Pitch], pitch_values: &[f64], time_values: &[f64]) -> Vec<Note> {
    let length = pitches.len() as f64;
    normalize(pitch_values, PITCH_LIMITS)
        .into_iter()
        .zip(normalize(time_values, TIME_LIMITS))
        .map(|(pitch, time)| Note {
            onset: time * length,
            pitch: pitches[quantize(pitch, pitches.len())],
        })
        .collect()
}

/// Renders the request and writes the result to its output path, replacing
/// whatever was there. Input is validated before any audio is produced.
pub fn render(request: &Request) -> Result<Rendered, SonifyError> {
    let span = span!(Level::INFO, "render", instrument = request.voice.name());
    let _enter = span.enter();

    data_range("pitch values", request.pitch_values)?;
    data_range("time values", request.time_values)?;
    if request.pitch_values.len() != request.time_values.len() {
        return Err(SonifyError::MismatchedArrayLengths {
            pitch: request.pitch_values.len(),
            time: request.time_values.len(),
        });
    }
    check_seconds("note length", request.note_length)?;
    check_seconds("release time", request.release_time)?;
    if request.sample_rate == 0 {
        return Err(SonifyError::InvalidParameter {
            name: "sample rate",
            value: 0.0,
        });
    }

    let mut voice = request.voice.clone();
    let pitches = Scale::lookup(request.scale)?;

    {
        let params = voice.params_mut();
        params.note_length = request.note_length;
        params.envelope = Envelope {
            attack: ATTACK,
            decay: DECAY,
            sustain: SUSTAIN,
            release: request.release_time,
        };
    }

    let notes = score(&pitches, request.pitch_values, request.time_values);
    info!(
        scale = request.scale,
        notes = notes.len(),
        output = ?request.output_path,
        "Rendering sonification"
    );

    let samples = mix(&voice, &notes, pitches.len() as f64, request.sample_rate)?;
    wav::write_mono(request.output_path, &samples, request.sample_rate)?;

    let duration = Duration::from_secs_f64(samples.len() as f64 / request.sample_rate as f64);
    info!(duration_ms = duration.as_millis(), "Sonification written");

    Ok(Rendered {
        path: request.output_path.to_path_buf(),
        notes,
        duration,
    })
}

/// Mixes the notes into one mono buffer at least `length` seconds long, long
/// enough to hold every release tail.
fn mix(voice: &Voice, notes: &[Note], length: f64, sample_rate: u32) -> Result<Vec<f32>, SonifyError> {
    let mut keys: Vec<u8> = notes.iter().map(|note| note.pitch.midi_key()).collect();
    keys.sort_unstable();
    keys.dedup();

    // Each distinct pitch is rendered once and reused.
    let rendered = keys
        .par_iter()
        .map(|key| voice.render_key(*key, sample_rate).map(|samples| (*key, samples)))
        .collect::<Result<HashMap<u8, Vec<f32>>, SonifyError>>()?;

    let placed: Vec<(usize, &[f32])> = notes
        .iter()
        .filter_map(|note| {
            rendered
                .get(&note.pitch.midi_key())
                .map(|samples| (frames(note.onset, sample_rate), samples.as_slice()))
        })
        .collect();

    let total = placed
        .iter()
        .map(|(start, samples)| start + samples.len())
        .max()
        .unwrap_or(0)
        .max(frames(length, sample_rate));

    let mut output = vec![0.0f32; total];
    for (start, samples) in placed {
        for (out, sample) in output[start..start + samples.len()]
            .iter_mut()
            .zip(samples)
        {
            *out += sample;
        }
    }

    let peak = output.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > 1.0 {
        output.iter_mut().for_each(|s| *s /= peak);
    }

    Ok(output)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use hound::WavReader;

    use super::*;
    use crate::instruments::mock::SineBank;

    const SAMPLE_RATE: u32 = 8000;

    fn sine_voice(bank: Arc<SineBank>) -> Voice {
        Voice::new("sine", Path::new("sine.sf2"), bank, 0)
    }

    fn request<'a>(
        voice: &'a Voice,
        scale: &'a str,
        pitch_values: &'a [f64],
        time_values: &'a [f64],
        output_path: &'a Path,
    ) -> Request<'a> {
        Request {
            voice,
            scale,
            pitch_values,
            time_values,
            note_length: 0.5,
            release_time: 0.3,
            output_path,
            sample_rate: SAMPLE_RATE,
        }
    }

    #[test]
    fn test_render_major_three_notes() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path());
        let voice = sine_voice(Arc::new(SineBank::new(1)));
        let values = [0.0, 50.0, 100.0];

        let rendered = render(&request(&voice, "major", &values, &values, &path)).unwrap();

        let labels: Vec<String> = rendered.notes.iter().map(|n| n.pitch.to_string()).collect();
        assert_eq!(labels, vec!["C3", "F4", "B5"]);
        assert_eq!(rendered.notes[0].onset, 0.0);
        assert!((rendered.notes[1].onset - 21.0 * 50.0 / 110.0).abs() < 1e-9);
        assert!((rendered.notes[2].onset - 21.0 * 100.0 / 110.0).abs() < 1e-9);

        let reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
        assert_eq!(reader.duration(), 21 * SAMPLE_RATE);

        // The estimated active length lands on the last onset.
        let raw_duration = reader.duration() as f64 / SAMPLE_RATE as f64;
        assert!((raw_duration / TIME_PADDING - rendered.notes[2].onset).abs() < 1e-6);
        assert_eq!(rendered.duration, Duration::from_secs(21));
    }

    #[test]
    fn test_render_has_sound_at_onsets() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path());
        let voice = sine_voice(Arc::new(SineBank::new(1)));
        let values = [0.0, 50.0, 100.0];

        let rendered = render(&request(&voice, "major", &values, &values, &path)).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        for note in rendered.notes {
            let start = frames(note.onset, SAMPLE_RATE);
            let window = &samples[start..start + frames(0.4, SAMPLE_RATE)];
            assert!(
                window.iter().any(|s| s.unsigned_abs() > 1000),
                "no sound near {}",
                note.onset
            );
        }
        // Silence between the first note's tail and the second note.
        let gap = &samples[frames(1.0, SAMPLE_RATE)..frames(9.0, SAMPLE_RATE)];
        assert!(gap.iter().all(|s| *s == 0));
    }

    #[test]
    fn test_render_each_pitch_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path());
        let bank = Arc::new(SineBank::new(1));
        let voice = sine_voice(bank.clone());
        let pitch_values = [1.0, 2.0, 1.0, 2.0, 1.0];
        let time_values = [0.0, 1.0, 2.0, 3.0, 4.0];

        render(&request(&voice, "pentatonic", &pitch_values, &time_values, &path)).unwrap();

        assert_eq!(bank.renders(), 2);
    }

    #[test]
    fn test_long_tail_extends_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path());
        let voice = sine_voice(Arc::new(SineBank::new(1)));
        let values = [0.0, 1.0];
        let mut request = request(&voice, "pentatonic", &values, &values, &path);
        request.note_length = 2.0;
        request.release_time = 1.0;

        let rendered = render(&request).unwrap();

        // Last onset is at 15 * 100/110 seconds and rings for three more.
        let expected = frames(15.0 / TIME_PADDING, SAMPLE_RATE) + frames(3.0, SAMPLE_RATE);
        assert_eq!(WavReader::open(&path).unwrap().duration() as usize, expected);
        assert!(rendered.duration > Duration::from_secs(15));
    }

    #[test]
    fn test_template_voice_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path());
        let voice = sine_voice(Arc::new(SineBank::new(1)));
        let values = [0.0, 1.0];

        render(&request(&voice, "minor", &values, &values, &path)).unwrap();

        assert_eq!(voice.params().note_length, 0.5);
        assert_eq!(voice.params().envelope.sustain, 1.0);
    }

    #[test]
    fn test_mismatched_lengths_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path());
        let voice = sine_voice(Arc::new(SineBank::new(1)));

        let result = render(&request(&voice, "major", &[1.0, 2.0, 3.0], &[1.0, 2.0], &path));

        assert!(matches!(
            result,
            Err(SonifyError::MismatchedArrayLengths { pitch: 3, time: 2 })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path());
        let voice = sine_voice(Arc::new(SineBank::new(1)));

        let result = render(&request(&voice, "major", &[], &[], &path));

        assert!(matches!(result, Err(SonifyError::EmptyDataset(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_unknown_scale_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path());
        let bank = Arc::new(SineBank::new(1));
        let voice = sine_voice(bank.clone());

        let result = render(&request(&voice, "lydian", &[1.0], &[1.0], &path));

        assert!(matches!(result, Err(SonifyError::UnknownScale(_))));
        assert!(!path.exists());
        assert_eq!(bank.renders(), 0);
    }

    #[test]
    fn test_negative_release_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path());
        let voice = sine_voice(Arc::new(SineBank::new(1)));
        let mut request = request(&voice, "major", &[1.0], &[1.0], &path);
        request.release_time = -0.1;

        assert!(matches!(
            render(&request),
            Err(SonifyError::InvalidParameter {
                name: "release time",
                ..
            })
        ));
    }

    #[test]
    fn test_unwritable_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join(OUTPUT_FILE);
        let voice = sine_voice(Arc::new(SineBank::new(1)));

        assert!(matches!(
            render(&request(&voice, "major", &[1.0], &[1.0], &path)),
            Err(SonifyError::UnwritableOutputPath { .. })
        ));
    }

    #[test]
    fn test_clipping_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path());
        let voice = sine_voice(Arc::new(SineBank::new(1)));
        // Many notes at the same instant and pitch stack up well past full scale.
        let pitch_values = [1.0; 8];
        let time_values = [0.0; 8];
        let mut request = request(&voice, "major", &pitch_values, &time_values, &path);
        request.release_time = 0.0;

        render(&request).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let peak = reader
            .samples::<i16>()
            .map(|s| s.unwrap().unsigned_abs())
            .max()
            .unwrap();
        assert!(peak > 30000);
    }
}
