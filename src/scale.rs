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

//! Musical scales used to quantize spectral values into pitches.
//!
//! Every scale spans the three octaves from C3 to B5.

use std::fmt;
use std::str::FromStr;

use crate::error::SonifyError;

/// The octaves every scale covers, lowest first.
const OCTAVES: [u8; 3] = [3, 4, 5];

/// One of the twelve pitch classes, spelled with sharps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// Semitones above C.
    pub fn semitone(self) -> u8 {
        self as u8
    }

    fn label(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

/// A pitch class in a given octave, e.g. D#4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pitch {
    class: PitchClass,
    octave: u8,
}

impl Pitch {
    pub fn new(class: PitchClass, octave: u8) -> Pitch {
        Pitch { class, octave }
    }

    pub fn class(&self) -> PitchClass {
        self.class
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    /// MIDI key number, with C4 = 60.
    pub fn midi_key(&self) -> u8 {
        (self.octave + 1) * 12 + self.class.semitone()
    }
}

impl PartialOrd for Pitch {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pitch {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.midi_key().cmp(&other.midi_key())
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class.label(), self.octave)
    }
}

/// The scales a spectrum can be played in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scale {
    Major,
    Minor,
    Pentatonic,
    /// The six-note blues pattern (C, D#, F, F#, G, A#), so 18 pitches over
    /// three octaves.
    Blues,
    Chromatic,
}

impl Scale {
    pub const ALL: [Scale; 5] = [
        Scale::Major,
        Scale::Minor,
        Scale::Pentatonic,
        Scale::Blues,
        Scale::Chromatic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
            Scale::Pentatonic => "pentatonic",
            Scale::Blues => "blues",
            Scale::Chromatic => "chromatic",
        }
    }

    /// The pitch classes of a single octave of this scale.
    fn degrees(&self) -> &'static [PitchClass] {
        use PitchClass::*;

        match self {
            Scale::Major => &[C, D, E, F, G, A, B],
            Scale::Minor => &[C, D, DSharp, F, G, GSharp, ASharp],
            Scale::Pentatonic => &[C, DSharp, F, G, ASharp],
            Scale::Blues => &[C, DSharp, F, FSharp, G, ASharp],
            Scale::Chromatic => &[C, CSharp, D, DSharp, E, F, FSharp, G, GSharp, A, ASharp, B],
        }
    }

    /// Returns the pitches of this scale across all octaves in ascending order.
    pub fn pitches(&self) -> Vec<Pitch> {
        OCTAVES
            .iter()
            .flat_map(|octave| {
                self.degrees()
                    .iter()
                    .map(move |class| Pitch::new(*class, *octave))
            })
            .collect()
    }

    /// Looks up a scale by name, failing on anything unrecognized.
    pub fn lookup(name: &str) -> Result<Vec<Pitch>, SonifyError> {
        Ok(name.parse::<Scale>()?.pitches())
    }
}

impl FromStr for Scale {
    type Err = SonifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(Scale::Major),
            "minor" => Ok(Scale::Minor),
            "pentatonic" => Ok(Scale::Pentatonic),
            "blues" => Ok(Scale::Blues),
            "chromatic" => Ok(Scale::Chromatic),
            _ => Err(SonifyError::UnknownScale(s.to_string())),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn labels(scale: Scale) -> Vec<String> {
        scale.pitches().iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_scale_lengths() {
        assert_eq!(Scale::lookup("major").unwrap().len(), 21);
        assert_eq!(Scale::lookup("minor").unwrap().len(), 21);
        assert_eq!(Scale::lookup("pentatonic").unwrap().len(), 15);
        assert_eq!(Scale::lookup("blues").unwrap().len(), 18);
        assert_eq!(Scale::lookup("chromatic").unwrap().len(), 36);
    }

    #[test]
    fn test_scales_ascend() {
        for scale in Scale::ALL {
            let pitches = scale.pitches();
            for pair in pitches.windows(2) {
                assert!(
                    pair[0] < pair[1],
                    "{} is not ascending at {} -> {}",
                    scale,
                    pair[0],
                    pair[1]
                );
            }
        }
    }

    #[test]
    fn test_scale_spans_three_octaves() {
        for scale in Scale::ALL {
            let pitches = scale.pitches();
            assert_eq!(pitches.first().unwrap().to_string(), "C3");
            assert_eq!(pitches.first().unwrap().midi_key(), 48);
            assert!(pitches.last().unwrap().octave() == 5);
        }
    }

    #[test]
    fn test_minor_labels() {
        assert_eq!(
            labels(Scale::Minor)[..7],
            ["C3", "D3", "D#3", "F3", "G3", "G#3", "A#3"]
        );
    }

    #[test]
    fn test_blues_labels() {
        assert_eq!(
            labels(Scale::Blues)[12..],
            ["C5", "D#5", "F5", "F#5", "G5", "A#5"]
        );
    }

    #[test]
    fn test_chromatic_covers_every_semitone() {
        let keys: Vec<u8> = Scale::Chromatic
            .pitches()
            .iter()
            .map(|p| p.midi_key())
            .collect();
        assert_eq!(keys, (48..84).collect::<Vec<u8>>());
    }

    #[test]
    fn test_parse_is_forgiving_about_case() {
        assert_eq!(" Major ".parse::<Scale>().unwrap(), Scale::Major);
        assert_eq!("PENTATONIC".parse::<Scale>().unwrap(), Scale::Pentatonic);
    }

    #[test]
    fn test_unknown_scale() {
        match Scale::lookup("dorian") {
            Err(SonifyError::UnknownScale(name)) => assert_eq!(name, "dorian"),
            other => panic!("expected unknown scale error, got {:?}", other),
        }
        assert!(Scale::lookup("").is_err());
    }

    #[test]
    fn test_names_round_trip() {
        for scale in Scale::ALL {
            assert_eq!(scale.name().parse::<Scale>().unwrap(), scale);
        }
    }
}
