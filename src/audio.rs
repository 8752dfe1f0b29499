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
use std::{fmt, sync::Arc};

use crate::error::SonifyError;

mod clip;
pub mod cpal;
pub mod mock;

pub use clip::Clip;

/// Something that can play a clip and report whether it is still sounding.
pub trait Output: fmt::Display + Send + Sync {
    /// Starts playing the clip, cutting off anything already playing. Returns once
    /// playback has started.
    fn play(&self, clip: Clip) -> Result<(), SonifyError>;

    /// Halts output immediately. Does nothing if nothing is playing.
    fn stop(&self);

    /// Returns true while the last clip is still playing.
    fn is_busy(&self) -> bool;
}

/// Lists the output devices known to cpal.
pub fn list_devices() -> Result<Vec<String>, SonifyError> {
    cpal::Output::list()
}

/// Gets an output by name. "default" picks the system default device and names
/// starting with "mock" give a device that only keeps time.
pub fn get_output(name: &str) -> Result<Arc<dyn Output>, SonifyError> {
    if name.starts_with("mock") {
        return Ok(Arc::new(mock::Output::get(name)));
    };

    Ok(Arc::new(cpal::Output::get(name)?))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_mock_output() {
        let output = get_output("mock-output").unwrap();
        assert_eq!(output.to_string(), "mock-output (Mock)");
        assert!(!output.is_busy());
    }
}
