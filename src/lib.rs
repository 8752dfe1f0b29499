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

//! Turns astronomical spectra into short sonifications: each data point becomes a
//! note whose pitch comes from a musical scale and whose onset comes from time.

pub mod audio;
pub mod config;
pub mod error;
pub mod instruments;
pub mod playback;
pub mod playsync;
pub mod plot;
pub mod progress;
pub mod rescale;
pub mod scale;
pub mod sonify;
pub mod spectrum;
#[cfg(test)]
mod testutil;
