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
use crate::error::SonifyError;

pub const MIN_PERCENT: i64 = 1;
pub const MAX_PERCENT: i64 = 100;

/// Returns the (min, max) of the data, rejecting empty or non-finite input.
pub fn data_range(name: &'static str, data: &[f64]) -> Result<(f64, f64), SonifyError> {
    if data.is_empty() {
        return Err(SonifyError::EmptyDataset(name));
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (index, value) in data.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(SonifyError::NonFiniteValue { name, index, value });
        }
        min = min.min(value);
        max = max.max(value);
    }
    Ok((min, max))
}

/// Maps a slider percentage in 1..=100 linearly onto the range of the data, so
/// 1 yields the minimum and 100 the maximum.
pub fn rescale(percent: i64, data: &[f64]) -> Result<f64, SonifyError> {
    if !(MIN_PERCENT..=MAX_PERCENT).contains(&percent) {
        return Err(SonifyError::InvalidPercent(percent));
    }
    let (min, max) = data_range("rescale data", data)?;
    // min + (max - min) doesn't always round back to max.
    if percent == MAX_PERCENT {
        return Ok(max);
    }

    let normalized = (percent - MIN_PERCENT) as f64 / (MAX_PERCENT - MIN_PERCENT) as f64;
    Ok(normalized * (max - min) + min)
}
