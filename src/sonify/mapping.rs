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

//! Percentile-limited normalization of data onto [0, 1].

/// Lower and upper percentile limits for one data dimension.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapLimits {
    pub lower: f64,
    pub upper: f64,
}

/// The full pitch range of the data is used.
pub const PITCH_LIMITS: MapLimits = MapLimits {
    lower: 0.0,
    upper: 100.0,
};

/// The time range is stretched 10% past the last data point so the final note
/// has room to ring out.
pub const TIME_LIMITS: MapLimits = MapLimits {
    lower: 0.0,
    upper: 110.0,
};

/// The linear-interpolated percentile of sorted data. Percentiles outside
/// 0..=100 extrapolate past the ends in proportion to the data range.
pub fn percentile(sorted: &[f64], percent: f64) -> f64 {
    let (min, max) = match (sorted.first(), sorted.last()) {
        (Some(min), Some(max)) => (*min, *max),
        _ => return 0.0,
    };

    if percent > 100.0 {
        return max + (percent - 100.0) / 100.0 * (max - min);
    }
    if percent < 0.0 {
        return min + percent / 100.0 * (max - min);
    }

    let rank = percent / 100.0 * (sorted.len() - 1) as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    sorted[below] + (rank - below as f64) * (sorted[above] - sorted[below])
}

/// Normalizes every value against the percentile limits, clamped to [0, 1]. Data
/// with no spread maps to 0.
pub fn normalize(values: &[f64], limits: MapLimits) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let low = percentile(&sorted, limits.lower);
    let high = percentile(&sorted, limits.upper);
    let span = high - low;
    if span <= 0.0 {
        return vec![0.0; values.len()];
    }

    values
        .iter()
        .map(|value| ((value - low) / span).clamp(0.0, 1.0))
        .collect()
}

/// Picks the index of the nearest step when `normalized` is spread over `steps` slots.
pub fn quantize(normalized: f64, steps: usize) -> usize {
    if steps == 0 {
        return 0;
    }
    ((normalized * (steps - 1) as f64).round() as usize).min(steps - 1)
}
