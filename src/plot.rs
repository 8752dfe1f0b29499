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
    path::{Path, PathBuf},
};

use parking_lot::{const_mutex, Mutex};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use tracing::{debug, info, warn};

use crate::error::SonifyError;

/// The file name of the placeholder plot in the output directory.
pub const PLOT_FILE: &str = "spectrum.PNG";

const PIXELS_PER_INCH: f64 = 100.0;
const FONT_FAMILY: &str = "sans-serif";
const X_LABEL: &str = "Wavelength [Å]";
const Y_LABEL: &str = "Flux [erg·Å⁻¹·cm⁻²·s⁻¹]";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// The font registered for the label family, if any. plotters keeps one font per
/// family and style for the whole process.
static FONT: Mutex<Option<PathBuf>> = const_mutex(None);

/// Returns the path of the placeholder plot in the given output directory.
pub fn plot_path(output_dir: &Path) -> PathBuf {
    output_dir.join(PLOT_FILE)
}

fn register(path: &Path) -> Result<(), String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| "not a usable TrueType font".to_string())
}

/// Registers the label font. A configured font must load; without one the first
/// usable system font is taken. Returns false if there is no font to draw with.
fn load_font(font_path: Option<&Path>, output_path: &Path) -> Result<bool, SonifyError> {
    let mut registered = FONT.lock();

    if let Some(font_path) = font_path {
        if registered.as_deref() != Some(font_path) {
            register(font_path).map_err(|message| SonifyError::PlotError {
                path: output_path.to_path_buf(),
                message: format!("unable to load font {}: {}", font_path.display(), message),
            })?;
            debug!(font = ?font_path, "Registered plot font");
            *registered = Some(font_path.to_path_buf());
        }
        return Ok(true);
    }

    if registered.is_some() {
        return Ok(true);
    }
    for candidate in SYSTEM_FONTS.iter().map(Path::new) {
        if register(candidate).is_ok() {
            debug!(font = ?candidate, "Registered system plot font");
            *registered = Some(candidate.to_path_buf());
            return Ok(true);
        }
    }
    warn!("No font found, plot labels will not be drawn");
    Ok(false)
}

fn plot_error<E: fmt::Display>(path: &Path) -> impl FnOnce(E) -> SonifyError + '_ {
    move |e| SonifyError::PlotError {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Draws an empty spectrum plot with a black plot area and labelled axes, and
/// writes it to `output_path`, replacing any existing file. `plot_size` is in
/// inches.
pub fn render_empty(
    plot_size: (f64, f64),
    output_path: &Path,
    font_path: Option<&Path>,
) -> Result<(), SonifyError> {
    let (width, height) = plot_size;
    if !(width.is_finite() && width > 0.0) {
        return Err(SonifyError::InvalidParameter {
            name: "plot width",
            value: width,
        });
    }
    if !(height.is_finite() && height > 0.0) {
        return Err(SonifyError::InvalidParameter {
            name: "plot height",
            value: height,
        });
    }
    let dimensions = (
        (width * PIXELS_PER_INCH).round().max(1.0) as u32,
        (height * PIXELS_PER_INCH).round().max(1.0) as u32,
    );

    let labels = load_font(font_path, output_path)?;
    let root = BitMapBackend::new(output_path, dimensions).into_drawing_area();

    if labels {
        root.fill(&WHITE).map_err(plot_error(output_path))?;
        let mut chart = ChartBuilder::on(&root)
            .margin(4)
            .x_label_area_size(40)
            .y_label_area_size(56)
            .build_cartesian_2d(0f64..1f64, 0f64..1f64)
            .map_err(plot_error(output_path))?;
        chart
            .plotting_area()
            .fill(&BLACK)
            .map_err(plot_error(output_path))?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(X_LABEL)
            .y_desc(Y_LABEL)
            .x_labels(6)
            .y_labels(6)
            .label_style((FONT_FAMILY, 12))
            .axis_desc_style((FONT_FAMILY, 14))
            .draw()
            .map_err(plot_error(output_path))?;
    } else {
        root.fill(&BLACK).map_err(plot_error(output_path))?;
    }

    root.present()
        .map_err(|e| SonifyError::unwritable(output_path, e.to_string()))?;
    info!(path = ?output_path, width = dimensions.0, height = dimensions.1, "Rendered plot");
    Ok(())
}
