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
use clap::{crate_version, Parser, Subcommand};
use sonicscrewdriver::config::Settings;
use sonicscrewdriver::error::SonifyError;
use sonicscrewdriver::instruments::SamplerRegistry;
use sonicscrewdriver::playback::PlaybackController;
use sonicscrewdriver::progress::TerminalProgress;
use sonicscrewdriver::scale::Scale;
use sonicscrewdriver::spectrum::{Column, Spectrum};
use sonicscrewdriver::{audio, plot, rescale, sonify};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Turns astronomical spectra into sound."
)]
struct Cli {
    /// The path to the init file.
    #[arg(short, long)]
    initfile: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sonifies a spectrum file into the output directory.
    Sonify {
        /// The path to the spectrum file.
        spectrum: PathBuf,
        /// The instrument to play the spectrum with.
        #[arg(short = 'n', long, default_value = "piano")]
        instrument: String,
        /// The scale to map flux onto.
        #[arg(short, long, default_value = "major")]
        scale: String,
        /// Plays the sonification once it has been written.
        #[arg(short, long)]
        play: bool,
    },
    /// Plays the last sonification with a progress bar.
    Play {},
    /// Writes the empty spectrum plot to the output directory.
    Plot {},
    /// Lists the available scales and their notes.
    Scales {},
    /// Lists the instruments found in the instruments directory.
    Instruments {},
    /// Lists the available audio output devices.
    Devices {},
    /// Prints the value a percentage of the way through a spectrum column.
    Rescale {
        /// The path to the spectrum file.
        spectrum: PathBuf,
        /// The percentage, from 1 to 100.
        #[arg(short, long)]
        percent: i64,
        /// The column to rescale (wavelength or flux).
        #[arg(short, long, default_value = "flux")]
        column: Column,
    },
}

fn load_settings(initfile: Option<&Path>) -> Result<Settings, SonifyError> {
    Ok(Settings::load(initfile)?)
}

async fn play(settings: &Settings, path: &Path) -> Result<(), Box<dyn Error>> {
    let output = audio::get_output(settings.audio_device())?;
    let controller = PlaybackController::new(output, settings.poll_interval()?);
    let indicator = Arc::new(TerminalProgress::new());

    let result = controller.play(path, indicator).await?;
    eprintln!();
    Ok(result?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scales {} => {
            println!("Scales:");
            for scale in Scale::ALL {
                let pitches: Vec<String> = scale.pitches().iter().map(|p| p.to_string()).collect();
                println!("- {} ({}): {}", scale, pitches.len(), pitches.join(" "));
            }
        }
        Commands::Devices {} => {
            let devices = audio::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Rescale {
            spectrum,
            percent,
            column,
        } => {
            let spectrum = Spectrum::load(&spectrum)?;
            let value = rescale::rescale(percent, spectrum.column(column))?;
            println!("{}", value);
        }
        Commands::Instruments {} => {
            let settings = load_settings(cli.initfile.as_deref())?;
            let registry = SamplerRegistry::load(settings.instruments_dir())?;

            println!("Instruments:");
            for name in registry.names() {
                println!("- {}", registry.get(name)?);
            }
        }
        Commands::Plot {} => {
            let settings = load_settings(cli.initfile.as_deref())?;
            fs::create_dir_all(settings.output_dir())?;

            let path = plot::plot_path(settings.output_dir());
            plot::render_empty(settings.plot_size(), &path, settings.font_path())?;
            println!("Wrote {}", path.display());
        }
        Commands::Play {} => {
            let settings = load_settings(cli.initfile.as_deref())?;
            play(&settings, &sonify::output_path(settings.output_dir())).await?;
        }
        Commands::Sonify {
            spectrum,
            instrument,
            scale,
            play: and_play,
        } => {
            let settings = load_settings(cli.initfile.as_deref())?;
            let spectrum = Spectrum::load(&spectrum)?;
            let registry = SamplerRegistry::load(settings.instruments_dir())?;
            let voice = registry.get(&instrument)?;

            fs::create_dir_all(settings.output_dir())?;
            let output_path = sonify::output_path(settings.output_dir());
            let request = sonify::Request::new(
                &voice,
                &scale,
                spectrum.flux(),
                spectrum.wavelength(),
                settings.soni_params(),
                &output_path,
                settings.sample_rate(),
            );
            let rendered = sonify::render(&request)?;
            println!(
                "Wrote {} ({} notes, {:.2}s)",
                rendered.path.display(),
                rendered.notes.len(),
                rendered.duration.as_secs_f64()
            );

            if and_play {
                play(&settings, &rendered.path).await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_sonify() {
        let cli = Cli::try_parse_from([
            "sonicscrewdriver",
            "-i",
            "init.yaml",
            "sonify",
            "star.txt",
            "--instrument",
            "cello",
            "--scale",
            "blues",
            "--play",
        ])
        .unwrap();

        assert_eq!(cli.initfile, Some(PathBuf::from("init.yaml")));
        match cli.command {
            Commands::Sonify {
                spectrum,
                instrument,
                scale,
                play,
            } => {
                assert_eq!(spectrum, PathBuf::from("star.txt"));
                assert_eq!(instrument, "cello");
                assert_eq!(scale, "blues");
                assert!(play);
            }
            _ => panic!("expected sonify"),
        }
    }

    #[test]
    fn test_parse_rescale() {
        let cli = Cli::try_parse_from([
            "sonicscrewdriver",
            "rescale",
            "star.txt",
            "--percent",
            "50",
            "--column",
            "wavelength",
        ])
        .unwrap();

        assert!(cli.initfile.is_none());
        match cli.command {
            Commands::Rescale {
                percent, column, ..
            } => {
                assert_eq!(percent, 50);
                assert_eq!(column, Column::Wavelength);
            }
            _ => panic!("expected rescale"),
        }

        assert!(Cli::try_parse_from(["sonicscrewdriver", "rescale", "star.txt"]).is_err());
    }
}
