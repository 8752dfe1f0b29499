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
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use tracing::{error, info, span, Level};

use super::Clip;
use crate::{error::SonifyError, playsync::CancelHandle};

const DEFAULT_DEVICE: &str = "default";

/// One clip being played by an output thread.
struct Session {
    cancel: CancelHandle,
    busy: Arc<AtomicBool>,
}

/// A small wrapper around a cpal::Device. Each clip is played on its own thread
/// that owns the stream for as long as the clip lasts.
pub struct Output {
    /// The name of the device.
    name: String,
    /// The host ID of the device.
    host_id: cpal::HostId,
    /// The underlying cpal device.
    device: cpal::Device,
    /// The clip currently playing, if any.
    session: Mutex<Option<Session>>,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.host_id.name())
    }
}

fn device_error<E: fmt::Display>(e: E) -> SonifyError {
    SonifyError::PlaybackDeviceError(e.to_string())
}

impl Output {
    /// Lists the names of every output device on the default host.
    pub fn list() -> Result<Vec<String>, SonifyError> {
        // Suppress noisy output here.
        let _shh_stdout = shh::stdout().map_err(device_error)?;
        let _shh_stderr = shh::stderr().map_err(device_error)?;

        let mut names: Vec<String> = cpal::default_host()
            .output_devices()
            .map_err(device_error)?
            .filter_map(|device| device.name().ok())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Gets the named output device, or the host default for "default".
    pub fn get(name: &str) -> Result<Output, SonifyError> {
        let _shh_stdout = shh::stdout().map_err(device_error)?;
        let _shh_stderr = shh::stderr().map_err(device_error)?;

        let host = cpal::default_host();
        let device = if name == DEFAULT_DEVICE {
            host.default_output_device()
        } else {
            host.output_devices()
                .map_err(device_error)?
                .find(|device| device.name().is_ok_and(|n| n.trim() == name))
        };

        match device {
            Some(device) => Ok(Output {
                name: device.name().unwrap_or_else(|_| name.to_string()),
                host_id: host.id(),
                device,
                session: Mutex::new(None),
            }),
            None => Err(SonifyError::PlaybackDeviceError(format!(
                "no device found with name {}",
                name
            ))),
        }
    }
}

impl super::Output for Output {
    fn play(&self, clip: Clip) -> Result<(), SonifyError> {
        let span = span!(Level::INFO, "play clip (cpal)");
        let _enter = span.enter();

        self.stop();

        let cancel = CancelHandle::new();
        let busy = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), String>>(1);

        {
            let device = self.device.clone();
            let cancel = cancel.clone();
            let busy = busy.clone();
            thread::Builder::new()
                .name("cpal-output".to_string())
                .spawn(move || {
                    let finished = Arc::new(AtomicBool::new(false));
                    match start_stream(&device, &clip, cancel.clone(), finished.clone()) {
                        Ok(stream) => {
                            let _ = ready_tx.send(Ok(()));
                            cancel.wait(finished);
                            drop(stream);
                        }
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                        }
                    }
                    busy.store(false, Ordering::Relaxed);
                })
                .map_err(device_error)?;
        }

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!(device = self.name, "Playback started");
                *self.session.lock() = Some(Session { cancel, busy });
                Ok(())
            }
            Ok(Err(e)) => Err(SonifyError::PlaybackDeviceError(e)),
            Err(e) => Err(device_error(e)),
        }
    }

    fn stop(&self) {
        if let Some(session) = self.session.lock().take() {
            session.cancel.cancel();
        }
    }

    fn is_busy(&self) -> bool {
        self.session
            .lock()
            .as_ref()
            .is_some_and(|session| session.busy.load(Ordering::Relaxed))
    }
}

/// Builds and starts a stream for the clip in the device's default format.
fn start_stream(
    device: &cpal::Device,
    clip: &Clip,
    cancel: CancelHandle,
    finished: Arc<AtomicBool>,
) -> Result<cpal::Stream, String> {
    let supported = device.default_output_config().map_err(|e| e.to_string())?;
    let config = supported.config();
    let samples = Arc::new(clip.convert(config.sample_rate.0, config.channels));

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(device, &config, samples, cancel, finished),
        cpal::SampleFormat::I16 => build_stream::<i16>(device, &config, samples, cancel, finished),
        cpal::SampleFormat::I32 => build_stream::<i32>(device, &config, samples, cancel, finished),
        cpal::SampleFormat::U16 => build_stream::<u16>(device, &config, samples, cancel, finished),
        other => Err(format!("unsupported sample format {:?}", other)),
    }?;

    stream.play().map_err(|e| e.to_string())?;
    Ok(stream)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Arc<Vec<f32>>,
    cancel: CancelHandle,
    finished: Arc<AtomicBool>,
) -> Result<cpal::Stream, String>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mut position = 0usize;
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let count = samples.len().saturating_sub(position).min(data.len());
                for (dst, src) in data[..count]
                    .iter_mut()
                    .zip(&samples[position..position + count])
                {
                    *dst = T::from_sample(*src);
                }
                // Zero-fill any shortfall
                data[count..].fill(T::EQUILIBRIUM);
                position += count;

                if position >= samples.len() && !finished.swap(true, Ordering::Relaxed) {
                    cancel.notify();
                }
            },
            |err| error!("CPAL output stream error: {}", err),
            None,
        )
        .map_err(|e| e.to_string())
}
