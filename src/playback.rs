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

//! Plays the rendered sonification while driving a progress indicator.
//!
//! Every call to [`PlaybackController::play`] starts a new session and bumps a
//! generation counter. A session only touches the indicator, or stops the output,
//! while holding the shared lock and while its generation is still the current
//! one, so a superseded session can keep polling until it notices but can never
//! restart the indicator or cut off its successor's audio.
//!
//! Starting the output can block until the stream is up, so it happens outside
//! the shared lock under a separate device lock. Sessions take turns starting the
//! output, and a session that was superseded while starting stops its own audio
//! before the next one gets the device.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, span, Level};

use crate::audio::{Clip, Output};
use crate::error::SonifyError;
use crate::progress::{ProgressIndicator, STEPS};
use crate::sonify::TIME_PADDING;

/// Where the controller is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Stopped,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Stopped => "stopped",
        };
        f.write_str(state)
    }
}

struct Shared {
    generation: u64,
    state: PlaybackState,
}

/// How long the indicator should run for a clip. The render pads the time axis
/// so the last note can ring out; the indicator covers only up to the last note.
pub fn estimated_duration(clip_duration: Duration) -> Duration {
    clip_duration.div_f64(TIME_PADDING)
}

/// Plays clips through an output, one logical session at a time.
pub struct PlaybackController {
    output: Arc<dyn Output>,
    shared: Arc<Mutex<Shared>>,
    /// Held by a session while it starts the output.
    device: Arc<Mutex<()>>,
    poll_interval: Duration,
}

impl PlaybackController {
    pub fn new(output: Arc<dyn Output>, poll_interval: Duration) -> PlaybackController {
        PlaybackController {
            output,
            shared: Arc::new(Mutex::new(Shared {
                generation: 0,
                state: PlaybackState::Idle,
            })),
            device: Arc::new(Mutex::new(())),
            poll_interval,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.lock().state
    }

    /// Stops whatever is playing and plays the WAV at `path` on a blocking worker.
    /// The returned handle resolves once the session ends, is superseded or fails.
    /// Must be called from within a tokio runtime.
    pub fn play(
        &self,
        path: &Path,
        indicator: Arc<dyn ProgressIndicator>,
    ) -> JoinHandle<Result<(), SonifyError>> {
        let generation = {
            let mut shared = self.shared.lock();
            shared.generation += 1;
            self.output.stop();
            indicator.stop();
            indicator.reset();
            shared.state = PlaybackState::Playing;
            shared.generation
        };
        info!(generation, path = ?path, "Starting playback session");

        let session = Session {
            generation,
            shared: self.shared.clone(),
            device: self.device.clone(),
            output: self.output.clone(),
            indicator,
            path: path.to_path_buf(),
            poll_interval: self.poll_interval,
        };
        tokio::task::spawn_blocking(move || session.run())
    }

    /// Halts audio and the indicator. Safe to call at any time.
    pub fn stop(&self, indicator: &dyn ProgressIndicator) {
        let mut shared = self.shared.lock();
        shared.generation += 1;
        self.output.stop();
        indicator.stop();
        indicator.reset();
        shared.state = PlaybackState::Stopped;
        debug!(generation = shared.generation, "Playback stopped");
    }
}

struct Session {
    generation: u64,
    shared: Arc<Mutex<Shared>>,
    device: Arc<Mutex<()>>,
    output: Arc<dyn Output>,
    indicator: Arc<dyn ProgressIndicator>,
    path: PathBuf,
    poll_interval: Duration,
}

impl Session {
    /// Runs `f` only if this session still owns the output and indicator.
    fn if_current<T>(&self, f: impl FnOnce(&mut Shared) -> T) -> Option<T> {
        let mut shared = self.shared.lock();
        if shared.generation == self.generation {
            Some(f(&mut shared))
        } else {
            None
        }
    }

    fn run(self) -> Result<(), SonifyError> {
        let span = span!(Level::INFO, "playback session", generation = self.generation);
        let _enter = span.enter();

        let result = self.play_and_wait();
        if let Err(e) = &result {
            error!(err = %e, "Playback failed");
        }

        // Whatever happened, leave the indicator stopped if it's still ours.
        let finished = self.if_current(|shared| {
            self.output.stop();
            self.indicator.stop();
            self.indicator.reset();
            shared.state = PlaybackState::Stopped;
        });
        if finished.is_none() {
            info!("Playback session superseded");
        }

        result
    }

    fn play_and_wait(&self) -> Result<(), SonifyError> {
        let clip = Clip::load(&self.path)?;
        let estimated = estimated_duration(clip.duration());
        let tick = estimated / STEPS as u32;

        {
            let _device = self.device.lock();
            if self.if_current(|_| ()).is_none() {
                return Ok(());
            }
            self.output.play(clip)?;

            if self.if_current(|_| self.indicator.start(tick)).is_none() {
                // Superseded while the output was starting.
                self.output.stop();
                return Ok(());
            }
        }
        info!(
            estimated_ms = estimated.as_millis(),
            output = %self.output,
            "Playing"
        );

        let start = Instant::now();
        let mut indicator_running = true;
        loop {
            thread::sleep(self.poll_interval);

            let busy = self.if_current(|_| self.output.is_busy());
            match busy {
                None => return Ok(()),
                Some(false) => break,
                Some(true) => {}
            }

            // The indicator tracks the last note, not the end of the ring-out.
            if indicator_running && start.elapsed() > estimated {
                self.if_current(|_| self.indicator.stop());
                indicator_running = false;
                debug!("Indicator finished before audio");
            }
        }

        debug!(elapsed_ms = start.elapsed().as_millis(), "Playback finished");
        Ok(())
    }
}
