// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
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
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tracing::info;

use super::Clip;
use crate::error::SonifyError;

struct Session {
    started: Instant,
    duration: Duration,
    stopped: bool,
}

/// A mock output. Doesn't actually play anything, it just reports itself busy
/// for as long as the clip would have played.
pub struct Output {
    name: String,
    session: Mutex<Option<Session>>,
    plays: AtomicUsize,
    stops: AtomicUsize,
}

impl Output {
    /// Gets the given mock output.
    pub fn get(name: &str) -> Output {
        Output {
            name: name.to_string(),
            session: Mutex::new(None),
            plays: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    /// Number of clips played so far.
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::Relaxed)
    }

    /// Number of stop requests so far.
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::Relaxed)
    }
}

impl super::Output for Output {
    fn play(&self, clip: Clip) -> Result<(), SonifyError> {
        info!(
            device = self.name,
            duration = ?clip.duration(),
            "Playing clip (mock)."
        );
        *self.session.lock() = Some(Session {
            started: Instant::now(),
            duration: clip.duration(),
            stopped: false,
        });
        self.plays.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn stop(&self) {
        if let Some(session) = self.session.lock().as_mut() {
            session.stopped = true;
        }
        self.stops.fetch_add(1, Ordering::Relaxed);
    }

    fn is_busy(&self) -> bool {
        self.session
            .lock()
            .as_ref()
            .is_some_and(|session| !session.stopped && session.started.elapsed() < session.duration)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
