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
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Number of ticks that fill the indicator.
pub const STEPS: u64 = 100;

/// Something that shows playback progress. Once started it advances one step per
/// tick by itself until stopped.
pub trait ProgressIndicator: Send + Sync {
    fn start(&self, tick: Duration);
    fn stop(&self);
    /// Moves the indicator back to empty.
    fn reset(&self);
}

/// A text progress bar drawn on stderr.
#[derive(Default)]
pub struct TerminalProgress {
    value: Arc<AtomicU64>,
    /// Bumped on every start/stop so an old ticker thread knows to quit.
    epoch: Arc<AtomicU64>,
}

impl TerminalProgress {
    pub fn new() -> TerminalProgress {
        TerminalProgress::default()
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    fn draw(value: u64) {
        let filled = (value * 40 / STEPS) as usize;
        let mut stderr = std::io::stderr().lock();
        let _ = write!(
            stderr,
            "\r[{}{}] {:>3}%",
            "#".repeat(filled),
            " ".repeat(40 - filled),
            value
        );
        let _ = stderr.flush();
    }
}

impl ProgressIndicator for TerminalProgress {
    fn start(&self, tick: Duration) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let current = self.epoch.clone();
        let value = self.value.clone();
        let tick = tick.max(Duration::from_millis(1));

        thread::spawn(move || loop {
            thread::sleep(tick);
            if current.load(Ordering::SeqCst) != epoch {
                return;
            }
            let next = (value.load(Ordering::Relaxed) + 1).min(STEPS);
            value.store(next, Ordering::Relaxed);
            TerminalProgress::draw(next);
        });
    }

    fn stop(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}
