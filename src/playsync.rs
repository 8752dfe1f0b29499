// Copyright (C) 2024 Michael Wilson <mike@mdwn.dev>
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
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};

use parking_lot::{Condvar, Mutex};

/// A cancel handle is handed to an output stream thread. It's the thread's
/// responsibility to tear the stream down once cancelled.
#[derive(Clone)]
pub struct CancelHandle {
    /// Set to true once the owner asks the stream to stop.
    cancelled: Arc<Mutex<bool>>,
    /// Wakes anyone waiting on cancellation or completion.
    condvar: Arc<Condvar>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    pub fn new() -> CancelHandle {
        CancelHandle {
            cancelled: Arc::new(Mutex::new(false)),
            condvar: Arc::new(Condvar::new()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.lock()
    }

    /// Blocks until the handle is cancelled or `finished` is set to true.
    pub fn wait(&self, finished: Arc<AtomicBool>) {
        let mut cancelled = self.cancelled.lock();
        self.condvar.wait_while(&mut cancelled, |cancelled| {
            !*cancelled && !finished.load(Ordering::Relaxed)
        });
    }

    /// Wakes waiters so they can re-check whether playback has finished.
    pub fn notify(&self) {
        // Taking the lock orders this wakeup after a waiter's last check.
        let _cancelled = self.cancelled.lock();
        self.condvar.notify_all();
    }

    pub fn cancel(&self) {
        let mut cancelled = self.cancelled.lock();
        if !*cancelled {
            *cancelled = true;
            self.condvar.notify_all();
        }
    }
}
