// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rebuild coalescing.
//!
//! A request arriving within `cooldown` of the last completed rebuild is
//! parked instead of run. Later requests replace the parked input, so once
//! the cooldown elapses exactly one rebuild runs, with the latest input.
//! Time is passed in by the caller.
//!
//! The first request after an idle period (no rebuild yet, or the cooldown
//! already over) runs at once. A burst on an idle scheduler therefore costs
//! two rebuilds: the leading one and a trailing one with the burst's last
//! input.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RebuildScheduler<T> {
    cooldown: Duration,
    last_completed: Option<Instant>,
    pending: Option<T>,
}

impl<T> RebuildScheduler<T> {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_completed: None,
            pending: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Submit a rebuild input.
    ///
    /// Returns the input back when the rebuild may run now; the caller runs
    /// it and reports [`complete`](Self::complete). Otherwise the input is
    /// parked, superseding any input parked before it.
    pub fn request(&mut self, input: T, now: Instant) -> Option<T> {
        if self.pending.is_none() && self.ready(now) {
            return Some(input);
        }
        if self.pending.replace(input).is_some() {
            tracing::trace!("Superseded pending rebuild");
        }
        None
    }

    /// Take the parked input once the cooldown has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.ready(now) {
            self.pending.take()
        } else {
            None
        }
    }

    /// Record the end of a rebuild.
    pub fn complete(&mut self, now: Instant) {
        self.last_completed = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Earliest time a parked rebuild can run.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        self.last_completed.map(|t| t + self.cooldown)
    }

    fn ready(&self, now: Instant) -> bool {
        match self.last_completed {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.cooldown,
        }
    }
}
