// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Animation time.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point in animation time.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct AnimTime(f64);

impl AnimTime {
    pub const fn new(t: f64) -> Self {
        Self(t)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for AnimTime {
    fn from(t: f64) -> Self {
        Self(t)
    }
}

impl std::fmt::Display for AnimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time interval over which an inbetween cell exists.
///
/// The cell exists on the open interval: at `start` and `end` the key cells
/// on its boundary take over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimTimeRange {
    start: AnimTime,
    end: AnimTime,
}

impl AnimTimeRange {
    /// Creates a range. `start` must be strictly before `end`.
    pub fn new(start: AnimTime, end: AnimTime) -> Result<Self> {
        if !(start < end) {
            return Err(Error::InvalidTimeRange(start, end));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> AnimTime {
        self.start
    }

    pub fn end(&self) -> AnimTime {
        self.end
    }

    /// Whether `t` is strictly inside the range.
    pub fn contains(&self, t: AnimTime) -> bool {
        self.start < t && t < self.end
    }

    /// Linear interpolation factor of `t`: 0 at `start`, 1 at `end`.
    pub fn factor(&self, t: AnimTime) -> f64 {
        (t.0 - self.start.0) / (self.end.0 - self.start.0)
    }
}
