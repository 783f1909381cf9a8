/* This file is part of DarkFi (https://dark.fi)
 *
 * Copyright (C) 2020-2025 Dyne.org foundation
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::{fmt, time::UNIX_EPOCH};

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Wrapper struct to represent system timestamps, in seconds since
/// the unix epoch. Contract deadlines are expressed the same way.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, PartialOrd, Eq, Ord, Hash,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Generate a `Timestamp` of the current time.
    /// A clock set before the epoch reads as the epoch itself.
    pub fn current_time() -> Self {
        Self(UNIX_EPOCH.elapsed().map(|d| d.as_secs()).unwrap_or_default())
    }

    /// Return the inner value of the `Timestamp`.
    pub fn inner(&self) -> u64 {
        self.0
    }

    /// Calculates elapsed time of a `Timestamp`, relative to `now`.
    /// Returns 0 for timestamps in the future.
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Seconds left until this `Timestamp` is reached, relative to `now`.
    /// Returns 0 for timestamps in the past.
    pub fn remaining_from(&self, now: Timestamp) -> u64 {
        self.0.saturating_sub(now.0)
    }

    /// Add `inc` seconds to the `Timestamp`, saturating at `u64::MAX`.
    pub fn saturating_add(&self, inc: u64) -> Self {
        Self(self.0.saturating_add(inc))
    }

    /// Subtract `dec` seconds from the `Timestamp`, saturating at the epoch.
    pub fn saturating_sub(&self, dec: u64) -> Self {
        Self(self.0.saturating_sub(dec))
    }
}

impl From<u64> for Timestamp {
    fn from(x: u64) -> Self {
        Self(x)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let date = timestamp_to_date(self.0, DateFormat::DateTime);
        write!(f, "{}", date)
    }
}

pub enum DateFormat {
    Date,
    DateTime,
}

/// Format a unix timestamp in UTC. Timestamps chrono cannot represent
/// are printed as raw seconds.
pub fn timestamp_to_date(timestamp: u64, format: DateFormat) -> String {
    let Some(date) = i64::try_from(timestamp).ok().and_then(|t| DateTime::from_timestamp(t, 0))
    else {
        return format!("@{}", timestamp)
    };

    match format {
        DateFormat::Date => date.format("%Y-%m-%d").to_string(),
        DateFormat::DateTime => date.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    }
}

/// Human readable representation of a duration in seconds, e.g. `1d 2h 3m 4s`.
pub fn fmt_duration(secs: u64) -> String {
    let (days, rem) = (secs / 86400, secs % 86400);
    let (hours, rem) = (rem / 3600, rem % 3600);
    let (mins, secs) = (rem / 60, rem % 60);

    let mut parts = vec![];
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if mins > 0 {
        parts.push(format!("{}m", mins));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{}s", secs));
    }

    parts.join(" ")
}
