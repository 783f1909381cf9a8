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

//! A proposal's lifecycle is never stored, it is derived from the
//! `(deadline, executed, now)` triple each time it is asked for.

use std::{fmt, str::FromStr};

use crate::{eth::U256, util::time::Timestamp, Error};

/// Read-only projection of a proposal's on-chain state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    /// Sequential ordinal assigned by the contract at creation
    pub id: u64,
    /// Token id of the NFT the DAO proposes to buy
    pub nft_token_id: U256,
    /// Voting closes once the current time reaches this
    pub deadline: Timestamp,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub executed: bool,
}

/// Lifecycle phase of a proposal
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Voting,
    AwaitingExecution,
    Executed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Voting => "Voting",
            Self::AwaitingExecution => "Awaiting execution",
            Self::Executed => "Executed",
        };
        write!(f, "{}", s)
    }
}

/// A holder's vote. The discriminants are the contract's `uint8` encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Vote {
    Yes = 0,
    No = 1,
}

impl Vote {
    pub fn abi_value(&self) -> u8 {
        *self as u8
    }
}

impl FromStr for Vote {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" | "y" => Ok(Self::Yes),
            "no" | "n" => Ok(Self::No),
            _ => Err(Error::InvalidVote(s.to_string())),
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

/// Result that executing a proposal would produce
pub type Outcome = Vote;

/// Something a caller may do to a proposal
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Vote(Vote),
    /// Execution, carrying the outcome it will settle on
    Execute(Outcome),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Vote(v) => write!(f, "Vote {}", v),
            Self::Execute(o) => write!(f, "Execute ({})", o),
        }
    }
}

impl Proposal {
    /// Phase of the proposal at `now`. `Executed` takes priority over the
    /// deadline, and a deadline equal to `now` has already passed.
    pub fn phase(&self, now: Timestamp) -> Phase {
        if self.executed {
            return Phase::Executed
        }

        if self.deadline > now {
            return Phase::Voting
        }

        Phase::AwaitingExecution
    }

    /// Outcome execution would settle on. A strict majority of yes votes
    /// is required, so a tie resolves to `No`.
    pub fn outcome(&self) -> Outcome {
        if self.yes_votes > self.no_votes {
            Outcome::Yes
        } else {
            Outcome::No
        }
    }

    /// Actions available at `now`
    pub fn permitted_actions(&self, now: Timestamp) -> Vec<Action> {
        match self.phase(now) {
            Phase::Voting => vec![Action::Vote(Vote::Yes), Action::Vote(Vote::No)],
            Phase::AwaitingExecution => vec![Action::Execute(self.outcome())],
            Phase::Executed => vec![],
        }
    }

    /// Whether `action` is available at `now`. For `Execute` only the
    /// phase matters, the carried outcome is ignored.
    pub fn permits(&self, action: &Action, now: Timestamp) -> bool {
        match (action, self.phase(now)) {
            (Action::Vote(_), Phase::Voting) => true,
            (Action::Execute(_), Phase::AwaitingExecution) => true,
            _ => false,
        }
    }
}
