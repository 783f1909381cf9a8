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

use std::{collections::HashMap, time::Duration};

use log::{debug, error, info};

use super::{
    contract::DaoReader,
    model::{Phase, Proposal},
};
use crate::{
    eth::{Address, U256},
    util::time::Timestamp,
    Error, Result,
};

/// Fetch every proposal, ordered by id. The first failing read aborts
/// the whole batch, no partial list is ever returned.
pub async fn fetch_proposals<R: DaoReader + ?Sized>(reader: &R) -> Result<Vec<Proposal>> {
    let count = reader.proposal_count().await?;
    debug!(target: "dao::view::fetch_proposals", "Fetching {} proposals", count);

    // The count comes from the chain, so nothing is preallocated from it
    let mut proposals = vec![];
    for id in 0..count {
        match reader.proposal_by_id(id).await {
            Ok(p) => proposals.push(p),
            Err(e) => {
                error!(target: "dao::view::fetch_proposals", "Failed fetching proposal {}: {}", id, e);
                return Err(Error::ProposalFetchFailed(id, e.to_string()))
            }
        }
    }

    Ok(proposals)
}

/// Fetch a single proposal, checking it exists first.
pub async fn fetch_proposal<R: DaoReader + ?Sized>(reader: &R, id: u64) -> Result<Proposal> {
    let count = reader.proposal_count().await?;
    if id >= count {
        return Err(Error::ProposalNotFound(id, count))
    }

    reader.proposal_by_id(id).await.map_err(|e| Error::ProposalFetchFailed(id, e.to_string()))
}

/// DAO-wide counters shown alongside the proposal list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DaoSummary {
    /// Treasury balance in wei
    pub treasury: U256,
    pub proposal_count: u64,
    /// NFTs of the collection held by the caller
    pub nft_balance: u64,
}

pub async fn fetch_summary<R: DaoReader + ?Sized>(reader: &R, caller: &Address) -> Result<DaoSummary> {
    let nft_balance = reader.nft_balance(caller).await?;
    let treasury = reader.treasury_balance().await?;
    let proposal_count = reader.proposal_count().await?;

    Ok(DaoSummary { treasury, proposal_count, nft_balance })
}

/// Reason a [`ProposalBoard`] is being refreshed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// Explicitly asked for by the user
    UserRequest,
    /// A cached proposal's deadline has passed since the last refresh
    PhaseTransition,
    /// A submitted action was mined
    ActionConfirmed,
}

/// Phase change of a single proposal between two refreshes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    pub id: u64,
    /// `None` for proposals not seen before
    pub from: Option<Phase>,
    pub to: Phase,
}

/// Cached proposal list, refreshed only on explicit request
#[derive(Clone, Debug, Default)]
pub struct ProposalBoard {
    proposals: Vec<Proposal>,
    refreshed_at: Timestamp,
}

impl ProposalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn get(&self, id: u64) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id == id)
    }

    /// Time the cached phases were derived at
    pub fn refreshed_at(&self) -> Timestamp {
        self.refreshed_at
    }

    /// Re-read every proposal and return the phase changes relative to
    /// the previous contents. On failure the previous contents are kept.
    pub async fn refresh<R: DaoReader + ?Sized>(
        &mut self,
        reader: &R,
        now: Timestamp,
        trigger: RefreshTrigger,
    ) -> Result<Vec<PhaseChange>> {
        info!(target: "dao::view::refresh", "Refreshing proposals ({:?})", trigger);
        let proposals = fetch_proposals(reader).await?;
        Ok(self.replace(proposals, now))
    }

    /// Replace the cached list with `proposals` observed at `now`
    pub fn replace(&mut self, proposals: Vec<Proposal>, now: Timestamp) -> Vec<PhaseChange> {
        let previous: HashMap<u64, Phase> =
            self.proposals.iter().map(|p| (p.id, p.phase(self.refreshed_at))).collect();

        let mut changes = vec![];
        for p in &proposals {
            let to = p.phase(now);
            let from = previous.get(&p.id).copied();
            if from != Some(to) {
                changes.push(PhaseChange { id: p.id, from, to });
            }
        }

        self.proposals = proposals;
        self.refreshed_at = now;
        changes
    }

    /// Whether some cached proposal is in a different phase at `now`
    /// than it was at the last refresh.
    pub fn phase_transition_pending(&self, now: Timestamp) -> bool {
        self.proposals.iter().any(|p| p.phase(now) != p.phase(self.refreshed_at))
    }

    /// Earliest deadline still ahead of `now` among proposals in voting
    pub fn next_transition(&self, now: Timestamp) -> Option<Timestamp> {
        self.proposals
            .iter()
            .filter(|p| p.phase(now) == Phase::Voting)
            .map(|p| p.deadline)
            .min()
    }

    /// How long to wait at `now` before the next refresh: no wait when a
    /// phase change is already due, one second past the next deadline when
    /// that comes sooner than `max_sleep`, `max_sleep` otherwise.
    pub fn next_wakeup(&self, now: Timestamp, max_sleep: Duration) -> Duration {
        if self.phase_transition_pending(now) {
            return Duration::ZERO
        }

        match self.next_transition(now) {
            Some(deadline) => {
                let secs = deadline.remaining_from(now).saturating_add(1);
                max_sleep.min(Duration::from_secs(secs))
            }
            None => max_sleep,
        }
    }

    /// Trigger to label a refresh happening at `now` with
    pub fn refresh_trigger(&self, now: Timestamp) -> RefreshTrigger {
        if self.phase_transition_pending(now) {
            RefreshTrigger::PhaseTransition
        } else {
            RefreshTrigger::UserRequest
        }
    }
}
