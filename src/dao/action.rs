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

//! Guarded DAO actions. Each one checks locally that it can succeed,
//! submits the transaction and re-reads the affected proposal once the
//! transaction is mined.

use log::{info, warn};

use super::{
    contract::{DaoReader, DaoWriter},
    model::{Action, Proposal, Vote},
    view::fetch_proposal,
};
use crate::{
    eth::{TransactionReceipt, U256},
    session::Session,
    util::time::Timestamp,
    Error, Result,
};

/// A mined action together with the proposal as read right after it
#[derive(Clone, Debug)]
pub struct Confirmed {
    pub receipt: TransactionReceipt,
    pub proposal: Proposal,
}

async fn ensure_holder<C: DaoReader + ?Sized>(contract: &C, session: &Session) -> Result<()> {
    if contract.nft_balance(&session.caller).await? == 0 {
        warn!(target: "dao::action", "{:?} holds no NFT of the collection", session.caller);
        return Err(Error::NotNftHolder)
    }

    Ok(())
}

fn ensure_permitted(proposal: &Proposal, action: Action, now: Timestamp) -> Result<()> {
    if !proposal.permits(&action, now) {
        let phase = proposal.phase(now);
        return Err(Error::ActionNotPermitted(proposal.id, action.to_string(), phase.to_string()))
    }

    Ok(())
}

/// Propose buying the NFT with `nft_token_id`. Requires the caller to
/// hold at least one NFT of the collection. Other proposals may be created
/// concurrently, so the new one is looked up among the ids added since
/// submission by its token id.
pub async fn create_proposal<C: DaoReader + DaoWriter + ?Sized>(
    contract: &C,
    session: &Session,
    nft_token_id: U256,
) -> Result<Confirmed> {
    ensure_holder(contract, session).await?;

    let before = contract.proposal_count().await?;
    let receipt = contract.submit_create_proposal(session, nft_token_id).await?;
    let after = contract.proposal_count().await?;

    for id in before..after {
        let proposal = fetch_proposal(contract, id).await?;
        if proposal.nft_token_id == nft_token_id {
            info!(target: "dao::action::create_proposal", "Created proposal {}", proposal.id);
            return Ok(Confirmed { receipt, proposal })
        }
    }

    warn!(
        target: "dao::action::create_proposal",
        "No proposal for token {} among ids {}..{}", nft_token_id, before, after,
    );
    Err(Error::ProposalNotFound(before, after))
}

/// Vote on proposal `id`, which must still be in voting.
pub async fn vote<C: DaoReader + DaoWriter + ?Sized>(
    contract: &C,
    session: &Session,
    id: u64,
    vote: Vote,
) -> Result<Confirmed> {
    ensure_holder(contract, session).await?;
    let proposal = fetch_proposal(contract, id).await?;
    ensure_permitted(&proposal, Action::Vote(vote), session.now().await?)?;

    let receipt = contract.submit_vote(session, id, vote).await?;
    let proposal = fetch_proposal(contract, id).await?;
    info!(target: "dao::action::vote", "Voted {} on proposal {}", vote, id);

    Ok(Confirmed { receipt, proposal })
}

/// Execute proposal `id` once its voting period is over.
pub async fn execute<C: DaoReader + DaoWriter + ?Sized>(
    contract: &C,
    session: &Session,
    id: u64,
) -> Result<Confirmed> {
    let proposal = fetch_proposal(contract, id).await?;
    ensure_permitted(&proposal, Action::Execute(proposal.outcome()), session.now().await?)?;

    let receipt = contract.submit_execute(session, id).await?;
    let proposal = fetch_proposal(contract, id).await?;
    info!(target: "dao::action::execute", "Executed proposal {} ({})", id, proposal.outcome());

    Ok(Confirmed { receipt, proposal })
}
