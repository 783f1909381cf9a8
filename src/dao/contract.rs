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

use std::time::Duration;

use async_trait::async_trait;
use ethers_core::abi::{decode, ParamType, Token};
use log::{debug, info};

use super::model::{Proposal, Vote};
use crate::{
    eth::{encode_call, Address, EthProvider, TransactionReceipt, U256},
    session::Session,
    util::{parse::u256_to_u64, time::Timestamp},
    Error, Result,
};

// Contract function signatures
const NUM_PROPOSALS: &str = "numProposals()";
const PROPOSALS: &str = "proposals(uint256)";
const CREATE_PROPOSAL: &str = "createProposal(uint256)";
const VOTE_ON_PROPOSAL: &str = "voteOnProposal(uint256,uint8)";
const EXECUTE_PROPOSAL: &str = "executeProposal(uint256)";
const BALANCE_OF: &str = "balanceOf(address)";

/// Read access to DAO state
#[async_trait]
pub trait DaoReader: Sync {
    /// Number of proposals created so far. Ids are `0..count`.
    async fn proposal_count(&self) -> Result<u64>;

    async fn proposal_by_id(&self, id: u64) -> Result<Proposal>;

    /// Native balance held by the DAO, in wei
    async fn treasury_balance(&self) -> Result<U256>;

    /// Number of collection NFTs held by `owner`
    async fn nft_balance(&self, owner: &Address) -> Result<u64>;
}

/// State-changing DAO actions. Each call returns once the transaction
/// sent on behalf of `session.caller` has been mined successfully.
#[async_trait]
pub trait DaoWriter: Sync {
    async fn submit_create_proposal(
        &self,
        session: &Session,
        nft_token_id: U256,
    ) -> Result<TransactionReceipt>;

    async fn submit_vote(&self, session: &Session, id: u64, vote: Vote) -> Result<TransactionReceipt>;

    async fn submit_execute(&self, session: &Session, id: u64) -> Result<TransactionReceipt>;
}

fn next_uint(tokens: &mut impl Iterator<Item = Token>) -> Result<U256> {
    match tokens.next().and_then(Token::into_uint) {
        Some(v) => Ok(v),
        None => Err(Error::AbiDecodeError("Expected uint256".to_string())),
    }
}

/// Decode a single `uint256` return value that has to fit into a `u64`
fn decode_u64(data: &[u8]) -> Result<u64> {
    let mut tokens = decode(&[ParamType::Uint(256)], data)?.into_iter();
    u256_to_u64(next_uint(&mut tokens)?)
}

/// Decode the return data of `proposals(uint256)`
pub fn decode_proposal(id: u64, data: &[u8]) -> Result<Proposal> {
    let types = [
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Bool,
    ];
    let mut tokens = decode(&types, data)?.into_iter();

    let nft_token_id = next_uint(&mut tokens)?;
    let deadline = Timestamp(u256_to_u64(next_uint(&mut tokens)?)?);
    let yes_votes = u256_to_u64(next_uint(&mut tokens)?)?;
    let no_votes = u256_to_u64(next_uint(&mut tokens)?)?;
    let Some(executed) = tokens.next().and_then(Token::into_bool) else {
        return Err(Error::AbiDecodeError("Expected bool".to_string()))
    };

    Ok(Proposal { id, nft_token_id, deadline, yes_votes, no_votes, executed })
}

/// DAO and NFT collection contracts deployed on an EVM chain
#[derive(Clone)]
pub struct DaoContract {
    provider: EthProvider,
    dao: Address,
    nft: Address,
    receipt_poll_interval: Duration,
    receipt_timeout: Duration,
}

impl DaoContract {
    pub fn new(session: &Session) -> Self {
        Self {
            provider: session.provider.clone(),
            dao: session.dao_contract,
            nft: session.nft_contract,
            receipt_poll_interval: Duration::from_secs(2),
            receipt_timeout: Duration::from_secs(300),
        }
    }

    /// Override how receipts of submitted transactions are awaited
    pub fn with_receipt_timing(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.receipt_poll_interval = poll_interval;
        self.receipt_timeout = timeout;
        self
    }

    async fn call(&self, to: &Address, signature: &str, args: &[Token]) -> Result<Vec<u8>> {
        let data = encode_call(signature, args);
        debug!(target: "dao::contract::call", "{} on {:?}", signature, to);
        self.provider.call(to, &data).await
    }

    async fn transact(
        &self,
        session: &Session,
        signature: &str,
        args: &[Token],
    ) -> Result<TransactionReceipt> {
        let data = encode_call(signature, args);
        info!(target: "dao::contract::transact", "Sending {} from {:?}", signature, session.caller);
        let hash = self.provider.send_transaction(&session.caller, &self.dao, &data).await?;
        self.provider.wait_for_receipt(&hash, self.receipt_poll_interval, self.receipt_timeout).await
    }
}

#[async_trait]
impl DaoReader for DaoContract {
    async fn proposal_count(&self) -> Result<u64> {
        let data = self.call(&self.dao, NUM_PROPOSALS, &[]).await?;
        decode_u64(&data)
    }

    async fn proposal_by_id(&self, id: u64) -> Result<Proposal> {
        let data = self.call(&self.dao, PROPOSALS, &[Token::Uint(id.into())]).await?;
        decode_proposal(id, &data)
    }

    async fn treasury_balance(&self) -> Result<U256> {
        self.provider.get_balance(&self.dao).await
    }

    async fn nft_balance(&self, owner: &Address) -> Result<u64> {
        let data = self.call(&self.nft, BALANCE_OF, &[Token::Address(*owner)]).await?;
        decode_u64(&data)
    }
}

#[async_trait]
impl DaoWriter for DaoContract {
    async fn submit_create_proposal(
        &self,
        session: &Session,
        nft_token_id: U256,
    ) -> Result<TransactionReceipt> {
        self.transact(session, CREATE_PROPOSAL, &[Token::Uint(nft_token_id)]).await
    }

    async fn submit_vote(&self, session: &Session, id: u64, vote: Vote) -> Result<TransactionReceipt> {
        let args = [Token::Uint(id.into()), Token::Uint(vote.abi_value().into())];
        self.transact(session, VOTE_ON_PROPOSAL, &args).await
    }

    async fn submit_execute(&self, session: &Session, id: u64) -> Result<TransactionReceipt> {
        self.transact(session, EXECUTE_PROPOSAL, &[Token::Uint(id.into())]).await
    }
}
