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

use log::{debug, info};
use url::Url;

use crate::{
    eth::{Address, EthProvider},
    rpc::client::RpcClient,
    util::time::Timestamp,
    Error, Result,
};

/// Goerli, the only chain the DAO is deployed on by default
pub const DEFAULT_CHAIN_ID: u64 = 5;

/// Everything an action needs to know about who is acting, where, and
/// against which contracts. Passed explicitly to reads and writes
/// instead of living in global wallet state.
#[derive(Clone)]
pub struct Session {
    pub provider: EthProvider,
    /// Account transactions are sent from
    pub caller: Address,
    pub chain_id: u64,
    pub dao_contract: Address,
    pub nft_contract: Address,
    /// Use the latest block timestamp instead of the local clock as `now`
    pub chain_time: bool,
}

impl Session {
    /// Connect to the provider at `endpoint` and verify it is on
    /// `expected_chain_id`. Without a configured `caller`, the first
    /// account the provider exposes is used.
    pub async fn connect(
        endpoint: Url,
        expected_chain_id: u64,
        caller: Option<Address>,
        dao_contract: Address,
        nft_contract: Address,
    ) -> Result<Self> {
        info!(target: "session::connect", "Connecting to provider at {}", endpoint);
        let provider = EthProvider::new(RpcClient::new(endpoint));

        let chain_id = provider.chain_id().await?;
        if chain_id != expected_chain_id {
            return Err(Error::ChainIdMismatch(expected_chain_id, chain_id))
        }

        let caller = match caller {
            Some(c) => c,
            None => {
                let accounts = provider.accounts().await?;
                debug!(target: "session::connect", "Provider accounts: {:?}", accounts);
                let Some(first) = accounts.first() else { return Err(Error::NoCallerAccount) };
                *first
            }
        };

        info!(target: "session::connect", "Connected to chain {} as {:?}", chain_id, caller);

        Ok(Self { provider, caller, chain_id, dao_contract, nft_contract, chain_time: false })
    }

    /// Current time used for phase derivation
    pub async fn now(&self) -> Result<Timestamp> {
        if self.chain_time {
            return self.provider.latest_block_timestamp().await
        }

        Ok(Timestamp::current_time())
    }
}
