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

//! Typed Ethereum JSON-RPC methods used to read chain state and to
//! submit transactions through a wallet provider that holds the keys.

use std::{
    str::FromStr,
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use smol::Timer;

use super::{parse_address, Address, TransactionReceipt, TxHash, U256, U64};
use crate::{
    rpc::{
        client::RpcClient,
        jsonrpc::JsonRequest,
        util::{json_field_str, json_map, json_str, JsonValue},
    },
    util::{
        parse::{decode_hex_quantity, decode_hex_u64},
        time::Timestamp,
    },
    Error, Result,
};

/// Parse the object returned by `eth_getTransactionReceipt`.
/// A JSON `null` means the transaction is still pending.
pub fn parse_receipt(value: &JsonValue) -> Result<Option<TransactionReceipt>> {
    if value.is_null() {
        return Ok(None)
    }

    Ok(serde_json::from_str(&value.stringify()?)?)
}

fn parse_tx_hash(s: &str) -> Result<TxHash> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() != 64 {
        return Err(Error::InvalidReply(format!("Invalid transaction hash: {}", s)))
    }

    TxHash::from_str(digits).map_err(|_| Error::InvalidReply(format!("Invalid transaction hash: {}", s)))
}

fn hex_bytes(data: &[u8]) -> JsonValue {
    json_str(&format!("0x{}", hex::encode(data)))
}

/// Ethereum JSON-RPC provider
#[derive(Clone)]
pub struct EthProvider {
    client: RpcClient,
}

fn expect_str(value: &JsonValue, method: &str) -> Result<String> {
    match value.get::<String>() {
        Some(s) => Ok(s.clone()),
        None => Err(Error::InvalidReply(format!("{} did not return a string", method))),
    }
}

impl EthProvider {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }

    async fn request(&self, method: &str, params: Vec<JsonValue>) -> Result<JsonValue> {
        self.client.request(JsonRequest::new(method, JsonValue::Array(params))).await
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64> {
        let rep = self.request("eth_chainId", vec![]).await?;
        decode_hex_u64(&expect_str(&rep, "eth_chainId")?)
    }

    /// `eth_accounts`, the accounts the provider can sign for
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        let rep = self.request("eth_accounts", vec![]).await?;
        let Some(accounts) = rep.get::<Vec<JsonValue>>() else {
            return Err(Error::InvalidReply("eth_accounts did not return an array".to_string()))
        };

        accounts.iter().map(|a| parse_address(&expect_str(a, "eth_accounts")?)).collect()
    }

    /// `eth_blockNumber`
    pub async fn block_number(&self) -> Result<u64> {
        let rep = self.request("eth_blockNumber", vec![]).await?;
        decode_hex_u64(&expect_str(&rep, "eth_blockNumber")?)
    }

    /// Timestamp of the latest block, used as chain time
    pub async fn latest_block_timestamp(&self) -> Result<Timestamp> {
        let rep = self
            .request("eth_getBlockByNumber", vec![json_str("latest"), JsonValue::Boolean(false)])
            .await?;

        let Some(ts) = json_field_str(&rep, "timestamp") else {
            return Err(Error::InvalidReply("Latest block has no timestamp".to_string()))
        };

        Ok(Timestamp(decode_hex_u64(ts)?))
    }

    /// `eth_getBalance` at the latest block, in wei
    pub async fn get_balance(&self, address: &Address) -> Result<U256> {
        let rep = self
            .request("eth_getBalance", vec![hex_bytes(address.as_bytes()), json_str("latest")])
            .await?;
        decode_hex_quantity(&expect_str(&rep, "eth_getBalance")?)
    }

    /// `eth_call` against the latest block, returning the raw return data
    pub async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
        let tx = json_map([("to", hex_bytes(to.as_bytes())), ("data", hex_bytes(data))]);

        let rep = self.request("eth_call", vec![tx, json_str("latest")]).await?;
        let ret = expect_str(&rep, "eth_call")?;
        let Some(ret) = ret.strip_prefix("0x") else {
            return Err(Error::InvalidReply(format!("eth_call returned non-hex data: {}", ret)))
        };

        Ok(hex::decode(ret)?)
    }

    /// `eth_sendTransaction`, signed by the provider on behalf of `from`.
    /// Errors raised by the node or the wallet at this stage mean the
    /// action was refused and are returned as [`Error::ActionRejected`].
    pub async fn send_transaction(&self, from: &Address, to: &Address, data: &[u8]) -> Result<TxHash> {
        let tx = json_map([
            ("from", hex_bytes(from.as_bytes())),
            ("to", hex_bytes(to.as_bytes())),
            ("data", hex_bytes(data)),
        ]);

        match self.request("eth_sendTransaction", vec![tx]).await {
            Ok(rep) => {
                let hash = parse_tx_hash(&expect_str(&rep, "eth_sendTransaction")?)?;
                info!(target: "eth::provider", "Submitted transaction {:?}", hash);
                Ok(hash)
            }
            Err(Error::JsonRpcError(code, msg)) => {
                warn!(
                    target: "eth::provider::send_transaction",
                    "Transaction refused ({}): {}", code, msg,
                );
                Err(Error::ActionRejected(msg))
            }
            Err(e) => Err(e),
        }
    }

    /// `eth_getTransactionReceipt`, `None` while still pending
    pub async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<TransactionReceipt>> {
        let rep =
            self.request("eth_getTransactionReceipt", vec![hex_bytes(hash.as_bytes())]).await?;
        parse_receipt(&rep)
    }

    /// Poll for the receipt of `hash` until it is mined or `timeout` passes.
    /// A reverted transaction yields [`Error::ActionRejected`].
    pub async fn wait_for_receipt(
        &self,
        hash: &TxHash,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<TransactionReceipt> {
        let start = Instant::now();

        loop {
            if let Some(receipt) = self.transaction_receipt(hash).await? {
                let block = receipt.block_number.unwrap_or_default();
                // Pre-Byzantium receipts carry no status field
                if receipt.status == Some(U64::zero()) {
                    return Err(Error::ActionRejected(format!(
                        "Transaction {:?} reverted in block {}",
                        hash, block
                    )))
                }

                info!(target: "eth::provider", "Transaction {:?} confirmed in block {}", hash, block);
                return Ok(receipt)
            }

            if start.elapsed() >= timeout {
                return Err(Error::ReceiptTimeout(format!("{:?}", hash)))
            }

            debug!(target: "eth::provider", "Transaction {:?} pending, polling again", hash);
            Timer::after(poll_interval).await;
        }
    }
}
