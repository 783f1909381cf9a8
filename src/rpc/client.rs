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

//! JSON-RPC client-side implementation over HTTP.
use log::{debug, error};
use tinyjson::JsonValue;
use url::Url;

use super::jsonrpc::{ErrorCode, JsonRequest, JsonResult};
use crate::{Error, Result};

/// JSON-RPC client talking to an HTTP(S) endpoint, e.g. an EVM node or a
/// wallet provider. Every request is a single POST, so the client holds
/// no connection state.
#[derive(Clone)]
pub struct RpcClient {
    endpoint: Url,
    client: surf::Client,
}

impl RpcClient {
    /// Instantiate a new JSON-RPC client for the given endpoint URL.
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint, client: surf::Client::new() }
    }

    /// Send a given JSON-RPC request and return the `result` of its reply.
    /// JSON-RPC error replies are returned as [`Error::JsonRpcError`].
    pub async fn request(&self, req: JsonRequest) -> Result<JsonValue> {
        let body = req.stringify()?;
        debug!(target: "rpc::client", "--> {}", body);

        let mut rep = match self
            .client
            .post(self.endpoint.as_str())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
        {
            Ok(v) => v,
            Err(e) => {
                error!(
                    target: "rpc::client::request",
                    "Failed sending {} request to {}: {}", req.method, self.endpoint, e,
                );
                return Err(Error::RpcRequestFailed(self.endpoint.to_string(), e.to_string()))
            }
        };

        let reply = match rep.body_string().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    target: "rpc::client::request",
                    "Failed reading {} reply body from {}: {}", req.method, self.endpoint, e,
                );
                return Err(Error::RpcRequestFailed(self.endpoint.to_string(), e.to_string()))
            }
        };

        debug!(target: "rpc::client", "<-- {}", reply);
        parse_reply(req.id, &reply)
    }
}

/// Parse a raw JSON-RPC reply body for the request with the given ID.
pub fn parse_reply(req_id: u16, body: &str) -> Result<JsonValue> {
    let value: JsonValue = body.parse()?;

    match JsonResult::try_from_value(&value)? {
        JsonResult::Response(r) => {
            if r.id != req_id {
                let code = ErrorCode::IdMismatch;
                return Err(Error::JsonRpcError(code.code(), code.message()))
            }

            Ok(r.result)
        }
        JsonResult::Error(e) => Err(Error::JsonRpcError(e.error.code, e.error.message)),
    }
}
