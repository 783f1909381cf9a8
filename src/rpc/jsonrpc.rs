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

//! JSON-RPC 2.0 object definitions
use std::collections::HashMap;

use rand::{rngs::OsRng, Rng};
use tinyjson::JsonValue;

use crate::{error::RpcError, Result};

/// JSON-RPC error codes.
/// The error codes `[-32768, -32000]` are reserved for predefined errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received by the server.
    /// An error occurred on the server while parsing the JSON text.
    ParseError,
    /// The JSON sent is not a valid Request object.
    InvalidRequest,
    /// The method does not exist / is not available.
    MethodNotFound,
    /// Invalid method parameter(s).
    InvalidParams,
    /// Internal JSON-RPC error.
    InternalError,
    /// ID mismatch
    IdMismatch,
    /// Invalid/Unexpected reply
    InvalidReply,
    /// Reserved for implementation-defined server-errors.
    /// EVM nodes report reverted calls as `3` or `-32000`.
    ServerError(i32),
}

impl ErrorCode {
    pub fn code(&self) -> i32 {
        match *self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::IdMismatch => -32360,
            Self::InvalidReply => -32361,
            Self::ServerError(c) => c,
        }
    }

    pub fn message(&self) -> String {
        match *self {
            Self::ParseError => "parse error".to_string(),
            Self::InvalidRequest => "invalid request".to_string(),
            Self::MethodNotFound => "method not found".to_string(),
            Self::InvalidParams => "invalid params".to_string(),
            Self::InternalError => "internal error".to_string(),
            Self::IdMismatch => "id mismatch".to_string(),
            Self::InvalidReply => "invalid reply".to_string(),
            Self::ServerError(_) => "server error".to_string(),
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32360 => Self::IdMismatch,
            -32361 => Self::InvalidReply,
            c => Self::ServerError(c),
        }
    }
}

/// Wrapping enum around the JSON-RPC object types a client can receive
#[derive(Clone, Debug)]
pub enum JsonResult {
    Response(JsonResponse),
    Error(JsonError),
}

impl JsonResult {
    pub fn try_from_value(value: &JsonValue) -> Result<Self> {
        if let Ok(response) = JsonResponse::try_from(value) {
            return Ok(Self::Response(response))
        }

        if let Ok(error) = JsonError::try_from(value) {
            return Ok(Self::Error(error))
        }

        Err(RpcError::InvalidJson("Invalid JSON Result".to_string()).into())
    }
}

impl From<JsonResponse> for JsonResult {
    fn from(resp: JsonResponse) -> Self {
        Self::Response(resp)
    }
}

impl From<JsonError> for JsonResult {
    fn from(err: JsonError) -> Self {
        Self::Error(err)
    }
}

/// Grab the object map of a JSON value and check the `jsonrpc` version field.
fn versioned_map<'a>(
    value: &'a JsonValue,
    kind: &str,
) -> std::result::Result<&'a HashMap<String, JsonValue>, RpcError> {
    let Some(map) = value.get::<HashMap<String, JsonValue>>() else {
        return Err(RpcError::InvalidJson("JSON is not an Object".to_string()))
    };

    match map.get("jsonrpc") {
        Some(JsonValue::String(v)) if v == "2.0" => Ok(map),
        _ => Err(RpcError::InvalidJson(format!(
            "{} does not contain valid \"jsonrpc\" field",
            kind
        ))),
    }
}

/// Parse the `id` field of a JSON-RPC object.
fn parse_id(map: &HashMap<String, JsonValue>, kind: &str) -> std::result::Result<u16, RpcError> {
    match map.get("id") {
        Some(JsonValue::Number(id))
            if id.fract() == 0.0 && *id >= 0.0 && *id <= u16::MAX as f64 =>
        {
            Ok(*id as u16)
        }
        _ => Err(RpcError::InvalidJson(format!("{} does not contain valid \"id\" field", kind))),
    }
}

/// A JSON-RPC request object
#[derive(Clone, Debug)]
pub struct JsonRequest {
    /// JSON-RPC version
    pub jsonrpc: &'static str,
    /// Request ID
    pub id: u16,
    /// Request method
    pub method: String,
    /// Request parameters
    pub params: JsonValue,
}

impl JsonRequest {
    /// Create a new [`JsonRequest`] object with the given method and parameters.
    /// The request ID is chosen randomly.
    pub fn new(method: &str, params: JsonValue) -> Self {
        assert!(params.is_object() || params.is_array());
        Self { jsonrpc: "2.0", id: OsRng.gen(), method: method.to_string(), params }
    }

    /// Convert the object into a JSON string
    pub fn stringify(&self) -> Result<String> {
        let v: JsonValue = self.into();
        Ok(v.stringify()?)
    }
}

impl From<&JsonRequest> for JsonValue {
    fn from(req: &JsonRequest) -> JsonValue {
        JsonValue::Object(HashMap::from([
            ("jsonrpc".to_string(), JsonValue::String(req.jsonrpc.to_string())),
            ("id".to_string(), JsonValue::Number(req.id.into())),
            ("method".to_string(), JsonValue::String(req.method.clone())),
            ("params".to_string(), req.params.clone()),
        ]))
    }
}

/// A JSON-RPC response object
#[derive(Clone, Debug)]
pub struct JsonResponse {
    /// JSON-RPC version
    pub jsonrpc: &'static str,
    /// Request ID
    pub id: u16,
    /// Response result
    pub result: JsonValue,
}

impl JsonResponse {
    /// Create a new [`JsonResponse`] object with the given ID and result value.
    /// Creating a `JsonResponse` implies that the method call was successful.
    pub fn new(result: JsonValue, id: u16) -> Self {
        Self { jsonrpc: "2.0", id, result }
    }

    /// Convert the object into a JSON string
    pub fn stringify(&self) -> Result<String> {
        let v: JsonValue = self.into();
        Ok(v.stringify()?)
    }
}

impl From<&JsonResponse> for JsonValue {
    fn from(rep: &JsonResponse) -> JsonValue {
        JsonValue::Object(HashMap::from([
            ("jsonrpc".to_string(), JsonValue::String(rep.jsonrpc.to_string())),
            ("id".to_string(), JsonValue::Number(rep.id.into())),
            ("result".to_string(), rep.result.clone()),
        ]))
    }
}

impl TryFrom<&JsonValue> for JsonResponse {
    type Error = RpcError;

    fn try_from(value: &JsonValue) -> std::result::Result<Self, Self::Error> {
        let map = versioned_map(value, "Response")?;
        let id = parse_id(map, "Response")?;

        let Some(result) = map.get("result") else {
            return Err(RpcError::InvalidJson(
                "Response does not contain valid \"result\" field".to_string(),
            ))
        };

        Ok(Self { jsonrpc: "2.0", id, result: result.clone() })
    }
}

/// A JSON-RPC error object
#[derive(Clone, Debug)]
pub struct JsonError {
    /// JSON-RPC version
    pub jsonrpc: &'static str,
    /// Request ID
    pub id: u16,
    /// JSON-RPC error (code and message)
    pub error: JsonErrorVal,
}

/// A JSON-RPC error value (code and message)
#[derive(Clone, Debug)]
pub struct JsonErrorVal {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
}

impl JsonError {
    /// Create a new [`JsonError`] object with the given error code, optional
    /// message, and a response ID.
    /// Creating a `JsonError` implies that the method call was unsuccessful.
    pub fn new(c: ErrorCode, message: Option<String>, id: u16) -> Self {
        let error = JsonErrorVal { code: c.code(), message: message.unwrap_or(c.message()) };
        Self { jsonrpc: "2.0", id, error }
    }

    /// Convert the object into a JSON string
    pub fn stringify(&self) -> Result<String> {
        let v: JsonValue = self.into();
        Ok(v.stringify()?)
    }
}

impl From<&JsonError> for JsonValue {
    fn from(err: &JsonError) -> JsonValue {
        let errmap = JsonValue::Object(HashMap::from([
            ("code".to_string(), JsonValue::Number(err.error.code.into())),
            ("message".to_string(), JsonValue::String(err.error.message.clone())),
        ]));

        JsonValue::Object(HashMap::from([
            ("jsonrpc".to_string(), JsonValue::String(err.jsonrpc.to_string())),
            ("id".to_string(), JsonValue::Number(err.id.into())),
            ("error".to_string(), errmap),
        ]))
    }
}

impl TryFrom<&JsonValue> for JsonError {
    type Error = RpcError;

    fn try_from(value: &JsonValue) -> std::result::Result<Self, Self::Error> {
        let map = versioned_map(value, "Error")?;
        let id = parse_id(map, "Error")?;

        let Some(errmap) = map.get("error").and_then(|e| e.get::<HashMap<String, JsonValue>>())
        else {
            return Err(RpcError::InvalidJson(
                "Error does not contain valid \"error\" field".to_string(),
            ))
        };

        let Some(JsonValue::Number(code)) = errmap.get("code") else {
            return Err(RpcError::InvalidJson(
                "Error does not contain valid \"error.code\" field".to_string(),
            ))
        };

        let Some(JsonValue::String(message)) = errmap.get("message") else {
            return Err(RpcError::InvalidJson(
                "Error does not contain valid \"error.message\" field".to_string(),
            ))
        };

        Ok(Self {
            jsonrpc: "2.0",
            id,
            error: JsonErrorVal { code: *code as i32, message: message.clone() },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let req = JsonRequest::new("eth_chainId", JsonValue::Array(vec![]));
        let json: JsonValue = req.stringify().unwrap().parse().unwrap();
        let map: &HashMap<String, JsonValue> = json.get().unwrap();

        assert_eq!(map["jsonrpc"], JsonValue::String("2.0".to_string()));
        assert_eq!(map["method"], JsonValue::String("eth_chainId".to_string()));
        assert_eq!(map["id"], JsonValue::Number(req.id as f64));
        assert!(map["params"].is_array());
    }

    #[test]
    fn result_parsing() {
        let rep: JsonValue = r#"{"jsonrpc":"2.0","id":7,"result":"0x5"}"#.parse().unwrap();
        match JsonResult::try_from_value(&rep).unwrap() {
            JsonResult::Response(r) => {
                assert_eq!(r.id, 7);
                assert_eq!(r.result, JsonValue::String("0x5".to_string()));
            }
            JsonResult::Error(_) => panic!("expected a response"),
        }

        let rep: JsonValue =
            r#"{"jsonrpc":"2.0","id":7,"error":{"code":3,"message":"execution reverted"}}"#
                .parse()
                .unwrap();
        match JsonResult::try_from_value(&rep).unwrap() {
            JsonResult::Error(e) => {
                assert_eq!(e.error.code, 3);
                assert_eq!(e.error.message, "execution reverted");
                assert_eq!(ErrorCode::from(e.error.code), ErrorCode::ServerError(3));
            }
            JsonResult::Response(_) => panic!("expected an error"),
        }

        let rep: JsonValue = r#"{"jsonrpc":"1.0","id":7,"result":null}"#.parse().unwrap();
        assert!(JsonResult::try_from_value(&rep).is_err());

        let rep: JsonValue = r#"{"jsonrpc":"2.0","result":null}"#.parse().unwrap();
        assert!(JsonResult::try_from_value(&rep).is_err());
    }

    #[test]
    fn null_result_is_a_response() {
        let rep: JsonValue = r#"{"jsonrpc":"2.0","id":1,"result":null}"#.parse().unwrap();
        let rep = JsonResponse::try_from(&rep).unwrap();
        assert_eq!(rep.result, JsonValue::Null);
    }

    #[test]
    fn id_range() {
        for id in ["65578", "1.5", "-1", "\"7\"", "null"] {
            let rep: JsonValue =
                format!(r#"{{"jsonrpc":"2.0","id":{},"result":"0x5"}}"#, id).parse().unwrap();
            assert!(JsonResult::try_from_value(&rep).is_err(), "accepted id {}", id);
        }

        let rep: JsonValue = r#"{"jsonrpc":"2.0","id":65535,"result":"0x5"}"#.parse().unwrap();
        assert!(JsonResult::try_from_value(&rep).is_ok());
    }
}
