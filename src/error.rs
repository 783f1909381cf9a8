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

// Hello developer. Please add your error to the according subsection
// that is commented, or make a new subsection. Keep it clean.

/// Main result type used throughout the codebase.
pub type Result<T> = std::result::Result<T, Error>;

/// General library errors used throughout the codebase.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    // ==============
    // Parsing errors
    // ==============
    #[error("Parse failed: {0}")]
    ParseFailed(&'static str),

    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    #[error(transparent)]
    HexDecodeError(#[from] hex::FromHexError),

    #[error("Invalid EVM address: {0}")]
    InvalidAddress(String),

    #[error("Invalid vote option: {0}")]
    InvalidVote(String),

    // ===============
    // Encoding errors
    // ===============
    #[error("ABI decode failed: {0}")]
    AbiDecodeError(String),

    #[error("Value does not fit into {0}")]
    ValueOverflow(&'static str),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("JSON generate error: {0}")]
    JsonGenerateError(String),

    // ======================
    // Network-related errors
    // ======================
    #[error("RPC request to {0} failed: {1}")]
    RpcRequestFailed(String, String),

    // ===================
    // RPC-related errors
    // ===================
    #[error("JSON-RPC error {0}: {1}")]
    JsonRpcError(i32, String),

    #[error("Unexpected JSON-RPC reply: {0}")]
    InvalidReply(String),

    // ====================
    // Chain-related errors
    // ====================
    #[error("Provider is on chain {1}, expected chain {0}")]
    ChainIdMismatch(u64, u64),

    #[error("Provider exposes no accounts and no caller was configured")]
    NoCallerAccount,

    // ==================
    // DAO-related errors
    // ==================
    #[error("Failed fetching proposal {0}: {1}")]
    ProposalFetchFailed(u64, String),

    #[error("Proposal {0} does not exist, DAO has {1} proposal(s)")]
    ProposalNotFound(u64, u64),

    #[error("Action `{1}` is not permitted while proposal {0} is {2}")]
    ActionNotPermitted(u64, String, String),

    #[error("Caller does not hold any NFT of the collection")]
    NotNftHolder,

    #[error("Action rejected by contract: {0}")]
    ActionRejected(String),

    #[error("Timed out waiting for receipt of transaction {0}")]
    ReceiptTimeout(String),

    // =============
    // Misc errors
    // =============
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),

    #[error("Could not fetch path for home directory")]
    HomeDirNotFound,

    #[error("Set logger failed: {0}")]
    SetLoggerError(String),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Returns `true` for failures of state reads, as opposed to rejected
    /// or unconfirmed write actions.
    pub fn is_read_failure(&self) -> bool {
        matches!(
            self,
            Self::RpcRequestFailed(..) |
                Self::JsonRpcError(..) |
                Self::InvalidReply(_) |
                Self::JsonParseError(_) |
                Self::AbiDecodeError(_) |
                Self::ValueOverflow(_) |
                Self::ProposalFetchFailed(..) |
                Self::ProposalNotFound(..)
        )
    }
}

/// Errors produced while validating JSON-RPC objects
#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
}

impl From<RpcError> for Error {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::InvalidJson(e) => Self::InvalidReply(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.kind())
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Self::SetLoggerError(err.to_string())
    }
}

impl From<tinyjson::JsonParseError> for Error {
    fn from(err: tinyjson::JsonParseError) -> Self {
        Self::JsonParseError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParseError(err.to_string())
    }
}

impl From<ethers_core::abi::Error> for Error {
    fn from(err: ethers_core::abi::Error) -> Self {
        Self::AbiDecodeError(err.to_string())
    }
}

impl From<tinyjson::JsonGenerateError> for Error {
    fn from(err: tinyjson::JsonGenerateError) -> Self {
        Self::JsonGenerateError(err.to_string())
    }
}
