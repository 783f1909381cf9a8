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

use std::str::FromStr;

use ethers_core::{
    abi::{encode, Token},
    utils::{id, to_checksum},
};

use crate::{Error, Result};

pub use ethers_core::types::{Address, TransactionReceipt, TxHash, U256, U64};

/// Typed Ethereum JSON-RPC methods
pub mod provider;
pub use provider::EthProvider;

/// Parse a `0x`-prefixed hex address. All-lowercase and all-uppercase
/// inputs are taken as is, mixed-case inputs must carry a valid EIP-55
/// checksum.
pub fn parse_address(s: &str) -> Result<Address> {
    let Some(digits) = s.strip_prefix("0x") else {
        return Err(Error::InvalidAddress(s.to_string()))
    };

    if digits.len() != 40 {
        return Err(Error::InvalidAddress(s.to_string()))
    }

    let Ok(address) = Address::from_str(digits) else {
        return Err(Error::InvalidAddress(s.to_string()))
    };

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum(&address, None) != s {
        return Err(Error::InvalidAddress(s.to_string()))
    }

    Ok(address)
}

/// Build call data: the function selector of `signature` followed by the
/// ABI-encoded arguments.
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = id(signature).to_vec();
    data.extend(encode(args));
    data
}
