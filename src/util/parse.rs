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

use ethers_core::{types::U256, utils};

use crate::{Error, Result};

/// Format a wei amount as ether, without trailing zeros.
pub fn format_ether(wei: U256) -> String {
    let s = utils::format_ether(wei);
    if !s.contains('.') {
        return s
    }

    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Parse a `0x`-prefixed hex quantity as used by EVM JSON-RPC.
pub fn decode_hex_quantity(quantity: &str) -> Result<U256> {
    let Some(digits) = quantity.strip_prefix("0x").or_else(|| quantity.strip_prefix("0X")) else {
        return Err(Error::ParseFailed("Hex quantity lacks 0x prefix"))
    };

    if digits.is_empty() {
        return Err(Error::ParseFailed("Empty hex quantity"))
    }

    if digits.trim_start_matches('0').len() > 64 {
        return Err(Error::ValueOverflow("uint256"))
    }

    U256::from_str_radix(digits, 16).map_err(|_| Error::ParseFailed("Invalid hex quantity digits"))
}

/// Narrow a `uint256` down to a `u64`.
pub fn u256_to_u64(value: U256) -> Result<u64> {
    if value.bits() > 64 {
        return Err(Error::ValueOverflow("u64"))
    }

    Ok(value.low_u64())
}

/// Parse a `0x`-prefixed hex quantity that has to fit into a `u64`.
pub fn decode_hex_u64(quantity: &str) -> Result<u64> {
    u256_to_u64(decode_hex_quantity(quantity)?)
}
