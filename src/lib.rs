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

pub mod error;
pub use error::{Error, Result};

/// NFT-holder DAO proposals, their lifecycle and the contract bindings
pub mod dao;

/// Address parsing, call encoding and typed JSON-RPC provider methods
pub mod eth;

/// JSON-RPC primitives and HTTP client
pub mod rpc;

/// Explicit caller session context
pub mod session;

pub mod util;

#[macro_export]
macro_rules! cli_desc {
    () => {{
        let commitish =
            option_env!("COMMITISH").map(|c| format!("-{}", c)).unwrap_or_default();
        let desc = Box::leak(
            format!(
                "{} {}{}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                commitish,
                env!("CARGO_PKG_DESCRIPTION"),
            )
            .into_boxed_str(),
        );

        desc as &'static str
    }};
}
