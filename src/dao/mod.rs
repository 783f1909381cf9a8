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

/// Proposal view model: phases, permitted actions and outcomes
pub mod model;
pub use model::{Action, Outcome, Phase, Proposal, Vote};

/// Contract reader/writer traits and their EVM implementation
pub mod contract;
pub use contract::{DaoContract, DaoReader, DaoWriter};

/// Aggregated reads and the refreshable proposal board
pub mod view;
pub use view::{fetch_proposal, fetch_proposals, fetch_summary, DaoSummary, ProposalBoard};

/// Checked create, vote and execute actions
pub mod action;
