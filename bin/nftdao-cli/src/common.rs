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

use prettytable::{format, row, Table};

use nftdao::{
    dao::{model::Phase, view::PhaseChange, DaoSummary, Proposal},
    eth::TransactionReceipt,
    util::{
        parse::format_ether,
        time::{fmt_duration, Timestamp},
    },
};

/// Auxiliary function to print the DAO summary counters.
pub fn print_summary(summary: &DaoSummary, chain_id: u64, block: u64) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.add_row(row!["Chain", format!("{} (block {})", chain_id, block)]);
    table.add_row(row!["Your NFT balance", summary.nft_balance]);
    table.add_row(row!["Treasury balance", format!("{} ETH", format_ether(summary.treasury))]);
    table.add_row(row!["Total proposals", summary.proposal_count]);
    println!("{}", table);
}

fn deadline_cell(proposal: &Proposal, now: Timestamp) -> String {
    match proposal.phase(now) {
        Phase::Voting => {
            let left = fmt_duration(proposal.deadline.remaining_from(now));
            format!("{} (in {})", proposal.deadline, left)
        }
        _ => {
            let ago = fmt_duration(proposal.deadline.elapsed_since(now));
            format!("{} ({} ago)", proposal.deadline, ago)
        }
    }
}

fn actions_cell(proposal: &Proposal, now: Timestamp) -> String {
    let actions = proposal.permitted_actions(now);
    if actions.is_empty() {
        return "-".to_string()
    }

    actions.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ")
}

/// Auxiliary function to print proposals along with their phase at `now`.
pub fn print_proposals(proposals: &[Proposal], now: Timestamp) {
    if proposals.is_empty() {
        println!("No proposals found");
        return
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row![
        "ID",
        "NFT Token ID",
        "Deadline",
        "Yes",
        "No",
        "Executed",
        "Phase",
        "Actions"
    ]);

    for p in proposals {
        table.add_row(row![
            p.id,
            p.nft_token_id,
            deadline_cell(p, now),
            p.yes_votes,
            p.no_votes,
            p.executed,
            p.phase(now),
            actions_cell(p, now)
        ]);
    }

    println!("{}", table);
}

pub fn print_confirmed(receipt: &TransactionReceipt, proposal: &Proposal, now: Timestamp) {
    println!(
        "Transaction {:?} confirmed in block {} (gas used: {})",
        receipt.transaction_hash,
        receipt.block_number.unwrap_or_default(),
        receipt.gas_used.unwrap_or_default()
    );
    print_proposals(std::slice::from_ref(proposal), now);
}

pub fn print_phase_changes(changes: &[PhaseChange], now: Timestamp) {
    for change in changes {
        match change.from {
            Some(from) => println!("[{}] Proposal {}: {} -> {}", now, change.id, from, change.to),
            None => println!("[{}] Proposal {}: new, {}", now, change.id, change.to),
        }
    }
}
