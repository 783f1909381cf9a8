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

use std::{fs, process::exit, str::FromStr, time::Duration};

use log::{debug, error, info};
use serde::Deserialize;
use smol::Timer;
use structopt::StructOpt;
use structopt_toml::StructOptToml;
use url::Url;

use nftdao::{
    cli_desc,
    dao::{
        action::{self, Confirmed},
        fetch_proposal, fetch_proposals, fetch_summary,
        view::{ProposalBoard, RefreshTrigger},
        DaoContract, Vote,
    },
    eth::{parse_address, U256},
    session::{Session, DEFAULT_CHAIN_ID},
    util::{
        cli::{init_logger, spawn_config},
        path::get_config_path,
    },
    Error, Result,
};

/// Output formatting
mod common;
use common::{print_confirmed, print_phase_changes, print_proposals, print_summary};

const CONFIG_FILE: &str = "nftdao_cli.toml";
const CONFIG_FILE_CONTENTS: &str = include_str!("../nftdao_cli.toml");

#[derive(Clone, Debug, Deserialize, StructOpt, StructOptToml)]
#[serde(default)]
#[structopt(name = "nftdao-cli", about = cli_desc!())]
struct Args {
    #[structopt(short, long)]
    /// Configuration file to use
    config: Option<String>,

    #[structopt(short, long, default_value = "http://127.0.0.1:8545")]
    /// Wallet provider JSON-RPC endpoint
    endpoint: Url,

    #[structopt(long, default_value = "5")]
    /// Chain id the DAO is deployed on
    chain_id: u64,

    #[structopt(long, default_value = "")]
    /// DAO contract address
    dao_contract: String,

    #[structopt(long, default_value = "")]
    /// NFT collection contract address
    nft_contract: String,

    #[structopt(long)]
    /// Account to act as (defaults to the provider's first account)
    caller: Option<String>,

    #[structopt(long)]
    /// Derive phases from the latest block timestamp instead of the local clock
    chain_time: bool,

    #[structopt(long, default_value = "2000")]
    /// Milliseconds between transaction receipt polls
    receipt_poll_interval: u64,

    #[structopt(long, default_value = "300")]
    /// Seconds to wait for a transaction receipt
    receipt_timeout: u64,

    #[structopt(long, default_value = "60")]
    /// Longest time in seconds `watch` sleeps between refreshes
    watch_interval: u64,

    #[structopt(subcommand)]
    /// Sub command to execute
    command: Subcmd,

    #[structopt(short, long)]
    /// Set log file to ouput into
    log: Option<String>,

    #[structopt(short, parse(from_occurrences))]
    /// Increase verbosity (-vvv supported)
    verbose: u8,
}

#[derive(Clone, Debug, Deserialize, StructOpt)]
enum Subcmd {
    /// Show NFT balance, treasury balance and proposal count
    Info,

    /// List proposals with their phase and available actions
    Proposals {
        #[structopt(long)]
        /// Only show the proposal with this id
        id: Option<u64>,
    },

    /// Propose buying the NFT with the given token id
    Propose {
        /// NFT token id
        nft_token_id: String,
    },

    /// Vote on a proposal that is still in voting
    Vote {
        /// Proposal id
        id: u64,

        /// Vote option (yes/no)
        vote: String,
    },

    /// Execute a proposal whose voting period is over
    Exec {
        /// Proposal id
        id: u64,
    },

    /// Keep the proposal list fresh and report phase changes
    Watch,
}

fn parse_args(toml: &str) -> Result<Args> {
    Args::from_args_with_toml(toml).map_err(|e| Error::Custom(format!("Invalid config: {}", e)))
}

/// Refresh a board after a mined action and print the affected proposal
async fn report_confirmed(
    session: &Session,
    contract: &DaoContract,
    confirmed: &Confirmed,
) -> Result<()> {
    let now = session.now().await?;
    let mut board = ProposalBoard::new();

    match board.refresh(contract, now, RefreshTrigger::ActionConfirmed).await {
        Ok(_) => {
            let proposal = board.get(confirmed.proposal.id).unwrap_or(&confirmed.proposal);
            print_confirmed(&confirmed.receipt, proposal, now);
        }
        // The action itself went through, fall back to what it read back
        Err(e) => {
            error!(target: "nftdao_cli", "Refresh after confirmation failed: {}", e);
            print_confirmed(&confirmed.receipt, &confirmed.proposal, now);
        }
    }

    Ok(())
}

async fn watch(session: &Session, contract: &DaoContract, max_sleep: Duration) -> Result<()> {
    let mut board = ProposalBoard::new();
    let now = session.now().await?;
    board.refresh(contract, now, RefreshTrigger::UserRequest).await?;
    print_proposals(board.proposals(), now);

    let mut sleep = board.next_wakeup(now, max_sleep);
    loop {
        debug!(target: "nftdao_cli::watch", "Sleeping for {:?}", sleep);
        Timer::after(sleep).await;
        sleep = max_sleep;

        // Clock failures are treated like read failures and retried later
        let now = match session.now().await {
            Ok(now) => now,
            Err(e) => {
                error!(target: "nftdao_cli::watch", "Failed reading current time: {}", e);
                continue
            }
        };

        let trigger = board.refresh_trigger(now);
        match board.refresh(contract, now, trigger).await {
            Ok(changes) => {
                print_phase_changes(&changes, now);
                sleep = board.next_wakeup(now, max_sleep);
            }
            // Read failures keep the last known state until the next round
            Err(e) => error!(target: "nftdao_cli::watch", "Refresh failed: {}", e),
        }
    }
}

async fn realmain(args: Args) -> Result<()> {
    let caller = args.caller.as_deref().map(parse_address).transpose()?;
    let dao_contract = parse_address(&args.dao_contract)?;
    let nft_contract = parse_address(&args.nft_contract)?;

    if args.chain_id != DEFAULT_CHAIN_ID {
        info!(target: "nftdao_cli", "Using non-default chain id {}", args.chain_id);
    }

    let mut session =
        Session::connect(args.endpoint, args.chain_id, caller, dao_contract, nft_contract).await?;
    session.chain_time = args.chain_time;

    let contract = DaoContract::new(&session).with_receipt_timing(
        Duration::from_millis(args.receipt_poll_interval),
        Duration::from_secs(args.receipt_timeout),
    );

    match args.command {
        Subcmd::Info => {
            let summary = fetch_summary(&contract, &session.caller).await?;
            let block = session.provider.block_number().await?;
            print_summary(&summary, session.chain_id, block);
            Ok(())
        }

        Subcmd::Proposals { id } => {
            let proposals = match id {
                Some(id) => vec![fetch_proposal(&contract, id).await?],
                None => fetch_proposals(&contract).await?,
            };

            print_proposals(&proposals, session.now().await?);
            Ok(())
        }

        Subcmd::Propose { nft_token_id } => {
            let Ok(nft_token_id) = U256::from_dec_str(&nft_token_id) else {
                return Err(Error::ParseFailed("Invalid NFT token id"))
            };
            let confirmed = action::create_proposal(&contract, &session, nft_token_id).await?;
            report_confirmed(&session, &contract, &confirmed).await
        }

        Subcmd::Vote { id, vote } => {
            let vote = Vote::from_str(&vote)?;
            let confirmed = action::vote(&contract, &session, id, vote).await?;
            report_confirmed(&session, &contract, &confirmed).await
        }

        Subcmd::Exec { id } => {
            let confirmed = action::execute(&contract, &session, id).await?;
            report_confirmed(&session, &contract, &confirmed).await
        }

        Subcmd::Watch => watch(&session, &contract, Duration::from_secs(args.watch_interval)).await,
    }
}

fn main() -> Result<()> {
    // Parse once without a config to find out which config file to use
    let args = parse_args("")?;
    let cfg_path = get_config_path(args.config, CONFIG_FILE)?;

    if spawn_config(&cfg_path, CONFIG_FILE_CONTENTS.as_bytes())? {
        eprintln!("Config file created in {:?}. Please review it and try again.", cfg_path);
        exit(2);
    }

    let args = parse_args(&fs::read_to_string(&cfg_path)?)?;
    init_logger(args.verbose as u64, args.log.as_deref())?;

    if let Err(e) = smol::block_on(realmain(args)) {
        if e.is_read_failure() {
            error!(target: "nftdao_cli", "Failed reading DAO state: {}", e);
        } else {
            error!(target: "nftdao_cli", "{}", e);
        }
        exit(1);
    }

    Ok(())
}
