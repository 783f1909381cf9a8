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

//! End-to-end tests against an in-process mock EVM node speaking
//! JSON-RPC over HTTP.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use ethers_core::{
    abi::{decode, ParamType, Token},
    utils::id,
};
use smol::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use tinyjson::JsonValue;
use url::Url;

use nftdao::{
    dao::{
        action, fetch_proposals, fetch_summary, model::Phase, DaoContract, DaoReader, DaoWriter,
        Vote,
    },
    eth::{parse_address, Address, U256, U64},
    rpc::jsonrpc::{ErrorCode, JsonError, JsonResponse},
    session::Session,
    util::{parse::format_ether, time::Timestamp},
    Error, Result,
};

const CALLER: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
const OUTSIDER: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
const DAO: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";
const NFT: &str = "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb";

#[derive(Clone)]
struct MockProposal {
    nft_token_id: u64,
    deadline: u64,
    yes: u64,
    no: u64,
    executed: bool,
}

#[derive(Default)]
struct NodeState {
    proposals: Vec<MockProposal>,
    holders: HashMap<Address, u64>,
    /// Transaction hash -> (success, receipt polls seen so far)
    receipts: HashMap<String, (bool, u32)>,
    tx_count: u64,
}

struct MockNode {
    state: Mutex<NodeState>,
}

fn word(v: u64) -> Vec<u8> {
    let mut w = vec![0u8; 32];
    w[24..].copy_from_slice(&v.to_be_bytes());
    w
}

fn hex_data(data: &[u8]) -> JsonValue {
    JsonValue::String(format!("0x{}", hex::encode(data)))
}

fn quantity(v: u64) -> JsonValue {
    JsonValue::String(format!("0x{:x}", v))
}

fn tx_field(params: &JsonValue, key: &str) -> String {
    let params: &Vec<JsonValue> = params.get().unwrap();
    let tx: &HashMap<String, JsonValue> = params[0].get().unwrap();
    tx[key].get::<String>().unwrap().clone()
}

fn call_data(params: &JsonValue) -> Vec<u8> {
    hex::decode(tx_field(params, "data").trim_start_matches("0x")).unwrap()
}

/// Selector and decoded `uint256` arguments of a contract call
fn call_args(data: &[u8], uints: usize) -> ([u8; 4], Vec<u64>) {
    let sel: [u8; 4] = data[..4].try_into().unwrap();
    let args = decode(&vec![ParamType::Uint(256); uints], &data[4..])
        .unwrap()
        .into_iter()
        .map(|t| t.into_uint().unwrap().as_u64())
        .collect();
    (sel, args)
}

impl MockNode {
    fn new() -> Self {
        let now = Timestamp::current_time().inner();
        let state = NodeState {
            proposals: vec![
                // Voting closed, 5 yes against 3 no
                MockProposal { nft_token_id: 11, deadline: now - 60, yes: 5, no: 3, executed: false },
                // Still open
                MockProposal { nft_token_id: 22, deadline: now + 3600, yes: 1, no: 1, executed: false },
                // Already executed
                MockProposal { nft_token_id: 33, deadline: now - 7200, yes: 2, no: 2, executed: true },
            ],
            holders: HashMap::from([(parse_address(CALLER).unwrap(), 2)]),
            ..Default::default()
        };

        Self { state: Mutex::new(state) }
    }

    fn handle(&self, method: &str, params: &JsonValue) -> std::result::Result<JsonValue, String> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;

        match method {
            "eth_chainId" => Ok(quantity(5)),
            "eth_accounts" => Ok(JsonValue::Array(vec![JsonValue::String(CALLER.to_lowercase())])),
            "eth_getBalance" => Ok(JsonValue::String("0x14d1120d7b160000".to_string())),
            "eth_call" => {
                let data = call_data(params);
                let sel: [u8; 4] = data[..4].try_into().unwrap();

                if sel == id("numProposals()") {
                    return Ok(hex_data(&word(state.proposals.len() as u64)))
                }

                if sel == id("proposals(uint256)") {
                    let (_, args) = call_args(&data, 1);
                    let Some(p) = state.proposals.get(args[0] as usize) else {
                        return Err("execution reverted".to_string())
                    };
                    let ret = [
                        word(p.nft_token_id),
                        word(p.deadline),
                        word(p.yes),
                        word(p.no),
                        word(p.executed as u64),
                    ]
                    .concat();
                    return Ok(hex_data(&ret))
                }

                if sel == id("balanceOf(address)") {
                    let tokens = decode(&[ParamType::Address], &data[4..]).unwrap();
                    let Some(Token::Address(owner)) = tokens.into_iter().next() else {
                        return Err("invalid address argument".to_string())
                    };
                    let balance = state.holders.get(&owner).copied().unwrap_or(0);
                    return Ok(hex_data(&word(balance)))
                }

                Err("unknown selector".to_string())
            }
            "eth_sendTransaction" => {
                let data = call_data(params);
                let sel: [u8; 4] = data[..4].try_into().unwrap();
                let now = Timestamp::current_time().inner();

                let success = if sel == id("createProposal(uint256)") {
                    let nft_token_id = call_args(&data, 1).1[0];
                    state.proposals.push(MockProposal {
                        nft_token_id,
                        deadline: now + 3600,
                        yes: 0,
                        no: 0,
                        executed: false,
                    });
                    true
                } else if sel == id("voteOnProposal(uint256,uint8)") {
                    let (_, args) = call_args(&data, 2);
                    let vote = args[1];
                    let Some(p) = state.proposals.get_mut(args[0] as usize) else {
                        return Err("execution reverted: no such proposal".to_string())
                    };
                    if vote == 0 {
                        p.yes += 1;
                    } else {
                        p.no += 1;
                    }
                    true
                } else if sel == id("executeProposal(uint256)") {
                    let (_, args) = call_args(&data, 1);
                    let p = &mut state.proposals[args[0] as usize];
                    // Reverts on chain while voting is still open
                    if p.deadline > now || p.executed {
                        false
                    } else {
                        p.executed = true;
                        true
                    }
                } else {
                    return Err("unknown selector".to_string())
                };

                state.tx_count += 1;
                let hash = format!("0x{:064x}", state.tx_count);
                state.receipts.insert(hash.clone(), (success, 0));
                Ok(JsonValue::String(hash))
            }
            "eth_getTransactionReceipt" => {
                let params: &Vec<JsonValue> = params.get().unwrap();
                let hash = params[0].get::<String>().unwrap().clone();
                let Some((success, polls)) = state.receipts.get_mut(&hash) else {
                    return Ok(JsonValue::Null)
                };

                // First poll sees the transaction as pending
                *polls += 1;
                if *polls == 1 {
                    return Ok(JsonValue::Null)
                }

                Ok(JsonValue::Object(HashMap::from([
                    ("transactionHash".to_string(), JsonValue::String(hash)),
                    ("transactionIndex".to_string(), quantity(0)),
                    ("blockHash".to_string(), hex_data(&[0x42; 32])),
                    ("blockNumber".to_string(), quantity(100 + state.tx_count)),
                    ("from".to_string(), JsonValue::String(CALLER.to_lowercase())),
                    ("to".to_string(), JsonValue::String(DAO.to_lowercase())),
                    ("cumulativeGasUsed".to_string(), quantity(21000)),
                    ("gasUsed".to_string(), quantity(21000)),
                    ("contractAddress".to_string(), JsonValue::Null),
                    ("logs".to_string(), JsonValue::Array(vec![])),
                    ("logsBloom".to_string(), hex_data(&[0; 256])),
                    ("status".to_string(), quantity(*success as u64)),
                ])))
            }
            _ => Err(format!("method {} not found", method)),
        }
    }

    fn reply(&self, body: &str) -> String {
        let req: JsonValue = body.parse().unwrap();
        let req: &HashMap<String, JsonValue> = req.get().unwrap();
        let id = *req["id"].get::<f64>().unwrap() as u16;
        let method = req["method"].get::<String>().unwrap();

        match self.handle(method, &req["params"]) {
            Ok(result) => JsonResponse::new(result, id).stringify().unwrap(),
            Err(msg) => JsonError::new(ErrorCode::ServerError(-32000), Some(msg), id)
                .stringify()
                .unwrap(),
        }
    }
}

async fn read_body(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = vec![];
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(String::new())
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        let Some(pos) = text.find("\r\n\r\n") else { continue };
        let len = text[..pos]
            .lines()
            .find_map(|l| l.to_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);

        if buf.len() >= pos + 4 + len {
            return Ok(text[pos + 4..pos + 4 + len].to_string())
        }
    }
}

async fn serve(listener: TcpListener, node: Arc<MockNode>) {
    while let Ok((mut stream, _)) = listener.accept().await {
        let node = node.clone();
        smol::spawn(async move {
            let Ok(body) = read_body(&mut stream).await else { return };
            let reply = node.reply(&body);
            let rep = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                reply.len(),
                reply
            );
            let _ = stream.write_all(rep.as_bytes()).await;
            let _ = stream.flush().await;
        })
        .detach();
    }
}

async fn spawn_node() -> Result<Url> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let endpoint = Url::parse(&format!("http://127.0.0.1:{}/", listener.local_addr()?.port()))?;
    smol::spawn(serve(listener, Arc::new(MockNode::new()))).detach();
    Ok(endpoint)
}

async fn connect(endpoint: Url, caller: Option<&str>) -> Result<(Session, DaoContract)> {
    let caller = caller.map(parse_address).transpose()?;
    let session =
        Session::connect(endpoint, 5, caller, parse_address(DAO)?, parse_address(NFT)?).await?;
    let contract = DaoContract::new(&session)
        .with_receipt_timing(Duration::from_millis(10), Duration::from_secs(5));
    Ok((session, contract))
}

#[test]
fn session_setup() -> Result<()> {
    smol::block_on(async {
        let endpoint = spawn_node().await?;

        // Caller defaults to the first provider account
        let (session, _) = connect(endpoint.clone(), None).await?;
        assert_eq!(session.caller, parse_address(CALLER)?);
        assert_eq!(session.chain_id, 5);

        let dao = parse_address(DAO)?;
        let nft = parse_address(NFT)?;
        match Session::connect(endpoint, 1, None, dao, nft).await {
            Err(Error::ChainIdMismatch(expected, got)) => assert_eq!((expected, got), (1, 5)),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("connected to the wrong chain"),
        }

        Ok(())
    })
}

#[test]
fn reads() -> Result<()> {
    smol::block_on(async {
        let (session, contract) = connect(spawn_node().await?, None).await?;
        let now = session.now().await?;

        let summary = fetch_summary(&contract, &session.caller).await?;
        assert_eq!(summary.proposal_count, 3);
        assert_eq!(summary.nft_balance, 2);
        assert_eq!(format_ether(summary.treasury), "1.5");

        let proposals = fetch_proposals(&contract).await?;
        assert_eq!(proposals.iter().map(|p| p.id).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(proposals[0].nft_token_id, U256::from(11u64));
        assert_eq!(proposals[0].phase(now), Phase::AwaitingExecution);
        assert_eq!(proposals[1].phase(now), Phase::Voting);
        assert_eq!(proposals[2].phase(now), Phase::Executed);

        Ok(())
    })
}

#[test]
fn guarded_actions() -> Result<()> {
    smol::block_on(async {
        let endpoint = spawn_node().await?;
        let (session, contract) = connect(endpoint.clone(), None).await?;

        let confirmed = action::vote(&contract, &session, 1, Vote::Yes).await?;
        assert_eq!(confirmed.receipt.status, Some(U64::one()));
        assert_eq!(confirmed.receipt.from, session.caller);
        assert_eq!((confirmed.proposal.yes_votes, confirmed.proposal.no_votes), (2, 1));

        // Voting is over for proposal 0
        match action::vote(&contract, &session, 0, Vote::No).await {
            Err(Error::ActionNotPermitted(id, _, phase)) => {
                assert_eq!(id, 0);
                assert_eq!(phase, Phase::AwaitingExecution.to_string());
            }
            other => panic!("unexpected result: {:?}", other.map(|c| c.proposal)),
        }

        let confirmed = action::execute(&contract, &session, 0).await?;
        assert!(confirmed.proposal.executed);
        assert!(matches!(
            action::execute(&contract, &session, 0).await,
            Err(Error::ActionNotPermitted(0, _, _))
        ));

        let confirmed = action::create_proposal(&contract, &session, U256::from(44u64)).await?;
        assert_eq!(confirmed.proposal.id, 3);
        assert_eq!(confirmed.proposal.nft_token_id, U256::from(44u64));
        assert_eq!(contract.proposal_count().await?, 4);

        // Callers without an NFT are refused locally
        let (outsider, contract) = connect(endpoint, Some(OUTSIDER)).await?;
        assert!(matches!(
            action::vote(&contract, &outsider, 1, Vote::No).await,
            Err(Error::NotNftHolder)
        ));
        assert!(matches!(
            action::create_proposal(&contract, &outsider, U256::from(1u64)).await,
            Err(Error::NotNftHolder)
        ));

        Ok(())
    })
}

#[test]
fn rejected_writes() -> Result<()> {
    smol::block_on(async {
        let (session, contract) = connect(spawn_node().await?, None).await?;

        // Mined but reverted
        assert!(matches!(contract.submit_execute(&session, 1).await, Err(Error::ActionRejected(_))));

        // Refused before being mined
        match contract.submit_vote(&session, 9, Vote::Yes).await {
            Err(Error::ActionRejected(msg)) => assert!(msg.contains("no such proposal")),
            other => panic!("unexpected result: {:?}", other),
        }

        Ok(())
    })
}
