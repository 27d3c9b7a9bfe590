//! Search against a live node
//!
//! Needs RPC_URL, GOVERNANCE_ADDRESS and APPLICANT_ADDRESS pointing at a
//! deployment. Run with `cargo test -- --ignored`.

use std::sync::Arc;

use alloy_primitives::Address;
use humanity_status::core::{DeploymentBlocks, StatusChecker};
use humanity_status::infrastructure::abi::ContractSet;
use humanity_status::infrastructure::{create_chain_client, ProviderConfig};

fn env_address(name: &str) -> Address {
    std::env::var(name)
        .unwrap_or_else(|_| panic!("{name} must be set"))
        .parse()
        .unwrap_or_else(|_| panic!("{name} must be an address"))
}

#[tokio::test]
#[ignore]
async fn test_live_proposal_search() {
    let rpc_url =
        std::env::var("RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8545".to_string());
    let contracts = ContractSet::builtin(
        env_address("GOVERNANCE_ADDRESS"),
        env_address("APPLICANT_ADDRESS"),
    )
    .expect("built-in ABIs parse");

    let client = create_chain_client(ProviderConfig::Http(rpc_url), contracts)
        .await
        .expect("should connect");
    let head = client.head_block().await.expect("should get block number");
    println!("✓ Head block: {}", head);
    assert!(head > DeploymentBlocks::MAINNET.governance);

    let checker = StatusChecker::new(Arc::new(client), DeploymentBlocks::MAINNET);
    let report = checker.search("136").await.expect("search should succeed");
    let view = report.view.expect("identifier searches always carry a view");

    println!(
        "✓ Proposal {}: {} votes, {} removed, {} applications",
        view.proposal_id,
        view.votes.len(),
        view.removed_votes.len(),
        view.applications.len()
    );
    assert_eq!(view.proposal.id, "136");
    assert!(view.result.is_some());
    assert!(view.votes.iter().all(|v| v.proposal_id == "136"));
}
