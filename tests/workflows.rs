//! End-to-end workflow runs against a scripted chain.

use std::time::Duration;

use chronobond::bonds::{unix_now, AccountRequest, Amount, MintRequest, RedeemRequest, StrategyId};
use chronobond::chain::{ChainError, ChainOperation, FinalityOutcome, Payment};
use chronobond::transaction::{FlowKind, MintPhase, RedeemPhase};
use chronobond::workflow::WorkflowError;

mod common;
use common::ScriptedGateway;

fn mint_request(account: &str, token: &str) -> MintRequest {
    MintRequest {
        account: account.to_string(),
        amount: "100".into(),
        lockup_period: 90,
        strategy_id: "balanced".into(),
        payment_token: Some(token.into()),
    }
}

#[tokio::test]
async fn test_mint_with_flow_runs_setup_then_succeeds() {
    let gateway = ScriptedGateway::new();
    *gateway.setup_ready.lock().unwrap() = false;
    let (workflows, _notices) = common::workflows(gateway.clone(), None);
    let mut events = workflows.events().subscribe();
    let account = common::address(1);

    let status = workflows
        .mint(&mint_request(account.as_str(), "FLOW"))
        .await
        .unwrap();

    assert_eq!(status.state(), MintPhase::Success);
    assert!(status.tx_id().is_some());
    assert_eq!(*gateway.setup_submissions.lock().unwrap(), 1);

    let mut states = Vec::new();
    while let Ok(snapshot) = events.try_recv() {
        assert_eq!(snapshot.flow, FlowKind::Mint);
        assert_eq!(snapshot.key, account.as_str());
        if states.last() != Some(&snapshot.state) {
            states.push(snapshot.state);
        }
    }
    assert_eq!(states, vec!["checking", "setup", "minting", "success"]);

    let submitted = gateway.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(
        submitted[0],
        ChainOperation::MintBond {
            amount: Amount::from_whole(100).unwrap(),
            lockup_days: 90,
            strategy: StrategyId::Balanced,
            payment: Payment::Flow,
        }
    );
}

#[tokio::test]
async fn test_mint_skips_setup_for_ready_account() {
    let gateway = ScriptedGateway::new();
    let (workflows, _notices) = common::workflows(gateway.clone(), None);
    let mut events = workflows.events().subscribe();

    let status = workflows
        .mint(&mint_request(common::address(2).as_str(), "FLOW"))
        .await
        .unwrap();

    assert_eq!(status.state(), MintPhase::Success);
    assert_eq!(*gateway.setup_submissions.lock().unwrap(), 0);
    let mut saw_setup = false;
    while let Ok(snapshot) = events.try_recv() {
        saw_setup |= snapshot.state == "setup";
    }
    assert!(!saw_setup);
}

#[tokio::test]
async fn test_invalid_mint_touches_nothing() {
    let gateway = ScriptedGateway::new();
    let (workflows, _notices) = common::workflows(gateway.clone(), None);
    let account = common::address(3);
    let mut request = mint_request(account.as_str(), "FLOW");
    request.lockup_period = 45;

    let result = workflows.begin_mint(&request).await;
    assert!(matches!(result, Err(WorkflowError::Validation(_))));
    assert_eq!(workflows.snapshot(FlowKind::Mint, account.as_str()).state, "idle");
    assert!(gateway.submitted().is_empty());
}

#[tokio::test]
async fn test_declined_signature_ends_in_error() {
    let gateway = ScriptedGateway::new();
    gateway
        .submit_errors
        .lock()
        .unwrap()
        .push_back(ChainError::UserRejected);
    let (workflows, _notices) = common::workflows(gateway.clone(), None);

    let status = workflows
        .mint(&mint_request(common::address(4).as_str(), "FLOW"))
        .await
        .unwrap();

    assert_eq!(status.state(), MintPhase::Error);
    assert_eq!(
        status.status_string(),
        "Transaction cancelled: you declined to sign in your wallet"
    );
    assert!(status.tx_id().is_none());
}

#[tokio::test]
async fn test_usdc_mint_without_quote_is_refused() {
    let gateway = ScriptedGateway::new();
    let (workflows, _notices) = common::workflows(gateway.clone(), None);
    let account = common::address(5);

    let result = workflows.begin_mint(&mint_request(account.as_str(), "USDC")).await;

    assert!(matches!(result, Err(WorkflowError::QuoteUnavailable(_))));
    assert_eq!(workflows.snapshot(FlowKind::Mint, account.as_str()).state, "idle");
    assert!(gateway.submitted().is_empty());
}

#[tokio::test]
async fn test_usdc_mint_caps_input_with_slippage() {
    let expires_at = unix_now() + 120;
    let (swap_addr, recorded) = common::start_programmable_backend(move |_| async move {
        (
            200,
            format!(r#"{{"inputAmount":"20","price":"0.2","expiresAt":{}}}"#, expires_at),
        )
    })
    .await;
    let gateway = ScriptedGateway::new();
    let (workflows, _notices) =
        common::workflows(gateway.clone(), Some(format!("http://{}", swap_addr)));

    let status = workflows
        .mint(&mint_request(common::address(6).as_str(), "USDC"))
        .await
        .unwrap();

    assert_eq!(status.state(), MintPhase::Success);
    let requests = recorded.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/quote/exact-output");

    let expected_max = Amount::from_whole(20).unwrap().with_tolerance_bps(50).unwrap();
    match &gateway.submitted()[0] {
        ChainOperation::MintBond { payment, .. } => {
            assert_eq!(payment, &Payment::Usdc { max_input: expected_max });
        }
        other => panic!("unexpected operation {:?}", other),
    }
}

#[tokio::test]
async fn test_second_redeem_of_same_bond_is_busy() {
    let gateway = ScriptedGateway::new();
    *gateway.finality_delay.lock().unwrap() = Duration::from_millis(100);
    let (workflows, _notices) = common::workflows(gateway.clone(), None);
    let request = RedeemRequest {
        account: common::address(7).to_string(),
        bond_id: 42,
    };

    let first = workflows.begin_redeem(&request).unwrap();
    assert!(matches!(
        workflows.begin_redeem(&request),
        Err(WorkflowError::Busy { flow: FlowKind::Redeem, .. })
    ));

    let status = first.run().await;
    assert_eq!(status.state(), RedeemPhase::Success);

    // A finished result does not block a new attempt.
    let again = workflows.redeem(&request).await.unwrap();
    assert_eq!(again.state(), RedeemPhase::Success);
}

#[tokio::test]
async fn test_dropped_flight_records_interruption() {
    let gateway = ScriptedGateway::new();
    let (workflows, _notices) = common::workflows(gateway.clone(), None);
    let request = RedeemRequest {
        account: common::address(8).to_string(),
        bond_id: 9,
    };

    drop(workflows.begin_redeem(&request).unwrap());

    let snapshot = workflows.snapshot(FlowKind::Redeem, "9");
    assert_eq!(snapshot.state, "error");
    assert!(workflows.begin_redeem(&request).is_ok());
}

#[tokio::test]
async fn test_redeem_all_outcomes_are_independent() {
    let gateway = ScriptedGateway::new();
    let account = common::address(9);
    let now = unix_now();
    {
        let mut bonds = gateway.bonds.lock().unwrap();
        bonds.push(common::bond(1, &account, now - 10));
        bonds.push(common::bond(2, &account, now - 10));
        bonds.push(common::bond(3, &account, now - 10));
        bonds.push(common::bond(4, &account, now + 86_400));
        bonds.push(common::bond(5, &common::address(10), now - 10));
    }
    {
        let mut outcomes = gateway.redeem_outcomes.lock().unwrap();
        outcomes.insert(2, FinalityOutcome::Reverted("bond not matured on-chain".into()));
        outcomes.insert(3, FinalityOutcome::Expired);
    }
    let (workflows, _notices) = common::workflows(gateway.clone(), None);

    let results = workflows
        .redeem_all(&AccountRequest {
            account: account.to_string(),
        })
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    let state_of = |key: &str| {
        results
            .iter()
            .find(|snapshot| snapshot.key == key)
            .map(|snapshot| snapshot.state)
    };
    assert_eq!(state_of("1"), Some("success"));
    assert_eq!(state_of("2"), Some("error"));
    assert_eq!(state_of("3"), Some("error"));
    assert_eq!(state_of("4"), None);

    let reverted = workflows.snapshot(FlowKind::Redeem, "2");
    assert!(reverted.status_string.contains("bond not matured on-chain"));
    assert!(reverted.tx_id.is_some());

    let mut redeemed: Vec<u64> = gateway
        .submitted()
        .into_iter()
        .filter_map(|op| match op {
            ChainOperation::RedeemBond { bond_id } => Some(bond_id),
            _ => None,
        })
        .collect();
    redeemed.sort_unstable();
    assert_eq!(redeemed, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_redeem_all_reports_bonds_already_in_flight() {
    let gateway = ScriptedGateway::new();
    *gateway.finality_delay.lock().unwrap() = Duration::from_millis(100);
    let account = common::address(11);
    let now = unix_now();
    gateway.bonds.lock().unwrap().push(common::bond(7, &account, now - 1));
    gateway.bonds.lock().unwrap().push(common::bond(8, &account, now - 1));
    let (workflows, _notices) = common::workflows(gateway.clone(), None);

    let single = workflows
        .begin_redeem(&RedeemRequest {
            account: account.to_string(),
            bond_id: 7,
        })
        .unwrap();
    let batch = workflows
        .begin_redeem_all(&AccountRequest {
            account: account.to_string(),
        })
        .await
        .unwrap();

    let snapshots = batch.snapshots();
    assert_eq!(snapshots.len(), 2);
    let (ran, _) = tokio::join!(single.run(), batch.run());
    assert_eq!(ran.state(), RedeemPhase::Success);
    assert_eq!(
        gateway
            .submitted()
            .iter()
            .filter(|op| matches!(op, ChainOperation::RedeemBond { bond_id: 7 }))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_flows_do_not_block_each_other() {
    let gateway = ScriptedGateway::new();
    *gateway.finality_delay.lock().unwrap() = Duration::from_millis(50);
    let (workflows, _notices) = common::workflows(gateway.clone(), None);
    let account = common::address(12);

    let mint = workflows
        .begin_mint(&mint_request(account.as_str(), "FLOW"))
        .await
        .unwrap();
    let redeem = workflows
        .begin_redeem(&RedeemRequest {
            account: account.to_string(),
            bond_id: 1,
        })
        .unwrap();

    let (minted, redeemed) = tokio::join!(mint.run(), redeem.run());
    assert_eq!(minted.state(), MintPhase::Success);
    assert_eq!(redeemed.state(), RedeemPhase::Success);
    assert_eq!(workflows.snapshots().len(), 2);
}

#[tokio::test]
async fn test_failed_account_check_submits_nothing() {
    let gateway = ScriptedGateway::new();
    *gateway.setup_check_error.lock().unwrap() = Some(ChainError::Transport("bridge down".into()));
    let (workflows, _notices) = common::workflows(gateway.clone(), None);

    let status = workflows
        .mint(&mint_request(common::address(13).as_str(), "FLOW"))
        .await
        .unwrap();

    assert_eq!(status.state(), MintPhase::Error);
    assert!(status.status_string().starts_with("Account check failed"));
    assert!(status.tx_id().is_none());
    assert_eq!(*gateway.setup_submissions.lock().unwrap(), 0);
    assert!(gateway.submitted().is_empty());
}

#[tokio::test]
async fn test_failed_setup_submits_nothing() {
    let gateway = ScriptedGateway::new();
    *gateway.setup_ready.lock().unwrap() = false;
    *gateway.setup_submit_error.lock().unwrap() = Some(ChainError::Rejected("no storage".into()));
    let (workflows, _notices) = common::workflows(gateway.clone(), None);

    let status = workflows
        .mint(&mint_request(common::address(14).as_str(), "FLOW"))
        .await
        .unwrap();

    assert_eq!(status.state(), MintPhase::Error);
    assert_eq!(
        status.status_string(),
        "Account setup failed: rejected by the network: no storage"
    );
    assert!(status.tx_id().is_none());
    assert!(gateway.submitted().is_empty());
}

#[tokio::test]
async fn test_unsealed_setup_submits_nothing() {
    let gateway = ScriptedGateway::new();
    *gateway.setup_ready.lock().unwrap() = false;
    *gateway.setup_outcome.lock().unwrap() = Some(FinalityOutcome::Expired);
    let (workflows, _notices) = common::workflows(gateway.clone(), None);

    let status = workflows
        .mint(&mint_request(common::address(15).as_str(), "FLOW"))
        .await
        .unwrap();

    assert_eq!(status.state(), MintPhase::Error);
    assert!(status.status_string().ends_with("the operation was not submitted"));
    assert!(status.tx_id().is_none());
    assert_eq!(*gateway.setup_submissions.lock().unwrap(), 1);
    assert!(gateway.submitted().is_empty());
}

#[tokio::test]
async fn test_quote_expiring_during_setup_is_not_submitted() {
    let expires_at = unix_now() + 2;
    let (swap_addr, _) = common::start_programmable_backend(move |_| async move {
        (200, format!(r#"{{"inputAmount":"20","expiresAt":{}}}"#, expires_at))
    })
    .await;
    let gateway = ScriptedGateway::new();
    *gateway.setup_ready.lock().unwrap() = false;
    *gateway.finality_delay.lock().unwrap() = Duration::from_secs(3);
    let (workflows, _notices) =
        common::workflows(gateway.clone(), Some(format!("http://{}", swap_addr)));

    let status = workflows
        .mint(&mint_request(common::address(16).as_str(), "USDC"))
        .await
        .unwrap();

    assert_eq!(status.state(), MintPhase::Error);
    assert!(status.status_string().contains("quote expired"));
    assert!(status.tx_id().is_none());
    assert_eq!(*gateway.setup_submissions.lock().unwrap(), 1);
    assert!(gateway.submitted().is_empty());
}

#[tokio::test]
async fn test_usdc_mint_with_zero_quote_is_refused() {
    let (swap_addr, _) = common::start_mock_backend(200, r#"{"inputAmount":"0"}"#).await;
    let gateway = ScriptedGateway::new();
    let (workflows, _notices) =
        common::workflows(gateway.clone(), Some(format!("http://{}", swap_addr)));
    let account = common::address(17);

    let result = workflows.begin_mint(&mint_request(account.as_str(), "USDC")).await;

    assert!(matches!(result, Err(WorkflowError::QuoteUnavailable(_))));
    assert_eq!(workflows.snapshot(FlowKind::Mint, account.as_str()).state, "idle");
    assert!(gateway.submitted().is_empty());
}

#[tokio::test]
async fn test_failed_refresh_keeps_success() {
    let gateway = ScriptedGateway::new();
    *gateway.bond_query_error.lock().unwrap() = Some(ChainError::Transport("bridge down".into()));
    let (workflows, _notices) = common::workflows(gateway.clone(), None);
    let account = common::address(18);

    let status = workflows
        .mint(&mint_request(account.as_str(), "FLOW"))
        .await
        .unwrap();
    assert_eq!(status.state(), MintPhase::Success);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*gateway.bond_queries.lock().unwrap(), 1);
    assert!(workflows.cache().bonds_refreshed_at(&account).is_none());
    let snapshot = workflows.snapshot(FlowKind::Mint, account.as_str());
    assert_eq!(snapshot.state, "success");
    assert!(snapshot.tx_id.is_some());
}

#[tokio::test]
async fn test_redeem_all_refreshes_bonds_once() {
    let gateway = ScriptedGateway::new();
    let account = common::address(19);
    let now = unix_now();
    {
        let mut bonds = gateway.bonds.lock().unwrap();
        for id in 20..24 {
            bonds.push(common::bond(id, &account, now - 5));
        }
    }
    let (workflows, _notices) = common::workflows(gateway.clone(), None);

    let results = workflows
        .redeem_all(&AccountRequest {
            account: account.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(results.len(), 4);

    tokio::time::sleep(Duration::from_millis(100)).await;
    // One read to pick the matured bonds, one refresh afterwards.
    assert_eq!(*gateway.bond_queries.lock().unwrap(), 2);
    assert!(workflows.cache().bonds_refreshed_at(&account).is_some());
}
