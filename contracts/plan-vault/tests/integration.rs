use cosmwasm_std::{coins, Addr, Uint128};
use cw_multi_test::{App, ContractWrapper, Executor};

use plan_vault::contract::{execute, instantiate, query};
use plan_vault::error::ContractError;
use plan_vault::msg::{
    BeneficiaryInput, ExecuteMsg, InstantiateMsg, PlanResponse, QueryMsg,
};
use plan_vault::state::PlanStatus;
use shared::commitment::{
    combined, commit_claim_code, commit_email, commit_name, commit_relationship,
};
use shared::schedule::DistributionMethod;

const DENOM: &str = "uatom";

fn beneficiary_input(
    name: &str,
    email: &str,
    relationship: &str,
    code: &str,
    share_bps: u16,
) -> BeneficiaryInput {
    let name_c = commit_name(name);
    let email_c = commit_email(email);
    let rel_c = commit_relationship(relationship);
    let combined_c = combined(&name_c, &email_c, &rel_c);
    BeneficiaryInput {
        name_commitment: name_c,
        email_commitment: email_c,
        relationship_commitment: rel_c,
        combined_commitment: combined_c,
        claim_code_commitment: commit_claim_code(code),
        share_bps,
    }
}

fn setup() -> (App, Addr) {
    let mut app = App::new(|router, _api, storage| {
        router
            .bank
            .init_balance(storage, &Addr::unchecked("alice"), coins(2000, DENOM))
            .unwrap();
    });

    let code_id = app.store_code(Box::new(ContractWrapper::new(execute, instantiate, query)));
    let contract = app
        .instantiate_contract(
            code_id,
            Addr::unchecked("deployer"),
            &InstantiateMsg {
                fee_collector: "collector".to_string(),
                creation_fee_bps: None,
                service_fee_bps: None,
            },
            &[],
            "plan-vault",
            None,
        )
        .unwrap();
    (app, contract)
}

fn create_lump_sum(app: &mut App, contract: &Addr, transfer_date: u64) {
    let msg = ExecuteMsg::CreatePlan {
        denom: DENOM.to_string(),
        amount: Uint128::new(1000),
        method: DistributionMethod::LumpSum,
        transfer_date: Some(transfer_date),
        periodic_percent: None,
        beneficiaries: vec![
            beneficiary_input("Alice Doe", "alice@example.com", "daughter", "AB12CD", 6000),
            beneficiary_input("Bob Doe", "bob@example.com", "son", "EF34GH", 4000),
        ],
    };
    app.execute_contract(
        Addr::unchecked("alice"),
        contract.clone(),
        &msg,
        &coins(1050, DENOM),
    )
    .unwrap();
}

fn balance(app: &App, account: &str) -> u128 {
    app.wrap()
        .query_balance(account, DENOM)
        .unwrap()
        .amount
        .u128()
}

#[test]
fn full_lifecycle_moves_funds() {
    let (mut app, contract) = setup();
    let transfer_date = app.block_info().time.seconds() + 1000;

    create_lump_sum(&mut app, &contract, transfer_date);

    // Owner paid 1050: 930 locked, 120 collected
    assert_eq!(balance(&app, "alice"), 950);
    assert_eq!(balance(&app, contract.as_str()), 930);
    assert_eq!(balance(&app, "collector"), 120);

    app.update_block(|block| block.time = block.time.plus_seconds(1000));

    let claim = |code: &str, name: &str, email: &str, rel: &str| ExecuteMsg::Claim {
        plan_id: 1,
        claim_code: code.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        relationship: rel.to_string(),
    };

    app.execute_contract(
        Addr::unchecked("heir1"),
        contract.clone(),
        &claim("AB12CD", "Alice Doe", "alice@example.com", "daughter"),
        &[],
    )
    .unwrap();
    assert_eq!(balance(&app, "heir1"), 558);
    assert_eq!(balance(&app, contract.as_str()), 372);

    app.execute_contract(
        Addr::unchecked("heir2"),
        contract.clone(),
        &claim("EF34GH", "Bob Doe", "bob@example.com", "son"),
        &[],
    )
    .unwrap();
    assert_eq!(balance(&app, "heir2"), 372);
    assert_eq!(balance(&app, contract.as_str()), 0);

    let plan: PlanResponse = app
        .wrap()
        .query_wasm_smart(&contract, &QueryMsg::GetPlan { plan_id: 1 })
        .unwrap();
    assert_eq!(plan.status, PlanStatus::Executed);
}

#[test]
fn cancel_refunds_remaining_escrow() {
    let (mut app, contract) = setup();
    let transfer_date = app.block_info().time.seconds() + 1000;

    create_lump_sum(&mut app, &contract, transfer_date);
    assert_eq!(balance(&app, "alice"), 950);

    app.execute_contract(
        Addr::unchecked("alice"),
        contract.clone(),
        &ExecuteMsg::CancelPlan { plan_id: 1 },
        &[],
    )
    .unwrap();

    // Net escrow comes back; fees stay collected
    assert_eq!(balance(&app, "alice"), 1880);
    assert_eq!(balance(&app, contract.as_str()), 0);
    assert_eq!(balance(&app, "collector"), 120);

    let plan: PlanResponse = app
        .wrap()
        .query_wasm_smart(&contract, &QueryMsg::GetPlan { plan_id: 1 })
        .unwrap();
    assert_eq!(plan.status, PlanStatus::Cancelled);
}

#[test]
fn underfunded_create_moves_nothing() {
    let (mut app, contract) = setup();
    let transfer_date = app.block_info().time.seconds() + 1000;

    let msg = ExecuteMsg::CreatePlan {
        denom: DENOM.to_string(),
        amount: Uint128::new(1000),
        method: DistributionMethod::LumpSum,
        transfer_date: Some(transfer_date),
        periodic_percent: None,
        beneficiaries: vec![beneficiary_input(
            "Alice Doe",
            "alice@example.com",
            "daughter",
            "AB12CD",
            10_000,
        )],
    };
    let err = app
        .execute_contract(
            Addr::unchecked("alice"),
            contract.clone(),
            &msg,
            &coins(1000, DENOM),
        )
        .unwrap_err();
    assert!(matches!(
        err.downcast::<ContractError>().unwrap(),
        ContractError::InsufficientFunds {}
    ));

    // Failed lock reverses completely
    assert_eq!(balance(&app, "alice"), 2000);
    assert_eq!(balance(&app, contract.as_str()), 0);
    assert!(app
        .wrap()
        .query_wasm_smart::<PlanResponse>(&contract, &QueryMsg::GetPlan { plan_id: 1 })
        .is_err());
}
