use cosmwasm_std::{
    entry_point, to_json_binary, BankMsg, Binary, Coin, Deps, DepsMut, Env, MessageInfo, Order,
    Response, StdError, StdResult, Uint128,
};
use cw2::set_contract_version;
use shared::commitment::{commit_claim_code, commit_identity};
use shared::fees::{
    allocate_shares, fee_breakdown, BPS_DENOMINATOR, DEFAULT_CREATION_FEE_BPS,
    DEFAULT_SERVICE_FEE_BPS,
};
use shared::schedule::{derive, DistributionMethod};

use crate::error::ContractError;
use crate::msg::{
    BeneficiariesResponse, BeneficiaryInput, BeneficiaryResponse, ClaimableResponse,
    ConfigResponse, EscrowResponse, ExecuteMsg, InstantiateMsg, PlanResponse, PlansResponse,
    QueryMsg, ScheduleResponse, VerifyClaimResponse,
};
use crate::state::{
    Beneficiary, Config, EscrowAccount, Plan, PlanStatus, BENEFICIARIES, CONFIG, ESCROWS,
    NEXT_ESCROW_ID, NEXT_PLAN_ID, OWNER_PLANS, PLANS, SCHEDULES,
};

const CONTRACT_NAME: &str = "crates.io:plan-vault";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = Config {
        fee_collector: deps.api.addr_validate(&msg.fee_collector)?,
        creation_fee_bps: msg.creation_fee_bps.unwrap_or(DEFAULT_CREATION_FEE_BPS),
        service_fee_bps: msg.service_fee_bps.unwrap_or(DEFAULT_SERVICE_FEE_BPS),
    };
    if config.creation_fee_bps + config.service_fee_bps >= BPS_DENOMINATOR {
        return Err(ContractError::InvalidFeeConfig {});
    }
    CONFIG.save(deps.storage, &config)?;

    NEXT_PLAN_ID.save(deps.storage, &1u64)?;
    NEXT_ESCROW_ID.save(deps.storage, &1u64)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("fee_collector", config.fee_collector)
        .add_attribute("creation_fee_bps", config.creation_fee_bps.to_string())
        .add_attribute("service_fee_bps", config.service_fee_bps.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreatePlan {
            denom,
            amount,
            method,
            transfer_date,
            periodic_percent,
            beneficiaries,
        } => execute_create_plan(
            deps,
            env,
            info,
            denom,
            amount,
            method,
            transfer_date,
            periodic_percent,
            beneficiaries,
        ),
        ExecuteMsg::PausePlan { plan_id } => execute_pause_plan(deps, info, plan_id),
        ExecuteMsg::ResumePlan { plan_id } => execute_resume_plan(deps, info, plan_id),
        ExecuteMsg::CancelPlan { plan_id } => execute_cancel_plan(deps, info, plan_id),
        ExecuteMsg::Claim {
            plan_id,
            claim_code,
            name,
            email,
            relationship,
        } => execute_claim(deps, env, info, plan_id, claim_code, name, email, relationship),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn execute_create_plan(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    denom: String,
    amount: Uint128,
    method: DistributionMethod,
    transfer_date: Option<u64>,
    periodic_percent: Option<u64>,
    beneficiaries: Vec<BeneficiaryInput>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let now = env.block.time.seconds();

    // All validation happens before any state write so a failed creation
    // leaves no half-created plan behind.
    let fees = fee_breakdown(amount, config.creation_fee_bps, config.service_fee_bps)?;
    let schedule = derive(fees.net_amount, method, transfer_date, periodic_percent, now)?;

    let shares_bps: Vec<u16> = beneficiaries.iter().map(|b| b.share_bps).collect();
    let allocated = allocate_shares(fees.net_amount, &shares_bps)?;

    let mut seen_codes: Vec<&str> = Vec::with_capacity(beneficiaries.len());
    for input in &beneficiaries {
        let commitments = [
            input.name_commitment.as_str(),
            input.email_commitment.as_str(),
            input.relationship_commitment.as_str(),
            input.combined_commitment.as_str(),
            input.claim_code_commitment.as_str(),
        ];
        if commitments.iter().any(|c| c.len() != 64) {
            return Err(ContractError::InvalidCommitment {});
        }
        // Claim codes are per-beneficiary; a duplicate commitment would make
        // the per-code scan ambiguous
        if seen_codes.contains(&input.claim_code_commitment.as_str()) {
            return Err(ContractError::InvalidCommitment {});
        }
        seen_codes.push(&input.claim_code_commitment);
    }

    // The lock debits amount + creation fee in one transfer; the attached
    // funds must cover it exactly
    match info.funds.as_slice() {
        [Coin {
            denom: paid_denom,
            amount: paid,
        }] if *paid_denom == denom && *paid == fees.total_debit => {}
        _ => return Err(ContractError::InsufficientFunds {}),
    }

    let plan_id = NEXT_PLAN_ID.load(deps.storage)?;
    NEXT_PLAN_ID.save(deps.storage, &(plan_id + 1))?;
    let escrow_id = NEXT_ESCROW_ID.load(deps.storage)?;
    NEXT_ESCROW_ID.save(deps.storage, &(escrow_id + 1))?;

    let plan = Plan {
        id: plan_id,
        owner: info.sender.clone(),
        denom: denom.clone(),
        net_amount: fees.net_amount,
        method,
        creation_fee: fees.creation_fee,
        service_fee: fees.service_fee,
        status: PlanStatus::Active,
        created_at: now,
        beneficiary_count: beneficiaries.len() as u8,
        escrow_id,
    };

    let escrow = EscrowAccount {
        id: escrow_id,
        plan_id,
        amount: fees.net_amount,
        creation_fee: fees.creation_fee,
        service_fee: fees.service_fee,
        is_locked: true,
        locked_at: now,
    };

    PLANS.save(deps.storage, plan_id, &plan)?;
    ESCROWS.save(deps.storage, escrow_id, &escrow)?;
    SCHEDULES.save(deps.storage, plan_id, &schedule)?;
    OWNER_PLANS.save(deps.storage, (&info.sender, plan_id), &())?;

    for (i, (input, allocated_amount)) in beneficiaries.into_iter().zip(allocated).enumerate() {
        let index = (i + 1) as u8;
        let beneficiary = Beneficiary {
            plan_id,
            index,
            name_commitment: input.name_commitment,
            email_commitment: input.email_commitment,
            relationship_commitment: input.relationship_commitment,
            combined_commitment: input.combined_commitment,
            claim_code_commitment: input.claim_code_commitment,
            share_bps: input.share_bps,
            allocated_amount,
            has_claimed: false,
            claimed_amount: Uint128::zero(),
            claimed_by: None,
            claimed_at: None,
        };
        BENEFICIARIES.save(deps.storage, (plan_id, index), &beneficiary)?;
    }

    // Fees move to the collector in the same response; bank failure reverts
    // the whole creation
    let mut response = Response::new();
    let collected = fees.collected();
    if !collected.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: config.fee_collector.to_string(),
            amount: vec![Coin {
                denom: denom.clone(),
                amount: collected,
            }],
        });
    }

    Ok(response
        .add_attribute("method", "create_plan")
        .add_attribute("plan_id", plan_id.to_string())
        .add_attribute("escrow_id", escrow_id.to_string())
        .add_attribute("owner", info.sender)
        .add_attribute("denom", denom)
        .add_attribute("net_amount", fees.net_amount)
        .add_attribute("creation_fee", fees.creation_fee)
        .add_attribute("service_fee", fees.service_fee)
        .add_attribute("created_at", now.to_string()))
}

pub fn execute_pause_plan(
    deps: DepsMut,
    info: MessageInfo,
    plan_id: u64,
) -> Result<Response, ContractError> {
    PLANS.update(deps.storage, plan_id, |maybe_plan| {
        let mut plan = maybe_plan.ok_or(ContractError::PlanNotFound {})?;
        if info.sender != plan.owner {
            return Err(ContractError::Unauthorized {});
        }
        if plan.status.is_terminal() {
            return Err(ContractError::TerminalStatus {});
        }
        if !matches!(plan.status, PlanStatus::Active) {
            return Err(ContractError::WrongPlanStatus {});
        }
        plan.status = PlanStatus::Paused;
        Ok(plan)
    })?;

    Ok(Response::new()
        .add_attribute("method", "pause_plan")
        .add_attribute("plan_id", plan_id.to_string()))
}

pub fn execute_resume_plan(
    deps: DepsMut,
    info: MessageInfo,
    plan_id: u64,
) -> Result<Response, ContractError> {
    PLANS.update(deps.storage, plan_id, |maybe_plan| {
        let mut plan = maybe_plan.ok_or(ContractError::PlanNotFound {})?;
        if info.sender != plan.owner {
            return Err(ContractError::Unauthorized {});
        }
        if plan.status.is_terminal() {
            return Err(ContractError::TerminalStatus {});
        }
        if !matches!(plan.status, PlanStatus::Paused) {
            return Err(ContractError::WrongPlanStatus {});
        }
        plan.status = PlanStatus::Active;
        Ok(plan)
    })?;

    Ok(Response::new()
        .add_attribute("method", "resume_plan")
        .add_attribute("plan_id", plan_id.to_string()))
}

pub fn execute_cancel_plan(
    deps: DepsMut,
    info: MessageInfo,
    plan_id: u64,
) -> Result<Response, ContractError> {
    let mut plan = PLANS
        .may_load(deps.storage, plan_id)?
        .ok_or(ContractError::PlanNotFound {})?;

    if info.sender != plan.owner {
        return Err(ContractError::Unauthorized {});
    }
    if plan.status.is_terminal() {
        return Err(ContractError::TerminalStatus {});
    }

    let mut escrow = ESCROWS.load(deps.storage, plan.escrow_id)?;
    let refund = escrow.amount;
    escrow.amount = Uint128::zero();
    escrow.is_locked = false;

    plan.status = PlanStatus::Cancelled;

    PLANS.save(deps.storage, plan_id, &plan)?;
    ESCROWS.save(deps.storage, plan.escrow_id, &escrow)?;

    let mut response = Response::new();
    if !refund.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: plan.owner.to_string(),
            amount: vec![Coin {
                denom: plan.denom.clone(),
                amount: refund,
            }],
        });
    }

    Ok(response
        .add_attribute("method", "cancel_plan")
        .add_attribute("plan_id", plan_id.to_string())
        .add_attribute("refund", refund))
}

#[allow(clippy::too_many_arguments)]
pub fn execute_claim(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    plan_id: u64,
    claim_code: String,
    name: String,
    email: String,
    relationship: String,
) -> Result<Response, ContractError> {
    let mut plan = PLANS
        .may_load(deps.storage, plan_id)?
        .ok_or(ContractError::PlanNotFound {})?;
    let now = env.block.time.seconds();

    if !matches!(plan.status, PlanStatus::Active) {
        return Err(ContractError::NotClaimable {});
    }
    let mut schedule = SCHEDULES.load(deps.storage, plan_id)?;
    if !schedule.is_due(now) {
        return Err(ContractError::NotClaimable {});
    }

    // Codes are per-beneficiary, so the commitment check runs against each
    // stored row rather than any plan-wide value
    let code_commitment = commit_claim_code(&claim_code);
    let mut matched: Option<Beneficiary> = None;
    for index in 1..=plan.beneficiary_count {
        let beneficiary = BENEFICIARIES.load(deps.storage, (plan_id, index))?;
        if beneficiary.claim_code_commitment == code_commitment {
            matched = Some(beneficiary);
            break;
        }
    }
    let mut beneficiary = matched.ok_or(ContractError::InvalidClaimCode {})?;

    let identity_commitment = commit_identity(&name, &email, &relationship);
    if identity_commitment != beneficiary.combined_commitment {
        return Err(ContractError::BeneficiaryMismatch {});
    }

    if beneficiary.has_claimed {
        return Err(ContractError::AlreadyClaimed {});
    }

    let mut escrow = ESCROWS.load(deps.storage, plan.escrow_id)?;
    let payout = beneficiary.allocated_amount;
    if payout > escrow.amount {
        return Err(ContractError::InsufficientEscrow {});
    }
    escrow.amount -= payout;

    beneficiary.has_claimed = true;
    beneficiary.claimed_amount = payout;
    beneficiary.claimed_by = Some(info.sender.clone());
    beneficiary.claimed_at = Some(now);
    let claimed_index = beneficiary.index;
    BENEFICIARIES.save(deps.storage, (plan_id, claimed_index), &beneficiary)?;

    schedule.periods_completed = schedule.periods_elapsed(now);
    SCHEDULES.save(deps.storage, plan_id, &schedule)?;

    // Executed exactly when the final share is claimed
    let mut all_claimed = true;
    for index in 1..=plan.beneficiary_count {
        if !BENEFICIARIES.load(deps.storage, (plan_id, index))?.has_claimed {
            all_claimed = false;
            break;
        }
    }
    if all_claimed {
        plan.status = PlanStatus::Executed;
        escrow.is_locked = false;
    }

    PLANS.save(deps.storage, plan_id, &plan)?;
    ESCROWS.save(deps.storage, plan.escrow_id, &escrow)?;

    Ok(Response::new()
        .add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: vec![Coin {
                denom: plan.denom.clone(),
                amount: payout,
            }],
        })
        .add_attribute("method", "claim")
        .add_attribute("plan_id", plan_id.to_string())
        .add_attribute("beneficiary_index", claimed_index.to_string())
        .add_attribute("amount", payout)
        .add_attribute("claimed_at", now.to_string())
        .add_attribute("plan_executed", all_claimed.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::GetPlan { plan_id } => to_json_binary(&query_plan(deps, plan_id)?),
        QueryMsg::GetPlanBeneficiaries { plan_id } => {
            to_json_binary(&query_beneficiaries(deps, plan_id)?)
        }
        QueryMsg::GetSchedule { plan_id } => to_json_binary(&ScheduleResponse {
            schedule: SCHEDULES.load(deps.storage, plan_id)?,
        }),
        QueryMsg::GetEscrow { plan_id } => to_json_binary(&query_escrow(deps, plan_id)?),
        QueryMsg::IsPlanClaimable { plan_id } => {
            to_json_binary(&query_claimable(deps, env, plan_id)?)
        }
        QueryMsg::VerifyClaim {
            plan_id,
            claim_code,
            name,
            email,
            relationship,
        } => to_json_binary(&query_verify_claim(
            deps,
            env,
            plan_id,
            claim_code,
            name,
            email,
            relationship,
        )?),
        QueryMsg::PreviewFees { amount } => {
            let config = CONFIG.load(deps.storage)?;
            let fees = fee_breakdown(amount, config.creation_fee_bps, config.service_fee_bps)
                .map_err(|e| StdError::generic_err(e.to_string()))?;
            to_json_binary(&fees)
        }
        QueryMsg::GetPlansByOwner {
            owner,
            start_after,
            limit,
        } => to_json_binary(&query_plans_by_owner(deps, owner, start_after, limit)?),
    }
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        fee_collector: config.fee_collector,
        creation_fee_bps: config.creation_fee_bps,
        service_fee_bps: config.service_fee_bps,
    })
}

fn query_plan(deps: Deps, plan_id: u64) -> StdResult<PlanResponse> {
    let plan = PLANS.load(deps.storage, plan_id)?;
    Ok(plan_to_response(plan))
}

fn query_beneficiaries(deps: Deps, plan_id: u64) -> StdResult<BeneficiariesResponse> {
    let plan = PLANS.load(deps.storage, plan_id)?;
    let mut beneficiaries = Vec::with_capacity(plan.beneficiary_count as usize);
    for index in 1..=plan.beneficiary_count {
        let b = BENEFICIARIES.load(deps.storage, (plan_id, index))?;
        beneficiaries.push(BeneficiaryResponse {
            index: b.index,
            combined_commitment: b.combined_commitment,
            share_bps: b.share_bps,
            allocated_amount: b.allocated_amount,
            has_claimed: b.has_claimed,
            claimed_amount: b.claimed_amount,
            claimed_at: b.claimed_at,
        });
    }
    Ok(BeneficiariesResponse { beneficiaries })
}

fn query_escrow(deps: Deps, plan_id: u64) -> StdResult<EscrowResponse> {
    let plan = PLANS.load(deps.storage, plan_id)?;
    let escrow = ESCROWS.load(deps.storage, plan.escrow_id)?;
    Ok(EscrowResponse {
        id: escrow.id,
        plan_id: escrow.plan_id,
        amount: escrow.amount,
        creation_fee: escrow.creation_fee,
        service_fee: escrow.service_fee,
        is_locked: escrow.is_locked,
        locked_at: escrow.locked_at,
    })
}

fn query_claimable(deps: Deps, env: Env, plan_id: u64) -> StdResult<ClaimableResponse> {
    let plan = PLANS.load(deps.storage, plan_id)?;
    let schedule = SCHEDULES.load(deps.storage, plan_id)?;
    let now = env.block.time.seconds();

    let claimable = matches!(plan.status, PlanStatus::Active) && schedule.is_due(now);
    let time_remaining = if claimable || schedule.next_due <= now {
        None
    } else {
        Some(schedule.next_due - now)
    };

    Ok(ClaimableResponse {
        claimable,
        time_remaining,
    })
}

/// Read-only claim verification. Any failure returns `valid: false` with no
/// indication of which check failed.
fn query_verify_claim(
    deps: Deps,
    env: Env,
    plan_id: u64,
    claim_code: String,
    name: String,
    email: String,
    relationship: String,
) -> StdResult<VerifyClaimResponse> {
    let rejected = VerifyClaimResponse {
        valid: false,
        beneficiary_index: None,
    };

    let Some(plan) = PLANS.may_load(deps.storage, plan_id)? else {
        return Ok(rejected);
    };
    if !matches!(plan.status, PlanStatus::Active) {
        return Ok(rejected);
    }
    let schedule = SCHEDULES.load(deps.storage, plan_id)?;
    if !schedule.is_due(env.block.time.seconds()) {
        return Ok(rejected);
    }

    let code_commitment = commit_claim_code(&claim_code);
    let identity_commitment = commit_identity(&name, &email, &relationship);
    for index in 1..=plan.beneficiary_count {
        let b = BENEFICIARIES.load(deps.storage, (plan_id, index))?;
        if b.claim_code_commitment == code_commitment
            && b.combined_commitment == identity_commitment
            && !b.has_claimed
        {
            return Ok(VerifyClaimResponse {
                valid: true,
                beneficiary_index: Some(index),
            });
        }
    }

    Ok(rejected)
}

fn query_plans_by_owner(
    deps: Deps,
    owner: String,
    _start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<PlansResponse> {
    let owner_addr = deps.api.addr_validate(&owner)?;
    let limit = limit.unwrap_or(10) as usize;

    let plans: Vec<PlanResponse> = OWNER_PLANS
        .prefix(&owner_addr)
        .range(deps.storage, None, None, Order::Ascending)
        .take(limit)
        .filter_map(|item| {
            let (plan_id, _) = item.ok()?;
            let plan = PLANS.load(deps.storage, plan_id).ok()?;
            Some(plan_to_response(plan))
        })
        .collect();

    Ok(PlansResponse { plans })
}

fn plan_to_response(plan: Plan) -> PlanResponse {
    PlanResponse {
        id: plan.id,
        owner: plan.owner,
        denom: plan.denom,
        net_amount: plan.net_amount,
        method: plan.method,
        creation_fee: plan.creation_fee,
        service_fee: plan.service_fee,
        status: plan.status,
        created_at: plan.created_at,
        beneficiary_count: plan.beneficiary_count,
        escrow_id: plan.escrow_id,
    }
}
