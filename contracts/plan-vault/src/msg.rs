use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Uint128};
use shared::fees::FeeBreakdown;
use shared::schedule::{DistributionMethod, Schedule};

use crate::state::PlanStatus;

#[cw_serde]
pub struct InstantiateMsg {
    pub fee_collector: String,
    pub creation_fee_bps: Option<u64>,
    pub service_fee_bps: Option<u64>,
}

/// Beneficiary data as submitted at creation: commitments only. Plaintext
/// identity and claim codes never reach the ledger.
#[cw_serde]
pub struct BeneficiaryInput {
    pub name_commitment: String,
    pub email_commitment: String,
    pub relationship_commitment: String,
    pub combined_commitment: String,
    pub claim_code_commitment: String,
    pub share_bps: u16,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Create a plan, locking the attached funds in escrow.
    /// Attached funds must equal `requested amount + creation fee`.
    CreatePlan {
        denom: String,
        amount: Uint128,
        method: DistributionMethod,
        /// Required for LumpSum
        transfer_date: Option<u64>,
        /// Whole percent per period, required for periodic methods
        periodic_percent: Option<u64>,
        beneficiaries: Vec<BeneficiaryInput>,
    },
    /// Owner-only, Active -> Paused
    PausePlan { plan_id: u64 },
    /// Owner-only, Paused -> Active
    ResumePlan { plan_id: u64 },
    /// Owner-only, refunds remaining escrow, terminal
    CancelPlan { plan_id: u64 },
    /// Claim a share with the claim code and identity plaintext. The
    /// contract re-derives commitments and pays out on a full match.
    Claim {
        plan_id: u64,
        claim_code: String,
        name: String,
        email: String,
        relationship: String,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    /// Get plan by ID
    #[returns(PlanResponse)]
    GetPlan { plan_id: u64 },

    /// Get a plan's beneficiaries (commitment fields only)
    #[returns(BeneficiariesResponse)]
    GetPlanBeneficiaries { plan_id: u64 },

    #[returns(ScheduleResponse)]
    GetSchedule { plan_id: u64 },

    #[returns(EscrowResponse)]
    GetEscrow { plan_id: u64 },

    /// Whether a claim would be accepted right now (time/status gate only)
    #[returns(ClaimableResponse)]
    IsPlanClaimable { plan_id: u64 },

    /// Read-only claim verification. Failure reasons are not disclosed.
    #[returns(VerifyClaimResponse)]
    VerifyClaim {
        plan_id: u64,
        claim_code: String,
        name: String,
        email: String,
        relationship: String,
    },

    /// Fee breakdown preview; the same function the debit path uses
    #[returns(FeeBreakdown)]
    PreviewFees { amount: Uint128 },

    #[returns(PlansResponse)]
    GetPlansByOwner {
        owner: String,
        start_after: Option<u64>,
        limit: Option<u32>,
    },
}

// Response types

#[cw_serde]
pub struct ConfigResponse {
    pub fee_collector: Addr,
    pub creation_fee_bps: u64,
    pub service_fee_bps: u64,
}

#[cw_serde]
pub struct PlanResponse {
    pub id: u64,
    pub owner: Addr,
    pub denom: String,
    pub net_amount: Uint128,
    pub method: DistributionMethod,
    pub creation_fee: Uint128,
    pub service_fee: Uint128,
    pub status: PlanStatus,
    pub created_at: u64,
    pub beneficiary_count: u8,
    pub escrow_id: u64,
}

#[cw_serde]
pub struct BeneficiaryResponse {
    pub index: u8,
    pub combined_commitment: String,
    pub share_bps: u16,
    pub allocated_amount: Uint128,
    pub has_claimed: bool,
    pub claimed_amount: Uint128,
    pub claimed_at: Option<u64>,
}

#[cw_serde]
pub struct BeneficiariesResponse {
    pub beneficiaries: Vec<BeneficiaryResponse>,
}

#[cw_serde]
pub struct ScheduleResponse {
    pub schedule: Schedule,
}

#[cw_serde]
pub struct EscrowResponse {
    pub id: u64,
    pub plan_id: u64,
    pub amount: Uint128,
    pub creation_fee: Uint128,
    pub service_fee: Uint128,
    pub is_locked: bool,
    pub locked_at: u64,
}

#[cw_serde]
pub struct ClaimableResponse {
    pub claimable: bool,
    /// Seconds until the first due date, when not yet claimable
    pub time_remaining: Option<u64>,
}

#[cw_serde]
pub struct VerifyClaimResponse {
    pub valid: bool,
    pub beneficiary_index: Option<u8>,
}

#[cw_serde]
pub struct PlansResponse {
    pub plans: Vec<PlanResponse>,
}
