use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};
use shared::schedule::{DistributionMethod, Schedule};

#[cw_serde]
pub struct Config {
    /// Receives creation and service fees
    pub fee_collector: Addr,
    pub creation_fee_bps: u64,
    pub service_fee_bps: u64,
}

/// On-ledger plan status. `Pending` exists only in the off-ledger shadow
/// record; a plan reaching the ledger is already live.
#[cw_serde]
pub enum PlanStatus {
    Active,
    Paused,
    Cancelled,
    Executed,
}

impl PlanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanStatus::Cancelled | PlanStatus::Executed)
    }
}

#[cw_serde]
pub struct Plan {
    /// Ledger-assigned, monotonically increasing
    pub id: u64,
    pub owner: Addr,
    /// Token denomination backing the plan
    pub denom: String,
    /// Amount locked for beneficiaries, fixed at creation
    pub net_amount: Uint128,
    pub method: DistributionMethod,
    /// Fees withheld at creation
    pub creation_fee: Uint128,
    pub service_fee: Uint128,
    pub status: PlanStatus,
    pub created_at: u64,
    pub beneficiary_count: u8,
    /// One-to-one escrow account
    pub escrow_id: u64,
}

/// Beneficiary row. Only commitments, never plaintext identity.
#[cw_serde]
pub struct Beneficiary {
    pub plan_id: u64,
    /// Ordinal 1..=N, immutable once set
    pub index: u8,
    pub name_commitment: String,
    pub email_commitment: String,
    pub relationship_commitment: String,
    /// Whole-record commitment over the three above
    pub combined_commitment: String,
    /// Per-beneficiary claim code commitment
    pub claim_code_commitment: String,
    pub share_bps: u16,
    pub allocated_amount: Uint128,
    pub has_claimed: bool,
    pub claimed_amount: Uint128,
    pub claimed_by: Option<Addr>,
    pub claimed_at: Option<u64>,
}

#[cw_serde]
pub struct EscrowAccount {
    pub id: u64,
    pub plan_id: u64,
    /// Remaining locked amount, only decreases as claims pay out
    pub amount: Uint128,
    pub creation_fee: Uint128,
    pub service_fee: Uint128,
    pub is_locked: bool,
    pub locked_at: u64,
}

pub const CONFIG: Item<Config> = Item::new("config");

/// Next plan ID
pub const NEXT_PLAN_ID: Item<u64> = Item::new("next_plan_id");

/// Next escrow ID
pub const NEXT_ESCROW_ID: Item<u64> = Item::new("next_escrow_id");

/// Plans indexed by ID
pub const PLANS: Map<u64, Plan> = Map::new("plans");

/// Beneficiaries by (plan_id, ordinal index)
pub const BENEFICIARIES: Map<(u64, u8), Beneficiary> = Map::new("beneficiaries");

/// Escrow accounts by escrow ID
pub const ESCROWS: Map<u64, EscrowAccount> = Map::new("escrows");

/// Distribution schedules by plan ID
pub const SCHEDULES: Map<u64, Schedule> = Map::new("schedules");

/// Plans by owner (for queries)
pub const OWNER_PLANS: Map<(&Addr, u64), ()> = Map::new("owner_plans");
