use cosmwasm_std::Uint128;
use serde::{Deserialize, Serialize};
use shared::schedule::Schedule;

/// Shadow record status, mirroring the ledger plan status once linked.
/// `Pending` exists only here: the record is created before the ledger
/// transaction and flips to `Active` when the ledger confirms.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ShadowStatus {
    Pending,
    Active,
    Paused,
    Cancelled,
    Executed,
}

/// Off-ledger beneficiary row. This is the only place plaintext identity
/// details exist; the ledger holds the commitments only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShadowBeneficiary {
    pub name: String,
    pub email: String,
    pub relationship: String,
    pub share_bps: u16,
    pub allocated_amount: Uint128,
    /// Mirrors the ledger row so verification can be cross-checked
    pub combined_commitment: String,
    pub claim_code_commitment: String,
    /// Reversibly encrypted so it can be emailed at due time; never the
    /// plaintext, never on the ledger
    pub encrypted_claim_code: String,
    /// Idempotence guard for the polling notification job
    pub notification_sent: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShadowPlan {
    /// Store-assigned id, independent of the ledger id
    pub local_id: u64,
    pub owner: String,
    pub plan_name: String,
    pub description: String,
    pub denom: String,
    /// Amount the owner requested to escrow
    pub requested_amount: Uint128,
    pub net_amount: Uint128,
    pub creation_fee: Uint128,
    pub service_fee: Uint128,
    pub schedule: Schedule,
    pub status: ShadowStatus,
    /// Assigned by the ledger once creation confirms
    pub ledger_plan_id: Option<u64>,
    pub tx_ref: Option<String>,
    /// Optimistic concurrency version, bumped on every update
    pub version: u64,
    pub beneficiaries: Vec<ShadowBeneficiary>,
    pub created_at: u64,
}

impl ShadowPlan {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, ShadowStatus::Cancelled | ShadowStatus::Executed)
    }
}
