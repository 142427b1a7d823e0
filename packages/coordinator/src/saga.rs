//! Two-phase plan creation across the shadow store and the ledger.
//!
//! There is no distributed transaction here; the flow is a saga:
//!
//! 1. the shadow record is written first, `Pending`, after all validation —
//!    discarding it compensates fully, since nothing claimable exists yet;
//! 2. the ledger transaction (commitments only, plus escrow transfer) is the
//!    commit point;
//! 3. the shadow record is linked to the ledger id and flipped `Active`.
//!
//! A step-3 failure leaves the plan live on the ledger with a stale shadow
//! record; `reconcile` closes that gap idempotently from ledger state alone.

use cosmwasm_std::Uint128;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use shared::commitment::{combined, commit_claim_code, commit_email, commit_name, commit_relationship};
use shared::fees::{allocate_shares, fee_breakdown};
use shared::schedule::{derive, DistributionMethod};

use crate::codes::{generate_claim_code, CodeCipher};
use crate::error::CoordinatorError;
use crate::record::{ShadowBeneficiary, ShadowPlan, ShadowStatus};
use crate::store::ShadowStore;

/// Plan status as reported by the ledger
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum LedgerStatus {
    Active,
    Paused,
    Cancelled,
    Executed,
}

impl From<LedgerStatus> for ShadowStatus {
    fn from(status: LedgerStatus) -> Self {
        match status {
            LedgerStatus::Active => ShadowStatus::Active,
            LedgerStatus::Paused => ShadowStatus::Paused,
            LedgerStatus::Cancelled => ShadowStatus::Cancelled,
            LedgerStatus::Executed => ShadowStatus::Executed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerReceipt {
    pub plan_id: u64,
    pub tx_ref: String,
}

/// Beneficiary data as it goes to the ledger: commitments only
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerBeneficiary {
    pub name_commitment: String,
    pub email_commitment: String,
    pub relationship_commitment: String,
    pub combined_commitment: String,
    pub claim_code_commitment: String,
    pub share_bps: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanSubmission {
    pub owner: String,
    pub denom: String,
    pub amount: Uint128,
    pub method: DistributionMethod,
    pub transfer_date: Option<u64>,
    pub periodic_percent: Option<u64>,
    pub beneficiaries: Vec<LedgerBeneficiary>,
}

/// The ledger as the coordinator sees it
pub trait PlanLedger {
    fn submit_create(&self, submission: PlanSubmission) -> Result<LedgerReceipt, CoordinatorError>;

    fn plan_status(&self, plan_id: u64) -> Result<LedgerStatus, CoordinatorError>;
}

/// Beneficiary details as entered by the owner
#[derive(Debug, Clone)]
pub struct BeneficiaryDraft {
    pub name: String,
    pub email: String,
    pub relationship: String,
    pub share_bps: u16,
}

#[derive(Debug, Clone)]
pub struct CreatePlanRequest {
    pub owner: String,
    /// Supplied by the authentication collaborator; creation is gated on it
    pub kyc_approved: bool,
    pub plan_name: String,
    pub description: String,
    pub denom: String,
    pub amount: Uint128,
    pub method: DistributionMethod,
    pub transfer_date: Option<u64>,
    pub periodic_percent: Option<u64>,
    pub beneficiaries: Vec<BeneficiaryDraft>,
    pub now: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPlan {
    pub local_id: u64,
    pub ledger_plan_id: u64,
    pub tx_ref: String,
}

pub struct Coordinator<S, L> {
    store: S,
    ledger: L,
    cipher: CodeCipher,
    creation_fee_bps: u64,
    service_fee_bps: u64,
}

impl<S: ShadowStore, L: PlanLedger> Coordinator<S, L> {
    pub fn new(store: S, ledger: L, cipher: CodeCipher, creation_fee_bps: u64, service_fee_bps: u64) -> Self {
        Self {
            store,
            ledger,
            cipher,
            creation_fee_bps,
            service_fee_bps,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the full creation saga. Validation happens before step 1 so the
    /// ledger is never called with data it would reject.
    pub fn create_plan(&self, req: CreatePlanRequest) -> Result<CreatedPlan, CoordinatorError> {
        if !req.kyc_approved {
            return Err(CoordinatorError::KycNotApproved {});
        }

        // Same fee and schedule math the contract runs; figures shown here
        // cannot drift from figures charged there
        let fees = fee_breakdown(req.amount, self.creation_fee_bps, self.service_fee_bps)?;
        let schedule = derive(
            fees.net_amount,
            req.method,
            req.transfer_date,
            req.periodic_percent,
            req.now,
        )?;
        let shares_bps: Vec<u16> = req.beneficiaries.iter().map(|b| b.share_bps).collect();
        let allocated = allocate_shares(fees.net_amount, &shares_bps)?;

        let mut shadow_beneficiaries = Vec::with_capacity(req.beneficiaries.len());
        let mut ledger_beneficiaries = Vec::with_capacity(req.beneficiaries.len());
        for (draft, allocated_amount) in req.beneficiaries.iter().zip(allocated) {
            // One independent code per beneficiary; a plan-wide code would
            // let any beneficiary impersonate the others
            let claim_code = generate_claim_code();
            let name_c = commit_name(&draft.name);
            let email_c = commit_email(&draft.email);
            let rel_c = commit_relationship(&draft.relationship);
            let combined_c = combined(&name_c, &email_c, &rel_c);
            let code_c = commit_claim_code(&claim_code);

            shadow_beneficiaries.push(ShadowBeneficiary {
                name: draft.name.clone(),
                email: draft.email.clone(),
                relationship: draft.relationship.clone(),
                share_bps: draft.share_bps,
                allocated_amount,
                combined_commitment: combined_c.clone(),
                claim_code_commitment: code_c.clone(),
                encrypted_claim_code: self.cipher.encrypt(&claim_code)?,
                notification_sent: false,
            });
            ledger_beneficiaries.push(LedgerBeneficiary {
                name_commitment: name_c,
                email_commitment: email_c,
                relationship_commitment: rel_c,
                combined_commitment: combined_c,
                claim_code_commitment: code_c,
                share_bps: draft.share_bps,
            });
        }

        // Step 1: pending shadow record
        let local_id = self.store.insert(ShadowPlan {
            local_id: 0,
            owner: req.owner.clone(),
            plan_name: req.plan_name,
            description: req.description,
            denom: req.denom.clone(),
            requested_amount: fees.requested,
            net_amount: fees.net_amount,
            creation_fee: fees.creation_fee,
            service_fee: fees.service_fee,
            schedule,
            status: ShadowStatus::Pending,
            ledger_plan_id: None,
            tx_ref: None,
            version: 0,
            beneficiaries: shadow_beneficiaries,
            created_at: req.now,
        })?;
        info!(local_id, "shadow plan record created pending ledger confirmation");

        // Step 2: the commit point
        let receipt = self
            .ledger
            .submit_create(PlanSubmission {
                owner: req.owner,
                denom: req.denom,
                amount: req.amount,
                method: req.method,
                transfer_date: req.transfer_date,
                periodic_percent: req.periodic_percent,
                beneficiaries: ledger_beneficiaries,
            })
            .map_err(|err| {
                warn!(local_id, error = %err, "ledger submission failed; shadow record stays pending");
                CoordinatorError::LedgerSubmission {
                    local_id,
                    reason: err.to_string(),
                }
            })?;

        // Step 3: link and activate
        match self.link_to_ledger(local_id, &receipt, ShadowStatus::Active) {
            Ok(()) => {}
            Err(err) => {
                warn!(
                    local_id,
                    ledger_plan_id = receipt.plan_id,
                    error = %err,
                    "shadow record activation failed after ledger write; reconcile required"
                );
                return Err(CoordinatorError::OutOfSync {
                    local_id,
                    ledger_plan_id: receipt.plan_id,
                });
            }
        }

        info!(local_id, ledger_plan_id = receipt.plan_id, "plan creation saga complete");
        Ok(CreatedPlan {
            local_id,
            ledger_plan_id: receipt.plan_id,
            tx_ref: receipt.tx_ref,
        })
    }

    /// Close the step-3 gap from ledger state alone. Safe to call any number
    /// of times; never re-submits the ledger transaction.
    pub fn reconcile(&self, local_id: u64, receipt: &LedgerReceipt) -> Result<(), CoordinatorError> {
        let plan = self.store.get(local_id)?;

        match plan.ledger_plan_id {
            Some(linked) if linked == receipt.plan_id => {
                // Already linked; refresh the status mirror and finish
                self.mirror_ledger_status(local_id)
            }
            Some(linked) => Err(CoordinatorError::OutOfSync {
                local_id,
                ledger_plan_id: linked,
            }),
            None => {
                // Link with the status the ledger reports now; the plan may
                // have moved on since the failed activation
                let status = self.ledger.plan_status(receipt.plan_id)?;
                self.link_to_ledger(local_id, receipt, status.into())
            }
        }
    }

    /// Pull the ledger's status for a linked plan into the shadow record
    pub fn mirror_ledger_status(&self, local_id: u64) -> Result<(), CoordinatorError> {
        let mut plan = self.store.get(local_id)?;
        let ledger_plan_id = plan.ledger_plan_id.ok_or(CoordinatorError::NotLinked {})?;
        let status: ShadowStatus = self.ledger.plan_status(ledger_plan_id)?.into();
        if plan.status == status {
            return Ok(());
        }
        let version = plan.version;
        plan.status = status;
        self.store.update(plan, version)
    }

    fn link_to_ledger(
        &self,
        local_id: u64,
        receipt: &LedgerReceipt,
        status: ShadowStatus,
    ) -> Result<(), CoordinatorError> {
        let mut plan = self.store.get(local_id)?;
        let version = plan.version;
        plan.ledger_plan_id = Some(receipt.plan_id);
        plan.tx_ref = Some(receipt.tx_ref.clone());
        plan.status = status;
        self.store.update(plan, version)
    }
}
