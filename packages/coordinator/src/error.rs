use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoordinatorError {
    #[error("{0}")]
    Shared(#[from] SharedError),

    #[error("KYC approval is required before plan creation")]
    KycNotApproved {},

    #[error("Shadow record not found")]
    NotFound {},

    #[error("Shadow record was modified concurrently")]
    VersionConflict {},

    #[error("Shadow record is not linked to a ledger plan")]
    NotLinked {},

    /// Step 2 of the creation saga failed. The pending shadow record keeps
    /// the given local id and is safe to retry or abandon.
    #[error("Ledger submission failed for shadow record {local_id}: {reason}")]
    LedgerSubmission { local_id: u64, reason: String },

    #[error("Ledger unavailable: {0}")]
    Ledger(String),

    /// Step 3 of the creation saga failed after the ledger write succeeded.
    /// Closed by `Coordinator::reconcile`, never by re-running step 2.
    #[error("Shadow record {local_id} out of sync with ledger plan {ledger_plan_id}")]
    OutOfSync { local_id: u64, ledger_plan_id: u64 },

    #[error("Claim code encryption failed")]
    Crypto {},

    #[error("Notification delivery failed: {0}")]
    Notification(String),
}
