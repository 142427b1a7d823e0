use cosmwasm_std::StdError;
use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Shared(#[from] SharedError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Plan not found")]
    PlanNotFound {},

    #[error("Plan is not in the required status for this action")]
    WrongPlanStatus {},

    #[error("Plan has reached a terminal status")]
    TerminalStatus {},

    #[error("Fee basis points must sum below 100%")]
    InvalidFeeConfig {},

    #[error("Malformed or duplicate beneficiary commitment")]
    InvalidCommitment {},

    #[error("Attached funds must equal the total debit in the plan denom")]
    InsufficientFunds {},

    #[error("Plan is not claimable yet")]
    NotClaimable {},

    // The two claim-verification failures deliberately share one public
    // message so callers cannot probe which sub-check failed. Logs can
    // still tell the variants apart by name.
    #[error("Claim verification failed")]
    InvalidClaimCode {},

    #[error("Claim verification failed")]
    BeneficiaryMismatch {},

    #[error("Beneficiary has already claimed")]
    AlreadyClaimed {},

    #[error("Claim exceeds remaining escrow")]
    InsufficientEscrow {},
}
