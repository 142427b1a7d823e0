// Shared plan math for the distribution-plan contract and off-ledger services.
//
// Fee figures shown to a user and fee figures charged on the ledger must come
// from the same functions, so both sides depend on this crate.

pub mod commitment;
pub mod fees;
pub mod schedule;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SharedError {
    #[error("Amount must be greater than zero")]
    InvalidAmount {},

    #[error("Beneficiary percentages must sum to 100%")]
    InvalidPercentageSum {},

    #[error("Periodic percentage must divide 100 exactly")]
    InvalidPeriodicPercentage {},

    #[error("Derived amount rounds to zero")]
    AmountRoundsToZero {},

    #[error("At least one beneficiary required")]
    NoBeneficiaries {},

    #[error("Too many beneficiaries")]
    TooManyBeneficiaries {},

    #[error("Transfer date must be in the future")]
    InvalidTransferDate {},

    #[error("Missing schedule parameter for distribution method")]
    MissingScheduleParam {},
}
