// Off-ledger side of the plan system: the shadow record store, claim-code
// handling, notification scheduling, and the two-phase creation saga that
// keeps the shadow record consistent with the ledger.
//
// The ledger never sees plaintext identities or claim codes; this crate is
// where the plaintext lives, behind the commitments the ledger verifies.

pub mod codes;
pub mod error;
pub mod notify;
pub mod record;
pub mod saga;
pub mod store;

pub use error::CoordinatorError;
