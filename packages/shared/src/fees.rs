use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

use crate::SharedError;

/// Basis-point denominator (10000 bps = 100.00%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Default creation fee, charged on top of the requested amount (5%)
pub const DEFAULT_CREATION_FEE_BPS: u64 = 500;

/// Default service fee, withheld from the requested amount (2%)
pub const DEFAULT_SERVICE_FEE_BPS: u64 = 200;

/// Beneficiary cap per plan
pub const MAX_BENEFICIARIES: usize = 10;

#[cw_serde]
pub struct FeeBreakdown {
    /// Amount the owner asked to escrow
    pub requested: Uint128,
    /// Fee charged on top of the requested amount
    pub creation_fee: Uint128,
    /// Fee withheld from the requested amount
    pub service_fee: Uint128,
    /// Amount actually locked for beneficiaries
    pub net_amount: Uint128,
    /// Total the owner must pay (requested + creation fee)
    pub total_debit: Uint128,
}

/// Take `bps` basis points of `amount`, truncating
pub fn bps_of(amount: Uint128, bps: u64) -> Uint128 {
    amount.multiply_ratio(bps, BPS_DENOMINATOR)
}

/// Compute the full fee breakdown for a requested escrow amount.
///
/// `net_amount = requested - creation_fee - service_fee` and
/// `total_debit = requested + creation_fee`. Everything the payer sends that
/// is not locked (`total_debit - net_amount`) goes to the fee collector.
pub fn fee_breakdown(
    requested: Uint128,
    creation_fee_bps: u64,
    service_fee_bps: u64,
) -> Result<FeeBreakdown, SharedError> {
    if requested.is_zero() {
        return Err(SharedError::InvalidAmount {});
    }

    let creation_fee = bps_of(requested, creation_fee_bps);
    let service_fee = bps_of(requested, service_fee_bps);

    let net_amount = requested
        .checked_sub(creation_fee + service_fee)
        .map_err(|_| SharedError::InvalidAmount {})?;
    if net_amount.is_zero() {
        return Err(SharedError::InvalidAmount {});
    }

    Ok(FeeBreakdown {
        requested,
        creation_fee,
        service_fee,
        net_amount,
        total_debit: requested + creation_fee,
    })
}

impl FeeBreakdown {
    /// Portion of the debit forwarded to the fee collector
    pub fn collected(&self) -> Uint128 {
        self.total_debit - self.net_amount
    }
}

/// Split `net` across beneficiary shares given in basis points.
///
/// Shares must sum to exactly 10000 bps. Each share truncates; the final
/// beneficiary absorbs the rounding residue so the sum equals `net` exactly.
pub fn allocate_shares(net: Uint128, shares_bps: &[u16]) -> Result<Vec<Uint128>, SharedError> {
    if shares_bps.is_empty() {
        return Err(SharedError::NoBeneficiaries {});
    }
    if shares_bps.len() > MAX_BENEFICIARIES {
        return Err(SharedError::TooManyBeneficiaries {});
    }

    let total: u64 = shares_bps.iter().map(|s| u64::from(*s)).sum();
    if total != BPS_DENOMINATOR {
        return Err(SharedError::InvalidPercentageSum {});
    }

    let mut amounts = Vec::with_capacity(shares_bps.len());
    let mut assigned = Uint128::zero();
    for bps in &shares_bps[..shares_bps.len() - 1] {
        let amount = bps_of(net, u64::from(*bps));
        assigned += amount;
        amounts.push(amount);
    }
    amounts.push(net - assigned);

    if amounts.iter().any(|a| a.is_zero()) {
        return Err(SharedError::AmountRoundsToZero {});
    }

    Ok(amounts)
}
