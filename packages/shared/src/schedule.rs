use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

use crate::SharedError;

pub const SECONDS_PER_DAY: u64 = 86_400;

#[cw_serde]
#[derive(Copy)]
pub enum DistributionMethod {
    /// Entire net amount claimable at the transfer date
    LumpSum,
    Monthly,
    Quarterly,
    Yearly,
}

impl DistributionMethod {
    /// Fixed calendar approximation per method (30/90/365 days)
    pub fn period_seconds(&self) -> u64 {
        match self {
            DistributionMethod::LumpSum => 0,
            DistributionMethod::Monthly => 30 * SECONDS_PER_DAY,
            DistributionMethod::Quarterly => 90 * SECONDS_PER_DAY,
            DistributionMethod::Yearly => 365 * SECONDS_PER_DAY,
        }
    }
}

#[cw_serde]
pub struct Schedule {
    pub method: DistributionMethod,
    /// Amount released per period (all periods except the last)
    pub period_amount: Uint128,
    /// Last period absorbs the truncation residue
    pub final_period_amount: Uint128,
    pub total_periods: u64,
    pub start_date: u64,
    pub end_date: u64,
    /// First date at which anything becomes claimable
    pub next_due: u64,
    pub periods_completed: u64,
}

impl Schedule {
    /// Due date of period `n` (1-based), None past the schedule end
    pub fn due_date(&self, n: u64) -> Option<u64> {
        if n == 0 || n > self.total_periods {
            return None;
        }
        match self.method {
            DistributionMethod::LumpSum => Some(self.next_due),
            _ => Some(self.start_date + self.method.period_seconds() * n),
        }
    }

    /// True once the first due date has been reached
    pub fn is_due(&self, now: u64) -> bool {
        now >= self.next_due
    }

    /// How many period due dates have passed, capped at total_periods
    pub fn periods_elapsed(&self, now: u64) -> u64 {
        match self.method {
            DistributionMethod::LumpSum => u64::from(now >= self.next_due),
            _ => {
                if now <= self.start_date {
                    0
                } else {
                    ((now - self.start_date) / self.method.period_seconds())
                        .min(self.total_periods)
                }
            }
        }
    }
}

/// Derive the distribution schedule for a plan at creation time.
///
/// LumpSum takes `transfer_date`; periodic methods take `periodic_percent`
/// (whole percent per period, must divide 100 exactly).
pub fn derive(
    net_amount: Uint128,
    method: DistributionMethod,
    transfer_date: Option<u64>,
    periodic_percent: Option<u64>,
    now: u64,
) -> Result<Schedule, SharedError> {
    if net_amount.is_zero() {
        return Err(SharedError::InvalidAmount {});
    }

    match method {
        DistributionMethod::LumpSum => {
            let transfer_date = transfer_date.ok_or(SharedError::MissingScheduleParam {})?;
            if transfer_date <= now {
                return Err(SharedError::InvalidTransferDate {});
            }
            Ok(Schedule {
                method,
                period_amount: net_amount,
                final_period_amount: net_amount,
                total_periods: 1,
                start_date: now,
                end_date: transfer_date,
                next_due: transfer_date,
                periods_completed: 0,
            })
        }
        _ => {
            let percent = periodic_percent.ok_or(SharedError::MissingScheduleParam {})?;
            if percent == 0 || percent > 100 || 100 % percent != 0 {
                return Err(SharedError::InvalidPeriodicPercentage {});
            }
            let total_periods = 100 / percent;
            let period_amount = net_amount.multiply_ratio(percent, 100u128);
            if period_amount.is_zero() {
                return Err(SharedError::AmountRoundsToZero {});
            }
            let final_period_amount =
                net_amount - period_amount * Uint128::from(total_periods - 1);

            let len = method.period_seconds();
            Ok(Schedule {
                method,
                period_amount,
                final_period_amount,
                total_periods,
                start_date: now,
                end_date: now + len * total_periods,
                next_due: now + len,
                periods_completed: 0,
            })
        }
    }
}
