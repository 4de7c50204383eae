use near_sdk::require;

use crate::errors::ERR_FEE_TOO_HIGH;

/// `protocol_fee` is a numerator over this denominator (basis points).
pub const FEE_POINTS: u128 = 10_000;

/// The two legs a fill pays out of `to_amount`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeSplit {
    pub payout: u128,
    pub fee: u128,
}

impl FeeSplit {
    /// `fee = floor(to_amount * protocol_fee / 10_000)`, `payout = to_amount - fee`.
    ///
    /// Computed as `q * bp + r * bp / N` with `to_amount = q * N + r`, which is
    /// exact and cannot overflow for any `to_amount` while `bp <= N`.
    pub fn compute(to_amount: u128, protocol_fee: u32) -> Self {
        let points = u128::from(protocol_fee);
        require!(points <= FEE_POINTS, ERR_FEE_TOO_HIGH);

        let fee = (to_amount / FEE_POINTS) * points + (to_amount % FEE_POINTS) * points / FEE_POINTS;
        Self {
            payout: to_amount - fee,
            fee,
        }
    }
}
