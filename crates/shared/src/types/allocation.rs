//! Proportional allocation of a monetary amount.
//!
//! Splitting a total into parts must never lose or create a subunit:
//! 1. Scale each proportion to an integer weight (6 decimal places)
//! 2. Floor each share: `total * weight / sum(weights)`
//! 3. Compute the remainder: `total - sum(shares)`
//! 4. Hand the remainder out one subunit at a time, round-robin from index 0

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use super::decimal::IntoDecimal;
use super::money::Money;
use crate::error::{MoneyError, MoneyResult};

/// Decimal places each proportion is scaled to before integer division.
const PROPORTION_SCALE: u32 = 6;

impl Money {
    /// Splits the amount by proportions; the parts always sum to `self`.
    ///
    /// Proportions are relative weights (`[1, 1, 1]`, `[50, 30, 20]`,
    /// `[0.7, 0.3]`), each non-negative and finite, with a positive total.
    ///
    /// # Example
    ///
    /// ```
    /// use subunit_shared::types::{CurrencyRegistry, Money};
    ///
    /// let registry = CurrencyRegistry::with_defaults();
    /// let total = Money::parse("USD", "100.00", &registry).unwrap();
    /// let parts = total.allocate(&[1, 1, 1]).unwrap();
    /// let amounts: Vec<String> = parts.iter().map(Money::amount).collect();
    /// assert_eq!(amounts, ["33.34", "33.33", "33.33"]);
    /// ```
    pub fn allocate<P>(&self, proportions: &[P]) -> MoneyResult<Vec<Money>>
    where
        P: IntoDecimal + Clone,
    {
        if proportions.is_empty() {
            return Err(MoneyError::InvalidAllocation(
                "at least one proportion is required".to_string(),
            ));
        }

        let weights = proportions
            .iter()
            .enumerate()
            .map(|(index, proportion)| {
                let literal = proportion.clone().into_decimal().map_err(|_| {
                    MoneyError::InvalidAllocation(format!(
                        "proportion {index} is not a finite number"
                    ))
                })?;
                if literal.is_negative() {
                    return Err(MoneyError::InvalidAllocation(format!(
                        "proportion {index} is negative: {literal}"
                    )));
                }
                Ok(literal.scaled_to(PROPORTION_SCALE))
            })
            .collect::<MoneyResult<Vec<BigInt>>>()?;

        let total_weight: BigInt = weights.iter().sum();
        if !total_weight.is_positive() {
            return Err(MoneyError::InvalidAllocation(
                "proportions must sum to a positive total".to_string(),
            ));
        }

        let mut shares: Vec<BigInt> = weights
            .iter()
            .map(|weight| (self.subunits() * weight).div_floor(&total_weight))
            .collect();

        let allocated: BigInt = shares.iter().sum();
        let mut remainder = self.subunits() - allocated;
        let step = if remainder.is_negative() {
            -BigInt::one()
        } else {
            BigInt::one()
        };

        tracing::debug!(
            currency = %self.currency(),
            total = %self.amount(),
            parts = shares.len(),
            remainder = %remainder,
            "Allocating amount"
        );

        let mut index = 0;
        while !remainder.is_zero() {
            shares[index] += &step;
            remainder -= &step;
            index = (index + 1) % shares.len();
        }

        Ok(shares
            .into_iter()
            .map(|share| self.with_subunits(share))
            .collect())
    }

    /// Splits the amount into `count` equal parts; earlier parts receive
    /// the leftover subunits.
    pub fn allocate_equal(&self, count: usize) -> MoneyResult<Vec<Money>> {
        if count == 0 {
            return Err(MoneyError::InvalidAllocation(
                "cannot allocate into zero parts".to_string(),
            ));
        }
        self.allocate(&vec![1_u32; count])
    }
}
