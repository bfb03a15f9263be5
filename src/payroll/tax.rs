//! Vietnamese progressive personal income tax on monthly taxable income.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// One step of the schedule: income up to `upper` (exclusive of the previous
/// bound) is taxed at `rate`. The last bracket has no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxBracket {
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

pub const BRACKETS: [TaxBracket; 7] = [
    TaxBracket { upper: Some(dec!(5000000)), rate: dec!(0.05) },
    TaxBracket { upper: Some(dec!(10000000)), rate: dec!(0.10) },
    TaxBracket { upper: Some(dec!(18000000)), rate: dec!(0.15) },
    TaxBracket { upper: Some(dec!(32000000)), rate: dec!(0.20) },
    TaxBracket { upper: Some(dec!(52000000)), rate: dec!(0.25) },
    TaxBracket { upper: Some(dec!(80000000)), rate: dec!(0.30) },
    TaxBracket { upper: None, rate: dec!(0.35) },
];

/// Ties round to the even whole unit (0.5 -> 0, 1.5 -> 2).
pub const TAX_ROUNDING: RoundingStrategy = RoundingStrategy::MidpointNearestEven;

/// Tax before rounding: every full lower bracket plus the marginal share of
/// the bracket the income falls in.
pub fn unrounded_tax(taxable_income: Decimal) -> Decimal {
    if taxable_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;
    for bracket in BRACKETS {
        let top = match bracket.upper {
            Some(upper) => taxable_income.min(upper),
            None => taxable_income,
        };
        if top <= lower {
            break;
        }
        tax += (top - lower) * bracket.rate;
        match bracket.upper {
            Some(upper) => lower = upper,
            None => break,
        }
    }
    tax
}

/// Personal income tax, rounded to whole currency units. Never negative.
pub fn compute_tax(taxable_income: Decimal) -> Decimal {
    unrounded_tax(taxable_income).round_dp_with_strategy(0, TAX_ROUNDING)
}
