//! Progressive bracket tables and the tax computation over them.

pub(crate) mod tables;

use serde::{Deserialize, Serialize};

use crate::policy::{Year, YearPolicy};

/// Taxing authority a bracket table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    Federal,
    State,
    City,
}

/// One row of a bracket table: amounts up to `upper` are taxed as
/// `amount * rate - offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub upper: f64,
    pub rate: f64,
    pub offset: f64,
}

impl Bracket {
    pub const fn new(upper: f64, rate: f64, offset: f64) -> Self {
        Self {
            upper,
            rate,
            offset,
        }
    }
}

/// Ordered brackets, the last one unbounded.
#[derive(Debug, Clone, Copy)]
pub struct BracketTable {
    pub name: &'static str,
    pub brackets: &'static [Bracket],
}

impl BracketTable {
    pub fn tax(&self, amount: f64) -> f64 {
        if amount == 0.0 {
            return 0.0;
        }

        let bracket = self
            .brackets
            .iter()
            .find(|b| amount <= b.upper)
            .or(self.brackets.last());

        match bracket {
            Some(b) => amount * b.rate - b.offset,
            None => 0.0,
        }
    }
}

/// Tax owed on `amount` for the given year and jurisdiction.
pub fn compute_tax(amount: f64, year: Year, jurisdiction: Jurisdiction) -> f64 {
    YearPolicy::select(year).table(jurisdiction).tax(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [(Year, Jurisdiction); 6] = [
        (Year::Y2023, Jurisdiction::Federal),
        (Year::Y2023, Jurisdiction::State),
        (Year::Y2023, Jurisdiction::City),
        (Year::Y2024, Jurisdiction::Federal),
        (Year::Y2024, Jurisdiction::State),
        (Year::Y2024, Jurisdiction::City),
    ];

    #[test]
    fn test_zero_is_zero() {
        for (year, jurisdiction) in ALL {
            assert_eq!(compute_tax(0.0, year, jurisdiction), 0.0);
        }
    }

    #[test]
    fn test_continuous_at_boundaries() {
        for (year, jurisdiction) in ALL {
            let table = YearPolicy::select(year).table(jurisdiction);
            for bracket in table.brackets.iter().filter(|b| b.upper.is_finite()) {
                let below = table.tax(bracket.upper);
                let above = table.tax(bracket.upper + 0.01);
                assert!(
                    (above - below).abs() < 0.01,
                    "{} jumps at {}: {below} -> {above}",
                    table.name,
                    bracket.upper
                );
            }
        }
    }

    #[test]
    fn test_federal_2024_single() {
        let tax = compute_tax(65400.0, Year::Y2024, Jurisdiction::Federal);
        assert!((tax - 9441.0).abs() < 1e-6);

        let tax = compute_tax(11600.0, Year::Y2024, Jurisdiction::Federal);
        assert!((tax - 1160.0).abs() < 1e-6);
    }

    #[test]
    fn test_top_bracket_unbounded() {
        let tax = compute_tax(1_000_000.0, Year::Y2024, Jurisdiction::Federal);
        assert!((tax - (370_000.0 - 41812.25)).abs() < 1e-6);
    }

    #[test]
    fn test_city_brackets() {
        let tax = compute_tax(20000.0, Year::Y2024, Jurisdiction::City);
        assert!((tax - (20000.0 * 0.03762 - 82.08)).abs() < 1e-6);
    }
}
