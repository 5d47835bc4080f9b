//! Year-specific rule sets.
//!
//! Each supported filing year is one static [`YearPolicy`]: bracket tables,
//! thresholds and caps, pagination limits, and the registry of unit build
//! routines. A run selects the policy once and never mixes years.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::engine::UnitDef;
use crate::error::EvalError;
use crate::forms;
use crate::rules::tables::{FEDERAL_2023, FEDERAL_2024, NEW_YORK_CITY, NEW_YORK_STATE};
use crate::rules::{BracketTable, Jurisdiction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Year {
    Y2023,
    Y2024,
}

impl Year {
    pub fn number(self) -> u16 {
        match self {
            Year::Y2023 => 2023,
            Year::Y2024 => 2024,
        }
    }
}

impl TryFrom<u16> for Year {
    type Error = EvalError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            2023 => Ok(Year::Y2023),
            2024 => Ok(Year::Y2024),
            other => Err(EvalError::UnsupportedYear(other)),
        }
    }
}

impl From<Year> for u16 {
    fn from(value: Year) -> Self {
        value.number()
    }
}

impl Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Rule set of a single filing year.
#[derive(Debug, Clone)]
pub struct YearPolicy {
    pub year: Year,
    pub federal: BracketTable,
    pub state: BracketTable,
    pub city: BracketTable,
    pub standard_deduction: f64,
    pub capital_loss_limit: f64,
    /// Upper end of the 0% qualified dividend and capital gain rate.
    pub qualified_zero_rate_limit: f64,
    /// Upper end of the 15% qualified dividend and capital gain rate.
    pub qualified_fifteen_rate_limit: f64,
    pub amt_exemption: f64,
    pub amt_phaseout_start: f64,
    /// Alternative minimum taxable income above which the 28% rate applies.
    pub amt_rate_threshold: f64,
    pub additional_medicare_threshold: f64,
    pub hsa_contribution_limit: f64,
    /// Cap on deductible state and local taxes.
    pub salt_cap: f64,
    /// Home acquisition debt limit for the mortgage interest deduction.
    pub mortgage_debt_limit: f64,
    /// Debt limit for loans taken out before December 16, 2017.
    pub grandfathered_debt_limit: f64,
    pub state_standard_deduction: f64,
    /// Federal AGI above which New York itemized deductions are limited.
    pub state_itemized_limit_agi: f64,
    /// New York AGI above which New York itemized deductions are reduced.
    pub state_itemized_adjustment_agi: f64,
    /// Trades per side of a single Form 8949 page.
    pub page_capacity: usize,
    pub max_pages: usize,
    pub(crate) units: &'static [UnitDef],
    pub(crate) federal_roots: &'static [&'static str],
    pub(crate) state_roots: &'static [&'static str],
}

static POLICY_2023: YearPolicy = YearPolicy {
    year: Year::Y2023,
    federal: FEDERAL_2023,
    state: NEW_YORK_STATE,
    city: NEW_YORK_CITY,
    standard_deduction: 13850.0,
    capital_loss_limit: 3000.0,
    qualified_zero_rate_limit: 44625.0,
    qualified_fifteen_rate_limit: 492300.0,
    amt_exemption: 81300.0,
    amt_phaseout_start: 578150.0,
    amt_rate_threshold: 220700.0,
    additional_medicare_threshold: 200000.0,
    hsa_contribution_limit: 3850.0,
    salt_cap: 10000.0,
    mortgage_debt_limit: 750000.0,
    grandfathered_debt_limit: 1000000.0,
    state_standard_deduction: 8000.0,
    state_itemized_limit_agi: 330200.0,
    state_itemized_adjustment_agi: 100000.0,
    page_capacity: 14,
    max_pages: 100,
    units: forms::UNITS,
    federal_roots: forms::FEDERAL_ROOTS,
    state_roots: forms::STATE_ROOTS,
};

static POLICY_2024: YearPolicy = YearPolicy {
    year: Year::Y2024,
    federal: FEDERAL_2024,
    state: NEW_YORK_STATE,
    city: NEW_YORK_CITY,
    standard_deduction: 14600.0,
    capital_loss_limit: 3000.0,
    qualified_zero_rate_limit: 47025.0,
    qualified_fifteen_rate_limit: 518900.0,
    amt_exemption: 85700.0,
    amt_phaseout_start: 609350.0,
    amt_rate_threshold: 232600.0,
    additional_medicare_threshold: 200000.0,
    hsa_contribution_limit: 4150.0,
    salt_cap: 10000.0,
    mortgage_debt_limit: 750000.0,
    grandfathered_debt_limit: 1000000.0,
    state_standard_deduction: 8000.0,
    state_itemized_limit_agi: 330200.0,
    state_itemized_adjustment_agi: 100000.0,
    page_capacity: 14,
    max_pages: 100,
    units: forms::UNITS,
    federal_roots: forms::FEDERAL_ROOTS,
    state_roots: forms::STATE_ROOTS,
};

impl YearPolicy {
    pub fn select(year: Year) -> &'static YearPolicy {
        match year {
            Year::Y2023 => &POLICY_2023,
            Year::Y2024 => &POLICY_2024,
        }
    }

    pub fn table(&self, jurisdiction: Jurisdiction) -> &BracketTable {
        match jurisdiction {
            Jurisdiction::Federal => &self.federal,
            Jurisdiction::State => &self.state,
            Jurisdiction::City => &self.city,
        }
    }

    pub fn compute_tax(&self, amount: f64, jurisdiction: Jurisdiction) -> f64 {
        self.table(jurisdiction).tax(amount)
    }

    pub(crate) fn unit(&self, name: &str) -> Option<&UnitDef> {
        self.units.iter().find(|def| def.name == name)
    }
}
