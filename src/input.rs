//! Normalized input record, produced by an upstream scraping step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Everything known about one filer for one year.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InputRecord {
    pub wage_statements: Vec<WageStatement>,
    pub interest_dividend_statements: Vec<InterestDividendStatement>,
    pub mortgage_statements: Vec<MortgageStatement>,
    pub estimated_payments: EstimatedPayments,
    pub deductions: Deductions,
    pub misc_elections: MiscElections,
}

impl InputRecord {
    pub fn has_broker_statements(&self) -> bool {
        !self.interest_dividend_statements.is_empty()
    }

    pub fn wages(&self) -> f64 {
        self.wage_statements.iter().filter_map(|w| w.wages).sum()
    }

    pub fn federal_withholding(&self) -> f64 {
        self.wage_statements.iter().filter_map(|w| w.federal_withholding).sum()
    }

    pub fn state_withholding(&self) -> f64 {
        self.wage_statements.iter().map(|w| w.state_withholding).sum()
    }

    pub fn local_withholding(&self) -> f64 {
        self.wage_statements.iter().map(|w| w.local_withholding).sum()
    }

    pub fn medicare_wages(&self) -> f64 {
        self.wage_statements.iter().map(|w| w.medicare_wages).sum()
    }

    pub fn medicare_withholding(&self) -> f64 {
        self.wage_statements.iter().map(|w| w.medicare_withholding).sum()
    }

    pub fn qualified_dividends(&self) -> f64 {
        self.broker_sum(|s| s.qualified_dividends)
    }

    pub fn capital_gain_distributions(&self) -> f64 {
        self.broker_sum(|s| s.capital_gain_distributions)
    }

    pub fn foreign_tax(&self) -> f64 {
        self.broker_sum(|s| s.foreign_tax)
    }

    /// Interest on US obligations, exempt from state and local tax.
    pub fn treasury_interest(&self) -> f64 {
        self.interest_dividend_statements
            .iter()
            .filter(|s| s.is_treasury())
            .map(|s| s.interest)
            .sum()
    }

    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.interest_dividend_statements.iter().flat_map(|s| &s.trades)
    }

    fn broker_sum(&self, f: impl Fn(&InterestDividendStatement) -> f64) -> f64 {
        self.interest_dividend_statements.iter().map(f).sum()
    }
}

/// Form W-2.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WageStatement {
    pub employer: String,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(rename = "SSN")]
    pub ssn: Option<String>,
    pub address: Option<String>,
    pub apt: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub wages: Option<f64>,
    pub federal_withholding: Option<f64>,
    pub social_security_withholding: f64,
    pub medicare_wages: f64,
    pub medicare_withholding: f64,
    pub state_withholding: f64,
    pub local_withholding: f64,
}

/// Consolidated broker statement (1099-INT, 1099-DIV, 1099-B).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InterestDividendStatement {
    pub institution: String,
    pub interest: f64,
    pub other_income: f64,
    pub other_description: String,
    pub ordinary_dividends: f64,
    pub qualified_dividends: f64,
    pub capital_gain_distributions: f64,
    pub foreign_tax: f64,
    pub trades: Vec<Trade>,
    #[serde(rename = "Contracts1256")]
    pub contracts_1256: Vec<Contract1256>,
}

impl InterestDividendStatement {
    pub fn is_treasury(&self) -> bool {
        self.institution == "Department of the Treasury"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HoldingPeriod {
    Short,
    Long,
}

/// Form 8949 reporting box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::A,
        Category::B,
        Category::C,
        Category::D,
        Category::E,
        Category::F,
    ];

    /// Basis reported to the IRS with no adjustments, so the detail may be
    /// reported directly on Schedule D.
    pub fn is_fully_covered(self) -> bool {
        matches!(self, Category::A | Category::D)
    }

    pub fn code(self) -> char {
        match self {
            Category::A => 'A',
            Category::B => 'B',
            Category::C => 'C',
            Category::D => 'D',
            Category::E => 'E',
            Category::F => 'F',
        }
    }
}

/// Single sale from a 1099-B.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub description: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub date_acquired: String,
    #[serde(default)]
    pub date_sold: String,
    pub proceeds: f64,
    pub cost: f64,
    #[serde(default)]
    pub wash_sale_adjustment: Option<f64>,
    #[serde(default)]
    pub wash_sale_code: Option<String>,
    pub holding_period: HoldingPeriod,
    pub reporting_category: Category,
}

/// Section 1256 contract from a 1099-B.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contract1256 {
    pub description: String,
    pub profit_or_loss: f64,
}

/// Form 1098.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MortgageStatement {
    pub lender: String,
    pub principal_balance: f64,
    pub payments: Vec<MortgagePayment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MortgagePayment {
    pub interest: f64,
    pub principal: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EstimatedPayments {
    pub federal: Vec<f64>,
    pub state: Vec<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Deductions {
    pub medical_expenses: f64,
    pub property_tax: f64,
    pub coop_state_taxes: f64,
    /// Elect general sales tax instead of state and local income tax.
    pub sales_tax: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MiscElections {
    pub occupation: String,
    pub phone: String,
    pub email: String,
    pub presidential_election: bool,
    pub schedule_d: bool,
    pub virtual_currency: bool,
    pub foreign_account: Option<String>,
    pub health_savings_account: bool,
    pub hsa_contributions: f64,
    pub hsa_employer_contributions: f64,
    pub hsa_distributions: f64,
    pub direct_deposit: Option<DirectDeposit>,
    /// Replaces identity fields collected from wage statements.
    pub overrides: BTreeMap<String, String>,
}

impl Default for MiscElections {
    fn default() -> Self {
        Self {
            occupation: String::new(),
            phone: String::new(),
            email: String::new(),
            presidential_election: false,
            schedule_d: true,
            virtual_currency: false,
            foreign_account: None,
            health_savings_account: false,
            hsa_contributions: 0.0,
            hsa_employer_contributions: 0.0,
            hsa_distributions: 0.0,
            direct_deposit: None,
            overrides: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DirectDeposit {
    pub routing_number: String,
    pub account_number: String,
    pub checking: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_record() {
        let json = r#"{
            "WageStatements": [{ "Employer": "Acme", "Wages": 80000, "FederalWithholding": 10000 }],
            "InterestDividendStatements": [{
                "Institution": "Broker",
                "Interest": 12.5,
                "Trades": [{
                    "description": "AAPL",
                    "quantity": 10,
                    "proceeds": 1500,
                    "cost": 1000,
                    "holdingPeriod": "SHORT",
                    "reportingCategory": "A"
                }]
            }]
        }"#;

        let record: InputRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.wages(), 80000.0);
        assert_eq!(record.federal_withholding(), 10000.0);
        assert!(record.misc_elections.schedule_d);

        let trade = record.trades().next().unwrap();
        assert_eq!(trade.holding_period, HoldingPeriod::Short);
        assert_eq!(trade.reporting_category, Category::A);
        assert_eq!(trade.wash_sale_adjustment, None);
    }

    #[test]
    fn test_treasury_interest() {
        let record = InputRecord {
            interest_dividend_statements: vec![
                InterestDividendStatement {
                    institution: "Department of the Treasury".into(),
                    interest: 40.0,
                    ..Default::default()
                },
                InterestDividendStatement {
                    institution: "Bank".into(),
                    interest: 10.0,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(record.treasury_interest(), 40.0);
    }
}
