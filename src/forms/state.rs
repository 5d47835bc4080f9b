//! New York State resident return with the New York City resident tax.

use crate::engine::Run;
use crate::error::EvalError;
use crate::forms::{IT196, SA, W_AGI, W_MORTGAGE, W_NY_AGI};
use crate::rules::Jurisdiction;
use crate::value::round_to;

/// Federal amounts and New York modifications.
///
/// 1. wages, 2. taxable interest, 3. ordinary dividends, 4. capital gain or
/// loss, 5. federal adjustments, 6. federal adjusted gross income,
/// 7. subtractions, 8. New York adjusted gross income.
pub(super) fn adjusted_gross_income(run: &mut Run<'_>) -> Result<(), EvalError> {
    let input = run.input();
    let federal = run.get(W_AGI)?.lines();

    let mut lines = [0.0_f64; 8];
    lines[0] = federal[1];
    lines[1] = federal[2];
    lines[2] = federal[4];
    lines[3] = federal[5];
    lines[4] = federal[8];
    lines[5] = lines[0] + lines[1] + lines[2] + lines[3] - lines[4];
    // Interest on US obligations is exempt from state tax.
    lines[6] = input.treasury_interest();
    lines[7] = lines[5] - lines[6];

    run.push_lines(&lines);
    Ok(())
}

pub(super) fn it201(run: &mut Run<'_>) -> Result<(), EvalError> {
    let input = run.input();
    let policy = run.policy();

    // Federal income and adjustments
    let ny = run.get(W_NY_AGI)?.lines();
    run.push("1", ny[1]);
    run.push("2", ny[2]);
    run.push("3", ny[3]);
    run.push("7", ny[4]);
    run.push_sum("17", &["1", "2", "3", "7"]);
    run.push("18", ny[5]);
    run.push("19", run.own("17") - run.own("18"));

    // New York additions and subtractions
    run.push_sum("24", &["19", "20", "21", "22", "23"]);
    run.push("28", ny[7]);
    run.push_sum("32", &["25", "26", "27", "28", "29", "30", "31"]);
    run.push("33", run.own("24") - run.own("32"));
    run.summarize("33 New York adjusted gross income", run.own("33"));

    // Standard or itemized deduction
    let itemized = run.value(IT196, "49")?;
    run.push("34", itemized.max(policy.state_standard_deduction));
    run.summarize("34 Standard or itemized deduction", run.own("34"));
    run.push("35", run.own("33") - run.own("34"));
    run.push("37", (run.own("35") - run.own("36")).max(0.0));
    run.summarize("37 Taxable income", run.own("37"));
    let taxable = run.push_sum("38", &["37"]);

    // New York State tax
    let state_tax = run.tax(taxable, Jurisdiction::State);
    run.push("39", state_tax);
    run.summarize("39 New York State tax", run.own("39"));
    run.push_sum("43", &["40", "41", "42"]);
    run.push("44", run.own("39") - run.own("43"));
    run.push_sum("46", &["44", "45"]);
    run.summarize("46 Total New York State taxes", run.own("46"));

    // New York City tax
    let city_taxable = run.push_sum("47", &["38"]);
    run.push("47a", run.tax(city_taxable, Jurisdiction::City));
    run.push("49", (run.own("47a") - run.own("48")).max(0.0));
    run.push_sum("52", &["49", "50", "51"]);
    run.push("54", (run.own("52") - run.own("53")).max(0.0));
    run.push_sum("58", &["54", "54e", "55", "56", "57"]);
    run.summarize("58 Total New York City taxes", run.own("58"));

    let total = run.push_sum("61", &["46", "58", "59", "60"]);
    run.summarize("61 Total taxes", total);
    run.push_sum("62", &["61"]);

    // School tax credit, fixed amount and rate reduction
    if taxable < 250_000.0 {
        run.push("69", 63.0);
    }
    let reduction = if taxable < 12_000.0 {
        taxable * 0.00171
    } else if taxable < 500_000.0 {
        21.0 + (taxable - 12_000.0) * 0.00228
    } else {
        0.0
    };
    run.push("69a", reduction);

    // Payments
    run.push("72", input.state_withholding());
    run.push("73", input.local_withholding());
    run.push("75", input.estimated_payments.state.iter().sum::<f64>());
    let payments = run.push_sum(
        "76",
        &[
            "63", "64", "65", "66", "67", "68", "69", "69a", "70", "71", "72", "73", "74", "75",
        ],
    );
    run.summarize("76 Total payments", payments);

    let owed = run.own("62");
    if payments > owed {
        run.push("77", payments - owed);
        run.summarize("77 Overpaid", run.own("77"));
        run.push("78", (run.own("77") - run.own("79")).max(0.0));
        run.summarize("78 Refund", run.own("78"));
        run.push("78b", (run.own("78") - run.own("78a")).max(0.0));
    } else {
        run.push("80", owed - payments);
        run.summarize("80 Amount you owe", run.own("80"));
    }

    Ok(())
}

/// New York itemized deductions, with the adjustments of worksheets 1 to 3
/// computed inline.
pub(super) fn it196(run: &mut Run<'_>) -> Result<(), EvalError> {
    let input = run.input();
    let policy = run.policy();
    run.push_name_ssn();

    let ny = run.get(W_NY_AGI)?.lines();
    let (federal_agi, ny_agi) = (ny[6], ny[8]);

    // Medical and dental
    run.push("1", input.deductions.medical_expenses);
    run.push("2", federal_agi);
    run.push("3", run.own("2") * 0.10);
    run.push("4", (run.own("1") - run.own("3")).max(0.0));

    // Taxes
    run.push("5", input.state_withholding() + input.local_withholding());
    run.push("7", input.deductions.coop_state_taxes);
    let taxes = run.push_sum("9", &["5", "6", "7", "8"]);

    // Interest. The mortgage worksheet is filled while building Schedule A.
    run.get(SA)?;
    let interest = run.value(W_MORTGAGE, "13")?;
    run.push("10", interest);
    run.push_sum("15", &["10", "11", "12", "14"]);

    // Gifts to charity
    run.push_sum("19", &["16", "17", "18"]);

    // Line 40, total itemized deductions
    let total: f64 = ["4", "9", "15", "19", "20", "28", "39"]
        .iter()
        .map(|f| run.own(f))
        .sum();
    let excluded: f64 = ["4", "14", "16_a", "20", "29", "30", "37"]
        .iter()
        .map(|f| run.own(f))
        .sum();
    let limit = policy.state_itemized_limit_agi;

    let mut limited = 0.0;
    let mut limitable = 0.0;
    if total > excluded && federal_agi > limit {
        limitable = total - excluded;
        limited = (limitable * 0.80).min((federal_agi - limit) * 0.03);
        run.push("40", (total - limited).max(0.0));
    } else {
        run.push("40", total);
    }

    // Line 41, subtractions
    if federal_agi <= limit {
        run.push("41", taxes);
    } else {
        let ratio = if limitable > 0.0 {
            round_to(limited / limitable, 4)
        } else {
            0.0
        };
        run.push("41", taxes - ratio * taxes);
    }
    run.push("42", run.own("40") - run.own("41"));
    run.push_sum("45", &["42", "43", "44"]);

    // Line 46, adjustment above the New York AGI threshold
    let threshold = policy.state_itemized_adjustment_agi;
    if ny_agi > threshold {
        let excess = (ny_agi - threshold).min(50_000.0);
        let ratio = round_to(excess / 50_000.0, 4);
        run.push("46", ratio * run.own("45") * 0.25);
    }
    run.push("47", run.own("45") - run.own("46"));
    let itemized = run.push_sum("49", &["47", "48"]);
    if itemized > 0.0 {
        run.summarize("49 New York itemized deductions", itemized);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::forms::IT201;
    use crate::input::{
        InputRecord, InterestDividendStatement, MortgagePayment, MortgageStatement, WageStatement,
    };
    use crate::{Evaluator, Year, evaluate};

    use super::*;

    fn resident(wages: f64, state: f64, local: f64) -> InputRecord {
        InputRecord {
            wage_statements: vec![WageStatement {
                employer: "Acme".into(),
                wages: Some(wages),
                federal_withholding: Some(0.0),
                state_withholding: state,
                local_withholding: local,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_state_and_city_tax() {
        let evaluation = evaluate(&resident(80000.0, 4000.0, 2000.0), Year::Y2024).unwrap();

        assert_eq!(evaluation.num(IT201, "33"), 80000.0);
        assert_eq!(evaluation.num(IT201, "34"), 8000.0);
        assert_eq!(evaluation.num(IT201, "38"), 72000.0);
        assert_eq!(evaluation.num(IT201, "39"), 3795.0);
        assert_eq!(evaluation.num(IT201, "47a"), 2666.0);
        assert_eq!(evaluation.num(IT201, "62"), 6461.0);
        assert_eq!(evaluation.num(IT201, "69"), 63.0);
        assert_eq!(evaluation.num(IT201, "69a"), 158.0);
        assert_eq!(evaluation.num(IT201, "76"), 6221.0);
        assert_eq!(evaluation.num(IT201, "80"), 240.0);
        assert!(evaluation.unit(IT196).is_none());
    }

    #[test]
    fn test_treasury_interest_subtracted() {
        let mut input = resident(50000.0, 0.0, 0.0);
        input.interest_dividend_statements = vec![InterestDividendStatement {
            institution: "Department of the Treasury".into(),
            interest: 1000.0,
            ..Default::default()
        }];

        let evaluation = evaluate(&input, Year::Y2024).unwrap();
        assert_eq!(evaluation.num(IT201, "19"), 51000.0);
        assert_eq!(evaluation.num(IT201, "28"), 1000.0);
        assert_eq!(evaluation.num(IT201, "33"), 50000.0);
    }

    #[test]
    fn test_itemized_deductions_limited() {
        let mut input = resident(400000.0, 30000.0, 15000.0);
        input.mortgage_statements = vec![MortgageStatement {
            lender: "Bank".into(),
            principal_balance: 700000.0,
            payments: vec![MortgagePayment {
                interest: 40000.0,
                principal: 0.0,
            }],
        }];

        let evaluation = evaluate(&input, Year::Y2024).unwrap();
        assert_eq!(evaluation.num(IT196, "10"), 40000.0);
        // 85000 less 3% of the AGI above 330200
        assert_eq!(evaluation.num(IT196, "40"), 82906.0);
        assert_eq!(evaluation.num(IT196, "41"), 43893.0);
        assert_eq!(evaluation.num(IT196, "46"), 9753.0);
        assert_eq!(evaluation.num(IT196, "49"), 29260.0);
        assert_eq!(evaluation.num(IT201, "34"), 29260.0);
    }

    #[test]
    fn test_federal_only() {
        let evaluation = Evaluator::new(Year::Y2024)
            .with_state(false)
            .evaluate(&resident(80000.0, 4000.0, 2000.0))
            .unwrap();

        assert!(evaluation.unit(IT201).is_none());
        assert!(!evaluation.worksheets.contains_key(W_NY_AGI));
    }
}
