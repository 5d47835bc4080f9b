use crate::engine::Run;
use crate::error::EvalError;
use crate::forms::{F1040, F6251, F8959, S2, SA, W_TAXABLE, preferential_income, regular_tax};
use crate::rules::Jurisdiction;

/// Additional taxes. Lines 3 and 21 are carried to Form 1040 lines 17 and 23.
pub(super) fn schedule_2(run: &mut Run<'_>) -> Result<(), EvalError> {
    run.push_name_ssn();

    // Part I, tax. Form 6251 carries line 1.
    run.get(F6251)?;
    let tax = run.push_sum("3", &["1", "2"]);
    run.push_foreign(F1040, "17", tax)?;

    // Part II, other taxes. Form 8959 carries line 11.
    run.push_sum("7", &["5", "6"]);
    run.get(F8959)?;

    run.push_sum(
        "18",
        &[
            "17_a_value", "17_b", "17_c", "17_d", "17_e", "17_f", "17_g", "17_h", "17_i", "17_j",
            "17_k", "17_l", "17_m", "17_n", "17_o", "17_p", "17_q", "17_z_amount",
        ],
    );
    let other = run.push_sum(
        "21",
        &[
            "4", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "18",
        ],
    );
    run.summarize("21 Total other taxes", other);
    run.push_foreign(F1040, "23", other)?;

    Ok(())
}

/// Foreign tax credit claimed without Form 1116.
pub(super) fn schedule_3(run: &mut Run<'_>) -> Result<(), EvalError> {
    run.push_name_ssn();
    run.push("1", run.input().foreign_tax());
    let credits = run.push_sum("8", &["1", "2", "3", "4", "5", "7"]);
    run.push_foreign(F1040, "20", credits)
}

/// Alternative minimum tax. Line 11 is carried to Schedule 2 line 1.
pub(super) fn f6251(run: &mut Run<'_>) -> Result<(), EvalError> {
    let policy = run.policy();
    run.push_name_ssn();

    // Part I, alternative minimum taxable income
    let taxable = run.get(W_TAXABLE)?.lines();
    run.push("1_value", taxable[7]);
    let itemizing = taxable[2] > taxable[3];
    let deducted_taxes = if itemizing {
        run.value(SA, "7")?
    } else {
        taxable[4]
    };
    run.push("2a_value", deducted_taxes);

    let mut adjustments = vec!["1_value".to_string()];
    adjustments.extend(('a'..='t').map(|c| format!("2{c}_value")));
    adjustments.push("3_value".to_string());
    let amti: f64 = adjustments.iter().map(|f| run.own(f)).sum();
    run.push("4_value", amti);
    if amti != 0.0 {
        run.summarize("4 Alternative minimum taxable income", run.own("4_value"));
    }

    // Part II, exemption and tax
    let reduction = 0.25 * (amti - policy.amt_phaseout_start).max(0.0);
    run.push("5_value", (policy.amt_exemption - reduction).max(0.0));
    run.push("6_value", (run.own("4_value") - run.own("5_value")).max(0.0));

    let base = run.own("6_value");
    if base > 0.0 {
        let threshold = policy.amt_rate_threshold;
        let tentative = if base < threshold {
            base * 0.26
        } else {
            base * 0.28 - threshold * 0.02
        };
        run.push("7_value", tentative);
        run.push("9_value", run.own("7_value") - run.own("8_value"));
        let regular = regular_tax(run)?;
        run.push("10_value", regular.max(0.0));
    }

    run.push("11_value", (run.own("9_value") - run.own("10_value")).max(0.0));
    let amt = run.own("11_value");
    if amt > 0.0 {
        run.summarize("11 Alternative minimum tax", amt);
        run.push_foreign(S2, "1", amt)?;
    }

    Ok(())
}

/// Additional Medicare tax. Line 18 is carried to Schedule 2 line 11, line 24
/// to Form 1040 line 25c.
pub(super) fn f8959(run: &mut Run<'_>) -> Result<(), EvalError> {
    let input = run.input();
    let threshold = run.policy().additional_medicare_threshold;
    run.push_name_ssn();

    // Part I, Medicare wages
    run.push("1", input.medicare_wages());
    run.push_sum("4", &["1", "2", "3"]);
    run.push("5", threshold);
    run.push("6", (run.own("4") - run.own("5")).max(0.0));
    run.push("7", run.own("6") * 0.009);
    if run.own("7") > 0.0 {
        run.summarize("7 Additional Medicare Tax on Medicare wages", run.own("7"));
    }

    // Part II, self-employment income
    run.push("9", threshold);
    run.push_sum("10", &["4"]);
    run.push("11", (run.own("9") - run.own("10")).max(0.0));
    run.push("12", (run.own("8") - run.own("11")).max(0.0));
    run.push("13", run.own("12") * 0.009);

    // Part IV, total
    let total = run.push_sum("18", &["7", "13", "17"]);
    run.summarize("18 Total Additional Medicare Tax", total);
    run.push_foreign(S2, "11", total)?;

    // Part V, withholding reconciliation
    run.push("19", input.medicare_withholding());
    run.push_sum("20", &["1"]);
    run.push("21", run.own("20") * 0.0145);
    run.push("22", (run.own("19") - run.own("21")).max(0.0));
    let withheld = run.push_sum("24", &["22", "23"]);
    if withheld > 0.0 {
        run.summarize("24 Total Additional Medicare Tax withholding", withheld);
    }
    run.push_foreign(F1040, "25_c", withheld)?;

    Ok(())
}

/// Qualified Dividends and Capital Gain Tax Worksheet.
///
/// Line 25 is the lesser of the blended tax (line 23) and the bracket tax on
/// all taxable income (line 24).
pub(super) fn qualified_dividends(run: &mut Run<'_>) -> Result<(), EvalError> {
    let policy = run.policy();
    let taxable = run.value(W_TAXABLE, "7")?;
    let (dividends, gain) = preferential_income(run)?;

    let mut l = [0.0_f64; 26];
    l[1] = taxable;
    l[2] = dividends;
    l[3] = gain;
    l[4] = l[2] + l[3];
    l[5] = (l[1] - l[4]).max(0.0);
    l[6] = policy.qualified_zero_rate_limit;
    l[7] = l[1].min(l[6]);
    l[8] = l[5].min(l[7]);
    // taxed at 0%
    l[9] = l[7] - l[8];
    l[10] = l[1].min(l[4]);
    l[11] = l[9];
    l[12] = l[10] - l[11];
    l[13] = policy.qualified_fifteen_rate_limit;
    l[14] = l[1].min(l[13]);
    l[15] = l[5] + l[9];
    l[16] = (l[14] - l[15]).max(0.0);
    l[17] = l[12].min(l[16]);
    l[18] = l[17] * 0.15;
    l[19] = l[9] + l[17];
    l[20] = l[10] - l[19];
    l[21] = l[20] * 0.20;
    l[22] = run.tax(l[5], Jurisdiction::Federal);
    l[23] = l[18] + l[21] + l[22];
    l[24] = run.tax(l[1], Jurisdiction::Federal);
    l[25] = l[23].min(l[24]);

    run.push_lines(&l[1..]);
    run.summarize("25 Tax on all taxable income", run.own("25"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::forms::{S3, W_QDCG};
    use crate::input::{
        InputRecord, InterestDividendStatement, MortgagePayment, MortgageStatement, WageStatement,
    };
    use crate::value::Value;
    use crate::{Year, evaluate};

    use super::*;

    fn wage_earner(wages: f64, withheld: f64) -> InputRecord {
        InputRecord {
            wage_statements: vec![WageStatement {
                employer: "Acme".into(),
                wages: Some(wages),
                federal_withholding: Some(withheld),
                medicare_wages: wages,
                medicare_withholding: wages * 0.0145,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_qualified_dividends_lower_the_tax() {
        let mut input = wage_earner(80000.0, 10000.0);
        input.interest_dividend_statements = vec![InterestDividendStatement {
            institution: "Broker".into(),
            ordinary_dividends: 5000.0,
            qualified_dividends: 5000.0,
            ..Default::default()
        }];

        let evaluation = evaluate(&input, Year::Y2024).unwrap();
        let taxable = evaluation.num(F1040, "15");
        assert_eq!(taxable, 70400.0);

        let bracket = evaluation.line(W_QDCG, 24);
        let blended = evaluation.line(W_QDCG, 23);
        assert_eq!(bracket, 10541.0);
        assert_eq!(blended, 10191.0);
        assert_eq!(evaluation.line(W_QDCG, 25), blended.min(bracket));
        assert_eq!(evaluation.num(F1040, "16"), 10191.0);
        assert!(evaluation.num(F1040, "16") < bracket);
    }

    #[test]
    fn test_no_worksheet_without_preferential_income() {
        let evaluation = evaluate(&wage_earner(80000.0, 10000.0), Year::Y2024).unwrap();
        assert!(!evaluation.worksheets.contains_key(W_QDCG));
    }

    #[test]
    fn test_additional_medicare_tax() {
        let evaluation = evaluate(&wage_earner(250000.0, 60000.0), Year::Y2024).unwrap();

        // 0.9% of the 50000 above the threshold
        assert_eq!(evaluation.num(F8959, "7"), 450.0);
        assert_eq!(evaluation.num(S2, "11"), 450.0);
        assert_eq!(evaluation.num(S2, "21"), 450.0);
        assert_eq!(evaluation.num(F1040, "23"), 450.0);
        assert_eq!(
            evaluation.num(F1040, "24"),
            evaluation.num(F1040, "22") + 450.0
        );
    }

    #[test]
    fn test_additional_medicare_withholding_credit() {
        let mut input = wage_earner(250000.0, 60000.0);
        input.wage_statements[0].medicare_withholding = 250000.0 * 0.0145 + 450.0;

        let evaluation = evaluate(&input, Year::Y2024).unwrap();
        assert_eq!(evaluation.num(F8959, "24"), 450.0);
        assert_eq!(evaluation.num(F1040, "25_c"), 450.0);
        assert_eq!(evaluation.num(F1040, "25_d"), 60450.0);
    }

    #[test]
    fn test_schedules_left_out_when_empty() {
        let evaluation = evaluate(&wage_earner(80000.0, 10000.0), Year::Y2024).unwrap();
        for unit in [S2, S3, F6251, F8959] {
            assert!(evaluation.unit(unit).is_none(), "{unit} should be left out");
        }
    }

    #[test]
    fn test_foreign_tax_credit() {
        let mut input = wage_earner(80000.0, 10000.0);
        input.interest_dividend_statements = vec![InterestDividendStatement {
            institution: "Broker".into(),
            ordinary_dividends: 1000.0,
            foreign_tax: 35.0,
            ..Default::default()
        }];

        let evaluation = evaluate(&input, Year::Y2024).unwrap();
        assert_eq!(evaluation.num(S3, "8"), 35.0);
        assert_eq!(evaluation.num(F1040, "20"), 35.0);
        assert_eq!(
            evaluation.num(F1040, "22"),
            evaluation.num(F1040, "18") - 35.0
        );
    }

    #[test]
    fn test_alternative_minimum_taxable_income() {
        let mut input = wage_earner(80000.0, 10000.0);
        input.wage_statements[0].state_withholding = 9000.0;
        input.deductions.property_tax = 1000.0;
        input.mortgage_statements = vec![MortgageStatement {
            lender: "Bank".into(),
            principal_balance: 400000.0,
            payments: vec![MortgagePayment {
                interest: 20000.0,
                principal: 0.0,
            }],
        }];

        let evaluation = evaluate(&input, Year::Y2024).unwrap();
        assert_eq!(evaluation.num(F1040, "15"), 50000.0);

        // Itemizing, so the taxes of Schedule A line 7 are added back.
        let amti = evaluation
            .summary
            .get("Federal/f6251 4 Alternative minimum taxable income");
        assert_eq!(amti, Some(&Value::Number(60000.0)));
        assert!(evaluation.unit(F6251).is_none());
    }
}
