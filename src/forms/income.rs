use crate::engine::{Issue, Run};
use crate::error::EvalError;
use crate::forms::F8889;

/// Payer lines available on Schedule B, parts I and II.
const INTEREST_LINES: usize = 14;
const DIVIDEND_LINES: usize = 16;

pub(super) fn schedule_b(run: &mut Run<'_>) -> Result<(), EvalError> {
    let input = run.input();
    run.push_name_ssn();

    for statement in &input.interest_dividend_statements {
        if statement.institution.trim().is_empty() {
            run.report(
                Issue::MissingRequiredInput,
                "Interest and dividend statement has no payer name",
            );
        }
        if statement.qualified_dividends > statement.ordinary_dividends {
            run.report(
                Issue::InconsistentCrossDocumentInfo,
                format!(
                    "Statement from '{}' has qualified dividends {} above ordinary dividends {}",
                    statement.institution,
                    statement.qualified_dividends,
                    statement.ordinary_dividends
                ),
            );
        }
    }

    // Part I, interest
    let mut interest = Vec::new();
    for statement in &input.interest_dividend_statements {
        if statement.interest != 0.0 {
            interest.push((statement.institution.clone(), statement.interest));
        }
        if statement.other_income != 0.0 {
            let payer = format!("{} {}", statement.institution, statement.other_description);
            interest.push((payer, statement.other_income));
        }
    }

    // Part II, ordinary dividends
    let dividends: Vec<_> = input
        .interest_dividend_statements
        .iter()
        .filter(|s| s.ordinary_dividends != 0.0)
        .map(|s| (s.institution.clone(), s.ordinary_dividends))
        .collect();

    payers(run, "1", "Part I", &interest, INTEREST_LINES)?;
    payers(run, "5", "Part II", &dividends, DIVIDEND_LINES)?;

    let treasury = input.treasury_interest();
    if treasury != 0.0 {
        run.summarize("Treasury interest exempt from local tax", treasury);
    }

    let interest_lines: Vec<String> =
        (1..=INTEREST_LINES).map(|i| format!("1_{i}_value")).collect();
    let dividend_lines: Vec<String> =
        (1..=DIVIDEND_LINES).map(|i| format!("5_{i}_value")).collect();

    let total = sum_of(run, &interest_lines);
    run.push("2_value", total);
    run.push("4_value", run.own("2_value") - run.own("3_value"));
    let total = sum_of(run, &dividend_lines);
    run.push("6_value", total);

    // Part III, foreign accounts and trusts
    match &input.misc_elections.foreign_account {
        Some(country) => {
            run.set("7a_y", true);
            run.set("7a_yes_y", true);
            run.set("7b", country.as_str());
        }
        None => run.set("7a_n", true),
    }
    run.set("8_n", true);

    Ok(())
}

fn payers(
    run: &mut Run<'_>,
    line: &str,
    part: &str,
    entries: &[(String, f64)],
    limit: usize,
) -> Result<(), EvalError> {
    if entries.len() > limit {
        return Err(EvalError::PageOverflow {
            unit: run.name().to_string(),
            category: part.to_string(),
            items: entries.len(),
            limit,
        });
    }

    for (i, (payer, amount)) in entries.iter().enumerate() {
        let i = i + 1;
        run.set(&format!("{line}_{i}_payer"), payer.as_str());
        run.push(&format!("{line}_{i}_value"), *amount);
    }
    Ok(())
}

fn sum_of(run: &Run<'_>, fields: &[String]) -> f64 {
    fields.iter().map(|f| run.own(f)).sum()
}

pub(super) fn schedule_1(run: &mut Run<'_>) -> Result<(), EvalError> {
    run.push_name_ssn();

    let hsa = run.get(F8889)?;
    let (deduction, taxable_distribution) = (hsa.num("13"), hsa.num("16"));
    run.push("13", deduction);
    run.push("8_e", taxable_distribution);

    // Part I, additional income
    let other: f64 = [
        "8_b", "8_c", "8_e", "8_f", "8_g", "8_h", "8_i", "8_j", "8_k", "8_l", "8_m", "8_n",
        "8_o", "8_p", "8_z",
    ]
    .iter()
    .map(|f| run.own(f))
    .sum();
    run.push("9", other - run.own("8_a") - run.own("8_d"));
    run.push_sum("10", &["1", "2_a", "3", "4", "5", "6", "7", "9"]);

    // Part II, adjustments to income
    run.push_sum(
        "25",
        &[
            "24_a", "24_b", "24_c", "24_d", "24_e", "24_f", "24_g", "24_h", "24_i", "24_j",
            "24_k", "24_z",
        ],
    );
    run.push_sum(
        "26",
        &[
            "11", "12", "13", "14", "15", "16", "17", "18", "19_a", "20", "21", "23", "25",
        ],
    );

    Ok(())
}

/// Health savings account, self-only coverage.
pub(super) fn f8889(run: &mut Run<'_>) -> Result<(), EvalError> {
    let misc = &run.input().misc_elections;
    let limit = run.policy().hsa_contribution_limit;

    run.push_name_ssn();
    run.set("1_self", true);

    // Part I, contributions and deduction
    run.push("2", misc.hsa_contributions);
    run.push("3", limit);
    run.push("5", run.own("3") - run.own("4"));
    run.push("6", run.own("5"));
    run.push_sum("8", &["6", "7"]);
    run.push("9", misc.hsa_employer_contributions);
    run.push_sum("11", &["9", "10"]);
    run.push("12", (run.own("8") - run.own("11")).max(0.0));
    run.push("13", run.own("2").min(run.own("12")));

    // Part II, distributions
    run.push("14_a", misc.hsa_distributions);
    run.push("14_c", run.own("14_a") - run.own("14_b"));
    // Distributions are assumed to pay qualified medical expenses only.
    run.push("15", run.own("14_c"));
    run.push("16", run.own("14_c") - run.own("15"));

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::forms::{F1040, S1, SB};
    use crate::input::{InputRecord, InterestDividendStatement};
    use crate::{EvalError, Year, evaluate};

    use super::*;

    fn statement(institution: &str, interest: f64, dividends: f64) -> InterestDividendStatement {
        InterestDividendStatement {
            institution: institution.into(),
            interest,
            ordinary_dividends: dividends,
            ..Default::default()
        }
    }

    #[test]
    fn test_payer_lines() {
        let mut input = InputRecord::default();
        input.interest_dividend_statements = vec![
            statement("Bank", 120.0, 0.0),
            InterestDividendStatement {
                other_income: 30.0,
                other_description: "Bonus".into(),
                ..statement("Broker", 0.0, 500.0)
            },
        ];

        let evaluation = evaluate(&input, Year::Y2024).unwrap();
        let sb = evaluation.unit(SB).unwrap();
        assert_eq!(sb["1_1_payer"].as_text(), "Bank");
        assert_eq!(sb["1_2_payer"].as_text(), "Broker Bonus");
        assert_eq!(sb["5_1_payer"].as_text(), "Broker");
        assert_eq!(evaluation.num(SB, "4_value"), 150.0);
        assert_eq!(evaluation.num(SB, "6_value"), 500.0);
        assert_eq!(evaluation.num(F1040, "2_b"), 150.0);
        assert_eq!(evaluation.num(F1040, "3_b"), 500.0);
    }

    #[test]
    fn test_foreign_account_forces_schedule_b() {
        let mut input = InputRecord::default();
        input.interest_dividend_statements = vec![statement("Broker", 0.0, 0.0)];
        let evaluation = evaluate(&input, Year::Y2024).unwrap();
        assert!(evaluation.unit(SB).is_none());

        input.misc_elections.foreign_account = Some("France".into());
        let evaluation = evaluate(&input, Year::Y2024).unwrap();
        let sb = evaluation.unit(SB).unwrap();
        assert!(sb["7a_y"].as_bool());
        assert_eq!(sb["7b"].as_text(), "France");
    }

    #[test]
    fn test_statement_problems_logged() {
        let mut input = InputRecord::default();
        input.interest_dividend_statements = vec![
            statement("", 40.0, 0.0),
            InterestDividendStatement {
                qualified_dividends: 900.0,
                ..statement("Broker", 0.0, 600.0)
            },
        ];

        let evaluation = evaluate(&input, Year::Y2024).unwrap();
        let issues: Vec<_> = evaluation
            .log
            .iter()
            .filter(|d| d.message.contains("payer") || d.message.contains("Broker"))
            .map(|d| d.issue)
            .collect();
        assert_eq!(
            issues,
            vec![Issue::MissingRequiredInput, Issue::InconsistentCrossDocumentInfo]
        );
        assert_eq!(evaluation.num(SB, "4_value"), 40.0);
    }

    #[test]
    fn test_too_many_payers() {
        let mut input = InputRecord::default();
        input.interest_dividend_statements =
            (0..15).map(|i| statement(&format!("Bank {i}"), 1.0, 0.0)).collect();

        let err = evaluate(&input, Year::Y2024).unwrap_err();
        assert!(matches!(
            err,
            EvalError::PageOverflow { ref unit, items: 15, limit: 14, .. } if unit == SB
        ));
    }

    #[test]
    fn test_hsa_deduction_reaches_agi() {
        let mut input = InputRecord::default();
        input.misc_elections.health_savings_account = true;
        input.misc_elections.hsa_contributions = 5000.0;
        input.misc_elections.hsa_employer_contributions = 1000.0;

        let evaluation = evaluate(&input, Year::Y2024).unwrap();
        // 4150 limit less 1000 from the employer
        assert_eq!(evaluation.num(F8889, "13"), 3150.0);
        assert_eq!(evaluation.num(S1, "26"), 3150.0);
        assert_eq!(evaluation.num(F1040, "10"), 3150.0);
    }
}
