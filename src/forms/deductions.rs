use crate::engine::Run;
use crate::error::EvalError;
use crate::forms::{SA, W_AGI, W_MORTGAGE};

/// Itemized deductions. The mortgage worksheet carries line 8a.
pub(super) fn schedule_a(run: &mut Run<'_>) -> Result<(), EvalError> {
    let input = run.input();
    let deductions = &input.deductions;
    run.push_name_ssn();

    // Medical and dental expenses
    let agi = run.value(W_AGI, "9")?;
    run.push("1", deductions.medical_expenses);
    run.push("2", agi);
    run.push("3", run.own("2") * 0.075);
    run.push("4", (run.own("1") - run.own("3")).max(0.0));

    // Taxes you paid
    match deductions.sales_tax {
        Some(amount) => {
            run.push("5_a_y", true);
            run.push("5_a", amount);
        }
        None => run.push("5_a", input.state_withholding() + input.local_withholding()),
    }
    run.push("5_c", deductions.property_tax);
    run.push_sum("5_d", &["5_a", "5_b", "5_c"]);
    let cap = run.policy().salt_cap;
    run.push("5_e", run.own("5_d").min(cap));
    run.push_sum("7", &["5_e", "6"]);

    // Interest you paid
    run.get(W_MORTGAGE)?;
    run.push_sum("8_e", &["8_a", "8_b", "8_c"]);
    run.push_sum("10", &["8_e", "9"]);

    let total = run.push_sum("17", &["4", "7", "10", "14", "15", "16"]);
    if total > 0.0 {
        run.summarize("17 Total itemized deductions", total);
    }

    Ok(())
}

/// Deductible home mortgage interest (Publication 936, Table 1).
///
/// Line 14 keeps three decimals. When the average balance is within the
/// qualified loan limit all interest on line 13 is deductible.
pub(super) fn mortgage_interest(run: &mut Run<'_>) -> Result<(), EvalError> {
    let input = run.input();
    let policy = run.policy();
    if input.mortgage_statements.is_empty() {
        return Ok(());
    }

    let mut balance = 0.0;
    let mut interest = 0.0;
    let mut principal = 0.0;
    for statement in &input.mortgage_statements {
        balance += statement.principal_balance;
        for payment in &statement.payments {
            interest += payment.interest;
            principal += payment.principal;
        }
    }

    // Part I, qualified loan limit
    let mut l = [0.0_f64; 14];
    // grandfathered and pre-2017 debt
    l[1] = 0.0;
    l[2] = 0.0;
    l[3] = policy.grandfathered_debt_limit;
    l[4] = l[1].max(l[3]);
    l[5] = l[1] + l[2];
    l[6] = l[4].min(l[5]);
    l[7] = balance - 0.5 * principal;
    l[8] = policy.mortgage_debt_limit;
    l[9] = l[6].max(l[8]);
    l[10] = l[6] + l[7];
    l[11] = l[9].min(l[10]);

    // Part II, deductible interest
    l[12] = l[1] + l[2] + l[7];
    l[13] = interest;
    run.push_lines(&l[1..]);
    run.summarize("11 Qualified loan limit", run.own("11"));

    if l[11] >= l[12] {
        run.summarize("13 All interest deductible", run.own("13"));
        return run.push_foreign(SA, "8_a", l[13]);
    }

    run.push_with("14", l[11] / l[12], 3);
    run.push("15", run.own("13") * run.own("14"));
    run.push("16", run.own("13") - run.own("15"));
    run.summarize("15 Deductible home mortgage interest", run.own("15"));
    run.summarize("16 Personal interest, not deductible", run.own("16"));

    run.push_foreign(SA, "8_a", run.own("15"))
}
