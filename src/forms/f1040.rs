use crate::engine::Run;
use crate::error::EvalError;
use crate::forms::{F1040, S1, S2, S3, SA, SB, SD, W_AGI, W_TAXABLE, regular_tax};

pub(super) fn f1040(run: &mut Run<'_>) -> Result<(), EvalError> {
    let input = run.input();
    let misc = &input.misc_elections;

    let identity = run.identity().clone();
    run.set("single", true);
    run.set("self_first_name_initial", identity.first_name_initial());
    run.set("self_last_name", identity.last_name);
    run.set("self_ssn", identity.ssn);
    run.set("address", identity.address);
    run.set("apt", identity.apt);
    run.set("city", identity.city);
    run.set("state", identity.state);
    run.set("zip", identity.zip);
    run.set("presidential_election_self", misc.presidential_election);
    run.set("self_occupation", misc.occupation.as_str());
    run.set("phone", misc.phone.as_str());
    run.set("email", misc.email.as_str());

    if misc.virtual_currency {
        run.push("virtual_currency_y", true);
    } else {
        run.push("virtual_currency_n", true);
    }

    // Income
    let agi = run.get(W_AGI)?.lines();
    run.push("1_a", agi[1]);
    run.push_sum("1_z", &["1_a", "1_b", "1_c", "1_d", "1_e", "1_f", "1_g", "1_h"]);
    run.push("2_b", agi[2]);
    run.push("3_a", agi[3]);
    run.push("3_b", agi[4]);
    run.push("7_value", agi[5]);
    run.push("7_n", !misc.schedule_d);
    run.push("8", agi[6]);

    let total = run.push_sum(
        "9",
        &["1_z", "2_b", "3_b", "4_b", "5_b", "6_b", "7_value", "8"],
    );
    run.summarize("9 Total income", total);

    run.push("10", agi[8]);
    let adjusted = run.own("9") - run.own("10");
    run.push("11", adjusted);
    run.summarize("11 Adjusted gross income", run.own("11"));

    // Deductions
    let taxable = run.get(W_TAXABLE)?.lines();
    run.push("12", taxable[4]);
    run.summarize("12 Standard deduction or itemized deductions", run.own("12"));
    run.push("13", taxable[5]);
    run.push("14", taxable[6]);
    run.push("15", taxable[7]);
    run.summarize("15 Taxable income", run.own("15"));

    // Tax and credits
    let tax = regular_tax(run)?;
    run.push("16", tax);
    run.summarize("16 Tax", run.own("16"));

    // Schedule 2 carries lines 17 and 23, Form 8959 carries 25c.
    run.get(S2)?;

    run.push_sum("18", &["16", "17"]);
    if input.foreign_tax() > 0.0 {
        run.get(S3)?;
    }
    run.push_sum("21", &["19", "20"]);
    let after_credits = (run.own("18") - run.own("21")).max(0.0);
    run.push("22", after_credits);
    let total_tax = run.push_sum("24", &["22", "23"]);
    run.summarize("24 Total tax", total_tax);

    // Payments
    run.push("25_a", input.federal_withholding());
    run.push_sum("25_d", &["25_a", "25_b", "25_c"]);
    run.push("26", input.estimated_payments.federal.iter().sum::<f64>());
    run.push_sum("32", &["27_a", "27_b", "27_c", "28", "29", "30", "31"]);
    let payments = run.push_sum("33", &["25_d", "26", "32"]);
    run.summarize("33 Total payments", payments);

    // Refund or amount owed
    let overpaid = payments - total_tax;
    if overpaid > 0.0 {
        run.push("34", overpaid);
        run.summarize("34 Overpaid", run.own("34"));
        run.push("35a_value", overpaid);
        if let Some(deposit) = &misc.direct_deposit {
            run.set("35b", deposit.routing_number.as_str());
            if deposit.checking {
                run.set("35c_checking", true);
            } else {
                run.set("35c_savings", true);
            }
            run.set("35d", deposit.account_number.as_str());
        }
        run.set("36", "-0-");
    } else {
        run.push("37", -overpaid);
        run.summarize("37 Amount you owe", run.own("37"));
    }

    run.set("other_designee_n", true);

    tracing::debug!(unit = F1040, total_tax, payments, "Computed balance");
    Ok(())
}

/// Lines 1 through 11 of Form 1040, gathered from the income schedules.
///
/// 1. wages, 2. taxable interest, 3. qualified dividends, 4. ordinary
/// dividends, 5. capital gain or loss, 6. additional income, 7. total
/// income, 8. adjustments, 9. adjusted gross income.
pub(super) fn adjusted_gross_income(run: &mut Run<'_>) -> Result<(), EvalError> {
    let input = run.input();
    let mut lines = [0.0_f64; 9];

    lines[0] = input.wages();
    lines[2] = input.qualified_dividends();

    if input.has_broker_statements() {
        let sb = run.get(SB)?;
        lines[1] = sb.num("4_value");
        lines[3] = sb.num("6_value");

        let sd = run.get(SD)?;
        let net = sd.num("16");
        lines[4] = if net > 0.0 {
            net
        } else if net < 0.0 {
            // Schedule D shows the limited loss as a positive amount.
            -sd.num("21")
        } else {
            0.0
        };
    }

    if input.misc_elections.health_savings_account {
        let s1 = run.get(S1)?;
        lines[5] = s1.num("10");
        lines[7] = s1.num("26");
    }

    lines[6] = lines[0] + lines[1] + lines[3] + lines[4] + lines[5];
    lines[8] = lines[6] - lines[7];

    run.push_lines(&lines);
    Ok(())
}

/// Lines 11 through 15 of Form 1040.
///
/// 1. adjusted gross income, 2. itemized deductions, 3. standard deduction,
/// 4. the larger of both, 5. qualified business income deduction, 6. total
/// deductions, 7. taxable income.
pub(super) fn taxable_income(run: &mut Run<'_>) -> Result<(), EvalError> {
    let agi = run.value(W_AGI, "9")?;
    let itemized = run.value(SA, "17")?;
    let standard = run.policy().standard_deduction;

    let deduction = itemized.max(standard);
    let qualified_business = 0.0;
    let total = deduction + qualified_business;

    run.push_lines(&[
        agi,
        itemized,
        standard,
        deduction,
        qualified_business,
        total,
        (agi - total).max(0.0),
    ]);
    Ok(())
}
