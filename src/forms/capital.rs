use crate::engine::{Inclusion, Run, Unit, UnitKind};
use crate::error::EvalError;
use crate::forms::{F1040, F6781, F8949, SD, W_CARRYOVER};
use crate::input::{Category, HoldingPeriod, Trade};
use crate::trades::{Amounts, LineItem, Page};
use crate::value::round_to;

/// Rows available in Part I of Form 6781.
const CONTRACT_LINES: usize = 3;

/// A row of Form 8949: a broker trade, or the 40/60 split of section 1256
/// gains which only carries a gain.
#[derive(Debug)]
enum SaleLine<'a> {
    Trade(&'a Trade),
    Contracts {
        holding: HoldingPeriod,
        category: Category,
        gain: f64,
    },
}

impl LineItem for SaleLine<'_> {
    fn holding_period(&self) -> HoldingPeriod {
        match self {
            SaleLine::Trade(trade) => trade.holding_period(),
            SaleLine::Contracts { holding, .. } => *holding,
        }
    }

    fn category(&self) -> Category {
        match self {
            SaleLine::Trade(trade) => trade.category(),
            SaleLine::Contracts { category, .. } => *category,
        }
    }

    fn amounts(&self) -> Amounts {
        match self {
            SaleLine::Trade(trade) => trade.amounts(),
            SaleLine::Contracts { gain, .. } => Amounts {
                gain: round_to(*gain, 2),
                ..Amounts::default()
            },
        }
    }
}

/// Builds every non-suppressed page as its own unit `Federal/f8949_<n>`.
/// The base unit only drives the pagination and is never exported.
pub(super) fn f8949(run: &mut Run<'_>) -> Result<(), EvalError> {
    let input = run.input();
    let mut items: Vec<SaleLine> = input.trades().map(SaleLine::Trade).collect();

    let has_contracts = input
        .interest_dividend_statements
        .iter()
        .any(|s| !s.contracts_1256.is_empty());
    if has_contracts {
        let f6781 = run.get(F6781)?;
        for (line, holding, category) in [
            ("8", HoldingPeriod::Short, Category::B),
            ("9", HoldingPeriod::Long, Category::E),
        ] {
            if f6781.has(line) {
                items.push(SaleLine::Contracts {
                    holding,
                    category,
                    gain: f6781.num(line),
                });
            }
        }
    }

    let name = run.name().to_string();
    let paginator = run.paginator();
    let pages = paginator.paginate(&name, &items, run.totals_mut())?;

    let mut number = 0;
    for page in &pages {
        if page.is_suppressed() {
            tracing::debug!(category = %page.category.code(), "Totals only, no page");
            continue;
        }
        number += 1;
        let unit = page_unit(run, &format!("{name}_{number}"), page);
        run.emit_page(unit);
    }

    tracing::debug!(items = items.len(), pages = number, "Paginated sales");
    Ok(())
}

fn page_unit(run: &Run<'_>, name: &str, page: &Page<'_, SaleLine<'_>>) -> Unit {
    let mut unit = Unit::new(name, UnitKind::Form, 2, Inclusion::Always);
    let identity = run.identity();

    for (part, holding, side) in [
        ("I", HoldingPeriod::Short, &page.short),
        ("II", HoldingPeriod::Long, &page.long),
    ] {
        unit.set(&format!("{part}_name"), identity.display_name().into());
        unit.set(&format!("{part}_ssn"), identity.ssn.clone().into());

        if side.is_empty() {
            continue;
        }

        let check = match holding {
            HoldingPeriod::Short => "short",
            HoldingPeriod::Long => "long",
        };
        let code = page.category.code().to_ascii_lowercase();
        unit.set(&format!("{check}_{code}"), true.into());

        for (i, item) in side.iter().enumerate() {
            let row = format!("{part}_1_{}", i + 1);
            let amounts = item.amounts();

            match item {
                SaleLine::Trade(trade) => {
                    let description = format!("{} {}", trade.quantity, trade.description);
                    unit.set(&format!("{row}_description"), description.into());
                    unit.set(&format!("{row}_date_acq"), trade.date_acquired.clone().into());
                    unit.set(&format!("{row}_date_sold"), trade.date_sold.clone().into());
                    unit.push(&format!("{row}_proceeds"), amounts.proceeds.into(), 2);
                    unit.push(&format!("{row}_cost"), amounts.cost.into(), 2);
                    if trade.wash_sale_adjustment.is_some() {
                        unit.push(&format!("{row}_adjustment"), amounts.adjustment.into(), 2);
                        if let Some(code) = &trade.wash_sale_code {
                            unit.set(&format!("{row}_code"), code.clone().into());
                        }
                    }
                }
                SaleLine::Contracts { .. } => {
                    unit.set(&format!("{row}_description"), "Form 6781, Part I".into());
                }
            }
            unit.push(&format!("{row}_gain"), amounts.gain.into(), 2);
        }

        let totals = page.totals(holding);
        unit.push(&format!("{part}_2_proceeds"), totals.proceeds.into(), 2);
        unit.push(&format!("{part}_2_cost"), totals.cost.into(), 2);
        unit.push(&format!("{part}_2_adjustment"), totals.adjustment.into(), 2);
        unit.push(&format!("{part}_2_gain"), totals.gain.into(), 2);
    }

    unit
}

/// Gains and losses from section 1256 contracts.
pub(super) fn f6781(run: &mut Run<'_>) -> Result<(), EvalError> {
    let input = run.input();
    let contracts: Vec<_> = input
        .interest_dividend_statements
        .iter()
        .flat_map(|s| s.contracts_1256.iter().map(move |c| (&s.institution, c)))
        .collect();

    if contracts.len() > CONTRACT_LINES {
        return Err(EvalError::PageOverflow {
            unit: F6781.to_string(),
            category: "Part I".to_string(),
            items: contracts.len(),
            limit: CONTRACT_LINES,
        });
    }

    run.push_name_ssn();
    for (i, (institution, contract)) in contracts.iter().enumerate() {
        let i = i + 1;
        run.set(&format!("1_{i}_a"), format!("Form 1099-B {institution}"));
        if contract.profit_or_loss < 0.0 {
            run.push(&format!("1_{i}_b"), -contract.profit_or_loss);
        } else {
            run.push(&format!("1_{i}_c"), contract.profit_or_loss);
        }
    }

    run.push_sum("2_b", &["1_1_b", "1_2_b", "1_3_b"]);
    run.push_sum("2_c", &["1_1_c", "1_2_c", "1_3_c"]);
    run.push("3", run.own("2_c") - run.own("2_b"));
    run.push_sum("5", &["3", "4"]);
    let net = run.push_sum("7", &["5", "6"]);
    // 40% short term, 60% long term
    run.push("8", net * 0.4);
    run.push("9", net * 0.6);

    Ok(())
}

pub(super) fn schedule_d(run: &mut Run<'_>) -> Result<(), EvalError> {
    let input = run.input();
    run.push_name_ssn();
    run.set("dispose_opportunity_n", true);

    // Totals of every page, including the suppressed ones.
    run.get(F8949)?;

    for (line, holding, category) in [
        ("1a", HoldingPeriod::Short, Category::A),
        ("2", HoldingPeriod::Short, Category::B),
        ("3", HoldingPeriod::Short, Category::C),
        ("8a", HoldingPeriod::Long, Category::D),
        ("9", HoldingPeriod::Long, Category::E),
        ("10", HoldingPeriod::Long, Category::F),
    ] {
        let totals = run.totals().get(holding, category);
        run.push(&format!("{line}_proceeds"), totals.proceeds);
        run.push(&format!("{line}_cost"), totals.cost);
        if !category.is_fully_covered() {
            run.push(&format!("{line}_adjustments"), totals.adjustment);
        }
        run.push(&format!("{line}_gain"), totals.gain);
    }

    // Carries the prior-year losses into lines 6 and 14, as positive amounts.
    run.get(W_CARRYOVER)?;

    let short = ["1a_gain", "1b_gain", "2_gain", "3_gain", "4", "5"]
        .iter()
        .map(|f| run.own(f))
        .sum::<f64>();
    run.push("7", short - run.own("6"));
    run.summarize("7 Net short-term capital gain or (loss)", run.own("7"));

    run.push("13", input.capital_gain_distributions());
    let long = ["8a_gain", "8b_gain", "9_gain", "10_gain", "11", "12", "13"]
        .iter()
        .map(|f| run.own(f))
        .sum::<f64>();
    run.push("15", long - run.own("14"));
    run.summarize("15 Net long-term capital gain or (loss)", run.own("15"));

    let net = run.push_sum("16", &["7", "15"]);

    if net > 0.0 {
        if run.own("15") < 0.0 {
            run.set("17_n", true);
        } else {
            run.set("17_y", true);
            // No 28% rate gain, unrecaptured section 1250 gain or Form 4952.
            if run.own("18") == 0.0 && run.own("19") == 0.0 {
                run.set("20_y", true);
            } else {
                run.set("20_n", true);
            }
            return Ok(());
        }
    } else if net < 0.0 {
        let limit = run.policy().capital_loss_limit;
        run.push("21", limit.min(-net));
    }

    if input.qualified_dividends() > 0.0 {
        run.set("22_y", true);
    } else {
        run.set("22_n", true);
    }

    Ok(())
}

/// Capital loss carryover from the prior year's Form 1040 and Schedule D.
///
/// Without a prior-year snapshot every line stays empty.
pub(super) fn loss_carryover(run: &mut Run<'_>) -> Result<(), EvalError> {
    let Some(prior) = run.prior() else {
        return Ok(());
    };

    let taxable = prior.num(F1040, "15");
    let limited_loss = prior.num(SD, "21");
    let short = prior.num(SD, "7");
    let long = prior.num(SD, "15");

    let mut lines = [0.0_f64; 13];
    lines[0] = taxable;
    lines[1] = limited_loss.max(0.0);
    lines[2] = (lines[0] + lines[1]).max(0.0);
    lines[3] = lines[1].min(lines[2]);

    if short < 0.0 {
        lines[4] = -short;
        lines[5] = long.max(0.0);
        lines[6] = lines[3] + lines[5];
        lines[7] = (lines[4] - lines[6]).max(0.0);
    }
    if long < 0.0 {
        lines[8] = -long;
        lines[9] = short.max(0.0);
        lines[10] = (lines[3] - lines[4]).max(0.0);
        lines[11] = lines[9] + lines[10];
        lines[12] = (lines[8] - lines[11]).max(0.0);
    }

    run.push_lines(&lines);
    if lines[7] > 0.0 {
        run.summarize("8 Short-term capital loss carryover", lines[7]);
    }
    if lines[12] > 0.0 {
        run.summarize("13 Long-term capital loss carryover", lines[12]);
    }

    run.push_foreign(SD, "6", lines[7])?;
    run.push_foreign(SD, "14", lines[12])?;
    Ok(())
}
