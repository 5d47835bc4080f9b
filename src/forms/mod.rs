//! Build routines of the federal 1040 family and the New York attachment.
//!
//! Every unit is registered in [`UNITS`] together with its rounding precision
//! and the rule deciding whether it shows up in the output. Units read each
//! other through [`Run::get`], so the registry has to stay acyclic: a form
//! never reads a unit that is still being built above it. Values that the
//! printed forms carry *upwards* (Schedule 2 into Form 1040, Form 8959 into
//! Schedule 2, and so on) travel through [`Run::push_foreign`] instead.

mod capital;
mod deductions;
mod f1040;
mod income;
mod state;
mod taxes;

use crate::engine::{Inclusion, Run, UnitDef, UnitKind};
use crate::error::EvalError;
use crate::rules::Jurisdiction;

pub const F1040: &str = "Federal/f1040";
pub const S1: &str = "Federal/f1040s1";
pub const S2: &str = "Federal/f1040s2";
pub const S3: &str = "Federal/f1040s3";
pub const SA: &str = "Federal/f1040sa";
pub const SB: &str = "Federal/f1040sb";
pub const SD: &str = "Federal/f1040sd";
pub const F6251: &str = "Federal/f6251";
pub const F6781: &str = "Federal/f6781";
pub const F8889: &str = "Federal/f8889";
pub const F8949: &str = "Federal/f8949";
pub const F8959: &str = "Federal/f8959";
pub const IT201: &str = "NY/it201";
pub const IT196: &str = "NY/it196";

pub const W_AGI: &str = "AdjustedGrossIncome";
pub const W_TAXABLE: &str = "TaxableIncome";
pub const W_QDCG: &str = "QualifiedDividendsAndCapitalGains";
pub const W_CARRYOVER: &str = "CapitalLossCarryover";
pub const W_MORTGAGE: &str = "MortgageInterestDeduction";
pub const W_NY_AGI: &str = "NewYorkAdjustedGrossIncome";

pub(crate) const FEDERAL_ROOTS: &[&str] = &[F1040];
pub(crate) const STATE_ROOTS: &[&str] = &[IT201];

const fn form(name: &'static str, include: Inclusion, build: crate::engine::BuildFn) -> UnitDef {
    UnitDef {
        name,
        kind: UnitKind::Form,
        precision: 0,
        include,
        build,
    }
}

const fn worksheet(name: &'static str, lines: usize, build: crate::engine::BuildFn) -> UnitDef {
    UnitDef {
        name,
        kind: UnitKind::Worksheet { lines },
        precision: 2,
        include: Inclusion::Never,
        build,
    }
}

/// Schedule D lines that carry an amount.
const SD_AMOUNTS: &[&str] = &[
    "1a_proceeds", "1a_cost", "1a_gain", "1b_gain", "2_proceeds", "2_cost", "2_gain", "3_proceeds",
    "3_cost", "3_gain", "6", "7", "8a_proceeds", "8a_cost", "8a_gain", "8b_gain", "9_proceeds",
    "9_cost", "9_gain", "10_proceeds", "10_cost", "10_gain", "13", "14", "15", "16", "21",
];

pub(crate) const UNITS: &[UnitDef] = &[
    form(F1040, Inclusion::Always, f1040::f1040),
    form(S1, Inclusion::WhenAny(&["10", "26"]), income::schedule_1),
    form(S2, Inclusion::WhenAny(&["3", "21"]), taxes::schedule_2),
    form(S3, Inclusion::Always, taxes::schedule_3),
    form(SA, Inclusion::WhenAny(&["17"]), deductions::schedule_a),
    form(
        SB,
        Inclusion::WhenAnyOrFlag {
            fields: &["4_value", "6_value"],
            flag: "7a_y",
        },
        income::schedule_b,
    ),
    form(SD, Inclusion::WhenAny(SD_AMOUNTS), capital::schedule_d),
    form(F6251, Inclusion::WhenAny(&["11_value"]), taxes::f6251),
    form(F6781, Inclusion::WhenAny(&["2_b", "2_c", "7"]), capital::f6781),
    form(F8889, Inclusion::WhenAny(&["13", "16"]), income::f8889),
    UnitDef {
        name: F8949,
        kind: UnitKind::Form,
        precision: 2,
        include: Inclusion::Never,
        build: capital::f8949,
    },
    form(F8959, Inclusion::WhenAny(&["18", "24"]), taxes::f8959),
    form(IT201, Inclusion::Always, state::it201),
    form(IT196, Inclusion::WhenAny(&["49"]), state::it196),
    worksheet(W_AGI, 9, f1040::adjusted_gross_income),
    worksheet(W_TAXABLE, 7, f1040::taxable_income),
    worksheet(W_QDCG, 25, taxes::qualified_dividends),
    worksheet(W_CARRYOVER, 13, capital::loss_carryover),
    worksheet(W_MORTGAGE, 16, deductions::mortgage_interest),
    worksheet(W_NY_AGI, 8, state::adjusted_gross_income),
];

/// Qualified dividends plus net long-term gain, the part of taxable income
/// eligible for the 0/15/20% rates.
fn preferential_income(run: &mut Run<'_>) -> Result<(f64, f64), EvalError> {
    let input = run.input();
    let dividends = run.value(W_AGI, "3")?;

    let gain = if input.has_broker_statements() && input.misc_elections.schedule_d {
        let sd = run.get(SD)?;
        sd.num("15").min(sd.num("16")).max(0.0)
    } else {
        run.value(W_AGI, "5")?.max(0.0)
    };

    Ok((dividends, gain))
}

/// Tax on taxable income before credits and additional taxes, taken from the
/// qualified dividends worksheet when preferential income is present.
pub(crate) fn regular_tax(run: &mut Run<'_>) -> Result<f64, EvalError> {
    let taxable = run.value(W_TAXABLE, "7")?;
    let (dividends, gain) = preferential_income(run)?;

    if taxable > 0.0 && dividends + gain > 0.0 {
        run.value(W_QDCG, "25")
    } else {
        Ok(run.tax(taxable, Jurisdiction::Federal))
    }
}
