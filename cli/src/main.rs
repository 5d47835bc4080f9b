use std::time::Instant;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use console::style;
use formulary::io::{as_overhead, load_input, load_snapshot, save_snapshot};
use formulary::{Evaluation, Evaluator, Year};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Format {
    Json,
    Cbor,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Cbor => "cbor",
        }
    }
}

/// Compute tax returns from JSON input records.
#[derive(Parser, Debug, Clone)]
struct Args {
    /// Input records, evaluated independently of each other.
    #[clap(required = true)]
    inputs: Vec<Utf8PathBuf>,

    /// Filing year.
    #[clap(long, default_value_t = 2024)]
    year: u16,

    /// Snapshot of the previous year's evaluation.
    #[clap(long)]
    prior: Option<Utf8PathBuf>,

    /// Directory receiving one snapshot per input.
    #[clap(long)]
    out: Option<Utf8PathBuf>,

    #[clap(long, value_enum, default_value = "json")]
    format: Format,

    /// Print the unit reference graph as a Mermaid flowchart.
    #[clap(long)]
    graph: bool,

    /// Skip the state return.
    #[clap(long)]
    no_state: bool,

    /// Trades per holding period on a Form 8949 page.
    #[clap(long)]
    page_capacity: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    formulary::init_logging()?;

    let year = Year::try_from(args.year)?;
    let prior = args
        .prior
        .as_deref()
        .map(load_snapshot)
        .transpose()
        .context("Couldn't load the prior-year snapshot")?;

    let mut evaluator = Evaluator::new(year).with_state(!args.no_state);
    if let Some(prior) = &prior {
        evaluator = evaluator.with_prior(prior);
    }
    if let Some(capacity) = args.page_capacity {
        evaluator = evaluator.with_page_capacity(capacity);
    }

    let s = Instant::now();
    let inputs = args
        .inputs
        .iter()
        .map(|path| load_input(path).with_context(|| format!("Couldn't load '{path}'")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let results = evaluator.evaluate_batch(&inputs);

    for (path, result) in args.inputs.iter().zip(results) {
        let evaluation = result.with_context(|| format!("Evaluation of '{path}' failed"))?;
        print_summary(path, &evaluation);

        if let Some(out) = &args.out {
            let stem = path.file_stem().unwrap_or("return");
            let dest = out.join(format!("{stem}.{}", args.format.extension()));
            save_snapshot(&evaluation, &dest)
                .with_context(|| format!("Couldn't write '{dest}'"))?;
            tracing::info!("Saved snapshot to {dest}");
        }

        if args.graph {
            println!("{}", evaluation.diagnostics.render_mermaid());
        }
    }

    eprintln!(
        "Evaluated {} {} for {} {}",
        inputs.len(),
        if inputs.len() == 1 { "return" } else { "returns" },
        style(year).blue(),
        as_overhead(s)
    );

    Ok(())
}

fn print_summary(path: &Utf8Path, evaluation: &Evaluation) {
    println!("{}", style(path).bold());

    for (label, value) in evaluation.summary.iter() {
        println!("  {label:<64} {}", style(value).green());
    }

    for entry in &evaluation.log {
        println!("  {} {}", style("warning:").yellow(), entry.message);
    }
}
