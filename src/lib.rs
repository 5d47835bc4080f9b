#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod engine;
mod error;
mod evaluator;
pub mod forms;
mod hash;
mod identity;
mod input;
pub mod io;
mod output;
mod policy;
mod rules;
mod summary;
mod trades;
mod value;

pub use crate::engine::{Diagnostic, Diagnostics, Issue};
pub use crate::error::*;
pub use crate::evaluator::{Evaluator, evaluate};
pub use crate::hash::Hash32;
pub use crate::identity::Identity;
pub use crate::input::*;
pub use crate::output::{Evaluation, FieldMapping, FieldSink, base_unit_name, render};
pub use crate::policy::{Year, YearPolicy};
pub use crate::rules::{Jurisdiction, compute_tax};
pub use crate::summary::Summary;
pub use crate::trades::{Amounts, LineItem, Page, aggregate};
pub use crate::value::{FieldMap, Value, round_to};

/// Install a `tracing` subscriber printing to stderr, filtered by `RUST_LOG`
/// and defaulting to `formulary=info`.
#[cfg(feature = "logging")]
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("formulary=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_still_evaluates() {
        let evaluation = evaluate(&InputRecord::default(), Year::Y2024).unwrap();

        assert!(evaluation.unit(forms::F1040).is_some());
        assert_eq!(evaluation.num(forms::F1040, "15"), 0.0);
        assert!(evaluation.log.iter().any(|d| d.issue == Issue::MissingRequiredInput));
    }

    #[test]
    fn test_identity_reaches_every_form() {
        let input = InputRecord {
            wage_statements: vec![WageStatement {
                employer: "Acme".into(),
                first_name: Some("Jordan".into()),
                last_name: Some("Lee".into()),
                ssn: Some("123-45-6789".into()),
                wages: Some(250000.0),
                federal_withholding: Some(50000.0),
                medicare_wages: 250000.0,
                ..Default::default()
            }],
            ..Default::default()
        };

        let evaluation = evaluate(&input, Year::Y2024).unwrap();
        let f8959 = evaluation.unit(forms::F8959).unwrap();
        assert_eq!(f8959["ssn"].as_text(), "123-45-6789");
        assert_eq!(f8959["name"].as_text(), "Jordan Lee");
        let f1040 = evaluation.unit(forms::F1040).unwrap();
        assert_eq!(f1040["self_last_name"].as_text(), "Lee");
    }
}
