use std::time::Instant;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::engine::Run;
use crate::error::EvalError;
use crate::hash::Hash32;
use crate::input::InputRecord;
use crate::output::Evaluation;
use crate::policy::{Year, YearPolicy};
use crate::trades::Paginator;

/// Configures and runs evaluations for a single filing year.
///
/// ```no_run
/// use formulary::{Evaluator, InputRecord, Year};
///
/// let input = InputRecord::default();
/// let evaluation = Evaluator::new(Year::Y2024)
///     .with_state(false)
///     .evaluate(&input)?;
/// # Ok::<(), formulary::EvalError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    year: Year,
    prior: Option<&'a Evaluation>,
    state: bool,
    page_capacity: Option<usize>,
}

impl<'a> Evaluator<'a> {
    pub fn new(year: Year) -> Self {
        Self {
            year,
            prior: None,
            state: true,
            page_capacity: None,
        }
    }

    /// Final result of the previous filing year, read for carryovers.
    pub fn with_prior(mut self, prior: &'a Evaluation) -> Self {
        self.prior = Some(prior);
        self
    }

    /// Whether to build the state return, on by default.
    pub fn with_state(mut self, state: bool) -> Self {
        self.state = state;
        self
    }

    /// Trades per holding period on a single Form 8949 page.
    pub fn with_page_capacity(mut self, capacity: usize) -> Self {
        self.page_capacity = Some(capacity);
        self
    }

    pub fn year(&self) -> Year {
        self.year
    }

    pub fn evaluate(&self, input: &InputRecord) -> Result<Evaluation, EvalError> {
        let span = tracing::info_span!("evaluate", year = %self.year);
        let _enter = span.enter();
        let start = Instant::now();

        if let Some(prior) = self.prior
            && prior.year.number() + 1 != self.year.number()
        {
            return Err(EvalError::PriorYear {
                expected: self.year.number() - 1,
                found: prior.year,
            });
        }

        let policy = YearPolicy::select(self.year);
        let paginator = Paginator {
            capacity: self.page_capacity.unwrap_or(policy.page_capacity),
            max_pages: policy.max_pages,
        };

        let mut run = Run::new(input, policy, self.prior, paginator);
        for root in policy.federal_roots {
            run.get(root)?;
        }
        if self.state {
            for root in policy.state_roots {
                run.get(root)?;
            }
        }

        let digest = match Hash32::of_input(input) {
            Ok(hash) => hash.to_hex(),
            Err(e) => {
                tracing::warn!("Couldn't fingerprint the input record: {e}");
                String::new()
            }
        };

        let evaluation = run.into_evaluation(digest);
        tracing::info!(
            units = evaluation.units.len(),
            worksheets = evaluation.worksheets.len(),
            warnings = evaluation.log.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Evaluation finished"
        );

        Ok(evaluation)
    }

    /// Evaluate independent input records in parallel, each in its own run.
    pub fn evaluate_batch(&self, inputs: &[InputRecord]) -> Vec<Result<Evaluation, EvalError>> {
        inputs.par_iter().map(|input| self.evaluate(input)).collect()
    }
}

/// Evaluate `input` for `year` with the default settings.
pub fn evaluate(input: &InputRecord, year: Year) -> Result<Evaluation, EvalError> {
    Evaluator::new(year).evaluate(input)
}
