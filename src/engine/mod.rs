//! Lazy, memoized evaluation of interdependent units.
//!
//! A [`Run`] owns everything a single evaluation needs: the registry of
//! finished units, the stack of units being built, the shared trade totals,
//! the summary, and the run log. Units are built on first reference through
//! [`Run::get`] by their year's build routine, and every later reference
//! returns the memoized result. Referencing a unit that is still being built
//! means the rules form a cycle, which aborts the run.

mod diagnostics;
mod unit;

use std::collections::{BTreeMap, HashMap};

use crate::error::EvalError;
use crate::identity::Identity;
use crate::input::InputRecord;
use crate::output::Evaluation;
use crate::policy::YearPolicy;
use crate::rules::Jurisdiction;
use crate::summary::Summary;
use crate::trades::{Paginator, TradeTotals};
use crate::value::Value;

pub use diagnostics::{Diagnostic, Diagnostics, Issue};
pub use unit::{BuildFn, Inclusion, Unit, UnitDef, UnitKind};

/// Lifecycle of a unit within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unbuilt,
    Building,
    Built,
}

/// Finished units of a run, in completion order.
#[derive(Debug, Default)]
struct Registry {
    units: HashMap<String, Unit>,
    order: Vec<String>,
}

impl Registry {
    fn get(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }

    fn insert(&mut self, unit: Unit) {
        let name = unit.name().to_string();
        if self.units.insert(name.clone(), unit).is_none() {
            self.order.push(name);
        }
    }

    fn into_units(mut self) -> impl Iterator<Item = Unit> {
        let order = std::mem::take(&mut self.order);
        order.into_iter().filter_map(move |name| self.units.remove(&name))
    }
}

/// State of a single evaluation.
pub struct Run<'a> {
    input: &'a InputRecord,
    policy: &'a YearPolicy,
    prior: Option<&'a Evaluation>,
    paginator: Paginator,
    identity: Identity,
    registry: Registry,
    stack: Vec<Unit>,
    totals: TradeTotals,
    summary: Summary,
    log: Vec<Diagnostic>,
    diagnostics: Diagnostics,
}

impl<'a> Run<'a> {
    pub(crate) fn new(
        input: &'a InputRecord,
        policy: &'a YearPolicy,
        prior: Option<&'a Evaluation>,
        paginator: Paginator,
    ) -> Self {
        let (identity, log) = Identity::collect(input);
        for entry in &log {
            tracing::warn!(issue = ?entry.issue, "{}", entry.message);
        }

        Self {
            input,
            policy,
            prior,
            paginator,
            identity,
            registry: Registry::default(),
            stack: Vec::new(),
            totals: TradeTotals::default(),
            summary: Summary::default(),
            log,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn state(&self, name: &str) -> State {
        if self.registry.get(name).is_some() {
            State::Built
        } else if self.stack.iter().any(|u| u.name() == name) {
            State::Building
        } else {
            State::Unbuilt
        }
    }

    /// The built unit `name`, building it first if needed.
    pub fn get(&mut self, name: &str) -> Result<&Unit, EvalError> {
        self.ensure(name)?;
        self.registry
            .get(name)
            .ok_or_else(|| EvalError::UnknownUnit(name.to_string()))
    }

    /// Numeric field of another unit.
    pub fn value(&mut self, name: &str, field: &str) -> Result<f64, EvalError> {
        Ok(self.get(name)?.num(field))
    }

    fn ensure(&mut self, name: &str) -> Result<(), EvalError> {
        let dependent = self.stack.last().map(|u| u.name().to_string());

        match self.state(name) {
            State::Built => {
                self.diagnostics.reference(dependent.as_deref(), name);
                return Ok(());
            }
            State::Building => {
                let mut path: Vec<String> =
                    self.stack.iter().map(|u| u.name().to_string()).collect();
                path.push(name.to_string());
                return Err(EvalError::CyclicDependency {
                    unit: name.to_string(),
                    path,
                });
            }
            State::Unbuilt => {}
        }

        let policy = self.policy;
        let def = policy
            .unit(name)
            .ok_or_else(|| EvalError::UnknownUnit(name.to_string()))?;
        self.diagnostics.reference(dependent.as_deref(), name);

        let span = tracing::debug_span!("build", unit = def.name);
        let _enter = span.enter();

        self.stack.push(Unit::from_def(def));
        let result = (def.build)(self);
        let unit = self.stack.pop();
        result?;

        if let Some(unit) = unit {
            tracing::debug!(fields = unit.fields().len(), "built");
            self.diagnostics.built(unit.name());
            self.registry.insert(unit);
        }

        Ok(())
    }

    /// Register a finished page of a paginated form.
    pub(crate) fn emit_page(&mut self, page: Unit) {
        let dependent = self.stack.last().map(|u| u.name().to_string());
        self.diagnostics.reference(dependent.as_deref(), page.name());
        self.diagnostics.built(page.name());
        self.registry.insert(page);
    }

    // Build routines only run while their unit sits on top of the stack.
    fn frame(&self) -> &Unit {
        self.stack.last().expect("unit access outside of a build routine")
    }

    fn frame_mut(&mut self) -> &mut Unit {
        self.stack
            .last_mut()
            .expect("unit access outside of a build routine")
    }

    /// Name of the unit being built.
    pub(crate) fn name(&self) -> &str {
        self.frame().name()
    }

    /// Write into the unit being built with its own precision, skipping blanks.
    pub(crate) fn push(&mut self, field: &str, value: impl Into<Value>) {
        let unit = self.frame_mut();
        let precision = unit.precision();
        unit.push(field, value.into(), precision);
    }

    pub(crate) fn push_with(&mut self, field: &str, value: f64, precision: u32) {
        self.frame_mut().push(field, Value::Number(value), precision);
    }

    /// Write a text or flag field unconditionally.
    pub(crate) fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.frame_mut().set(field, value.into());
    }

    /// Sum own fields into `field`, missing sources count as 0.
    pub(crate) fn push_sum(&mut self, field: &str, sources: &[&str]) -> f64 {
        let total = self.frame().sum(sources);
        self.push(field, total);
        self.own(field)
    }

    /// Worksheet lines starting at line 1.
    pub(crate) fn push_lines(&mut self, lines: &[f64]) {
        for (i, value) in lines.iter().enumerate() {
            self.push(&(i + 1).to_string(), *value);
        }
    }

    /// Own field of the unit being built.
    pub(crate) fn own(&self, field: &str) -> f64 {
        self.frame().num(field)
    }

    /// Carry a value into a unit that is still in progress further up the
    /// stack. Last write wins, and the target must already exist.
    pub(crate) fn push_foreign(
        &mut self,
        target: &str,
        field: &str,
        value: f64,
    ) -> Result<(), EvalError> {
        let Some(unit) = self.stack.iter_mut().rev().find(|u| u.name() == target) else {
            return Err(EvalError::ForeignWrite {
                target: target.to_string(),
                field: field.to_string(),
            });
        };
        let precision = unit.precision();
        unit.push(field, Value::Number(value), precision);
        Ok(())
    }

    /// Record a summary line labelled with the current unit.
    pub(crate) fn summarize(&mut self, label: &str, value: impl Into<Value>) {
        let label = format!("{} {}", self.name(), label);
        self.summary.record(label, value);
    }

    pub(crate) fn report(&mut self, issue: Issue, message: impl Into<String>) {
        let entry = Diagnostic::new(issue, message);
        tracing::warn!(issue = ?entry.issue, unit = self.stack.last().map(|u| u.name()), "{}", entry.message);
        self.log.push(entry);
    }

    /// Standard schedule header.
    pub(crate) fn push_name_ssn(&mut self) {
        let name = self.identity.display_name();
        let ssn = self.identity.ssn.clone();
        self.set("name", name);
        self.set("ssn", ssn);
    }

    pub(crate) fn input(&self) -> &'a InputRecord {
        self.input
    }

    pub(crate) fn policy(&self) -> &'a YearPolicy {
        self.policy
    }

    pub(crate) fn prior(&self) -> Option<&'a Evaluation> {
        self.prior
    }

    pub(crate) fn identity(&self) -> &Identity {
        &self.identity
    }

    pub(crate) fn paginator(&self) -> Paginator {
        self.paginator
    }

    pub(crate) fn totals(&self) -> &TradeTotals {
        &self.totals
    }

    pub(crate) fn totals_mut(&mut self) -> &mut TradeTotals {
        &mut self.totals
    }

    pub(crate) fn tax(&self, amount: f64, jurisdiction: Jurisdiction) -> f64 {
        self.policy.compute_tax(amount, jurisdiction)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Split finished units into exported forms and worksheets.
    pub(crate) fn into_evaluation(self, input_digest: String) -> Evaluation {
        let mut units = BTreeMap::new();
        let mut worksheets = BTreeMap::new();

        for unit in self.registry.into_units() {
            match unit.kind() {
                UnitKind::Worksheet { .. } => {
                    worksheets.insert(unit.name().to_string(), unit.lines());
                }
                UnitKind::Form if unit.should_include() => {
                    units.insert(unit.name().to_string(), unit.into_fields());
                }
                UnitKind::Form => {
                    tracing::debug!("Leaving out '{}', nothing to report", unit.name());
                }
            }
        }

        Evaluation {
            year: self.policy.year,
            input_digest,
            units,
            worksheets,
            summary: self.summary,
            log: self.log,
            diagnostics: self.diagnostics,
        }
    }
}
