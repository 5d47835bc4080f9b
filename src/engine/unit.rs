use crate::engine::Run;
use crate::error::EvalError;
use crate::value::{FieldMap, Value};

/// Build routine of a single unit. It writes into the unit being built
/// through [`Run`] and may reference other units.
pub type BuildFn = fn(&mut Run<'_>) -> Result<(), EvalError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Printed form, exported by name.
    Form,
    /// Scratch computation exported as a line array `[0, line 1, line 2, ...]`.
    Worksheet { lines: usize },
}

/// Rule deciding whether a built form appears in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    Always,
    Never,
    /// Included when any of the monetarily significant fields was written.
    WhenAny(&'static [&'static str]),
    /// Same as `WhenAny`, or when the boolean `flag` field is set.
    WhenAnyOrFlag {
        fields: &'static [&'static str],
        flag: &'static str,
    },
}

/// Static description of a unit in a year's registry.
#[derive(Debug, Clone, Copy)]
pub struct UnitDef {
    pub name: &'static str,
    pub kind: UnitKind,
    pub precision: u32,
    pub include: Inclusion,
    pub build: BuildFn,
}

/// A form or worksheet with its computed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    name: String,
    kind: UnitKind,
    precision: u32,
    include: Inclusion,
    fields: FieldMap,
}

impl Unit {
    pub fn new(
        name: impl Into<String>,
        kind: UnitKind,
        precision: u32,
        include: Inclusion,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            precision,
            include,
            fields: FieldMap::new(),
        }
    }

    pub(crate) fn from_def(def: &UnitDef) -> Self {
        Self::new(def.name, def.kind, def.precision, def.include)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub(crate) fn into_fields(self) -> FieldMap {
        self.fields
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Numeric field, `0` when absent.
    pub fn num(&self, field: &str) -> f64 {
        self.fields.get(field).map(Value::as_number).unwrap_or(0.0)
    }

    /// Boolean field, `false` when absent.
    pub fn flag(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(Value::as_bool)
    }

    /// Text field, `""` when absent.
    pub fn text(&self, field: &str) -> &str {
        self.fields.get(field).map(Value::as_text).unwrap_or("")
    }

    /// Write `value` rounded to `precision` digits, unless it ends up blank.
    pub(crate) fn push(&mut self, field: &str, value: Value, precision: u32) {
        let value = value.rounded(precision);
        if !value.is_blank() {
            self.fields.insert(field.to_string(), value);
        }
    }

    /// Write `value` unconditionally.
    pub(crate) fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    pub(crate) fn sum(&self, fields: &[&str]) -> f64 {
        fields.iter().map(|f| self.num(f)).sum()
    }

    pub fn should_include(&self) -> bool {
        match self.include {
            Inclusion::Always => true,
            Inclusion::Never => false,
            Inclusion::WhenAny(fields) => fields.iter().any(|f| self.has(f)),
            Inclusion::WhenAnyOrFlag { fields, flag } => {
                self.flag(flag) || fields.iter().any(|f| self.has(f))
            }
        }
    }

    /// Worksheet lines indexed from 1; index 0 is unused.
    pub fn lines(&self) -> Vec<f64> {
        let count = match self.kind {
            UnitKind::Worksheet { lines } => lines,
            UnitKind::Form => 0,
        };
        let mut out = vec![0.0; count + 1];
        for (i, slot) in out.iter_mut().enumerate().skip(1) {
            *slot = self.num(&i.to_string());
        }
        out
    }
}
