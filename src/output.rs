use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::engine::{Diagnostic, Diagnostics};
use crate::error::RenderError;
use crate::policy::Year;
use crate::summary::Summary;
use crate::value::{FieldMap, Value};

/// Result of a run: the included forms, the worksheets, the summary and the
/// data-quality log. It also serves as the prior-year snapshot of the next
/// year's run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub year: Year,
    /// BLAKE3 digest of the input record this evaluation was computed from.
    pub input_digest: String,
    pub units: BTreeMap<String, FieldMap>,
    pub worksheets: BTreeMap<String, Vec<f64>>,
    pub summary: Summary,
    pub log: Vec<Diagnostic>,
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}

impl Evaluation {
    pub fn unit(&self, name: &str) -> Option<&FieldMap> {
        self.units.get(name)
    }

    /// Numeric field of a unit, `0` when the unit or field is absent.
    pub fn num(&self, unit: &str, field: &str) -> f64 {
        self.unit(unit)
            .and_then(|u| u.get(field))
            .map(Value::as_number)
            .unwrap_or(0.0)
    }

    /// Worksheet line, `0` when absent.
    pub fn line(&self, worksheet: &str, line: usize) -> f64 {
        self.worksheets
            .get(worksheet)
            .and_then(|w| w.get(line))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Paged units are named `<base>_<page>`.
pub fn base_unit_name(name: &str) -> &str {
    match name.rsplit_once('_') {
        Some((base, page)) if !page.is_empty() && page.chars().all(|c| c.is_ascii_digit()) => base,
        _ => name,
    }
}

/// Destination of rendered values, for example a PDF form filler.
pub trait FieldSink {
    fn write(&mut self, document: &str, widget: &str, value: &Value) -> anyhow::Result<()>;
}

/// Unit and field name to output widget identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldMapping(HashMap<String, HashMap<String, String>>);

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit: &str, field: &str, widget: &str) {
        self.0
            .entry(unit.to_string())
            .or_default()
            .insert(field.to_string(), widget.to_string());
    }

    pub fn widget(&self, unit: &str, field: &str) -> Option<&str> {
        self.0
            .get(base_unit_name(unit))
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }
}

/// Send every mapped field of every included unit to `sink`, one document
/// per unit. Returns the number of values written; unmapped fields are
/// skipped.
pub fn render(
    evaluation: &Evaluation,
    mapping: &FieldMapping,
    sink: &mut impl FieldSink,
) -> Result<usize, RenderError> {
    let mut written = 0;

    for (document, fields) in &evaluation.units {
        for (field, value) in fields {
            let Some(widget) = mapping.widget(document, field) else {
                tracing::trace!("No widget for {document} {field}");
                continue;
            };
            sink.write(document, widget, value)
                .map_err(|error| RenderError::Sink {
                    document: document.clone(),
                    widget: widget.to_string(),
                    error,
                })?;
            written += 1;
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect(Vec<(String, String, Value)>);

    impl FieldSink for Collect {
        fn write(&mut self, document: &str, widget: &str, value: &Value) -> anyhow::Result<()> {
            if widget == "broken" {
                anyhow::bail!("widget is read-only");
            }
            self.0.push((document.into(), widget.into(), value.clone()));
            Ok(())
        }
    }

    fn evaluation() -> Evaluation {
        let mut units = BTreeMap::new();
        let mut page = FieldMap::new();
        page.insert("I_name".into(), Value::Text("Jane".into()));
        page.insert("unmapped".into(), Value::Number(1.0));
        units.insert("Federal/f8949_2".to_string(), page);

        Evaluation {
            year: Year::Y2024,
            input_digest: String::new(),
            units,
            worksheets: BTreeMap::from([("W".to_string(), vec![0.0, 3.0])]),
            summary: Summary::default(),
            log: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    #[test]
    fn test_base_unit_name() {
        assert_eq!(base_unit_name("Federal/f8949_12"), "Federal/f8949");
        assert_eq!(base_unit_name("Federal/f1040"), "Federal/f1040");
        assert_eq!(base_unit_name("NY/it201"), "NY/it201");
    }

    #[test]
    fn test_render_through_base_mapping() {
        let mut mapping = FieldMapping::new();
        mapping.insert("Federal/f8949", "I_name", "topmostSubform[0].f1_01[0]");

        let mut sink = Collect::default();
        let written = render(&evaluation(), &mapping, &mut sink).unwrap();
        assert_eq!(written, 1);
        assert_eq!(sink.0[0].0, "Federal/f8949_2");
        assert_eq!(sink.0[0].1, "topmostSubform[0].f1_01[0]");
    }

    #[test]
    fn test_render_reports_sink_errors() {
        let mut mapping = FieldMapping::new();
        mapping.insert("Federal/f8949", "I_name", "broken");

        let err = render(&evaluation(), &mapping, &mut Collect::default()).unwrap_err();
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_lookups_default_to_zero() {
        let evaluation = evaluation();
        assert_eq!(evaluation.num("Federal/f1040", "11"), 0.0);
        assert_eq!(evaluation.line("W", 1), 3.0);
        assert_eq!(evaluation.line("W", 9), 0.0);
    }
}
