use std::collections::BTreeMap;

use crate::engine::{Diagnostic, Issue};
use crate::input::{InputRecord, WageStatement};

/// Filer identity printed in form headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identity {
    pub first_name: String,
    pub initial: String,
    pub last_name: String,
    pub ssn: String,
    pub address: String,
    pub apt: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

const REQUIRED: &[&str] = &[
    "full_name",
    "first_name",
    "last_name",
    "ssn",
    "address",
    "city",
    "state",
    "zip",
];

fn field_of<'a>(statement: &'a WageStatement, key: &str) -> Option<&'a String> {
    match key {
        "full_name" => statement.full_name.as_ref(),
        "first_name" => statement.first_name.as_ref(),
        "last_name" => statement.last_name.as_ref(),
        "ssn" => statement.ssn.as_ref(),
        "address" => statement.address.as_ref(),
        "apt" => statement.apt.as_ref(),
        "city" => statement.city.as_ref(),
        "state" => statement.state.as_ref(),
        "zip" => statement.zip.as_ref(),
        _ => None,
    }
}

impl Identity {
    /// Collect identity fields across all wage statements. The first value
    /// seen for a field wins, later disagreeing values are reported.
    pub fn collect(input: &InputRecord) -> (Self, Vec<Diagnostic>) {
        let mut seen: BTreeMap<&str, String> = BTreeMap::new();
        let mut log = Vec::new();

        for statement in &input.wage_statements {
            for &key in REQUIRED {
                let Some(value) = field_of(statement, key) else {
                    continue;
                };
                match seen.get(key) {
                    None => {
                        seen.insert(key, value.clone());
                    }
                    Some(first) if first != value => log.push(Diagnostic::new(
                        Issue::InconsistentCrossDocumentInfo,
                        format!(
                            "Wage statement from '{}' has {key} '{value}', keeping '{first}'",
                            statement.employer
                        ),
                    )),
                    Some(_) => {}
                }
            }
            if let Some(apt) = &statement.apt {
                seen.entry("apt").or_insert_with(|| apt.clone());
            }
        }

        let overrides = &input.misc_elections.overrides;
        let field = |key: &str| -> String {
            overrides
                .get(key)
                .or_else(|| seen.get(key))
                .cloned()
                .unwrap_or_default()
        };

        let full_name = field("full_name");
        let identity = Identity {
            initial: overrides
                .get("initial")
                .cloned()
                .unwrap_or_else(|| middle_initial(&full_name)),
            first_name: field("first_name"),
            last_name: field("last_name"),
            ssn: field("ssn"),
            address: field("address"),
            apt: field("apt"),
            city: field("city"),
            state: field("state"),
            zip: field("zip"),
        };

        for (key, value) in [
            ("first_name", &identity.first_name),
            ("last_name", &identity.last_name),
            ("ssn", &identity.ssn),
        ] {
            if value.is_empty() {
                log.push(Diagnostic::new(
                    Issue::MissingRequiredInput,
                    format!("No wage statement or override provides {key}"),
                ));
            }
        }

        for statement in &input.wage_statements {
            if statement.wages.is_none() {
                log.push(Diagnostic::new(
                    Issue::MissingRequiredInput,
                    format!("Wage statement from '{}' has no wage amount", statement.employer),
                ));
            }
            if statement.federal_withholding.is_none() {
                log.push(Diagnostic::new(
                    Issue::MissingRequiredInput,
                    format!(
                        "Wage statement from '{}' has no federal withholding",
                        statement.employer
                    ),
                ));
            }
        }

        (identity, log)
    }

    /// First name followed by the middle initial, as printed on Form 1040.
    pub fn first_name_initial(&self) -> String {
        if self.initial.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.initial)
        }
    }

    /// Name line used by schedules and attachments.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name_initial(), self.last_name)
    }
}

fn middle_initial(full_name: &str) -> String {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    match parts.as_slice() {
        [_, middle, _, ..] => middle.chars().take(1).collect(),
        _ => String::new(),
    }
}
