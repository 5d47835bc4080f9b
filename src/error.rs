use thiserror::Error;

use crate::policy::Year;

/// Fatal problems that abort an evaluation run.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Cyclic dependency on unit '{unit}': {}", path.join(" -> "))]
    CyclicDependency { unit: String, path: Vec<String> },

    #[error("Unit '{unit}': {items} line items in category '{category}' exceed the limit of {limit}")]
    PageOverflow {
        unit: String,
        category: String,
        items: usize,
        limit: usize,
    },

    #[error("Unit '{0}' has no build routine for this filing year")]
    UnknownUnit(String),

    #[error("Unit '{target}' is not in progress, can't carry field '{field}' into it")]
    ForeignWrite { target: String, field: String },

    #[error("Prior-year snapshot is for {found}, expected {expected}")]
    PriorYear { expected: u16, found: Year },

    #[error("Filing year {0} is not supported")]
    UnsupportedYear(u16),
}

/// Problems with reading or writing input records and snapshots.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Couldn't access file.\n{0}")]
    Io(#[from] std::io::Error),

    #[error("Couldn't parse JSON.\n{0}")]
    Json(#[from] serde_json::Error),

    #[error("Couldn't decode CBOR snapshot.\n{0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),

    #[error("Couldn't encode CBOR snapshot.\n{0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Document '{document}', widget '{widget}':\n{error}")]
    Sink {
        document: String,
        widget: String,
        error: anyhow::Error,
    },
}
