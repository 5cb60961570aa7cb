use thiserror::Error;

use crate::dns_provider::ProviderError;
use crate::record::RecordType;

#[derive(Error, Debug)]
pub enum Error {
    /// A required value was missing or invalid before any remote call was made.
    #[error("{0}")]
    Configuration(String),

    #[error("failed to find zone {domain}: no such zone in this account")]
    ZoneResolution { domain: String },

    #[error("zone not set")]
    ZoneNotSet,

    #[error("{}", ambiguity_message(.count, .name, .record_type))]
    AmbiguousMatch {
        count: usize,
        name: String,
        record_type: Option<RecordType>,
    },

    #[error("{0}")]
    NoMatch(String),

    #[error("failed to {operation}: {source}")]
    Provider {
        operation: String,
        #[source]
        source: ProviderError,
    },

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn provider(operation: impl Into<String>, source: ProviderError) -> Self {
        Error::Provider {
            operation: operation.into(),
            source,
        }
    }
}

fn ambiguity_message(count: &usize, name: &str, record_type: &Option<RecordType>) -> String {
    if *count == 0 {
        let record_type = record_type.as_ref().map(RecordType::to_string).unwrap_or_default();
        format!("no record found matching name={name} type={record_type}")
    } else {
        format!("multiple records found ({count}), please be more specific with -q")
    }
}
