use serde::Serialize;

use crate::error::Error;
use crate::record::{Record, RecordType};

/// Wire body for creating or updating a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationRequest {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

/// Builds a request carrying only the optional fields the record type accepts.
pub fn build_mutation(
    record_type: RecordType,
    name: &str,
    content: &str,
    ttl: u32,
    priority: Option<u16>,
    proxied: bool,
) -> MutationRequest {
    let fields = record_type.optional_fields();
    MutationRequest {
        name: name.to_string(),
        content: content.to_string(),
        ttl,
        priority: priority.filter(|_| fields.priority),
        proxied: fields.proxied.then_some(proxied),
        record_type,
    }
}

/// Values supplied on the command line when editing an existing record.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub record_type: RecordType,
    pub new_type: Option<RecordType>,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub priority: Option<u16>,
    /// Only ever turns the proxy on.
    pub activate: bool,
}

impl EditRequest {
    pub fn target_type(&self) -> &RecordType {
        self.new_type.as_ref().unwrap_or(&self.record_type)
    }

    pub fn plan(&self, existing: &Record) -> MutationRequest {
        let priority = self.priority.or(existing.priority);
        let proxied = self.activate || existing.is_proxied();
        build_mutation(
            self.target_type().clone(),
            &self.name,
            &self.content,
            self.ttl,
            priority,
            proxied,
        )
    }
}

/// Edit targets must resolve to exactly one record.
pub fn single_match(
    mut records: Vec<Record>,
    name: &str,
    record_type: Option<&RecordType>,
) -> Result<Record, Error> {
    match records.len() {
        1 => Ok(records.remove(0)),
        count => Err(Error::AmbiguousMatch {
            count,
            name: name.to_string(),
            record_type: record_type.cloned(),
        }),
    }
}
