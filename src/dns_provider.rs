use async_trait::async_trait;
use thiserror::Error;

use crate::mutation::MutationRequest;
use crate::record::{Record, RecordType, Zone};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Exact-match filters evaluated by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub name: Option<String>,
    pub record_type: Option<RecordType>,
    pub content: Option<String>,
}

/// Remote DNS API. Implementations return complete result sets, paging internally.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DnsProvider: Send + Sync {
    async fn find_zone(&self, domain: &str) -> Result<Option<Zone>, ProviderError>;

    async fn list_zones(&self) -> Result<Vec<Zone>, ProviderError>;

    async fn list_records(
        &self,
        zone_id: &str,
        filter: &RecordFilter,
    ) -> Result<Vec<Record>, ProviderError>;

    async fn create_record(
        &self,
        zone_id: &str,
        request: &MutationRequest,
    ) -> Result<Record, ProviderError>;

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        request: &MutationRequest,
    ) -> Result<Record, ProviderError>;

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<(), ProviderError>;
}
