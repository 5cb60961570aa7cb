use tracing::{debug, info};

use crate::dns_provider::{DnsProvider, RecordFilter};
use crate::error::Error;
use crate::mutation::MutationRequest;
use crate::record::{Record, RecordType, Zone};

/// Provider access scoped to the single zone of one invocation.
pub struct DnsClient<P> {
    provider: P,
    zone: Option<Zone>,
}

impl<P: DnsProvider> DnsClient<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            zone: None,
        }
    }

    pub async fn set_zone(&mut self, domain: &str) -> Result<&Zone, Error> {
        let zone = self
            .provider
            .find_zone(domain)
            .await
            .map_err(|e| Error::provider(format!("find zone {domain}"), e))?
            .ok_or_else(|| Error::ZoneResolution {
                domain: domain.to_string(),
            })?;
        debug!(zone_id = %zone.id, "using zone {}", zone.name);
        Ok(&*self.zone.insert(zone))
    }

    pub fn zone(&self) -> Result<&Zone, Error> {
        self.zone.as_ref().ok_or(Error::ZoneNotSet)
    }

    pub async fn list_zones(&self) -> Result<Vec<Zone>, Error> {
        self.provider
            .list_zones()
            .await
            .map_err(|e| Error::provider("list zones", e))
    }

    pub async fn list_records(&self) -> Result<Vec<Record>, Error> {
        let zone = self.zone()?;
        self.provider
            .list_records(&zone.id, &RecordFilter::default())
            .await
            .map_err(|e| Error::provider("list DNS records", e))
    }

    /// Exact-match lookup on the provider. Empty criteria are not sent.
    pub async fn find_records(
        &self,
        name: &str,
        content: Option<&str>,
        record_type: Option<&RecordType>,
    ) -> Result<Vec<Record>, Error> {
        let zone = self.zone()?;
        let filter = RecordFilter {
            name: Some(name)
                .filter(|n| !n.is_empty())
                .map(|n| qualify_name(n, &zone.name)),
            record_type: record_type.cloned(),
            content: content.filter(|c| !c.is_empty()).map(str::to_string),
        };
        debug!(?filter, "finding DNS records");
        self.provider
            .list_records(&zone.id, &filter)
            .await
            .map_err(|e| Error::provider(format!("find DNS records named {name}"), e))
    }

    pub async fn create_record(&self, request: &MutationRequest) -> Result<Record, Error> {
        let zone = self.zone()?;
        let record = self
            .provider
            .create_record(&zone.id, request)
            .await
            .map_err(|e| {
                Error::provider(
                    format!("create {} record {}", request.record_type, request.name),
                    e,
                )
            })?;
        info!(record_id = %record.id, "created {} record {}", record.record_type, record.name);
        Ok(record)
    }

    pub async fn update_record(
        &self,
        record_id: &str,
        request: &MutationRequest,
    ) -> Result<Record, Error> {
        let zone = self.zone()?;
        let record = self
            .provider
            .update_record(&zone.id, record_id, request)
            .await
            .map_err(|e| {
                Error::provider(format!("update DNS record {record_id} ({})", request.name), e)
            })?;
        info!(record_id, "updated {} record {}", record.record_type, record.name);
        Ok(record)
    }

    pub async fn delete_record(&self, record: &Record) -> Result<(), Error> {
        let zone = self.zone()?;
        self.provider
            .delete_record(&zone.id, &record.id)
            .await
            .map_err(|e| {
                Error::provider(format!("delete DNS record {} ({})", record.id, record.name), e)
            })?;
        info!(record_id = %record.id, "deleted {} record {}", record.record_type, record.name);
        Ok(())
    }
}

/// The provider's name filter only matches fully-qualified names.
pub fn qualify_name(name: &str, zone: &str) -> String {
    let name = name.trim_end_matches('.');
    if name == "@" || name.eq_ignore_ascii_case(zone) {
        return zone.to_string();
    }
    let suffix = format!(".{}", zone.to_lowercase());
    if name.to_lowercase().ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}.{zone}")
    }
}
