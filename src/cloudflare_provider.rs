use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::dns_provider::{DnsProvider, ProviderError, RecordFilter};
use crate::error::Error;
use crate::mutation::MutationRequest;
use crate::record::{Record, RecordType, Zone};

const CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ZONES_PER_PAGE: u32 = 50;
const RECORDS_PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
struct CloudflareResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct CloudflareZone {
    id: String,
    name: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct CloudflareDnsRecord {
    id: String,
    #[serde(rename = "type")]
    record_type: RecordType,
    name: String,
    content: String,
    ttl: u32,
    priority: Option<u16>,
    proxied: Option<bool>,
}

impl From<CloudflareZone> for Zone {
    fn from(zone: CloudflareZone) -> Self {
        Zone {
            id: zone.id,
            name: zone.name,
            status: zone.status,
        }
    }
}

impl From<CloudflareDnsRecord> for Record {
    fn from(record: CloudflareDnsRecord) -> Self {
        Record {
            id: record.id,
            record_type: record.record_type,
            name: record.name,
            content: record.content,
            ttl: record.ttl,
            priority: record.priority,
            proxied: record.proxied,
        }
    }
}

enum Credentials {
    Token(String),
    /// Legacy global API key, sent together with the account email.
    Key { email: String, key: String },
}

pub struct CloudflareProvider {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl CloudflareProvider {
    pub fn new(token: &str, email: &str) -> Result<Self, Error> {
        Self::with_base_url(CLOUDFLARE_API_URL, token, email)
    }

    pub fn with_base_url(base_url: &str, token: &str, email: &str) -> Result<Self, Error> {
        if token.is_empty() {
            return Err(Error::Configuration(
                "API token is required (use -k or set CF_API_KEY)".to_string(),
            ));
        }
        let credentials = if email.is_empty() {
            Credentials::Token(token.to_string())
        } else {
            Credentials::Key {
                email: email.to_string(),
                key: token.to_string(),
            }
        };
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to create Cloudflare client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::Token(token) => request.bearer_auth(token),
            Credentials::Key { email, key } => request
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", key),
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<CloudflareResponse<T>, ProviderError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, "cloudflare response: {body}");

        let envelope: CloudflareResponse<T> = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Decode(format!("HTTP {status}: {e}")))?;

        if !envelope.success {
            return Err(ProviderError::Api(describe_errors(&envelope.errors)));
        }
        Ok(envelope)
    }

    async fn send_for_result<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ProviderError> {
        self.send(request)
            .await?
            .result
            .ok_or_else(|| ProviderError::Decode("response is missing the result field".to_string()))
    }

    /// Walks every page of a list endpoint.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        per_page: u32,
    ) -> Result<Vec<T>, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            debug!(page, ?params, "GET {url}");
            let request = self
                .client
                .get(&url)
                .query(params)
                .query(&[("page", page), ("per_page", per_page)]);
            let envelope: CloudflareResponse<Vec<T>> = self.send(request).await?;
            let total_pages = envelope.result_info.as_ref().map_or(0, |info| info.total_pages);
            items.extend(envelope.result.unwrap_or_default());

            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, zone_id)
    }
}

fn describe_errors(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "unknown error".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn find_zone(&self, domain: &str) -> Result<Option<Zone>, ProviderError> {
        let zones: Vec<CloudflareZone> = self
            .get_all("/zones", &[("name", domain.to_string())], ZONES_PER_PAGE)
            .await?;
        Ok(zones.into_iter().next().map(Zone::from))
    }

    async fn list_zones(&self) -> Result<Vec<Zone>, ProviderError> {
        let zones: Vec<CloudflareZone> = self.get_all("/zones", &[], ZONES_PER_PAGE).await?;
        Ok(zones.into_iter().map(Zone::from).collect())
    }

    async fn list_records(
        &self,
        zone_id: &str,
        filter: &RecordFilter,
    ) -> Result<Vec<Record>, ProviderError> {
        let mut params = Vec::new();
        if let Some(name) = &filter.name {
            params.push(("name", name.clone()));
        }
        if let Some(record_type) = &filter.record_type {
            params.push(("type", record_type.to_string()));
        }
        if let Some(content) = &filter.content {
            params.push(("content", content.clone()));
        }

        let path = format!("/zones/{zone_id}/dns_records");
        let records: Vec<CloudflareDnsRecord> =
            self.get_all(&path, &params, RECORDS_PER_PAGE).await?;
        Ok(records.into_iter().map(Record::from).collect())
    }

    async fn create_record(
        &self,
        zone_id: &str,
        request: &MutationRequest,
    ) -> Result<Record, ProviderError> {
        let url = self.records_url(zone_id);
        debug!(?request, "POST {url}");
        let record: CloudflareDnsRecord = self
            .send_for_result(self.client.post(&url).json(request))
            .await?;
        Ok(record.into())
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        request: &MutationRequest,
    ) -> Result<Record, ProviderError> {
        let url = format!("{}/{}", self.records_url(zone_id), record_id);
        debug!(?request, "PATCH {url}");
        let record: CloudflareDnsRecord = self
            .send_for_result(self.client.patch(&url).json(request))
            .await?;
        Ok(record.into())
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<(), ProviderError> {
        let url = format!("{}/{}", self.records_url(zone_id), record_id);
        debug!("DELETE {url}");
        self.send::<serde_json::Value>(self.client.delete(&url))
            .await
            .map(|_| ())
    }
}
