use std::io::Write;

use tracing::{debug, warn};

use crate::cli_args::{DnsCommand, GlobalArgs};
use crate::config::Settings;
use crate::dns_client::DnsClient;
use crate::dns_provider::DnsProvider;
use crate::error::Error;
use crate::mutation::{build_mutation, single_match, EditRequest};
use crate::output::{self, OutputFormat};
use crate::query::FilterQuery;
use crate::record::{Record, RecordType, AUTO_TTL};

/// Record-level flags shared by the subcommands.
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub record_type: Option<RecordType>,
    pub new_type: Option<RecordType>,
    pub priority: Option<u16>,
    pub ttl: u32,
    pub activate: bool,
    pub format: OutputFormat,
    pub query: FilterQuery,
}

impl Default for RecordOptions {
    fn default() -> Self {
        RecordOptions {
            record_type: None,
            new_type: None,
            priority: None,
            ttl: AUTO_TTL,
            activate: false,
            format: OutputFormat::default(),
            query: FilterQuery::default(),
        }
    }
}

impl From<&GlobalArgs> for RecordOptions {
    fn from(args: &GlobalArgs) -> Self {
        RecordOptions {
            record_type: args.record_type.clone(),
            new_type: args.new_type.clone(),
            priority: args.priority,
            ttl: args.ttl,
            activate: args.activate,
            format: args.format,
            query: FilterQuery::parse(&args.query),
        }
    }
}

pub struct CLIProgram<P, O, E>
where
    P: DnsProvider,
{
    settings: Settings,
    options: RecordOptions,
    client: DnsClient<P>,
    out: O,
    err: E,
}

impl<P, O, E> CLIProgram<P, O, E>
where
    P: DnsProvider,
    O: Write,
    E: Write,
{
    pub fn new(provider: P, settings: Settings, options: RecordOptions, out: O, err: E) -> Self {
        CLIProgram {
            settings,
            options,
            client: DnsClient::new(provider),
            out,
            err,
        }
    }

    pub async fn run(&mut self, command: DnsCommand) -> Result<(), Error> {
        match command {
            DnsCommand::Add { name, content } => self.add(&name, &content).await,
            DnsCommand::Edit { name, content } => self.edit(&name, &content).await,
            DnsCommand::Find { name, content } => self.find(&name, content.as_deref()).await,
            DnsCommand::Ls => self.ls().await,
            DnsCommand::Rm { name, content } => self.rm(&name, content.as_deref()).await,
            DnsCommand::Zones => self.zones().await,
        }
    }

    fn require_type(&self) -> Result<RecordType, Error> {
        self.options
            .record_type
            .clone()
            .ok_or_else(|| Error::Configuration("record type is required (use -t)".to_string()))
    }

    async fn use_domain_zone(&mut self) -> Result<(), Error> {
        let domain = self.settings.require_domain()?.to_string();
        self.client.set_zone(&domain).await?;
        Ok(())
    }

    fn print_change(&mut self, verb: &str, record: &Record) -> Result<(), Error> {
        write!(
            self.out,
            "✓ {verb} {} record: {} -> {}",
            record.record_type, record.name, record.content
        )?;
        if record.is_proxied() {
            write!(self.out, " (proxied)")?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    pub async fn add(&mut self, name: &str, content: &str) -> Result<(), Error> {
        self.settings.require_domain()?;
        let record_type = self.require_type()?;
        self.use_domain_zone().await?;

        let request = build_mutation(
            record_type,
            name,
            content,
            self.options.ttl,
            self.options.priority,
            self.options.activate,
        );
        let record = self.client.create_record(&request).await?;

        self.print_change("Created", &record)?;
        writeln!(self.out, "  Record ID: {}", record.id)?;
        Ok(())
    }

    pub async fn edit(&mut self, name: &str, content: &str) -> Result<(), Error> {
        self.settings.require_domain()?;
        let record_type = self.require_type()?;
        self.use_domain_zone().await?;

        let records = self
            .client
            .find_records(name, None, Some(&record_type))
            .await?;
        let records = self.options.query.apply(records);
        let existing = single_match(records, name, Some(&record_type))?;

        let edit = EditRequest {
            record_type,
            new_type: self.options.new_type.clone(),
            name: name.to_string(),
            content: content.to_string(),
            ttl: self.options.ttl,
            priority: self.options.priority,
            activate: self.options.activate,
        };
        let request = edit.plan(&existing);
        let updated = self.client.update_record(&existing.id, &request).await?;

        self.print_change("Updated", &updated)
    }

    pub async fn find(&mut self, name: &str, content: Option<&str>) -> Result<(), Error> {
        self.settings.require_domain()?;
        self.use_domain_zone().await?;

        let records = self
            .client
            .find_records(name, content, self.options.record_type.as_ref())
            .await?;
        let records = self.options.query.apply(records);

        if records.is_empty() {
            writeln!(self.out, "No records found")?;
            return Ok(());
        }
        writeln!(self.out, "Found {} record(s):\n", records.len())?;
        output::write_table(&mut self.out, &records)?;
        Ok(())
    }

    pub async fn ls(&mut self) -> Result<(), Error> {
        self.settings.require_domain()?;
        self.use_domain_zone().await?;

        let records = self.client.list_records().await?;
        let records = self.options.query.apply(records);
        output::write_records(&mut self.out, &records, self.options.format)?;
        Ok(())
    }

    /// Deletes every match in order. A failed delete is reported and the rest still run.
    pub async fn rm(&mut self, name: &str, content: Option<&str>) -> Result<(), Error> {
        self.settings.require_domain()?;

        let mut filters = self.options.query.clone();
        if let Some(content) = content.filter(|c| !c.is_empty()) {
            filters.insert("content", content);
        }
        let record_type = match filters.get("type") {
            Some(t) => Some(t.parse::<RecordType>().map_err(Error::Configuration)?),
            None => self.options.record_type.clone(),
        };

        self.use_domain_zone().await?;
        debug!(filters = %filters.to_query_string(), "removing records named {name}");

        let records = self
            .client
            .find_records(name, filters.get("content"), record_type.as_ref())
            .await?;
        if records.is_empty() {
            return Err(Error::NoMatch(
                "no records found matching the criteria".to_string(),
            ));
        }

        let records = filters.apply(records);
        if records.is_empty() {
            return Err(Error::NoMatch(
                "no records found matching all filters".to_string(),
            ));
        }

        let mut failed = 0;
        for record in &records {
            match self.client.delete_record(record).await {
                Ok(()) => writeln!(
                    self.out,
                    "✓ Deleted {} record: {} -> {}",
                    record.record_type, record.name, record.content
                )?,
                Err(e) => {
                    failed += 1;
                    writeln!(
                        self.err,
                        "Failed to delete {} record {}: {e}",
                        record.record_type, record.name
                    )?;
                }
            }
        }
        if failed > 0 {
            warn!(failed, total = records.len(), "some records could not be deleted");
        }
        Ok(())
    }

    pub async fn zones(&mut self) -> Result<(), Error> {
        let zones = self.client.list_zones().await?;
        if zones.is_empty() {
            writeln!(self.out, "No zones found")?;
            return Ok(());
        }
        output::write_zones(&mut self.out, &zones)?;
        Ok(())
    }
}
