use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::config::SettingsLayer;
use crate::output::OutputFormat;
use crate::record::{RecordType, AUTO_TTL};

/// cfcli is a command-line interface for managing Cloudflare DNS records.
/// It supports CRUD operations on DNS records with a simple, intuitive syntax.
#[derive(Parser, Debug)]
#[command(name = "cfcli", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (default is $HOME/.cfcli.toml)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Email of your Cloudflare account (legacy API key authentication)
    #[arg(short = 'e', long, global = true)]
    pub email: Option<String>,

    /// API token for your Cloudflare account
    #[arg(short = 'k', long, global = true)]
    pub token: Option<String>,

    /// Named account from config file
    #[arg(short = 'u', long, global = true)]
    pub account: Option<String>,

    /// Domain to operate on
    #[arg(short = 'd', long, global = true)]
    pub domain: Option<String>,

    /// Type of DNS record (A, AAAA, CNAME, MX, TXT, NS, SRV)
    #[arg(short = 't', long = "type", global = true)]
    pub record_type: Option<RecordType>,

    /// New type when editing a record
    #[arg(short = 'n', long = "newtype", global = true)]
    pub new_type: Option<RecordType>,

    /// Priority for MX or SRV records
    #[arg(short = 'p', long, global = true)]
    pub priority: Option<u16>,

    /// TTL in seconds (1 for auto, 120-86400)
    #[arg(short = 'l', long, global = true, default_value_t = AUTO_TTL)]
    pub ttl: u32,

    /// Enable the Cloudflare proxy for the record
    #[arg(short = 'a', long, global = true)]
    pub activate: bool,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, ignore_case = true, default_value_t)]
    pub format: OutputFormat,

    /// Comma-separated filters (e.g. content:1.1.1.1,type:A)
    #[arg(short = 'q', long, global = true, default_value = "")]
    pub query: String,

    /// Log debug output to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn settings_layer(&self) -> SettingsLayer {
        SettingsLayer {
            token: self.token.clone(),
            email: self.email.clone(),
            domain: self.domain.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(flatten)]
    Dns(DnsCommand),

    /// Generate a shell completion script
    Completion { shell: Shell },
}

/// Subcommands that talk to the DNS provider.
#[derive(Subcommand, Debug)]
pub enum DnsCommand {
    /// Add a DNS record
    #[command(after_help = "Examples:
  cfcli -d example.com -t A add mail 1.2.3.4
  cfcli -d example.com -t MX -p 10 add @ mail.example.com
  cfcli -d example.com -t A -a add test 1.1.1.1")]
    Add { name: String, content: String },

    /// Edit a DNS record
    #[command(after_help = "Examples:
  cfcli -d example.com -t A edit mail 5.6.7.8
  cfcli -d example.com -t A -n CNAME edit test example.com
  cfcli -d example.com -t A -l 300 edit mail 1.2.3.4")]
    Edit { name: String, content: String },

    /// Find DNS record(s)
    Find {
        name: String,
        content: Option<String>,
    },

    /// List DNS records for the domain
    #[command(visible_aliases = ["list", "listrecords"])]
    Ls,

    /// Remove DNS record(s)
    #[command(
        visible_aliases = ["remove", "delete"],
        after_help = "Examples:
  cfcli -d example.com rm test
  cfcli -d example.com -t A rm test -q content:1.1.1.1"
    )]
    Rm {
        name: String,
        content: Option<String>,
    },

    /// List all zones in your Cloudflare account
    Zones,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cfcli", "add", "@", "mail.example.com", "-d", "example.com", "-t", "mx", "-p", "10",
        ])
        .unwrap();
        assert_eq!(cli.global.record_type, Some(RecordType::MX));
        assert_eq!(cli.global.priority, Some(10));
        assert_eq!(cli.global.ttl, AUTO_TTL);
        assert!(!cli.global.activate);
        assert!(matches!(
            cli.command,
            Command::Dns(DnsCommand::Add { ref name, .. }) if name == "@"
        ));
    }

    #[test]
    fn test_aliases_and_format() {
        let cli = Cli::try_parse_from(["cfcli", "-f", "JSON", "listrecords", "-q", "type:A"]).unwrap();
        assert!(matches!(cli.command, Command::Dns(DnsCommand::Ls)));
        assert_eq!(cli.global.format, OutputFormat::Json);
        assert_eq!(cli.global.query, "type:A");

        let cli = Cli::try_parse_from(["cfcli", "delete", "test", "1.1.1.1"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Dns(DnsCommand::Rm { ref content, .. }) if content.as_deref() == Some("1.1.1.1")
        ));
    }

    #[test]
    fn test_positional_arity() {
        assert!(Cli::try_parse_from(["cfcli", "add", "mail"]).is_err());
        assert!(Cli::try_parse_from(["cfcli", "edit", "mail"]).is_err());
        assert!(Cli::try_parse_from(["cfcli", "find"]).is_err());
        assert!(Cli::try_parse_from(["cfcli", "find", "mail"]).is_ok());
        assert!(Cli::try_parse_from(["cfcli", "rm", "mail", "1.1.1.1", "extra"]).is_err());
    }

    #[test]
    fn test_completion_is_not_a_dns_command() {
        let cli = Cli::try_parse_from(["cfcli", "completion", "bash"]).unwrap();
        assert!(matches!(cli.command, Command::Completion { shell: Shell::Bash }));

        let cli = Cli::try_parse_from(["cfcli", "zones"]).unwrap();
        assert!(matches!(cli.command, Command::Dns(DnsCommand::Zones)));
    }
}
