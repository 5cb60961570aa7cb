use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;

pub const TOKEN_ENV: &str = "CF_API_KEY";
pub const EMAIL_ENV: &str = "CF_API_EMAIL";
pub const DOMAIN_ENV: &str = "CF_API_DOMAIN";

const CONFIG_FILE_NAME: &str = ".cfcli.toml";

/// On-disk configuration, e.g.
///
/// ```toml
/// [defaults]
/// account = "work"
///
/// [accounts.work]
/// token = "..."
/// domain = "example.com"
/// ```
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub accounts: HashMap<String, AccountConfig>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Defaults {
    pub token: Option<String>,
    pub email: Option<String>,
    pub domain: Option<String>,
    /// Account used when none is named on the command line.
    pub account: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct AccountConfig {
    pub token: Option<String>,
    pub email: Option<String>,
    pub domain: Option<String>,
}

impl Config {
    pub fn get_config_path(custom_path: Option<PathBuf>) -> Option<PathBuf> {
        custom_path.or_else(|| home::home_dir().map(|home| home.join(CONFIG_FILE_NAME)))
    }

    /// A missing file yields an empty config. Unreadable or malformed files are errors.
    pub fn load(path: &Path) -> Result<Config, Error> {
        if !path.exists() {
            warn!("no config file found at {}, continuing without it", path.display());
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("failed to read config file {}: {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::Configuration(format!("failed to parse config file {}: {e}", path.display()))
        })?;
        debug!(
            accounts = config.accounts.len(),
            "loaded config file {}",
            path.display()
        );
        Ok(config)
    }
}

/// One source of settings. Unset and empty values never override lower layers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SettingsLayer {
    pub token: Option<String>,
    pub email: Option<String>,
    pub domain: Option<String>,
}

impl SettingsLayer {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        SettingsLayer {
            token: lookup(TOKEN_ENV),
            email: lookup(EMAIL_ENV),
            domain: lookup(DOMAIN_ENV),
        }
    }
}

impl From<&AccountConfig> for SettingsLayer {
    fn from(account: &AccountConfig) -> Self {
        SettingsLayer {
            token: account.token.clone(),
            email: account.email.clone(),
            domain: account.domain.clone(),
        }
    }
}

impl From<&Defaults> for SettingsLayer {
    fn from(defaults: &Defaults) -> Self {
        SettingsLayer {
            token: defaults.token.clone(),
            email: defaults.email.clone(),
            domain: defaults.domain.clone(),
        }
    }
}

/// Credentials and domain for one invocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Settings {
    pub token: String,
    pub email: String,
    pub domain: String,
}

impl Settings {
    pub fn apply(&mut self, layer: &SettingsLayer) {
        fn set(field: &mut String, value: &Option<String>) {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                *field = value.to_string();
            }
        }
        set(&mut self.token, &layer.token);
        set(&mut self.email, &layer.email);
        set(&mut self.domain, &layer.domain);
    }

    /// Lowest precedence first: file defaults, default account, named account, environment, flags.
    pub fn resolve(
        config: &Config,
        account: Option<&str>,
        env: &SettingsLayer,
        flags: &SettingsLayer,
    ) -> Result<Settings, Error> {
        let mut layers = vec![SettingsLayer::from(&config.defaults)];

        if let Some(name) = config.defaults.account.as_deref().filter(|n| !n.is_empty()) {
            match config.accounts.get(name) {
                Some(default_account) => layers.push(default_account.into()),
                None => warn!("default account `{name}` is not defined in the config file"),
            }
        }

        if let Some(name) = account.filter(|n| !n.is_empty()) {
            let named = config.accounts.get(name).ok_or_else(|| {
                Error::Configuration(format!("account `{name}` not found in config file"))
            })?;
            layers.push(named.into());
        }

        layers.push(env.clone());
        layers.push(flags.clone());

        let mut settings = Settings::default();
        for layer in &layers {
            settings.apply(layer);
        }
        Ok(settings)
    }

    pub fn require_token(&self) -> Result<&str, Error> {
        if self.token.is_empty() {
            return Err(Error::Configuration(
                "API token is required (use -k or set CF_API_KEY)".to_string(),
            ));
        }
        Ok(&self.token)
    }

    pub fn require_domain(&self) -> Result<&str, Error> {
        if self.domain.is_empty() {
            return Err(Error::Configuration(
                "domain is required (use -d or set CF_API_DOMAIN)".to_string(),
            ));
        }
        Ok(&self.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn layer(token: &str, email: &str, domain: &str) -> SettingsLayer {
        let value = |v: &str| Some(v.to_string()).filter(|v| !v.is_empty());
        SettingsLayer {
            token: value(token),
            email: value(email),
            domain: value(domain),
        }
    }

    fn sample_config() -> Config {
        toml::from_str(
            r#"
            [defaults]
            token = "default-token"
            email = "default@example.com"
            domain = "default.com"
            account = "work"

            [accounts.work]
            token = "work-token"
            domain = "work.com"

            [accounts.personal]
            token = "personal-token"
            email = "me@example.com"
            domain = "personal.com"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_default_account_overrides_top_level_defaults() {
        let settings = Settings::resolve(
            &sample_config(),
            None,
            &SettingsLayer::default(),
            &SettingsLayer::default(),
        )
        .unwrap();
        assert_eq!(settings.token, "work-token");
        assert_eq!(settings.domain, "work.com");
        // not defined by the account, so the top-level default survives
        assert_eq!(settings.email, "default@example.com");
    }

    #[test]
    fn test_named_account_overrides_default_account() {
        let settings = Settings::resolve(
            &sample_config(),
            Some("personal"),
            &SettingsLayer::default(),
            &SettingsLayer::default(),
        )
        .unwrap();
        assert_eq!(settings.token, "personal-token");
        assert_eq!(settings.email, "me@example.com");
        assert_eq!(settings.domain, "personal.com");
    }

    #[test]
    fn test_env_overrides_file_and_flags_override_env() {
        let env = layer("env-token", "", "env.com");
        let flags = layer("", "", "flag.com");
        let settings =
            Settings::resolve(&sample_config(), Some("personal"), &env, &flags).unwrap();
        assert_eq!(settings.token, "env-token");
        assert_eq!(settings.email, "me@example.com");
        assert_eq!(settings.domain, "flag.com");
    }

    #[test]
    fn test_empty_values_never_override() {
        let mut settings = Settings::default();
        settings.apply(&layer("token", "a@b.c", "example.com"));
        settings.apply(&SettingsLayer {
            token: Some(String::new()),
            email: None,
            domain: Some(String::new()),
        });
        assert_eq!(settings.token, "token");
        assert_eq!(settings.email, "a@b.c");
        assert_eq!(settings.domain, "example.com");
    }

    #[test]
    fn test_unknown_named_account_is_configuration_error() {
        let result = Settings::resolve(
            &sample_config(),
            Some("missing"),
            &SettingsLayer::default(),
            &SettingsLayer::default(),
        );
        assert_matches!(result, Err(Error::Configuration(_)));
    }

    #[test]
    fn test_env_layer_reads_cf_variables() {
        let env = SettingsLayer::from_lookup(|key| match key {
            TOKEN_ENV => Some("tok".to_string()),
            DOMAIN_ENV => Some("example.com".to_string()),
            _ => None,
        });
        assert_eq!(env, layer("tok", "", "example.com"));
    }

    #[test]
    fn test_require_token_and_domain() {
        let settings = Settings::default();
        assert_matches!(settings.require_token(), Err(Error::Configuration(_)));
        assert_matches!(settings.require_domain(), Err(Error::Configuration(_)));

        let settings = Settings {
            token: "t".to_string(),
            email: String::new(),
            domain: "example.com".to_string(),
        };
        assert_eq!(settings.require_token().unwrap(), "t");
        assert_eq!(settings.require_domain().unwrap(), "example.com");
    }

    #[test]
    fn test_load_missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert!(config.accounts.is_empty());
        assert!(config.defaults.token.is_none());
    }

    #[test]
    fn test_load_reads_accounts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[accounts.work]\ntoken = \"abc\"").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.accounts["work"].token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults\ntoken = ").unwrap();
        assert_matches!(Config::load(file.path()), Err(Error::Configuration(_)));
    }

    #[test]
    fn test_custom_config_path_wins() {
        let custom = PathBuf::from("/tmp/custom.toml");
        assert_eq!(Config::get_config_path(Some(custom.clone())), Some(custom));
    }
}
