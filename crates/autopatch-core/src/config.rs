//! Environment configuration

use url::Url;

use crate::error::ConfigError;

pub const WEBHOOK_URL_VAR: &str = "SLACK_WEBHOOK_URL";
pub const RECIPIENTS_VAR: &str = "UPDATER_RECIPIENTS";
pub const SMTP_ADDRESS_VAR: &str = "UPDATER_SMTP_ADDRESS";
pub const SMTP_PORT_VAR: &str = "UPDATER_SMTP_PORT";
pub const MAIL_FROM_VAR: &str = "UPDATER_MAIL_FROM";

/// Names used by earlier deployments, still honoured as fallbacks
const LEGACY_RECIPIENTS_VAR: &str = "UPDATER_RECIPIETS";
const LEGACY_SMTP_ADDRESS_VAR: &str = "UPDATER_SMTP_ADDERESS";

const DEFAULT_SMTP_PORT: u16 = 25;

/// Notification settings, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// Primary channel webhook
    pub webhook_url: Url,
    /// Fallback mail recipients, in send order
    pub recipients: Vec<String>,
    /// Fallback SMTP server host
    pub smtp_host: String,
    /// Fallback SMTP server port
    pub smtp_port: u16,
    /// Envelope sender; `root@<hostname>` when unset
    pub mail_from: Option<String>,
}

impl UpdaterConfig {
    /// Load from the process environment
    ///
    /// # Errors
    /// Returns `ConfigError` if a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    /// Returns `ConfigError` if a required variable is missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let webhook = get(WEBHOOK_URL_VAR).ok_or(ConfigError::Missing(WEBHOOK_URL_VAR))?;
        let webhook_url =
            Url::parse(webhook.trim()).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

        let recipients = get(RECIPIENTS_VAR)
            .or_else(|| get(LEGACY_RECIPIENTS_VAR))
            .ok_or(ConfigError::Missing(RECIPIENTS_VAR))?;
        let recipients: Vec<String> = recipients
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();
        if recipients.is_empty() {
            return Err(ConfigError::NoRecipients);
        }

        let smtp_host = get(SMTP_ADDRESS_VAR)
            .or_else(|| get(LEGACY_SMTP_ADDRESS_VAR))
            .ok_or(ConfigError::Missing(SMTP_ADDRESS_VAR))?
            .trim()
            .to_string();

        let smtp_port = match get(SMTP_PORT_VAR) {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or(ConfigError::InvalidPort(port))?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            webhook_url,
            recipients,
            smtp_host,
            smtp_port,
            mail_from: get(MAIL_FROM_VAR).map(|v| v.trim().to_string()),
        })
    }

    /// Envelope sender for fallback mail
    #[must_use]
    pub fn sender_address(&self, hostname: &str) -> String {
        self.mail_from
            .clone()
            .unwrap_or_else(|| format!("root@{hostname}"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            (WEBHOOK_URL_VAR, "https://hooks.slack.com/services/T0/B0/x"),
            (RECIPIENTS_VAR, "ops@example.com, oncall@example.com"),
            (SMTP_ADDRESS_VAR, "mail.example.com"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = UpdaterConfig::from_lookup(lookup(&required())).unwrap();

        assert_eq!(config.smtp_port, 25);
        assert_eq!(config.smtp_host, "mail.example.com");
        assert_eq!(config.recipients, vec!["ops@example.com", "oncall@example.com"]);
        assert_eq!(config.sender_address("web01"), "root@web01");
    }

    #[test]
    fn test_each_required_variable() {
        for missing in [WEBHOOK_URL_VAR, RECIPIENTS_VAR, SMTP_ADDRESS_VAR] {
            let vars: Vec<_> = required().into_iter().filter(|(k, _)| *k != missing).collect();
            let err = UpdaterConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert_eq!(err, ConfigError::Missing(missing));
        }
    }

    #[test]
    fn test_empty_value_is_missing() {
        let mut vars = required();
        vars[0].1 = "  ";
        let err = UpdaterConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing(WEBHOOK_URL_VAR));
    }

    #[test]
    fn test_legacy_names() {
        let vars = [
            (WEBHOOK_URL_VAR, "https://hooks.example.com/x"),
            ("UPDATER_RECIPIETS", "ops@example.com"),
            ("UPDATER_SMTP_ADDERESS", "10.0.0.25"),
        ];
        let config = UpdaterConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.recipients, vec!["ops@example.com"]);
        assert_eq!(config.smtp_host, "10.0.0.25");
    }

    #[test]
    fn test_port_and_sender_overrides() {
        let mut vars = required();
        vars.push((SMTP_PORT_VAR, "2525"));
        vars.push((MAIL_FROM_VAR, "updates@example.com"));
        let config = UpdaterConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.smtp_port, 2525);
        assert_eq!(config.sender_address("web01"), "updates@example.com");
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = required();
        vars.push((SMTP_PORT_VAR, "smtp"));
        assert!(matches!(
            UpdaterConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidPort(_))
        ));

        let mut vars = required();
        vars[0].1 = "not a url";
        assert!(matches!(
            UpdaterConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidUrl(_))
        ));

        let mut vars = required();
        vars[1].1 = " , ,";
        assert_eq!(
            UpdaterConfig::from_lookup(lookup(&vars)).unwrap_err(),
            ConfigError::NoRecipients
        );
    }
}
