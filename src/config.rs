use crate::SyncError;

/// Runtime configuration, sourced from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base: String,
    pub table: String,
    pub field: String,
    /// Name of the container running skyd.
    pub container: String,
    /// Operator channel webhook; messages go to stdout when unset.
    pub webhook_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from a name -> value lookup. An unset or empty
    /// required variable is a configuration error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SyncError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(SyncError::MissingEnv(name))
        };

        Ok(Config {
            api_key: required("AIRTABLE_API_KEY")?,
            base: required("AIRTABLE_BASE")?,
            table: required("AIRTABLE_TABLE")?,
            field: required("AIRTABLE_FIELD")?,
            container: lookup("SKYD_CONTAINER")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| "sia".to_string()),
            webhook_url: lookup("DISCORD_WEBHOOK_URL").filter(|value| !value.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_complete_environment() {
        let vars = env(
            &[
                ("AIRTABLE_API_KEY", "key"),
                ("AIRTABLE_BASE", "app123"),
                ("AIRTABLE_TABLE", "Blocklist"),
                ("AIRTABLE_FIELD", "Link"),
            ]
        );

        let config = Config::from_lookup(|name| vars.get(name).cloned()).unwrap();
        assert_eq!(config.base, "app123");
        assert_eq!(config.field, "Link");
        assert_eq!(config.container, "sia");
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn test_missing_variable_is_fatal() {
        let vars = env(
            &[
                ("AIRTABLE_API_KEY", "key"),
                ("AIRTABLE_BASE", "app123"),
                ("AIRTABLE_TABLE", "Blocklist"),
            ]
        );

        let err = Config::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
        assert!(matches!(err, SyncError::MissingEnv("AIRTABLE_FIELD")));
    }

    #[test]
    fn test_empty_variable_counts_as_missing() {
        let vars = env(
            &[
                ("AIRTABLE_API_KEY", ""),
                ("AIRTABLE_BASE", "app123"),
                ("AIRTABLE_TABLE", "Blocklist"),
                ("AIRTABLE_FIELD", "Link"),
            ]
        );

        let err = Config::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
        assert!(matches!(err, SyncError::MissingEnv("AIRTABLE_API_KEY")));
    }

    #[test]
    fn test_optional_overrides() {
        let vars = env(
            &[
                ("AIRTABLE_API_KEY", "key"),
                ("AIRTABLE_BASE", "app123"),
                ("AIRTABLE_TABLE", "Blocklist"),
                ("AIRTABLE_FIELD", "Link"),
                ("SKYD_CONTAINER", "skyd-dev"),
                ("DISCORD_WEBHOOK_URL", "https://discord.test/hook"),
            ]
        );

        let config = Config::from_lookup(|name| vars.get(name).cloned()).unwrap();
        assert_eq!(config.container, "skyd-dev");
        assert_eq!(config.webhook_url.as_deref(), Some("https://discord.test/hook"));
    }
}
