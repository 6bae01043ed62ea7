//! Named environments a site's tests can run against

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable consulted when no explicit environment key is
/// given, e.g. `STORESHOT_ENV=staging1`.
pub const ENV_VAR: &str = "STORESHOT_ENV";

/// One target deployment of a site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteEnvironment {
    /// Display name, e.g. "Production"
    pub name: String,

    /// Base URL without a trailing slash, e.g. "https://example.com"
    pub base_url: String,

    #[serde(default)]
    pub description: String,
}

/// The set of environments a site defines, keyed by a short name
/// (`live`, `staging1`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSet {
    environments: BTreeMap<String, SiteEnvironment>,

    #[serde(default = "default_environment_key")]
    default: String,
}

fn default_environment_key() -> String {
    "live".to_string()
}

impl EnvironmentSet {
    pub fn new(environments: BTreeMap<String, SiteEnvironment>, default: String) -> Result<Self> {
        // The default must itself resolve, else every run without an
        // override would fail late instead of at load time.
        if !environments.contains_key(&default) {
            return Err(Error::UnknownEnvironment {
                requested: default,
                available: environments.keys().cloned().collect(),
            });
        }
        Ok(Self {
            environments,
            default,
        })
    }

    pub fn keys(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }

    pub fn default_key(&self) -> &str {
        &self.default
    }

    fn get(&self, key: &str) -> Result<&SiteEnvironment> {
        self.environments
            .get(key)
            .ok_or_else(|| Error::UnknownEnvironment {
                requested: key.to_string(),
                available: self.keys(),
            })
    }

    /// Resolve the environment to run against. Precedence: explicit
    /// argument, then `STORESHOT_ENV`, then the site's default key.
    /// An unknown key fails fast listing every valid option.
    pub fn select(&self, requested: Option<&str>) -> Result<(String, &SiteEnvironment)> {
        let from_env = std::env::var(ENV_VAR).ok();
        let key = requested
            .map(str::to_string)
            .or(from_env)
            .unwrap_or_else(|| self.default.clone());
        let environment = self.get(&key)?;
        Ok((key, environment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EnvironmentSet {
        let mut envs = BTreeMap::new();
        envs.insert(
            "live".to_string(),
            SiteEnvironment {
                name: "Production".to_string(),
                base_url: "https://example.com".to_string(),
                description: "Live production site".to_string(),
            },
        );
        envs.insert(
            "staging1".to_string(),
            SiteEnvironment {
                name: "Staging 1".to_string(),
                base_url: "https://staging1.example.com".to_string(),
                description: String::new(),
            },
        );
        EnvironmentSet::new(envs, "live".to_string()).unwrap()
    }

    #[test]
    fn explicit_key_wins() {
        let set = sample();
        let (key, env) = set.select(Some("staging1")).unwrap();
        assert_eq!(key, "staging1");
        assert_eq!(env.base_url, "https://staging1.example.com");
    }

    #[test]
    fn falls_back_to_default() {
        let set = sample();
        let (key, env) = set.select(None).unwrap();
        assert_eq!(key, "live");
        assert_eq!(env.name, "Production");
    }

    #[test]
    fn unknown_key_lists_available() {
        let set = sample();
        let err = set.select(Some("staging9")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("staging9"), "names the offender: {}", msg);
        assert!(msg.contains("live"), "lists valid keys: {}", msg);
        assert!(msg.contains("staging1"), "lists valid keys: {}", msg);
    }

    #[test]
    fn unknown_default_is_rejected_at_construction() {
        let err = EnvironmentSet::new(BTreeMap::new(), "live".to_string()).unwrap_err();
        assert!(matches!(err, Error::UnknownEnvironment { .. }));
    }
}
