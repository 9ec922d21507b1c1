//! Runtime configuration.
//!
//! Loaded from environment variables with fallback to defaults:
//!
//! | Variable                       | Values              | Default         |
//! |--------------------------------|---------------------|-----------------|
//! | `TRIPSPLIT_DB_PATH`            | file path           | `tripsplit.db`  |
//! | `TRIPSPLIT_UNKNOWN_PAYER`      | `reject` \| `admit` | `reject`        |
//! | `TRIPSPLIT_EMPTY_PARTICIPANTS` | `guard` \| `reject` | `guard`         |
//! | `TRIPSPLIT_TOLERANCE_CENTS`    | integer >= 0        | `1`             |
//!
//! An unparseable value is logged and the default is kept.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;
use tripsplit_core::{Money, SettlementPolicy};

use crate::pool::DbConfig;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "tripsplit.db";

/// Tripsplit configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TripsplitConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Policy for the settlement engine
    pub policy: SettlementPolicy,
}

impl Default for TripsplitConfig {
    fn default() -> Self {
        TripsplitConfig {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            policy: SettlementPolicy::default(),
        }
    }
}

impl TripsplitConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TripsplitConfig::default();

        let database_path = lookup("TRIPSPLIT_DB_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let policy = SettlementPolicy {
            unknown_payer: parse_or_default(
                &lookup,
                "TRIPSPLIT_UNKNOWN_PAYER",
                defaults.policy.unknown_payer,
            ),
            empty_participants: parse_or_default(
                &lookup,
                "TRIPSPLIT_EMPTY_PARTICIPANTS",
                defaults.policy.empty_participants,
            ),
            tolerance: tolerance_or_default(&lookup, defaults.policy.tolerance),
        };

        TripsplitConfig {
            database_path,
            policy,
        }
    }

    /// Database configuration for `database_path` with default pool settings.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|err| {
            warn!(key, value = %raw, error = %err, "Invalid configuration value, using default");
            default
        }),
    }
}

fn tolerance_or_default<F>(lookup: &F, default: Money) -> Money
where
    F: Fn(&str) -> Option<String>,
{
    const KEY: &str = "TRIPSPLIT_TOLERANCE_CENTS";

    match lookup(KEY).map(|raw| (raw.trim().parse::<i64>(), raw)) {
        None => default,
        Some((Ok(cents), _)) if cents >= 0 => Money::from_cents(cents),
        Some((_, raw)) => {
            warn!(key = KEY, value = %raw, "Tolerance must be a non-negative integer, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tripsplit_core::settlement::{EmptyParticipantsPolicy, UnknownPayerPolicy};

    fn config_from(pairs: &[(&str, &str)]) -> TripsplitConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TripsplitConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, TripsplitConfig::default());
        assert_eq!(config.database_path, PathBuf::from("tripsplit.db"));
        assert_eq!(config.policy.tolerance.cents(), 1);
    }

    #[test]
    fn test_reads_all_keys() {
        let config = config_from(&[
            ("TRIPSPLIT_DB_PATH", "/tmp/trips.db"),
            ("TRIPSPLIT_UNKNOWN_PAYER", "admit"),
            ("TRIPSPLIT_EMPTY_PARTICIPANTS", "reject"),
            ("TRIPSPLIT_TOLERANCE_CENTS", "5"),
        ]);

        assert_eq!(config.database_path, PathBuf::from("/tmp/trips.db"));
        assert_eq!(config.policy.unknown_payer, UnknownPayerPolicy::AdmitAsHolder);
        assert_eq!(
            config.policy.empty_participants,
            EmptyParticipantsPolicy::Reject
        );
        assert_eq!(config.policy.tolerance.cents(), 5);
        assert_eq!(config.db_config().database_path, PathBuf::from("/tmp/trips.db"));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = config_from(&[
            ("TRIPSPLIT_UNKNOWN_PAYER", "sometimes"),
            ("TRIPSPLIT_TOLERANCE_CENTS", "-3"),
            ("TRIPSPLIT_DB_PATH", "  "),
        ]);

        assert_eq!(config, TripsplitConfig::default());
    }
}
