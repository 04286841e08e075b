use std::env;
use std::path::PathBuf;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::model::UserId;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_i64(profile: &str, key: &str, default: i64) -> i64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub store: StoreConfig,
    pub worker: WorkerConfig,
    pub admin: AdminConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `GRADEVIS_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("GRADEVIS_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            store: StoreConfig::from_env_profiled(p),
            worker: WorkerConfig::from_env_profiled(p),
            admin: AdminConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  store:   path={}", self.store.path.display());
        tracing::info!(
            "  worker:  interval={}s, parent_hiding_lookback={}s",
            self.worker.interval_secs,
            self.worker.parent_hiding_lookback_secs
        );
        tracing::info!(
            "  admin:   duplicate_offset={}s, default_actor={}",
            self.admin.duplicate_offset_secs,
            self.admin.default_actor_id
        );
    }
}

// ── Store ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON snapshot holding courses, grade tree, rules and task state.
    pub path: PathBuf,
}

impl StoreConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            path: PathBuf::from(profiled_env_or(p, "STORE_PATH", "data/gradebook.json")),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/gradebook.json"),
        }
    }
}

// ── Worker ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Seconds between two ticks of the periodic task.
    pub interval_secs: u64,
    /// How far before the previous run the parent-hiding sweep looks back.
    pub parent_hiding_lookback_secs: i64,
}

impl WorkerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            interval_secs: profiled_env_u64(p, "WORKER_INTERVAL_SECS", 60).max(1),
            parent_hiding_lookback_secs: profiled_env_i64(p, "PARENT_HIDING_LOOKBACK_SECS", 3600),
        }
    }

    pub fn lookback(&self) -> Duration {
        Duration::seconds(self.parent_hiding_lookback_secs)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            parent_hiding_lookback_secs: 3600,
        }
    }
}

// ── Admin ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// A duplicated rule is scheduled this many seconds after "now".
    pub duplicate_offset_secs: i64,
    /// Author recorded on rules when no actor is given.
    pub default_actor_id: UserId,
}

impl AdminConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            duplicate_offset_secs: profiled_env_i64(p, "DUPLICATE_OFFSET_SECS", 3600),
            default_actor_id: profiled_env_i64(p, "DEFAULT_ACTOR_ID", 0),
        }
    }

    pub fn duplicate_offset(&self) -> Duration {
        Duration::seconds(self.duplicate_offset_secs)
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            duplicate_offset_secs: 3600,
            default_actor_id: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hourly_windows() {
        let config = Config::default();
        assert_eq!(config.profile_label(), "default");
        assert_eq!(config.worker.lookback(), Duration::hours(1));
        assert_eq!(config.admin.duplicate_offset(), Duration::hours(1));
        assert_eq!(config.store.path, PathBuf::from("data/gradebook.json"));
    }

    #[test]
    fn profile_prefix_wins_over_bare_key() {
        // Keys are unique to this test so parallel tests don't interfere.
        env::set_var("GVTEST_STORE_PATH", "/tmp/profiled.json");
        let config = Config::for_profile("gvtest");
        assert_eq!(config.profile, "GVTEST");
        assert_eq!(config.store.path, PathBuf::from("/tmp/profiled.json"));
        env::remove_var("GVTEST_STORE_PATH");
    }
}
