//! Owner resolution for commands that create deals.
//!
//! Rather than requiring `--as` on every invocation, the owner is resolved
//! through a chain:
//!
//! 1. `--as <owner>`: explicit per-command override
//! 2. `OUTREACH_OWNER` env var: session level
//! 3. `default-owner` in `~/.outreach/config.toml`
//!
//! The resolved owner signs every generated email on the deal.

use std::env;

use crate::config::Config;

/// Error message shown when the owner cannot be resolved.
pub const OWNER_REQUIRED: &str = "owner required: pass --as <owner>, \
    set OUTREACH_OWNER, or add `default-owner = \"...\"` to ~/.outreach/config.toml";

/// Resolve the deal owner from the tiered resolution chain.
pub fn resolve_owner(explicit: Option<&str>, config: &Config) -> Result<String, String> {
    resolve(explicit, env::var("OUTREACH_OWNER").ok(), config)
}

fn resolve(explicit: Option<&str>, from_env: Option<String>, config: &Config) -> Result<String, String> {
    // 1. Explicit --as flag.
    if let Some(owner) = explicit.filter(|s| !s.is_empty()) {
        return Ok(owner.to_string());
    }

    // 2. OUTREACH_OWNER environment variable.
    if let Some(owner) = from_env.filter(|s| !s.is_empty()) {
        return Ok(owner);
    }

    // 3. Config default.
    config
        .default_owner
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| OWNER_REQUIRED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(owner: Option<&str>) -> Config {
        Config {
            default_owner: owner.map(str::to_string),
            ..Config::default()
        }
    }

    #[test]
    fn explicit_wins() {
        let owner = resolve(Some("jordan"), Some("env".into()), &config(Some("cfg")));
        assert_eq!(owner.unwrap(), "jordan");
    }

    #[test]
    fn env_beats_config() {
        let owner = resolve(None, Some("riley".into()), &config(Some("cfg")));
        assert_eq!(owner.unwrap(), "riley");
    }

    #[test]
    fn empty_values_fall_through() {
        let owner = resolve(Some(""), Some(String::new()), &config(Some("cfg")));
        assert_eq!(owner.unwrap(), "cfg");
    }

    #[test]
    fn nothing_configured_is_an_error() {
        let err = resolve(None, None, &config(None)).unwrap_err();
        assert_eq!(err, OWNER_REQUIRED);
    }
}
