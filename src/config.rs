use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Datelike;
use serde::Deserialize;

const DEFAULT_BACKEND_URL: &str = "https://match-diary-backend-79e304d3a79e.herokuapp.com";
const DEFAULT_DB_PATH: &str = "data/kbo.sqlite";

/// Short-name substitutions applied before catalog lookup. The upstream
/// schedule keeps using retired names after stadiums are replaced or teams
/// rebrand, so the table has to be swappable without a rebuild (`ALIAS_FILE`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AliasTable {
    #[serde(default)]
    pub teams: HashMap<String, String>,
    #[serde(default)]
    pub stadiums: HashMap<String, String>,
}

impl AliasTable {
    /// Defaults covering the stadium renames seen in past seasons.
    pub fn builtin() -> Self {
        let stadiums = [("마산", "창원"), ("목동", "고척")]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        AliasTable {
            teams: HashMap::new(),
            stadiums,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read alias file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid alias file {}", path.display()))
    }
}

pub struct Config {
    /// Bearer token for the backend API (http sink only).
    pub api_key: Option<String>,
    pub webhook_url: Option<String>,
    pub backend_url: String,
    pub db_path: String,
    pub aliases: AliasTable,
}

impl Config {
    /// Read configuration from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let aliases = match std::env::var("ALIAS_FILE") {
            Ok(path) => AliasTable::from_file(Path::new(&path))?,
            Err(_) => AliasTable::builtin(),
        };

        Ok(Config {
            api_key: std::env::var("API_KEY").ok(),
            webhook_url: std::env::var("WEBHOOK_URL").ok(),
            backend_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            aliases,
        })
    }
}

pub fn default_season_year() -> i32 {
    chrono::Local::now().year()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_aliases_cover_stadium_renames() {
        let table = AliasTable::builtin();
        assert_eq!(table.stadiums.get("마산").map(String::as_str), Some("창원"));
        assert_eq!(table.stadiums.get("목동").map(String::as_str), Some("고척"));
    }

    #[test]
    fn alias_file_parses_partial_tables() {
        let table: AliasTable =
            serde_json::from_str(r#"{ "stadiums": { "마산": "창원" } }"#).unwrap();
        assert!(table.teams.is_empty());
        assert_eq!(table.stadiums.len(), 1);
    }
}
