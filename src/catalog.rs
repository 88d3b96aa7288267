use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::config::{AliasTable, Config};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("unknown team name: {0}")]
    UnknownTeam(String),
    #[error("unknown stadium name: {0}")]
    UnknownStadium(String),
}

#[derive(Debug, Deserialize)]
struct RefEntry {
    #[serde(rename = "shortName")]
    short_name: String,
    id: i64,
}

/// Name → ID lookup tables, loaded once per run and read-only afterwards.
pub struct ReferenceCatalog {
    teams: HashMap<String, i64>,
    stadiums: HashMap<String, i64>,
    aliases: AliasTable,
}

impl ReferenceCatalog {
    /// Fetch both reference collections from the backend.
    pub async fn load(client: &reqwest::Client, config: &Config) -> Result<Self> {
        let teams = fetch_entries(client, &format!("{}/teams", config.backend_url))
            .await
            .context("failed to load team lookup table")?;
        let stadiums = fetch_entries(client, &format!("{}/stadiums", config.backend_url))
            .await
            .context("failed to load stadium lookup table")?;
        info!(
            "Reference catalog loaded: {} teams, {} stadiums",
            teams.len(),
            stadiums.len()
        );
        Ok(Self::from_entries(teams, stadiums, config.aliases.clone()))
    }

    pub fn from_entries(
        teams: Vec<(String, i64)>,
        stadiums: Vec<(String, i64)>,
        aliases: AliasTable,
    ) -> Self {
        ReferenceCatalog {
            teams: teams.into_iter().collect(),
            stadiums: stadiums.into_iter().collect(),
            aliases,
        }
    }

    pub fn resolve_team(&self, name: &str) -> Result<i64, LookupError> {
        let name = canonical(&self.aliases.teams, name);
        self.teams
            .get(name)
            .copied()
            .ok_or_else(|| LookupError::UnknownTeam(name.to_string()))
    }

    pub fn resolve_stadium(&self, name: &str) -> Result<i64, LookupError> {
        let name = canonical(&self.aliases.stadiums, name);
        self.stadiums
            .get(name)
            .copied()
            .ok_or_else(|| LookupError::UnknownStadium(name.to_string()))
    }

    pub fn team_list(&self) -> Vec<(&str, i64)> {
        sorted_entries(&self.teams)
    }

    pub fn stadium_list(&self) -> Vec<(&str, i64)> {
        sorted_entries(&self.stadiums)
    }
}

fn canonical<'a>(aliases: &'a HashMap<String, String>, name: &'a str) -> &'a str {
    aliases.get(name).map(String::as_str).unwrap_or(name)
}

fn sorted_entries(map: &HashMap<String, i64>) -> Vec<(&str, i64)> {
    let mut entries: Vec<_> = map.iter().map(|(n, id)| (n.as_str(), *id)).collect();
    entries.sort_by_key(|&(_, id)| id);
    entries
}

async fn fetch_entries(client: &reqwest::Client, url: &str) -> Result<Vec<(String, i64)>> {
    let entries: Vec<RefEntry> = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(entries.into_iter().map(|e| (e.short_name, e.id)).collect())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ReferenceCatalog {
        ReferenceCatalog::from_entries(
            vec![("KIA".into(), 1), ("LG".into(), 2)],
            vec![("광주".into(), 10), ("창원".into(), 12)],
            AliasTable::builtin(),
        )
    }

    #[test]
    fn resolves_known_names() {
        let c = catalog();
        assert_eq!(c.resolve_team("KIA").unwrap(), 1);
        assert_eq!(c.resolve_stadium("광주").unwrap(), 10);
    }

    #[test]
    fn retired_stadium_name_collapses_to_current() {
        let c = catalog();
        assert_eq!(c.resolve_stadium("마산").unwrap(), 12);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let c = catalog();
        assert!(matches!(
            c.resolve_team("한화"),
            Err(LookupError::UnknownTeam(_))
        ));
        assert!(matches!(
            c.resolve_stadium("사직"),
            Err(LookupError::UnknownStadium(_))
        ));
    }

    #[test]
    fn reference_entries_decode() {
        let entries: Vec<RefEntry> =
            serde_json::from_str(r#"[{ "shortName": "KIA", "id": 1 }]"#).unwrap();
        assert_eq!(entries[0].short_name, "KIA");
        assert_eq!(entries[0].id, 1);
    }
}
