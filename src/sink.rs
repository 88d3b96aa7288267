use anyhow::{Context, Result};
use rusqlite::Connection;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::db;
use crate::record::MatchRecord;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("sink request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sink rejected record with status {0}")]
    Rejected(reqwest::StatusCode),
    #[error("store write failed: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Where normalized records go. Both backends are upsert-style: persisting
/// the same fixture twice never duplicates it.
pub enum MatchSink {
    /// POST each record to the backend's schedule endpoint.
    Http {
        client: reqwest::Client,
        url: String,
        api_key: String,
    },
    /// Write straight into the local SQLite store.
    Store(Connection),
}

impl MatchSink {
    pub fn http(client: reqwest::Client, config: &Config, year: i32) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("API_KEY must be set for the http sink")?;
        Ok(MatchSink::Http {
            client,
            url: format!("{}/api/schedule-{}s", config.backend_url, year),
            api_key,
        })
    }

    pub fn store(config: &Config) -> Result<Self> {
        let conn = db::connect(&config.db_path)?;
        db::init_schema(&conn)?;
        Ok(MatchSink::Store(conn))
    }

    pub async fn persist(&self, record: &MatchRecord) -> Result<(), PersistError> {
        match self {
            MatchSink::Http {
                client,
                url,
                api_key,
            } => {
                let resp = client
                    .post(url)
                    .bearer_auth(api_key)
                    .json(&serde_json::json!({ "data": record }))
                    .send()
                    .await?;
                if !resp.status().is_success() {
                    return Err(PersistError::Rejected(resp.status()));
                }
                debug!("Posted {} {} @ {}", record.date, record.away, record.home);
                Ok(())
            }
            MatchSink::Store(conn) => {
                db::upsert_match(conn, record)?;
                Ok(())
            }
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_sink_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let sink = MatchSink::Store(conn);

        let record = MatchRecord {
            date: "2024-03-23".to_string(),
            time: "14:00".to_string(),
            away: 1,
            away_score: 3,
            home: 2,
            home_score: 5,
            stadium: 10,
            memo: "-".to_string(),
        };
        sink.persist(&record).await.unwrap();
        sink.persist(&record).await.unwrap();

        let MatchSink::Store(conn) = sink else {
            unreachable!()
        };
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM matches", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
