use anyhow::Result;
use rusqlite::Connection;

use crate::doubleheader::DOUBLEHEADER_MEMO;
use crate::record::MatchRecord;

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = std::path::Path::new(path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS matches (
            id         INTEGER PRIMARY KEY,
            date       TEXT NOT NULL,
            time       TEXT NOT NULL,
            away       INTEGER NOT NULL,
            away_score INTEGER NOT NULL DEFAULT -1,
            home       INTEGER NOT NULL,
            home_score INTEGER NOT NULL DEFAULT -1,
            stadium    INTEGER NOT NULL,
            memo       TEXT NOT NULL DEFAULT '-',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_matches_fixture
            ON matches(date, time, away, home, stadium);
        CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(date);
        ",
    )?;
    Ok(())
}

/// Upsert keyed on the fixture identity. Only the mutable fields move on
/// conflict; the identity columns never change once a row exists, so
/// re-crawling a finished month updates scores in place.
pub fn upsert_match(conn: &Connection, m: &MatchRecord) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO matches (date, time, away, away_score, home, home_score, stadium, memo)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(date, time, away, home, stadium) DO UPDATE SET
            away_score = excluded.away_score,
            home_score = excluded.home_score,
            memo       = excluded.memo",
        rusqlite::params![
            m.date,
            m.time,
            m.away,
            m.away_score,
            m.home,
            m.home_score,
            m.stadium,
            m.memo,
        ],
    )?;
    Ok(())
}

// ── Stats ──

pub struct StoreStats {
    pub total: usize,
    pub played: usize,
    pub scheduled: usize,
    pub doubleheaders: usize,
}

pub fn get_stats(conn: &Connection) -> Result<StoreStats> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM matches", [], |r| r.get(0))?;
    let played: usize = conn.query_row(
        "SELECT COUNT(*) FROM matches WHERE away_score >= 0 AND home_score >= 0",
        [],
        |r| r.get(0),
    )?;
    let doubleheaders: usize = conn.query_row(
        "SELECT COUNT(*) FROM matches WHERE memo LIKE ?1",
        [format!("%{DOUBLEHEADER_MEMO}%")],
        |r| r.get(0),
    )?;
    Ok(StoreStats {
        total,
        played,
        scheduled: total - played,
        doubleheaders,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn fixture(away_score: i64, home_score: i64, memo: &str) -> MatchRecord {
        MatchRecord {
            date: "2024-03-23".to_string(),
            time: "14:00".to_string(),
            away: 1,
            away_score,
            home: 2,
            home_score,
            stadium: 10,
            memo: memo.to_string(),
        }
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM matches", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn repeated_upsert_keeps_a_single_row() {
        let conn = mem_conn();
        let m = fixture(3, 5, "-");
        upsert_match(&conn, &m).unwrap();
        upsert_match(&conn, &m).unwrap();
        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn score_update_overwrites_in_place() {
        let conn = mem_conn();
        upsert_match(&conn, &fixture(-1, -1, "-")).unwrap();
        upsert_match(&conn, &fixture(3, 5, "doubleheader")).unwrap();
        assert_eq!(count(&conn), 1);

        let (away_score, home_score, memo): (i64, i64, String) = conn
            .query_row(
                "SELECT away_score, home_score, memo FROM matches",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(away_score, 3);
        assert_eq!(home_score, 5);
        assert_eq!(memo, "doubleheader");
    }

    #[test]
    fn different_stadium_is_a_different_fixture() {
        let conn = mem_conn();
        let mut second = fixture(-1, -1, "-");
        second.stadium = 11;
        upsert_match(&conn, &fixture(-1, -1, "-")).unwrap();
        upsert_match(&conn, &second).unwrap();
        assert_eq!(count(&conn), 2);
    }

    #[test]
    fn stats_split_played_from_scheduled() {
        let conn = mem_conn();
        upsert_match(&conn, &fixture(3, 5, "doubleheader")).unwrap();
        let mut upcoming = fixture(-1, -1, "-");
        upcoming.time = "18:30".to_string();
        upsert_match(&conn, &upcoming).unwrap();

        let s = get_stats(&conn).unwrap();
        assert_eq!(s.total, 2);
        assert_eq!(s.played, 1);
        assert_eq!(s.scheduled, 1);
        assert_eq!(s.doubleheaders, 1);
    }
}
