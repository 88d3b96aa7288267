use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

use crate::catalog::{LookupError, ReferenceCatalog};
use crate::fetch::{Cell, ScheduleRow, SeasonKind};
use crate::record::{MatchRecord, NO_MEMO, UNPLAYED};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(\d{4})\.)?(\d{1,2})\.(\d{1,2})").unwrap());

/// Memo marker the upstream uses for unclassifiable special fixtures.
/// Rows carrying it are dropped before they reach the sink.
const MISC_MEMO: &str = "기타";

/// Why a raw row produced no record. Row-local only; the surrounding batch
/// keeps going.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("row has no cells")]
    EmptyRow,
    #[error("continuation row with no prior record to inherit a date from")]
    NoPriorDate,
    #[error("missing cell {0}")]
    MissingCell(usize),
    #[error("missing game-info segment {0}")]
    MissingSegment(usize),
    #[error("unparseable date: {0}")]
    BadDate(String),
    #[error("unparseable score: {0}")]
    BadScore(String),
    #[error("game-info cell has no text segments")]
    NoGameInfo,
    #[error("postseason travel-day placeholder")]
    TravelDay,
    #[error("miscellaneous fixture memo")]
    MiscMemo,
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

#[derive(Debug)]
pub enum RowOutcome {
    Match(MatchRecord),
    Skipped(SkipReason),
}

/// Convert one raw row into a record, consulting the batch built so far for
/// inherited dates. Every failure is contained to the row.
pub fn parse_row(
    row: &ScheduleRow,
    batch: &[MatchRecord],
    catalog: &ReferenceCatalog,
    year: i32,
    kind: SeasonKind,
) -> RowOutcome {
    match try_parse(row, batch, catalog, year, kind) {
        Ok(record) => RowOutcome::Match(record),
        Err(reason) => RowOutcome::Skipped(reason),
    }
}

fn try_parse(
    row: &ScheduleRow,
    batch: &[MatchRecord],
    catalog: &ReferenceCatalog,
    year: i32,
    kind: SeasonKind,
) -> Result<MatchRecord, SkipReason> {
    let first = row.row.first().ok_or(SkipReason::EmptyRow)?;
    let is_primary = first.class.as_deref() == Some("day");

    // The first game of a day carries its own date cell; continuation rows
    // drop it, shifting every later column left by one.
    let (date, base) = if is_primary {
        (normalize_date(&first.text, year)?, 1)
    } else {
        let prior = batch.last().ok_or(SkipReason::NoPriorDate)?;
        (prior.date.clone(), 0)
    };

    let time = strip_tags(&cell(row, base)?.text);
    let info = text_segments(&cell(row, base + 1)?.text);

    let (away_name, home_name, away_score, home_score) = if info.len() > 3 {
        // Completed game: [away, awayScore, separator, homeScore, home]
        (
            segment(&info, 0)?,
            segment(&info, 4)?,
            parse_score(segment(&info, 1)?)?,
            parse_score(segment(&info, 3)?)?,
        )
    } else if info.is_empty() {
        // Postseason schedules list travel days as game-less continuation rows.
        return Err(if kind == SeasonKind::Post && !is_primary {
            SkipReason::TravelDay
        } else {
            SkipReason::NoGameInfo
        });
    } else {
        // Not played yet: [away, separator, home]
        (segment(&info, 0)?, segment(&info, 2)?, UNPLAYED, UNPLAYED)
    };

    let stadium_name = strip_tags(&cell(row, base + 6)?.text);

    let memo = match row.row.get(base + 7) {
        Some(c) => {
            let text = strip_tags(&c.text);
            if text.is_empty() {
                NO_MEMO.to_string()
            } else {
                text
            }
        }
        None => NO_MEMO.to_string(),
    };
    if memo == MISC_MEMO {
        return Err(SkipReason::MiscMemo);
    }

    Ok(MatchRecord {
        date,
        time,
        away: catalog.resolve_team(away_name)?,
        away_score,
        home: catalog.resolve_team(home_name)?,
        home_score,
        stadium: catalog.resolve_stadium(&stadium_name)?,
        memo,
    })
}

fn cell(row: &ScheduleRow, idx: usize) -> Result<&Cell, SkipReason> {
    row.row.get(idx).ok_or(SkipReason::MissingCell(idx))
}

fn segment(info: &[String], idx: usize) -> Result<&str, SkipReason> {
    info.get(idx)
        .map(String::as_str)
        .ok_or(SkipReason::MissingSegment(idx))
}

// Completed games only ever carry non-negative scores; anything else is a
// malformed segment, not a sentinel.
fn parse_score(raw: &str) -> Result<i64, SkipReason> {
    raw.parse::<u32>()
        .map(i64::from)
        .map_err(|_| SkipReason::BadScore(raw.to_string()))
}

/// Ordered text segments of a markup fragment: everything between tags,
/// trimmed, empties dropped. A completed game yields five segments because
/// the score separator sits as bare text between the score spans.
fn text_segments(markup: &str) -> Vec<String> {
    TAG_RE
        .split(markup)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_tags(markup: &str) -> String {
    TAG_RE.replace_all(markup, "").trim().to_string()
}

/// `MM.DD(요일)` implies the crawl's season year; a `YYYY.` prefix wins when
/// present. Output is always `YYYY-MM-DD`.
fn normalize_date(raw: &str, season_year: i32) -> Result<String, SkipReason> {
    fn bad(raw: &str) -> SkipReason {
        SkipReason::BadDate(raw.to_string())
    }

    let caps = DATE_RE.captures(raw.trim()).ok_or_else(|| bad(raw))?;
    let year = match caps.get(1) {
        Some(y) => y.as_str().parse::<i32>().map_err(|_| bad(raw))?,
        None => season_year,
    };
    let month: u32 = caps[2].parse().map_err(|_| bad(raw))?;
    let day: u32 = caps[3].parse().map_err(|_| bad(raw))?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| bad(raw))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

// ── Tests ──
