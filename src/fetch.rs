use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const SCHEDULE_URL: &str = "https://www.koreabaseball.com/ws/Schedule.asmx/GetScheduleList";
const LEAGUE_ID: &str = "1";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("schedule request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("schedule endpoint returned {0}")]
    Status(reqwest::StatusCode),
}

/// Which upstream series set to query. Regular season and postseason publish
/// under different series IDs and month windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonKind {
    Regular,
    Post,
}

impl SeasonKind {
    pub fn series_ids(self) -> &'static str {
        match self {
            SeasonKind::Regular => "0,9,6",
            SeasonKind::Post => "3,4,5,7",
        }
    }

    pub fn months(self) -> std::ops::RangeInclusive<u32> {
        match self {
            SeasonKind::Regular => 3..=11,
            SeasonKind::Post => 9..=11,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeasonKind::Regular => "regular season",
            SeasonKind::Post => "postseason",
        }
    }
}

/// Row-oriented envelope the schedule endpoint returns. An empty `rows`
/// array means no schedule has been published for that month yet.
#[derive(Debug, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub rows: Vec<ScheduleRow>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRow {
    #[serde(default)]
    pub row: Vec<Cell>,
}

/// One table cell. `text` may carry embedded HTML fragments.
#[derive(Debug, Deserialize)]
pub struct Cell {
    #[serde(rename = "Text", default)]
    pub text: String,
    #[serde(rename = "Class", default)]
    pub class: Option<String>,
}

pub async fn fetch_month(
    client: &reqwest::Client,
    year: i32,
    month: u32,
    kind: SeasonKind,
) -> Result<ScheduleResponse, FetchError> {
    let form = [
        ("leId", LEAGUE_ID.to_string()),
        ("srIdList", kind.series_ids().to_string()),
        ("seasonId", year.to_string()),
        ("gameMonth", format!("{month:02}")),
        ("teamId", String::new()),
    ];

    let resp = client.post(SCHEDULE_URL).form(&form).send().await?;
    if !resp.status().is_success() {
        return Err(FetchError::Status(resp.status()));
    }

    let body: ScheduleResponse = resp.json().await?;
    debug!(
        "{} {}-{:02}: {} raw rows",
        kind.label(),
        year,
        month,
        body.rows.len()
    );
    Ok(body)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_decodes_cells_with_markup() {
        let raw = r#"{"rows":[{"row":[
            {"Text":"03.23(토)","Class":"day"},
            {"Text":"<b>14:00</b>","Class":"time"}
        ]}]}"#;
        let resp: ScheduleResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.rows.len(), 1);
        assert_eq!(resp.rows[0].row[0].class.as_deref(), Some("day"));
        assert_eq!(resp.rows[0].row[1].text, "<b>14:00</b>");
    }

    #[test]
    fn empty_envelope_is_a_normal_outcome() {
        let resp: ScheduleResponse = serde_json::from_str(r#"{"rows":[]}"#).unwrap();
        assert!(resp.rows.is_empty());
    }

    #[test]
    fn season_windows_and_series() {
        assert_eq!(SeasonKind::Regular.months(), 3..=11);
        assert_eq!(SeasonKind::Post.months(), 9..=11);
        assert_eq!(SeasonKind::Regular.series_ids(), "0,9,6");
        assert_eq!(SeasonKind::Post.series_ids(), "3,4,5,7");
    }
}
