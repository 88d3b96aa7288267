use serde::Serialize;

/// Memo sentinel for fixtures with no annotation.
pub const NO_MEMO: &str = "-";

/// Score sentinel for fixtures that have not been played yet.
pub const UNPLAYED: i64 = -1;

/// One normalized KBO fixture, the unit handed to the sink.
///
/// The serialized shape matches the backend payload: camelCase score fields,
/// team and stadium as catalog IDs rather than display names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Normalized `YYYY-MM-DD`.
    pub date: String,
    /// Local start time, kept as the upstream text.
    pub time: String,
    pub away: i64,
    pub away_score: i64,
    pub home: i64,
    pub home_score: i64,
    pub stadium: i64,
    pub memo: String,
}
