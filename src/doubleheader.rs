use crate::record::{MatchRecord, NO_MEMO};

/// Memo marker appended to both legs of a doubleheader.
pub const DOUBLEHEADER_MEMO: &str = "doubleheader";

/// Tag every record that shares `(date, stadium)` with another record in the
/// batch. Self-comparison is excluded by index, not by field equality, so two
/// legs with identical fields still pair up. Running this twice is a no-op.
pub fn annotate(batch: &mut [MatchRecord]) {
    for i in 0..batch.len() {
        let (date, stadium) = (batch[i].date.clone(), batch[i].stadium);
        let has_twin = batch
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && other.date == date && other.stadium == stadium);
        if !has_twin || batch[i].memo.contains(DOUBLEHEADER_MEMO) {
            continue;
        }
        batch[i].memo = if batch[i].memo == NO_MEMO {
            DOUBLEHEADER_MEMO.to_string()
        } else {
            format!("{}, {}", batch[i].memo, DOUBLEHEADER_MEMO)
        };
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: &str, time: &str, stadium: i64, memo: &str) -> MatchRecord {
        MatchRecord {
            date: date.to_string(),
            time: time.to_string(),
            away: 1,
            away_score: -1,
            home: 2,
            home_score: -1,
            stadium,
            memo: memo.to_string(),
        }
    }

    #[test]
    fn tags_both_legs_of_a_pair() {
        let mut batch = vec![
            rec("2024-06-15", "14:00", 10, "-"),
            rec("2024-06-15", "18:30", 10, "-"),
            rec("2024-06-15", "18:30", 11, "-"),
        ];
        annotate(&mut batch);
        assert_eq!(batch[0].memo, DOUBLEHEADER_MEMO);
        assert_eq!(batch[1].memo, DOUBLEHEADER_MEMO);
        assert_eq!(batch[2].memo, NO_MEMO);
    }

    #[test]
    fn annotation_is_idempotent() {
        let mut once = vec![
            rec("2024-06-15", "14:00", 10, "-"),
            rec("2024-06-15", "18:30", 10, "우천순연"),
        ];
        annotate(&mut once);
        let mut twice = once.clone();
        annotate(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn existing_memo_is_merged_not_replaced() {
        let mut batch = vec![
            rec("2024-06-15", "14:00", 10, "rain delay"),
            rec("2024-06-15", "18:30", 10, "-"),
        ];
        annotate(&mut batch);
        assert_eq!(batch[0].memo, "rain delay, doubleheader");
        assert_eq!(batch[1].memo, DOUBLEHEADER_MEMO);
    }

    #[test]
    fn identical_legs_still_pair_up() {
        // Index-keyed self-exclusion: equal fields must not look like "self".
        let mut batch = vec![
            rec("2024-06-15", "14:00", 10, "-"),
            rec("2024-06-15", "14:00", 10, "-"),
        ];
        annotate(&mut batch);
        assert_eq!(batch[0].memo, DOUBLEHEADER_MEMO);
        assert_eq!(batch[1].memo, DOUBLEHEADER_MEMO);
    }

    #[test]
    fn same_stadium_on_different_days_is_not_a_pair() {
        let mut batch = vec![
            rec("2024-06-15", "18:30", 10, "-"),
            rec("2024-06-16", "18:30", 10, "-"),
        ];
        annotate(&mut batch);
        assert_eq!(batch[0].memo, NO_MEMO);
        assert_eq!(batch[1].memo, NO_MEMO);
    }
}
