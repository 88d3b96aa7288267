use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::catalog::ReferenceCatalog;
use crate::config::Config;
use crate::doubleheader;
use crate::fetch::{self, FetchError, SeasonKind};
use crate::notify;
use crate::parse::{self, RowOutcome, SkipReason};
use crate::record::MatchRecord;
use crate::sink::MatchSink;

#[derive(Default)]
pub struct MonthStats {
    pub saved: usize,
    pub skipped: usize,
    pub persist_errors: usize,
}

pub struct RunSummary {
    pub year: i32,
    pub saved: usize,
    pub skipped: usize,
    pub persist_errors: usize,
    pub failed_months: Vec<(u32, SeasonKind, FetchError)>,
}

impl RunSummary {
    pub fn print(&self) {
        println!(
            "Saved {} matches ({} rows skipped, {} persist errors).",
            self.saved, self.skipped, self.persist_errors
        );
        for (month, kind, err) in &self.failed_months {
            println!("  {} month {:02} failed: {}", kind.label(), month, err);
        }
    }

    /// Short status string for the completion webhook.
    pub fn status_line(&self) -> String {
        if self.failed_months.is_empty() && self.persist_errors == 0 {
            format!(
                "KBO {} schedule crawl complete: {} matches saved, {} rows skipped",
                self.year, self.saved, self.skipped
            )
        } else {
            format!(
                "KBO {} schedule crawl finished with problems: {} saved, {} persist errors, {} failed months",
                self.year,
                self.saved,
                self.persist_errors,
                self.failed_months.len()
            )
        }
    }
}

/// Crawl the whole season and fire the completion webhook.
pub async fn run(
    client: &reqwest::Client,
    catalog: &ReferenceCatalog,
    sink: &MatchSink,
    config: &Config,
    year: i32,
) -> Result<RunSummary> {
    let summary = crawl_season(client, catalog, sink, year).await?;
    notify::notify(client, config.webhook_url.as_deref(), &summary.status_line()).await;
    Ok(summary)
}

/// Both season windows in order: regular months first, then postseason.
/// A failed month is recorded and the crawl moves on.
pub async fn crawl_season(
    client: &reqwest::Client,
    catalog: &ReferenceCatalog,
    sink: &MatchSink,
    year: i32,
) -> Result<RunSummary> {
    let windows: Vec<(u32, SeasonKind)> = SeasonKind::Regular
        .months()
        .map(|m| (m, SeasonKind::Regular))
        .chain(SeasonKind::Post.months().map(|m| (m, SeasonKind::Post)))
        .collect();

    let pb = ProgressBar::new(windows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} months")?
            .progress_chars("=> "),
    );

    let mut summary = RunSummary {
        year,
        saved: 0,
        skipped: 0,
        persist_errors: 0,
        failed_months: Vec::new(),
    };

    for (month, kind) in windows {
        match crawl_month(client, catalog, sink, year, month, kind).await {
            Ok(stats) => {
                summary.saved += stats.saved;
                summary.skipped += stats.skipped;
                summary.persist_errors += stats.persist_errors;
            }
            Err(e) => {
                warn!("{} {}-{:02} failed: {}", kind.label(), year, month, e);
                summary.failed_months.push((month, kind, e));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Season {} crawl done: {} saved, {} skipped, {} persist errors, {} failed months",
        year,
        summary.saved,
        summary.skipped,
        summary.persist_errors,
        summary.failed_months.len()
    );
    Ok(summary)
}

/// One month: fetch, parse every row against the growing batch, annotate
/// doubleheaders, persist each record. Persist failures are counted and the
/// rest of the batch continues; records are independently idempotent.
pub async fn crawl_month(
    client: &reqwest::Client,
    catalog: &ReferenceCatalog,
    sink: &MatchSink,
    year: i32,
    month: u32,
    kind: SeasonKind,
) -> Result<MonthStats, FetchError> {
    let response = fetch::fetch_month(client, year, month, kind).await?;
    let mut stats = MonthStats::default();

    if response.rows.is_empty() {
        info!("{} {}-{:02}: no published schedule", kind.label(), year, month);
        return Ok(stats);
    }

    let mut batch: Vec<MatchRecord> = Vec::with_capacity(response.rows.len());
    for row in &response.rows {
        match parse::parse_row(row, &batch, catalog, year, kind) {
            RowOutcome::Match(record) => batch.push(record),
            RowOutcome::Skipped(reason) => {
                stats.skipped += 1;
                match reason {
                    SkipReason::TravelDay | SkipReason::MiscMemo => {
                        debug!("{} {}-{:02}: row skipped: {}", kind.label(), year, month, reason)
                    }
                    other => {
                        warn!("{} {}-{:02}: row skipped: {}", kind.label(), year, month, other)
                    }
                }
            }
        }
    }

    doubleheader::annotate(&mut batch);

    for record in &batch {
        match sink.persist(record).await {
            Ok(()) => stats.saved += 1,
            Err(e) => {
                stats.persist_errors += 1;
                warn!(
                    "Failed to persist {} {} @ {}: {}",
                    record.date, record.away, record.home, e
                );
            }
        }
    }

    info!(
        "{} {}-{:02}: {} rows -> {} saved, {} skipped",
        kind.label(),
        year,
        month,
        response.rows.len(),
        stats.saved,
        stats.skipped
    );
    Ok(stats)
}
