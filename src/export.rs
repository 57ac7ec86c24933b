use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{CompetingPair, QuerySummary};
use crate::pipeline::severity::Severity;

/// Queries carried into the priority matrix, matching the original report.
pub const PRIORITY_MATRIX_LIMIT: usize = 50;

const DETAIL_HEADERS: [&str; 8] = [
    "Query",
    "Landing Page",
    "Severity",
    "Url Clicks",
    "Impressions",
    "URL CTR (%)",
    "Average Position",
    "Competing Pages",
];

const QUERY_SUMMARY_HEADERS: [&str; 11] = [
    "Query",
    "Competing Pages",
    "Severity",
    "Url Clicks",
    "Impressions",
    "URL CTR (%)",
    "Best Average Position",
    "Worst Average Position",
    "Position Spread",
    "Best Landing Page",
    "All Landing Pages",
];

const PRIORITY_MATRIX_HEADERS: [&str; 7] = [
    "Query",
    "Competing Pages",
    "Impressions",
    "Url Clicks",
    "Best Average Position",
    "Severity",
    "Recommended Action",
];

/// Detail view: one row per competing (query, page) pair. Severity is
/// recomputed per row from that row's position and impressions.
pub fn write_detail_csv<W: io::Write>(writer: W, pairs: &[CompetingPair]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(DETAIL_HEADERS)
        .context("failed to write detail header")?;

    for pair in pairs {
        let severity = Severity::classify(pair.position, pair.impressions);
        csv_writer
            .write_record([
                pair.query.clone(),
                pair.slug.clone(),
                severity.as_str().to_string(),
                pair.clicks.to_string(),
                pair.impressions.to_string(),
                format!("{:.2}", pair.ctr),
                format!("{:.1}", pair.position),
                pair.competing_pages.to_string(),
            ])
            .context("failed to write detail row")?;
    }

    csv_writer.flush().context("failed to flush detail csv")?;
    Ok(())
}

/// Query summary: one row per query, pages listed inline in authority order.
pub fn write_query_summary_csv<W: io::Write>(
    writer: W,
    summaries: &[QuerySummary],
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(QUERY_SUMMARY_HEADERS)
        .context("failed to write query summary header")?;

    for summary in summaries {
        let severity = Severity::classify(summary.best_position, summary.impressions);
        csv_writer
            .write_record([
                summary.query.clone(),
                summary.competing_pages.to_string(),
                severity.as_str().to_string(),
                summary.clicks.to_string(),
                summary.impressions.to_string(),
                format!("{:.2}", summary.ctr),
                format!("{:.1}", summary.best_position),
                format!("{:.1}", summary.worst_position),
                format!("{:.1}", summary.position_spread),
                summary.best_page.clone(),
                summary.all_pages.join(" | "),
            ])
            .context("failed to write query summary row")?;
    }

    csv_writer.flush().context("failed to flush query summary csv")?;
    Ok(())
}

/// Priority matrix: the highest-impression queries with the action their
/// severity tier calls for.
pub fn write_priority_matrix_csv<W: io::Write>(
    writer: W,
    summaries: &[QuerySummary],
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(PRIORITY_MATRIX_HEADERS)
        .context("failed to write priority matrix header")?;

    for summary in summaries.iter().take(PRIORITY_MATRIX_LIMIT) {
        let severity = Severity::classify(summary.best_position, summary.impressions);
        csv_writer
            .write_record([
                summary.query.clone(),
                summary.competing_pages.to_string(),
                summary.impressions.to_string(),
                summary.clicks.to_string(),
                format!("{:.1}", summary.best_position),
                severity.as_str().to_string(),
                severity.recommended_action().to_string(),
            ])
            .context("failed to write priority matrix row")?;
    }

    csv_writer.flush().context("failed to flush priority matrix csv")?;
    Ok(())
}

pub fn export_detail(path: &Path, pairs: &[CompetingPair]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_detail_csv(file, pairs)
}

pub fn export_query_summary(path: &Path, summaries: &[QuerySummary]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_query_summary_csv(file, summaries)
}

pub fn export_priority_matrix(path: &Path, summaries: &[QuerySummary]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_priority_matrix_csv(file, summaries)
}

#[cfg(test)]
mod tests {
    use super::{write_detail_csv, write_priority_matrix_csv, write_query_summary_csv};
    use crate::model::{CompetingPair, QuerySummary};

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> anyhow::Result<()>,
    {
        let mut buffer = Vec::new();
        write(&mut buffer).expect("export should serialize");
        String::from_utf8(buffer).expect("csv output should be utf-8")
    }

    fn summary() -> QuerySummary {
        QuerySummary {
            query: "buy widgets".to_string(),
            competing_pages: 2,
            clicks: 55,
            impressions: 2500,
            ctr: 1.75,
            best_position: 4.0,
            worst_position: 15.0,
            position_spread: 11.0,
            best_page: "widgets-us".to_string(),
            all_pages: vec!["widgets-us".to_string(), "widgets".to_string()],
        }
    }

    #[test]
    fn detail_rows_carry_per_row_severity() {
        let pairs = vec![CompetingPair {
            query: "buy widgets".to_string(),
            slug: "widgets-us".to_string(),
            clicks: 50,
            impressions: 2000,
            ctr: 2.5,
            position: 4.0,
            competing_pages: 2,
        }];

        let output = render(|buffer| write_detail_csv(buffer, &pairs));
        let mut lines = output.lines();

        assert_eq!(
            lines.next(),
            Some(
                "Query,Landing Page,Severity,Url Clicks,Impressions,URL CTR (%),Average Position,Competing Pages"
            )
        );
        assert_eq!(lines.next(), Some("buy widgets,widgets-us,High,50,2000,2.50,4.0,2"));
    }

    #[test]
    fn query_summary_rows_join_all_pages_inline() {
        let output = render(|buffer| write_query_summary_csv(buffer, &[summary()]));
        let row = output.lines().nth(1).expect("one summary row");

        assert_eq!(
            row,
            "buy widgets,2,High,55,2500,1.75,4.0,15.0,11.0,widgets-us,widgets-us | widgets"
        );
    }

    #[test]
    fn priority_matrix_maps_severity_to_an_action() {
        let output = render(|buffer| write_priority_matrix_csv(buffer, &[summary()]));
        let row = output.lines().nth(1).expect("one matrix row");

        assert_eq!(row, "buy widgets,2,2500,55,4.0,High,Consolidate / 301 redirect");
    }
}
