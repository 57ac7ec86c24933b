use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::StringRecord;
use regex::Regex;

use crate::model::PerformanceRecord;
use crate::util::{parse_count_or_default, parse_numeric_or_default};

/// Maps one source header to its canonical field name. Exact synonyms from
/// the known export formats are tried first, then a case-folded match on the
/// canonical names themselves.
pub fn canonical_field(header: &str) -> Option<&'static str> {
    let trimmed = header.trim();

    let mapped = match trimmed {
        "Query" | "Top queries" | "Queries" => Some("query"),
        "Landing Page" | "Page" | "Top pages" | "Pages" | "URL" => Some("page"),
        "Url Clicks" | "Clicks" => Some("clicks"),
        "Impressions" => Some("impressions"),
        "URL CTR" | "CTR" | "CTR (%)" | "Click Through Rate" => Some("ctr"),
        "Average Position" | "Average position" | "Avg Position" | "Avg. position"
        | "Position" => Some("position"),
        _ => None,
    };
    if mapped.is_some() {
        return mapped;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "query" => Some("query"),
        "page" => Some("page"),
        "clicks" => Some("clicks"),
        "impressions" => Some("impressions"),
        "ctr" => Some("ctr"),
        "position" => Some("position"),
        _ => None,
    }
}

/// Column indices of the canonical fields within one export. `ctr` is the
/// only optional field; absent CTR defaults to 0.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub query: usize,
    pub page: usize,
    pub clicks: usize,
    pub impressions: usize,
    pub position: usize,
    pub ctr: Option<usize>,
}

pub fn resolve_columns(headers: &StringRecord) -> Result<ColumnMap> {
    let mut query = None;
    let mut page = None;
    let mut clicks = None;
    let mut impressions = None;
    let mut position = None;
    let mut ctr = None;

    for (index, header) in headers.iter().enumerate() {
        let slot = match canonical_field(header) {
            Some("query") => &mut query,
            Some("page") => &mut page,
            Some("clicks") => &mut clicks,
            Some("impressions") => &mut impressions,
            Some("position") => &mut position,
            Some("ctr") => &mut ctr,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(index);
        }
    }

    let mut missing = Vec::new();
    for (field, slot) in [
        ("query", &query),
        ("page", &page),
        ("clicks", &clicks),
        ("impressions", &impressions),
        ("position", &position),
    ] {
        if slot.is_none() {
            missing.push(field);
        }
    }

    if !missing.is_empty() {
        bail!(
            "missing required columns: {}. Expected: Query, Landing Page, Url Clicks, Impressions, URL CTR, Average Position",
            missing.join(", ")
        );
    }

    Ok(ColumnMap {
        query: query.unwrap_or_default(),
        page: page.unwrap_or_default(),
        clicks: clicks.unwrap_or_default(),
        impressions: impressions.unwrap_or_default(),
        position: position.unwrap_or_default(),
        ctr,
    })
}

fn parse_ctr_cell(raw: &str) -> f64 {
    let trimmed = raw.trim().trim_end_matches('%');
    parse_numeric_or_default(trimmed, 0.0)
}

pub fn record_from_row(row: &StringRecord, columns: &ColumnMap) -> PerformanceRecord {
    let cell = |index: usize| row.get(index).unwrap_or("");

    PerformanceRecord {
        query: cell(columns.query).trim().to_string(),
        page: cell(columns.page).trim().to_string(),
        clicks: parse_count_or_default(cell(columns.clicks), 0),
        impressions: parse_count_or_default(cell(columns.impressions), 0),
        ctr: columns.ctr.map(|index| parse_ctr_cell(cell(index))).unwrap_or(0.0),
        position: parse_numeric_or_default(cell(columns.position), 0.0),
    }
}

/// Exports disagree on whether CTR is a fraction or a percentage. The scale
/// is a dataset-global decision: any value above 1.0 marks the whole column
/// as percentages and it is rescaled to the `[0, 1]` fraction range.
pub fn normalize_ctr_scale(records: &mut [PerformanceRecord]) {
    let is_percentage = records.iter().any(|record| record.ctr > 1.0);
    if is_percentage {
        for record in records {
            record.ctr /= 100.0;
        }
    }
}

pub fn read_records_from<R: io::Read>(reader: R) -> Result<Vec<PerformanceRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("failed to read csv header row")?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut records = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row.with_context(|| format!("failed to read csv row {}", index + 2))?;
        records.push(record_from_row(&row, &columns));
    }

    normalize_ctr_scale(&mut records);
    Ok(records)
}

pub fn read_records(path: &Path) -> Result<Vec<PerformanceRecord>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_records_from(file)
}

pub fn host_prefix_regex() -> Result<Regex> {
    Regex::new(r"^https?://[^/]+/").context("failed to compile host prefix regex")
}

/// Derives the page identity used for grouping: protocol and host stripped,
/// trailing slashes removed, final path segment kept.
pub fn base_slug(page: &str, host_prefix: &Regex) -> String {
    let stripped = host_prefix.replace(page, "");
    let trimmed = stripped.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}
