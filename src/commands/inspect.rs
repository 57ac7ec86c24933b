use std::collections::HashSet;
use std::fs::File;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::InspectArgs;
use crate::normalize::{record_from_row, resolve_columns};

/// Validates the input contract: resolves every canonical field through the
/// synonym table and reports what the analysis would be working with. Fails
/// with the missing-field error when required columns cannot be resolved.
pub fn run(args: InspectArgs) -> Result<()> {
    info!(input = %args.input.display(), "inspecting search performance export");

    let file = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader
        .headers()
        .context("failed to read csv header row")?
        .clone();
    let columns = resolve_columns(&headers)?;

    let source = |index: usize| headers.get(index).unwrap_or("").to_string();
    info!(field = "query", source = %source(columns.query), "resolved column");
    info!(field = "page", source = %source(columns.page), "resolved column");
    info!(field = "clicks", source = %source(columns.clicks), "resolved column");
    info!(field = "impressions", source = %source(columns.impressions), "resolved column");
    info!(field = "position", source = %source(columns.position), "resolved column");
    match columns.ctr {
        Some(index) => info!(field = "ctr", source = %source(index), "resolved column"),
        None => warn!(field = "ctr", "column missing; ctr defaults to 0"),
    }

    let mut rows = 0_usize;
    let mut total_clicks = 0_u64;
    let mut total_impressions = 0_u64;
    let mut queries = HashSet::new();
    let mut pages = HashSet::new();

    for (index, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("failed to read csv row {}", index + 2))?;
        let record = record_from_row(&row, &columns);

        rows += 1;
        total_clicks += record.clicks;
        total_impressions += record.impressions;
        queries.insert(record.query);
        pages.insert(record.page);
    }

    info!(
        rows,
        unique_queries = queries.len(),
        unique_pages = pages.len(),
        total_clicks,
        total_impressions,
        "input contract satisfied"
    );

    Ok(())
}
