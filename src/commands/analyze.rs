use anyhow::{Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::AnalyzeArgs;
use crate::export;
use crate::model::{
    AnalysisCounts, AnalysisPaths, AnalysisReport, AnalysisRunManifest, FilterConfig, InputEntry,
};
use crate::normalize::read_records;
use crate::pipeline;
use crate::pipeline::severity::Severity;
use crate::templates::TemplateClassifier;
use crate::util::{ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty};

pub fn run(args: AnalyzeArgs) -> Result<()> {
    if args.min_competing_pages < 2 {
        bail!("--min-competing-pages must be at least 2");
    }

    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let config = FilterConfig {
        position_min: args.position_min,
        position_max: args.position_max,
        min_impressions: args.min_impressions,
        min_clicks: args.min_clicks,
        remove_anchors: !args.keep_anchor_urls,
        remove_templates: !args.keep_templated_pages,
        min_competing_pages: args.min_competing_pages,
    };

    info!(input = %args.input.display(), run_id = %run_id, "starting cannibalization analysis");

    let records = read_records(&args.input)?;
    let rows_loaded = records.len();
    let input_sha256 = sha256_file(&args.input)?;
    info!(rows = rows_loaded, sha256 = %input_sha256, "loaded search performance export");

    let templates = TemplateClassifier::new()?;
    let report = pipeline::analyze(records, &config, &templates)?;

    info!(
        before = report.audit.before,
        anchors_removed = report.audit.anchors_removed,
        templates_removed = report.audit.templates_removed,
        after = report.audit.after,
        "filter chain applied"
    );

    ensure_directory(&args.out_dir)?;
    let manifest_path = args
        .out_dir
        .join("manifests")
        .join(format!("analysis_run_{}.json", utc_compact_string(started_ts)));

    let input_entry = InputEntry {
        path: args.input.display().to_string(),
        sha256: input_sha256,
        rows_loaded,
    };

    let empty_reason = if report.audit.after == 0 {
        Some("no rows remain after filtering; relax the position range or volume thresholds")
    } else if report.pairs.is_empty() {
        Some("no cannibalization found; raise --position-max or lower --min-impressions")
    } else {
        None
    };

    if let Some(reason) = empty_reason {
        warn!(reason, "analysis produced an empty report");

        let manifest = AnalysisRunManifest {
            manifest_version: 1,
            run_id,
            status: "empty".to_string(),
            started_at,
            updated_at: now_utc_string(),
            command: render_analyze_command(&args),
            input: input_entry,
            config,
            audit: report.audit.clone(),
            paths: AnalysisPaths {
                out_dir: args.out_dir.display().to_string(),
                manifest_path: manifest_path.display().to_string(),
                report_json_path: None,
                detail_csv_path: None,
                query_summary_csv_path: None,
                priority_matrix_csv_path: None,
            },
            counts: AnalysisCounts {
                rows_loaded,
                rows_analyzed: report.audit.after,
                ..AnalysisCounts::default()
            },
        };
        write_json_pretty(&manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote run manifest");
        return Ok(());
    }

    let report_json_path = args.out_dir.join("cannibalization_report.json");
    write_json_pretty(&report_json_path, &report)?;

    let detail_csv_path = args.out_dir.join("cannibalization_detail.csv");
    export::export_detail(&detail_csv_path, &report.pairs)?;

    let query_summary_csv_path = args.out_dir.join("cannibalization_query_summary.csv");
    export::export_query_summary(&query_summary_csv_path, &report.summaries)?;

    let priority_matrix_csv_path = args.out_dir.join("cannibalization_priority_matrix.csv");
    export::export_priority_matrix(&priority_matrix_csv_path, &report.summaries)?;

    let counts = collect_counts(rows_loaded, &report);
    let avg_pages =
        counts.competing_pairs as f64 / counts.conflicting_queries.max(1) as f64;

    info!(
        conflicting_queries = counts.conflicting_queries,
        competing_pairs = counts.competing_pairs,
        high_severity = counts.high_severity,
        medium_severity = counts.medium_severity,
        low_severity = counts.low_severity,
        impressions_at_stake = counts.impressions_at_stake,
        clicks_at_stake = counts.clicks_at_stake,
        avg_pages_per_query = %format!("{avg_pages:.1}"),
        max_competing_pages = counts.max_competing_pages,
        "analysis complete"
    );

    let manifest = AnalysisRunManifest {
        manifest_version: 1,
        run_id,
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_analyze_command(&args),
        input: input_entry,
        config,
        audit: report.audit.clone(),
        paths: AnalysisPaths {
            out_dir: args.out_dir.display().to_string(),
            manifest_path: manifest_path.display().to_string(),
            report_json_path: Some(report_json_path.display().to_string()),
            detail_csv_path: Some(detail_csv_path.display().to_string()),
            query_summary_csv_path: Some(query_summary_csv_path.display().to_string()),
            priority_matrix_csv_path: Some(priority_matrix_csv_path.display().to_string()),
        },
        counts,
    };
    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote run manifest");
    info!(out_dir = %args.out_dir.display(), "report artifacts written");

    Ok(())
}

fn collect_counts(rows_loaded: usize, report: &AnalysisReport) -> AnalysisCounts {
    let mut counts = AnalysisCounts {
        rows_loaded,
        rows_analyzed: report.audit.after,
        competing_pairs: report.pairs.len(),
        conflicting_queries: report.summaries.len(),
        ..AnalysisCounts::default()
    };

    for summary in &report.summaries {
        match Severity::classify(summary.best_position, summary.impressions) {
            Severity::High => counts.high_severity += 1,
            Severity::Medium => counts.medium_severity += 1,
            Severity::Low => counts.low_severity += 1,
        }
    }

    counts.clicks_at_stake = report.pairs.iter().map(|pair| pair.clicks).sum();
    counts.impressions_at_stake = report.pairs.iter().map(|pair| pair.impressions).sum();
    counts.max_competing_pages = report
        .pairs
        .iter()
        .map(|pair| pair.competing_pages)
        .max()
        .unwrap_or(0);
    counts
}

fn render_analyze_command(args: &AnalyzeArgs) -> String {
    let mut command = format!(
        "cannifind analyze --input {} --out-dir {} --position-min {} --position-max {} --min-impressions {} --min-clicks {} --min-competing-pages {}",
        args.input.display(),
        args.out_dir.display(),
        args.position_min,
        args.position_max,
        args.min_impressions,
        args.min_clicks,
        args.min_competing_pages
    );
    if args.keep_anchor_urls {
        command.push_str(" --keep-anchor-urls");
    }
    if args.keep_templated_pages {
        command.push_str(" --keep-templated-pages");
    }
    command
}
