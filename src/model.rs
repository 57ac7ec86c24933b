use serde::Serialize;

/// One normalized search-performance row: a (query, page) observation with
/// its traffic metrics. Immutable once produced by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRecord {
    pub query: String,
    pub page: String,
    pub clicks: u64,
    pub impressions: u64,
    /// Click-through rate as a fraction in `[0, 1]`.
    pub ctr: f64,
    pub position: f64,
}

/// Filter settings for one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct FilterConfig {
    pub position_min: f64,
    pub position_max: f64,
    pub min_impressions: u64,
    pub min_clicks: u64,
    pub remove_anchors: bool,
    pub remove_templates: bool,
    pub min_competing_pages: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            position_min: 1.0,
            position_max: 20.0,
            min_impressions: 0,
            min_clicks: 0,
            remove_anchors: true,
            remove_templates: true,
            min_competing_pages: 2,
        }
    }
}

/// Removal counts from the filter chain. Only the anchor and template stages
/// report per-stage counts; the numeric stages are covered by `before`/`after`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterAudit {
    pub before: usize,
    pub after: usize,
    pub anchors_removed: usize,
    pub templates_removed: usize,
}

/// A filtered record together with the page identity the rest of the pipeline
/// groups on: the derived slug when template filtering ran, else the raw page.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRecord {
    pub record: PerformanceRecord,
    pub group_key: String,
}

/// Aggregated metrics for one (query, page) group, with the number of
/// distinct pages competing for that query broadcast onto every row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetingPair {
    pub query: String,
    pub slug: String,
    pub clicks: u64,
    pub impressions: u64,
    /// Mean CTR expressed as a percentage, rounded to 2 decimals.
    pub ctr: f64,
    /// Mean position, rounded to 1 decimal.
    pub position: f64,
    pub competing_pages: usize,
}

/// One row per cannibalized query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySummary {
    pub query: String,
    pub competing_pages: usize,
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: f64,
    pub best_position: f64,
    pub worst_position: f64,
    pub position_spread: f64,
    pub best_page: String,
    pub all_pages: Vec<String>,
}

/// The full output contract of one analysis run, independent of any export
/// serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub audit: FilterAudit,
    pub pairs: Vec<CompetingPair>,
    pub summaries: Vec<QuerySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputEntry {
    pub path: String,
    pub sha256: String,
    pub rows_loaded: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisPaths {
    pub out_dir: String,
    pub manifest_path: String,
    pub report_json_path: Option<String>,
    pub detail_csv_path: Option<String>,
    pub query_summary_csv_path: Option<String>,
    pub priority_matrix_csv_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisCounts {
    pub rows_loaded: usize,
    pub rows_analyzed: usize,
    pub competing_pairs: usize,
    pub conflicting_queries: usize,
    pub high_severity: usize,
    pub medium_severity: usize,
    pub low_severity: usize,
    pub clicks_at_stake: u64,
    pub impressions_at_stake: u64,
    pub max_competing_pages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub input: InputEntry,
    pub config: FilterConfig,
    pub audit: FilterAudit,
    pub paths: AnalysisPaths,
    pub counts: AnalysisCounts,
}
