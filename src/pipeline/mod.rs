use anyhow::Result;

use crate::model::{AnalysisReport, FilterConfig, PerformanceRecord};
use crate::templates::TemplateClassifier;

pub mod aggregate;
pub mod detect;
pub mod filter;
pub mod score;
pub mod severity;
pub mod summarize;

/// Runs the full analysis over one normalized record set: filter chain,
/// aggregation, detection, per-query rollup. Pure and deterministic: the
/// same records and config always produce an identical report.
pub fn analyze(
    records: Vec<PerformanceRecord>,
    config: &FilterConfig,
    templates: &TemplateClassifier,
) -> Result<AnalysisReport> {
    let (filtered, audit) = filter::apply(records, config, templates)?;
    let pairs = detect::detect(aggregate::aggregate(&filtered), config.min_competing_pages);
    let summaries = summarize::summarize(&pairs);

    Ok(AnalysisReport {
        audit,
        pairs,
        summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::analyze;
    use super::severity::Severity;
    use crate::model::{FilterConfig, PerformanceRecord};
    use crate::templates::TemplateClassifier;

    fn record(
        query: &str,
        page: &str,
        clicks: u64,
        impressions: u64,
        ctr: f64,
        position: f64,
    ) -> PerformanceRecord {
        PerformanceRecord {
            query: query.to_string(),
            page: page.to_string(),
            clicks,
            impressions,
            ctr,
            position,
        }
    }

    fn classifier() -> TemplateClassifier {
        TemplateClassifier::new().expect("template patterns should compile")
    }

    fn widgets_config() -> FilterConfig {
        FilterConfig {
            position_min: 1.0,
            position_max: 20.0,
            min_impressions: 0,
            min_clicks: 0,
            remove_anchors: false,
            remove_templates: false,
            min_competing_pages: 2,
        }
    }

    #[test]
    fn widgets_scenario_detects_scores_and_classifies() {
        let records = vec![
            record("buy widgets", "/widgets-us", 50, 2000, 0.025, 4.0),
            record("buy widgets", "/widgets", 5, 500, 0.01, 15.0),
        ];

        let report = analyze(records, &widgets_config(), &classifier())
            .expect("analysis should run");

        assert_eq!(report.pairs.len(), 2);
        assert!(report.pairs.iter().all(|pair| pair.competing_pages == 2));
        assert_eq!(report.pairs[0].slug, "/widgets-us");

        let summary = &report.summaries[0];
        assert_eq!(summary.best_page, "/widgets-us");
        assert_eq!(summary.impressions, 2500);
        assert_eq!(summary.best_position, 4.0);
        assert_eq!(
            Severity::classify(summary.best_position, summary.impressions),
            Severity::High
        );
    }

    #[test]
    fn templated_pages_are_excluded_before_aggregation() {
        let records = vec![
            record("corporate training", "/corporate-training-companies-singapore", 40, 3000, 0.01, 3.0),
            record("corporate training", "/corporate-training-services", 10, 800, 0.01, 7.0),
        ];
        let config = FilterConfig {
            remove_templates: true,
            ..widgets_config()
        };

        let report = analyze(records, &config, &classifier()).expect("analysis should run");

        // The surviving page has no competitor left, so nothing is detected.
        assert_eq!(report.audit.templates_removed, 1);
        assert!(report.pairs.is_empty());
        assert!(report.summaries.is_empty());
    }

    #[test]
    fn repeated_runs_produce_identical_reports() {
        let records = vec![
            record("buy widgets", "/widgets-us", 50, 2000, 0.025, 4.0),
            record("buy widgets", "/widgets", 5, 500, 0.01, 15.0),
            record("buy widgets", "/widgets-sale", 9, 900, 0.02, 8.0),
            record("buy gadgets", "/gadgets", 3, 300, 0.01, 6.0),
            record("buy gadgets", "/gadgets-pro", 2, 250, 0.01, 9.0),
        ];
        let config = widgets_config();
        let templates = classifier();

        let first = analyze(records.clone(), &config, &templates).expect("analysis should run");
        let second = analyze(records, &config, &templates).expect("analysis should run");

        assert_eq!(first, second);
    }

    #[test]
    fn all_filters_removing_everything_is_a_clean_empty_report() {
        let records = vec![record("q", "/page", 0, 10, 0.0, 80.0)];

        let report = analyze(records, &widgets_config(), &classifier())
            .expect("analysis should run");

        assert_eq!(report.audit.before, 1);
        assert_eq!(report.audit.after, 0);
        assert!(report.pairs.is_empty());
        assert!(report.summaries.is_empty());
    }
}
