use anyhow::Result;
use tracing::debug;

use crate::model::{FilterAudit, FilterConfig, KeyedRecord, PerformanceRecord};
use crate::normalize::{base_slug, host_prefix_regex};
use crate::templates::TemplateClassifier;

/// Runs the filter chain in its fixed order: anchor URLs, templated pages,
/// position range, volume thresholds. The template stage decides the grouping
/// key for the rest of the pipeline: the derived slug when it runs, the raw
/// page value when it does not.
///
/// An empty survivor set is a valid outcome, not an error.
pub fn apply(
    records: Vec<PerformanceRecord>,
    config: &FilterConfig,
    templates: &TemplateClassifier,
) -> Result<(Vec<KeyedRecord>, FilterAudit)> {
    let mut audit = FilterAudit {
        before: records.len(),
        ..FilterAudit::default()
    };

    let mut survivors = records;
    if config.remove_anchors {
        let before = survivors.len();
        survivors.retain(|record| !record.page.contains('#'));
        audit.anchors_removed = before - survivors.len();
    }

    let mut keyed = if config.remove_templates {
        let host_prefix = host_prefix_regex()?;
        let before = survivors.len();

        let mut kept = Vec::with_capacity(before);
        for record in survivors {
            let slug = base_slug(&record.page, &host_prefix);
            if templates.is_templated(&slug) {
                let family = templates.matched_family(&slug).unwrap_or("");
                debug!(slug = %slug, family = family, "dropped templated page");
                continue;
            }
            kept.push(KeyedRecord {
                record,
                group_key: slug,
            });
        }

        audit.templates_removed = before - kept.len();
        kept
    } else {
        survivors
            .into_iter()
            .map(|record| {
                let group_key = record.page.clone();
                KeyedRecord { record, group_key }
            })
            .collect()
    };

    keyed.retain(|row| {
        row.record.position >= config.position_min && row.record.position <= config.position_max
    });

    keyed.retain(|row| {
        row.record.impressions >= config.min_impressions && row.record.clicks >= config.min_clicks
    });

    audit.after = keyed.len();
    Ok((keyed, audit))
}
