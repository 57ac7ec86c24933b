use std::collections::HashMap;

use crate::model::{CompetingPair, QuerySummary};
use crate::pipeline::score::rank_by_authority;
use crate::util::round_to;

/// Rolls detector output up to one row per query. `best_page` and the
/// `all_pages` order both come from the authority score, so the summary and
/// the detail view never disagree about the canonical page. Output is sorted
/// by total impressions descending.
pub fn summarize(pairs: &[CompetingPair]) -> Vec<QuerySummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&CompetingPair>> = HashMap::new();
    for pair in pairs {
        let rows = groups.entry(pair.query.as_str()).or_default();
        if rows.is_empty() {
            order.push(pair.query.as_str());
        }
        rows.push(pair);
    }

    let mut summaries = Vec::with_capacity(order.len());
    for query in order {
        let rows = &groups[query];
        let ranked = rank_by_authority(rows);

        // Post-detector groups always hold >= 2 rows, but a single survivor
        // must still summarize cleanly rather than panic.
        let Some(canonical) = ranked.first() else {
            continue;
        };

        let count = rows.len() as f64;
        let best_position = rows.iter().map(|pair| pair.position).fold(f64::INFINITY, f64::min);
        let worst_position = rows
            .iter()
            .map(|pair| pair.position)
            .fold(f64::NEG_INFINITY, f64::max);

        summaries.push(QuerySummary {
            query: query.to_string(),
            competing_pages: rows.len(),
            clicks: rows.iter().map(|pair| pair.clicks).sum(),
            impressions: rows.iter().map(|pair| pair.impressions).sum(),
            ctr: round_to(rows.iter().map(|pair| pair.ctr).sum::<f64>() / count, 2),
            best_position: round_to(best_position, 1),
            worst_position: round_to(worst_position, 1),
            position_spread: round_to(worst_position - best_position, 1),
            best_page: canonical.slug.clone(),
            all_pages: ranked.iter().map(|pair| pair.slug.clone()).collect(),
        });
    }

    summaries.sort_by(|a, b| b.impressions.cmp(&a.impressions));
    summaries
}
