use std::collections::{BTreeMap, HashMap};

use crate::model::{CompetingPair, KeyedRecord};
use crate::util::round_to;

#[derive(Default)]
struct Accumulator {
    clicks: u64,
    impressions: u64,
    ctr_sum: f64,
    position_sum: f64,
    rows: usize,
}

/// Reduces filtered records into one row per (query, grouping key): clicks
/// and impressions summed, CTR and position averaged. CTR is reported as a
/// percentage rounded to 2 decimals, position rounded to 1.
///
/// The reduction is keyed on an ordered map, so output order depends only on
/// the (query, key) values and repeated runs are reproducible. `competing_pages`
/// is the count of distinct keys per query, broadcast onto every row.
pub fn aggregate(rows: &[KeyedRecord]) -> Vec<CompetingPair> {
    let mut groups: BTreeMap<(String, String), Accumulator> = BTreeMap::new();

    for row in rows {
        let acc = groups
            .entry((row.record.query.clone(), row.group_key.clone()))
            .or_default();
        acc.clicks += row.record.clicks;
        acc.impressions += row.record.impressions;
        acc.ctr_sum += row.record.ctr;
        acc.position_sum += row.record.position;
        acc.rows += 1;
    }

    let mut pages_per_query: HashMap<&str, usize> = HashMap::new();
    for (query, _) in groups.keys() {
        *pages_per_query.entry(query.as_str()).or_insert(0) += 1;
    }

    let mut pairs = Vec::with_capacity(groups.len());
    for ((query, slug), acc) in &groups {
        let rows = acc.rows as f64;
        pairs.push(CompetingPair {
            query: query.clone(),
            slug: slug.clone(),
            clicks: acc.clicks,
            impressions: acc.impressions,
            ctr: round_to(acc.ctr_sum / rows * 100.0, 2),
            position: round_to(acc.position_sum / rows, 1),
            competing_pages: pages_per_query[query.as_str()],
        });
    }
    pairs
}
