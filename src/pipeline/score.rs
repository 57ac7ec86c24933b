use crate::model::CompetingPair;

/// Traffic-authority score used to pick the canonical page of a query. A
/// click is worth ten impressions, so the page with demonstrated traffic
/// wins over one that merely ranks marginally better on a trickle of
/// impressions.
pub fn authority_score(pair: &CompetingPair) -> u64 {
    pair.impressions + pair.clicks * 10
}

/// Orders a query's pages by descending authority score. Stable: pages with
/// equal scores keep their incoming order.
pub fn rank_by_authority<'a>(pairs: &[&'a CompetingPair]) -> Vec<&'a CompetingPair> {
    let mut ranked = pairs.to_vec();
    ranked.sort_by(|a, b| authority_score(b).cmp(&authority_score(a)));
    ranked
}

/// The page a query's traffic should consolidate onto.
pub fn select_canonical<'a>(pairs: &[&'a CompetingPair]) -> Option<&'a CompetingPair> {
    rank_by_authority(pairs).into_iter().next()
}
