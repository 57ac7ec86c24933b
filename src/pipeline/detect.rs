use crate::model::CompetingPair;

/// Keeps queries served by at least `min_competing_pages` distinct pages and
/// orders the result by competing-page count, then impressions, both
/// descending. The sort is stable, so ties keep the aggregator's
/// (query, slug) order and identical input always yields identical output.
///
/// Competing means at least two pages; the threshold is clamped so a query
/// with a single page is never reported, whatever the caller passed.
pub fn detect(pairs: Vec<CompetingPair>, min_competing_pages: usize) -> Vec<CompetingPair> {
    let threshold = min_competing_pages.max(2);

    let mut detected: Vec<CompetingPair> = pairs
        .into_iter()
        .filter(|pair| pair.competing_pages >= threshold)
        .collect();

    detected.sort_by(|a, b| {
        b.competing_pages
            .cmp(&a.competing_pages)
            .then(b.impressions.cmp(&a.impressions))
    });
    detected
}

#[cfg(test)]
mod tests {
    use super::detect;
    use crate::model::CompetingPair;

    fn pair(query: &str, slug: &str, impressions: u64, competing_pages: usize) -> CompetingPair {
        CompetingPair {
            query: query.to_string(),
            slug: slug.to_string(),
            clicks: 0,
            impressions,
            ctr: 1.0,
            position: 5.0,
            competing_pages,
        }
    }

    #[test]
    fn rows_below_the_threshold_are_dropped() {
        let pairs = vec![
            pair("a", "x", 100, 3),
            pair("b", "y", 100, 2),
            pair("c", "z", 100, 1),
        ];

        let detected = detect(pairs, 3);

        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].query, "a");
    }

    #[test]
    fn single_page_queries_never_appear_even_with_a_loose_threshold() {
        let pairs = vec![pair("solo", "only-page", 50_000, 1)];

        assert!(detect(pairs.clone(), 0).is_empty());
        assert!(detect(pairs, 1).is_empty());
    }

    #[test]
    fn ordering_is_competing_pages_then_impressions_descending() {
        let pairs = vec![
            pair("low", "a", 9_000, 2),
            pair("crowded", "b", 10, 4),
            pair("busy", "c", 5_000, 4),
        ];

        let detected = detect(pairs, 2);

        let queries: Vec<&str> = detected.iter().map(|pair| pair.query.as_str()).collect();
        assert_eq!(queries, vec!["busy", "crowded", "low"]);
    }

    #[test]
    fn tightening_the_threshold_never_detects_more() {
        let pairs = vec![
            pair("a", "p1", 100, 2),
            pair("a", "p2", 50, 2),
            pair("b", "p1", 100, 3),
            pair("b", "p2", 80, 3),
            pair("b", "p3", 20, 3),
            pair("c", "p1", 10, 4),
            pair("c", "p2", 10, 4),
            pair("c", "p3", 10, 4),
            pair("c", "p4", 10, 4),
        ];

        let mut previous = usize::MAX;
        for threshold in 2..=5 {
            let detected = detect(pairs.clone(), threshold);
            assert!(detected.len() <= previous);
            previous = detected.len();
        }
    }

    #[test]
    fn empty_input_yields_an_empty_result() {
        assert!(detect(Vec::new(), 2).is_empty());
    }
}
