use serde::Serialize;

/// Urgency tier of a cannibalized query, derived from its best position and
/// total impressions. Always recomputed from those inputs at the point of
/// use; the report model never stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// High: page-one ranking with real volume at stake. Medium: page-two
    /// ranking with some volume. Low: everything else. The thresholds are
    /// fixed; they are part of the report's meaning, not tunables.
    pub fn classify(best_position: f64, total_impressions: u64) -> Self {
        if best_position <= 10.0 && total_impressions >= 1000 {
            Self::High
        } else if best_position <= 20.0 && total_impressions >= 200 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn recommended_action(self) -> &'static str {
        match self {
            Self::High => "Consolidate / 301 redirect",
            Self::Medium => "Add canonicals / differentiate",
            Self::Low => "Monitor / internal linking",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Severity;

    #[test]
    fn boundary_cases_land_on_the_documented_tiers() {
        assert_eq!(Severity::classify(10.0, 1000), Severity::High);
        assert_eq!(Severity::classify(10.01, 1000), Severity::Medium);
        assert_eq!(Severity::classify(20.0, 200), Severity::Medium);
        assert_eq!(Severity::classify(20.0, 199), Severity::Low);
        assert_eq!(Severity::classify(20.01, 50_000), Severity::Low);
        assert_eq!(Severity::classify(4.0, 999), Severity::Medium);
    }

    #[test]
    fn classification_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(Severity::classify(7.3, 4200), Severity::High);
        }
    }

    #[test]
    fn each_tier_maps_to_one_recommended_action() {
        assert_eq!(Severity::High.recommended_action(), "Consolidate / 301 redirect");
        assert_eq!(
            Severity::Medium.recommended_action(),
            "Add canonicals / differentiate"
        );
        assert_eq!(Severity::Low.recommended_action(), "Monitor / internal linking");
    }
}
