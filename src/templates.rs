use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

/// Country and region tokens used by the templated page series. The token
/// list is part of the site's URL scheme and must match it exactly.
pub const COUNTRY_TOKENS: &[&str] = &[
    "singapore",
    "australia",
    "malaysia",
    "canada",
    "nigeria",
    "ireland",
    "philippines",
    "south-africa",
    "new-zealand",
    "egypt",
    "kenya",
    "greece",
    "india",
    "uk",
    "usa",
    "germany",
    "france",
    "uae",
    "saudi-arabia",
    "italy",
    "norway",
    "sweden",
    "belgium",
    "south-korea",
    "japan",
    "china",
    "brazil",
    "austria",
    "bahrain",
    "botswana",
    "cyprus",
    "denmark",
    "finland",
    "dubai",
    "spain",
    "portugal",
    "netherlands",
    "poland",
    "switzerland",
    "turkey",
    "thailand",
    "indonesia",
    "vietnam",
    "qatar",
    "kuwait",
    "oman",
    "jordan",
    "pakistan",
    "bangladesh",
    "sri-lanka",
    "nepal",
    "myanmar",
    "hong-kong",
    "taiwan",
    "mexico",
    "argentina",
    "colombia",
    "chile",
    "peru",
    "ghana",
    "tanzania",
    "uganda",
    "ethiopia",
    "zimbabwe",
    "zambia",
    "morocco",
    "algeria",
    "tunisia",
    "senegal",
    "ivory-coast",
    "cameroon",
    "new-york",
    "london",
    "texas",
    "california",
    "florida",
];

struct TemplatePattern {
    regex: Regex,
    family: &'static str,
}

/// Matches page slugs that belong to an intentionally duplicated geo/variant
/// series. Those pages target different regions on purpose and must not be
/// reported as cannibalizing each other.
///
/// Patterns use unanchored search semantics unless explicitly anchored, and
/// match case-insensitively. Classification is a plain OR over all patterns.
pub struct TemplateClassifier {
    patterns: Vec<TemplatePattern>,
}

impl TemplateClassifier {
    pub fn new() -> Result<Self> {
        let countries = COUNTRY_TOKENS.join("|");

        let specs: [(String, &'static str); 7] = [
            (
                format!("corporate-training-companies-({countries})"),
                "corporate-training-companies-<country>",
            ),
            (
                format!("skills-in-demand-in-({countries})"),
                "skills-in-demand-in-<country>",
            ),
            (
                format!("skills-in-demand-({countries})"),
                "skills-in-demand-<country>",
            ),
            ("^[a-z]+-work-culture$".to_string(), "<country>-work-culture"),
            (
                format!("corporate-training-in-({countries})"),
                "corporate-training-in-<country>",
            ),
            (
                format!("best-.*-training-companies-({countries})"),
                "best-*-training-companies-<country>",
            ),
            (
                format!("top-.*-training-companies-({countries})"),
                "top-*-training-companies-<country>",
            ),
        ];

        let mut patterns = Vec::with_capacity(specs.len());
        for (pattern, family) in specs {
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .with_context(|| format!("failed to compile template pattern: {family}"))?;
            patterns.push(TemplatePattern { regex, family });
        }

        Ok(Self { patterns })
    }

    pub fn is_templated(&self, slug: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.regex.is_match(slug))
    }

    /// Name of the first pattern family matching `slug`, for audit logging.
    pub fn matched_family(&self, slug: &str) -> Option<&'static str> {
        self.patterns
            .iter()
            .find(|pattern| pattern.regex.is_match(slug))
            .map(|pattern| pattern.family)
    }
}
