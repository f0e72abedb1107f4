//! Static catalog of supply-chain risk categories and their search keywords.
//!
//! Each category has a short identifier used in configuration, a full display
//! name written into result rows, and an ordered list of keyword phrases. A
//! search prompt is built per keyword as `"{keyword} {country} {commodity}"`.

/// A configured supply-chain social/environmental harm classification.
#[derive(Debug, PartialEq, Eq)]
pub struct RiskCategory {
    pub id: &'static str,
    pub full_name: &'static str,
    pub keywords: &'static [&'static str],
}

pub static RISK_CATEGORIES: &[RiskCategory] = &[
    RiskCategory {
        id: "child_labour",
        full_name: "Child labour (< 15 yrs)",
        keywords: &[
            "Child labour",
            "Child labour compulsory schooling",
            "Access to education",
        ],
    },
    RiskCategory {
        id: "worst_form_child_labour",
        full_name: "Worst form of child labour (< 18 yrs)",
        keywords: &[
            "Child trafficking",
            "Serfdom children",
            "Child soldiers",
            "Child prostitution",
            "Children drug trafficking",
            "Hazardous work young workers",
        ],
    },
    RiskCategory {
        id: "forced_labour",
        full_name: "Forced labour",
        keywords: &[
            "Forced labour",
            "Debt bondage",
            "Human trafficking",
            "Human exploitation",
            "Bonded labour",
            "Freedom of movement",
            "Retention of passport",
        ],
    },
    RiskCategory {
        id: "slavery",
        full_name: "Slavery",
        keywords: &["Slavery", "Serfdom"],
    },
    RiskCategory {
        id: "work_related_health",
        full_name: "Work-related health",
        keywords: &[
            "Work-related health hazards",
            "Occupational safety",
            "Insufficient safety standards",
            "Working hours violation",
        ],
    },
    RiskCategory {
        id: "freedom_association",
        full_name: "Freedom of association",
        keywords: &[
            "Freedom association",
            "Freedom trade unions",
            "Discrimination trade union",
        ],
    },
    RiskCategory {
        id: "no_discrimination",
        full_name: "No discrimination",
        keywords: &[
            "Ethnic discrimination",
            "Social discrimination",
            "Health status discrimination",
            "Disability discrimination",
            "Sexual discrimination",
            "Age discrimination",
            "Gender discrimination",
            "Political discrimination",
            "Religion discrimination",
        ],
    },
    RiskCategory {
        id: "withholding_wage",
        full_name: "Withholding wage",
        keywords: &[
            "Withholding wage",
            "Violation against minimum wage",
            "Lack of minimum wage",
        ],
    },
    RiskCategory {
        id: "soil_water_noise_emission",
        full_name: "Causing harmful soil change, water pollution (consumption), noise emission",
        keywords: &[
            "Harmful soil change",
            "Water pollution harmful people",
            "Air pollution harmful people",
            "Harmful noise emission people",
            "Excessive water consumption",
            "Soil degradation",
            "Water diversion",
        ],
    },
    RiskCategory {
        id: "unlawful_eviction",
        full_name: "Unlawful eviction, taking of land, forest and waters",
        keywords: &["Land eviction", "Land grabbing", "Forced displacement"],
    },
    RiskCategory {
        id: "hiring_private_forces",
        full_name: "Hiring of private/public security forces",
        keywords: &[
            "Security forces torture",
            "Security forces cruel",
            "Security forces damages",
            "Security forces freedom of association",
        ],
    },
    RiskCategory {
        id: "chemicals_stockholm_convention",
        full_name: "Chemicals from the stockholm convention",
        keywords: &[
            "Aldrin",
            "Alpha hexachlorocyclohexane",
            "Chlordane",
            "Dieldrin",
            "Lindane",
            "Toxaphene",
            "Technical Endosulfan",
            "Hazardous chemicals",
            "Harmful chemicals",
        ],
    },
];

/// Look up a category by its configuration identifier.
pub fn find_category(id: &str) -> Option<&'static RiskCategory> {
    RISK_CATEGORIES.iter().find(|c| c.id == id)
}

/// Build the query string sent verbatim to the search collaborator.
pub fn search_prompt(keyword: &str, country: &str, commodity: &str) -> String {
    format!("{keyword} {country} {commodity}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn test_find_known_category() {
        let slavery = find_category("slavery").unwrap();
        assert_eq!(slavery.full_name, "Slavery");
        assert_eq!(slavery.keywords, &["Slavery", "Serfdom"]);
    }

    #[test]
    fn test_find_unknown_category() {
        assert!(find_category("foo").is_none());
    }

    #[test]
    fn test_identifiers_are_unique_and_keywords_present() {
        assert_eq!(RISK_CATEGORIES.len(), 12);
        assert!(RISK_CATEGORIES.iter().map(|c| c.id).all_unique());
        assert!(RISK_CATEGORIES.iter().all(|c| !c.keywords.is_empty()));
    }

    #[test]
    fn test_search_prompt() {
        assert_eq!(
            search_prompt("Child labour", "Ghana", "cocoa"),
            "Child labour Ghana cocoa"
        );
    }
}
