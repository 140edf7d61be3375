//! Content categories and delivery frequencies offered to users.

use serde::Serialize;

use super::Frequency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrequencyInfo {
    pub id: Frequency,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CATEGORIES: &[CategoryInfo] = &[
    CategoryInfo {
        id: "technology",
        name: "Technology",
        description: "Latest tech news and innovations",
    },
    CategoryInfo {
        id: "business",
        name: "Business",
        description: "Business trends and market updates",
    },
    CategoryInfo {
        id: "sports",
        name: "Sports",
        description: "Sports news and highlights",
    },
    CategoryInfo {
        id: "entertainment",
        name: "Entertainment",
        description: "Movies, TV, and celebrity news",
    },
    CategoryInfo {
        id: "science",
        name: "Science",
        description: "Scientific discoveries and research",
    },
    CategoryInfo {
        id: "health",
        name: "Health",
        description: "Health and wellness updates",
    },
    CategoryInfo {
        id: "politics",
        name: "Politics",
        description: "Political news and current events",
    },
    CategoryInfo {
        id: "environment",
        name: "Environment",
        description: "Climate and environmental news",
    },
];

pub const FREQUENCIES: &[FrequencyInfo] = &[
    FrequencyInfo {
        id: Frequency::Daily,
        name: "Daily",
        description: "Every day",
    },
    FrequencyInfo {
        id: Frequency::Weekly,
        name: "Weekly",
        description: "Once a week",
    },
    FrequencyInfo {
        id: Frequency::Biweekly,
        name: "Bi-weekly",
        description: "Twice a week",
    },
];

pub fn is_known_category(id: &str) -> bool {
    CATEGORIES.iter().any(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_frequency() {
        for frequency in Frequency::ALL {
            assert!(FREQUENCIES.iter().any(|f| f.id == frequency));
        }
    }

    #[test]
    fn test_known_categories() {
        assert!(is_known_category("technology"));
        assert!(is_known_category("environment"));
        assert!(!is_known_category("Technology"));
        assert!(!is_known_category("crypto"));
    }
}
