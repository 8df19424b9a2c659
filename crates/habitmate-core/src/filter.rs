//! In-memory habit filtering for live search views.
//!
//! Narrows an already-fetched list of one owner's habits by a
//! case-insensitive name substring and an exact category. Runs as a single
//! linear pass so it can be re-evaluated on every keystroke.

use serde::{Deserialize, Serialize};

use crate::types::{Habit, CATEGORY_ALL};

/// Category part of a habit query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    /// No category restriction.
    #[default]
    All,
    /// Category must equal this value exactly (case-sensitive).
    Exact(String),
}

impl CategoryFilter {
    /// Interpret a category selector value, where `"All"` disables filtering.
    pub fn from_selector(selector: &str) -> Self {
        if selector == CATEGORY_ALL {
            CategoryFilter::All
        } else {
            CategoryFilter::Exact(selector.to_string())
        }
    }

    /// Same as [`from_selector`](Self::from_selector), treating a missing selector as `All`.
    pub fn from_optional(selector: Option<&str>) -> Self {
        selector.map(Self::from_selector).unwrap_or_default()
    }

    /// The category to compare against, or `None` when unrestricted.
    pub fn as_exact(&self) -> Option<&str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Exact(category) => Some(category),
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Exact(wanted) => wanted == category,
        }
    }
}

/// A search-text plus category query over habits.
///
/// The lowercased search text is computed once so repeated `matches` calls
/// only lowercase the habit names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HabitFilter {
    needle: String,
    category: CategoryFilter,
}

impl HabitFilter {
    pub fn new(query_text: &str, category: CategoryFilter) -> Self {
        Self {
            needle: query_text.to_lowercase(),
            category,
        }
    }

    /// Build from raw UI values: the search text and the category selector.
    pub fn from_selector(query_text: &str, category_selector: &str) -> Self {
        Self::new(query_text, CategoryFilter::from_selector(category_selector))
    }

    /// Whether this filter lets every habit through.
    pub fn is_unrestricted(&self) -> bool {
        self.needle.is_empty() && self.category == CategoryFilter::All
    }

    pub fn matches(&self, habit: &Habit) -> bool {
        self.category.matches(&habit.category)
            && (self.needle.is_empty() || habit.name.to_lowercase().contains(&self.needle))
    }

    /// Matching habits in input order.
    pub fn apply<'a>(&'a self, habits: &'a [Habit]) -> impl Iterator<Item = &'a Habit> + 'a {
        habits.iter().filter(move |habit| self.matches(habit))
    }
}

/// Reduce `habits` to those whose name contains `query_text` (ignoring case)
/// and whose category matches `category_selector` (`"All"` matches any).
///
/// Never fails; no match yields an empty list. Input order is preserved.
pub fn filter(habits: &[Habit], query_text: &str, category_selector: &str) -> Vec<Habit> {
    let filter = HabitFilter::from_selector(query_text, category_selector);
    filter.apply(habits).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habit(name: &str, category: &str) -> Habit {
        Habit::builder(name)
            .frequency("Daily")
            .category(category)
            .owner("alice")
            .build_unchecked()
    }

    fn sample() -> Vec<Habit> {
        vec![
            habit("Run", "Health"),
            habit("Read", "Personal"),
            habit("Stretch", "Health"),
            habit("Journal", "Personal"),
            habit("Review PRs", "Work"),
        ]
    }

    fn names(habits: &[Habit]) -> Vec<&str> {
        habits.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_empty_query_all_returns_everything_in_order() {
        let set = sample();
        let out = filter(&set, "", "All");
        assert_eq!(out, set);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let set = sample();
        let out = filter(&set, "r", "All");
        assert_eq!(names(&out), vec!["Run", "Read", "Stretch", "Journal", "Review PRs"]);

        let out = filter(&set, "RE", "All");
        assert_eq!(names(&out), vec!["Read", "Stretch", "Review PRs"]);
    }

    #[test]
    fn test_query_matches_exactly_the_lowercase_subset() {
        let set = sample();
        for q in ["", "r", "ea", "xyz", "PR", "run", "j"] {
            let out = filter(&set, q, "All");
            let expected: Vec<Habit> = set
                .iter()
                .filter(|h| h.name.to_lowercase().contains(&q.to_lowercase()))
                .cloned()
                .collect();
            assert_eq!(out, expected, "query {:?}", q);
        }
    }

    #[test]
    fn test_category_only() {
        let set = sample();
        let out = filter(&set, "", "Personal");
        assert_eq!(names(&out), vec!["Read", "Journal"]);
    }

    #[test]
    fn test_category_is_case_sensitive() {
        let set = sample();
        assert!(filter(&set, "", "health").is_empty());
        assert_eq!(filter(&set, "", "Health").len(), 2);
    }

    #[test]
    fn test_both_predicates_and_together() {
        let set = sample();
        let out = filter(&set, "ru", "Health");
        assert_eq!(names(&out), vec!["Run"]);

        let out = filter(&set, "ru", "Personal");
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(filter(&[], "anything", "All").is_empty());
        assert!(filter(&[], "", "Health").is_empty());
    }

    #[test]
    fn test_unknown_category_yields_empty_output() {
        assert!(filter(&sample(), "", "Finance").is_empty());
    }

    #[test]
    fn test_category_filter_from_selector() {
        assert_eq!(CategoryFilter::from_selector("All"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from_selector("Work"),
            CategoryFilter::Exact("Work".to_string())
        );
        // Only the exact sentinel disables filtering.
        assert_eq!(
            CategoryFilter::from_selector("all"),
            CategoryFilter::Exact("all".to_string())
        );
        assert_eq!(CategoryFilter::from_optional(None), CategoryFilter::All);
        assert_eq!(CategoryFilter::All.as_exact(), None);
        assert_eq!(
            CategoryFilter::Exact("Work".into()).as_exact(),
            Some("Work")
        );
    }

    #[test]
    fn test_is_unrestricted() {
        assert!(HabitFilter::from_selector("", "All").is_unrestricted());
        assert!(!HabitFilter::from_selector("a", "All").is_unrestricted());
        assert!(!HabitFilter::from_selector("", "Work").is_unrestricted());
    }

    #[test]
    fn test_non_ascii_names() {
        let set = vec![habit("Éclair baking", "Personal"), habit("Yoga", "Health")];
        let out = filter(&set, "éCLAIR", "All");
        assert_eq!(names(&out), vec!["Éclair baking"]);
    }
}
