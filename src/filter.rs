// Client-side filtering of catalog records

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::Record;

/// Category criterion: everything, or one exact slug
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Slug(String),
}

impl CategoryFilter {
    /// Sentinel value used by selection widgets for "every category"
    pub const ALL: &'static str = "all";

    /// Parse a selection value; `"all"` maps to [`CategoryFilter::All`]
    pub fn parse(value: &str) -> Self {
        if value == Self::ALL {
            CategoryFilter::All
        } else {
            CategoryFilter::Slug(value.to_string())
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Slug(slug) => slug == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "{}", Self::ALL),
            CategoryFilter::Slug(s) => write!(f, "{}", s),
        }
    }
}

/// Calendar range; `to` of `None` means the single day `from`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self { from: day, to: None }
    }

    /// `from` at 00:00:00.000
    pub fn start(&self) -> NaiveDateTime {
        self.from.and_time(NaiveTime::MIN)
    }

    /// `to` (or `from`) at 23:59:59.999
    pub fn end(&self) -> NaiveDateTime {
        let last = self.to.unwrap_or(self.from);
        // 23:59:59.999 always exists
        let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        last.and_time(end_of_day)
    }

    /// Day-granular containment, inclusive on both ends
    pub fn contains(&self, day: NaiveDate) -> bool {
        let at = day.and_time(NaiveTime::MIN);
        self.start() <= at && at <= self.end()
    }

    /// Short summary such as "Jun 1 - Jun 3", or "Jun 1 - " when open-ended
    pub fn label(&self) -> String {
        let to = self.to.map(|d| d.format("%b %-d").to_string()).unwrap_or_default();
        format!("{} - {}", self.from.format("%b %-d"), to)
    }
}

/// The user's current narrowing criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    /// Case-insensitive substring of title or description; empty matches everything
    pub search_query: String,
    pub category: CategoryFilter,
    pub date_range: Option<DateRange>,
}

impl FilterState {
    /// True when any criterion narrows the collection
    pub fn is_active(&self) -> bool {
        !self.search_query.is_empty() || self.category != CategoryFilter::All || self.date_range.is_some()
    }

    /// State with every criterion reset
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.matches_search(record) && self.matches_category(record) && self.matches_date(record)
    }

    fn matches_search<R: Record>(&self, record: &R) -> bool {
        if self.search_query.is_empty() {
            return true;
        }
        let query = self.search_query.to_lowercase();
        record.title().to_lowercase().contains(&query) || record.description().to_lowercase().contains(&query)
    }

    fn matches_category<R: Record>(&self, record: &R) -> bool {
        self.category.matches(record.category())
    }

    fn matches_date<R: Record>(&self, record: &R) -> bool {
        match &self.date_range {
            None => true,
            Some(range) => record.date_added().is_some_and(|day| range.contains(day)),
        }
    }
}

/// Records matching `state`, in input order
pub fn apply<'a, R: Record>(records: &'a [R], state: &FilterState) -> Vec<&'a R> {
    if !state.is_active() {
        return records.iter().collect();
    }
    records.iter().filter(|r| state.matches(*r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ProductId;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: ProductId,
        title: String,
        description: String,
        category: String,
        date: Option<NaiveDate>,
    }

    impl Record for Item {
        fn id(&self) -> ProductId {
            self.id
        }

        fn title(&self) -> &str {
            &self.title
        }

        fn description(&self) -> &str {
            &self.description
        }

        fn category(&self) -> &str {
            &self.category
        }

        fn date_added(&self) -> Option<NaiveDate> {
            self.date
        }
    }

    fn item(id: ProductId, title: &str, category: &str) -> Item {
        Item {
            id,
            title: title.to_string(),
            description: String::new(),
            category: category.to_string(),
            date: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Item> {
        vec![
            item(1, "Essence Mascara", "beauty"),
            item(2, "Eyeshadow Palette", "beauty"),
            item(3, "iPhone 9", "smartphones"),
        ]
    }

    fn ids(records: &[&Item]) -> Vec<ProductId> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let records = sample();
        let state = FilterState {
            search_query: "iphone".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&records, &state)), vec![3]);
    }

    #[test]
    fn test_category_filter() {
        let records = sample();
        let state = FilterState {
            category: CategoryFilter::parse("beauty"),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&records, &state)), vec![1, 2]);
    }

    #[test]
    fn test_category_is_case_sensitive() {
        let records = sample();
        let state = FilterState {
            category: CategoryFilter::parse("Beauty"),
            ..Default::default()
        };
        assert!(apply(&records, &state).is_empty());
    }

    #[test]
    fn test_search_matches_description() {
        let mut records = sample();
        records[1].description = "Long-lasting PIGMENTS".to_string();
        let state = FilterState {
            search_query: "pigment".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&records, &state)), vec![2]);
    }

    #[test]
    fn test_criteria_are_conjunctive() {
        let records = sample();

        // "e" matches all three titles; the category keeps only the beauty items
        let state = FilterState {
            search_query: "e".to_string(),
            category: CategoryFilter::parse("beauty"),
            date_range: None,
        };
        assert_eq!(ids(&apply(&records, &state)), vec![1, 2]);

        // "palette" alone keeps item 2; a non-matching category drops it
        let state = FilterState {
            search_query: "palette".to_string(),
            category: CategoryFilter::parse("beauty"),
            date_range: None,
        };
        assert_eq!(ids(&apply(&records, &state)), vec![2]);

        let state = FilterState {
            search_query: "mascara".to_string(),
            category: CategoryFilter::parse("smartphones"),
            date_range: None,
        };
        assert!(apply(&records, &state).is_empty());
    }

    #[test]
    fn test_empty_state_passes_everything() {
        let records = sample();
        assert_eq!(ids(&apply(&records, &FilterState::default())), vec![1, 2, 3]);
    }

    #[test]
    fn test_date_range_inclusive_bounds() {
        let mut records = sample();
        records[0].date = Some(day(2024, 3, 1));
        records[1].date = Some(day(2024, 3, 5));
        records[2].date = Some(day(2024, 3, 6));

        let state = FilterState {
            date_range: Some(DateRange::new(day(2024, 3, 1), Some(day(2024, 3, 5)))),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&records, &state)), vec![1, 2]);
    }

    #[test]
    fn test_date_range_single_day() {
        let mut records = sample();
        records[0].date = Some(day(2024, 3, 1));
        records[1].date = Some(day(2024, 3, 2));
        records[2].date = Some(day(2024, 2, 29));

        let state = FilterState {
            date_range: Some(DateRange::single_day(day(2024, 3, 1))),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&records, &state)), vec![1]);
    }

    #[test]
    fn test_date_range_excludes_undated_records() {
        let mut records = sample();
        records[0].date = Some(day(2024, 3, 1));

        let state = FilterState {
            date_range: Some(DateRange::new(day(2024, 1, 1), Some(day(2024, 12, 31)))),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&records, &state)), vec![1]);
    }

    #[test]
    fn test_date_range_bounds() {
        let range = DateRange::new(day(2024, 3, 1), Some(day(2024, 3, 5)));
        assert_eq!(range.start().to_string(), "2024-03-01 00:00:00");
        assert_eq!(range.end().to_string(), "2024-03-05 23:59:59.999");
        assert_eq!(DateRange::single_day(day(2024, 3, 1)).end().date(), day(2024, 3, 1));
    }

    #[test]
    fn test_date_range_label() {
        assert_eq!(DateRange::new(day(2024, 6, 1), Some(day(2024, 6, 3))).label(), "Jun 1 - Jun 3");
        assert_eq!(DateRange::single_day(day(2024, 6, 1)).label(), "Jun 1 - ");
    }

    #[test]
    fn test_is_active() {
        assert!(!FilterState::cleared().is_active());
        assert!(
            FilterState {
                search_query: "x".to_string(),
                ..Default::default()
            }
            .is_active()
        );
        assert!(
            FilterState {
                category: CategoryFilter::parse("beauty"),
                ..Default::default()
            }
            .is_active()
        );
        assert!(!FilterState {
            category: CategoryFilter::parse(CategoryFilter::ALL),
            ..Default::default()
        }
        .is_active());
    }

    #[test]
    fn test_category_filter_display() {
        assert_eq!(CategoryFilter::All.to_string(), "all");
        assert_eq!(CategoryFilter::parse("laptops").to_string(), "laptops");
    }

    fn arb_items() -> impl Strategy<Value = Vec<Item>> {
        prop::collection::vec(("[a-zA-Z ]{0,12}", "[a-zA-Z ]{0,12}", 0u8..3), 0..40).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (title, description, cat))| Item {
                    id: i as ProductId,
                    title,
                    description,
                    category: format!("cat-{}", cat),
                    date: None,
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_search_matches_exactly(records in arb_items(), query in "[a-zA-Z]{1,3}") {
            let state = FilterState { search_query: query.clone(), ..Default::default() };
            let kept = ids(&apply(&records, &state));
            let needle = query.to_lowercase();
            let expected: Vec<ProductId> = records
                .iter()
                .filter(|r| r.title.to_lowercase().contains(&needle) || r.description.to_lowercase().contains(&needle))
                .map(|r| r.id)
                .collect();
            prop_assert_eq!(kept, expected);
        }

        #[test]
        fn prop_apply_is_idempotent(records in arb_items(), query in "[a-z]{0,2}", cat in 0u8..4) {
            let category = if cat == 3 { CategoryFilter::All } else { CategoryFilter::Slug(format!("cat-{}", cat)) };
            let state = FilterState { search_query: query, category, date_range: None };
            let first = apply(&records, &state);
            let second = apply(&records, &state);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_output_preserves_input_order(records in arb_items(), cat in 0u8..3) {
            let state = FilterState { category: CategoryFilter::Slug(format!("cat-{}", cat)), ..Default::default() };
            let kept = ids(&apply(&records, &state));
            prop_assert!(kept.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
