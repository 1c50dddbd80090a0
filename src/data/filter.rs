use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

use super::model::{Category, Review, ReviewDataset};

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// How the selected category set is matched against a review's tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryMatch {
    /// Review matches when its tag set shares at least one category with the
    /// selection.
    #[default]
    Intersects,
    /// Review matches only when it carries every selected category.
    ContainsAll,
}

/// User-chosen constraints narrowing the review collection.
///
/// An empty `ratings` or `categories` set means "no filter on that axis";
/// `brand: None` means all brands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub date_range: DateRange,
    pub ratings: BTreeSet<u8>,
    pub categories: BTreeSet<Category>,
    pub brand: Option<String>,
    pub category_match: CategoryMatch,
}

impl FilterCriteria {
    /// Whether a single review passes every predicate. Assumes the date
    /// range has already been validated.
    fn matches(&self, review: &Review) -> bool {
        if !self.date_range.contains(review.date) {
            return false;
        }
        if !self.ratings.is_empty() && !self.ratings.contains(&review.rating) {
            return false;
        }
        if let Some(brand) = &self.brand {
            if review.brand != *brand {
                return false;
            }
        }
        if self.categories.is_empty() {
            return true;
        }
        match self.category_match {
            // Every category selected → no effective filter; untagged
            // reviews pass too.
            CategoryMatch::Intersects => {
                self.categories.len() == Category::ALL.len()
                    || self
                        .categories
                        .iter()
                        .any(|c| review.categories.contains(c))
            }
            CategoryMatch::ContainsAll => self
                .categories
                .iter()
                .all(|c| review.categories.contains(c)),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of reviews passing all active predicates, in input order.
///
/// Pure function of (dataset, criteria); the dataset is never mutated.
/// Fails before examining any review when the range is inverted.
pub fn filter_indices(
    dataset: &ReviewDataset,
    criteria: &FilterCriteria,
) -> Result<Vec<usize>, FilterError> {
    let DateRange { start, end } = criteria.date_range;
    if start > end {
        return Err(FilterError::InvalidRange { start, end });
    }

    Ok(dataset
        .reviews
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(i, _)| i)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Review;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn review(id: u64, brand: &str, day: &str, rating: u8, cats: &[Category]) -> Review {
        Review {
            id,
            brand: brand.to_string(),
            customer: format!("c{id}"),
            date: date(day),
            rating,
            categories: cats.iter().copied().collect(),
            text: String::new(),
        }
    }

    fn sample() -> ReviewDataset {
        ReviewDataset::from_reviews(vec![
            review(0, "Wanderdoll", "2024-01-01", 5, &[Category::PositiveExperiences]),
            review(1, "Wanderdoll", "2024-02-01", 2, &[Category::DeliveryIssues]),
            review(2, "Odd Muse", "2024-02-15", 1, &[
                Category::DeliveryIssues,
                Category::Expectations,
            ]),
            review(3, "Odd Muse", "2024-03-01", 4, &[]),
        ])
    }

    /// Criteria that pass every sample review.
    fn span_all() -> FilterCriteria {
        FilterCriteria {
            date_range: DateRange {
                start: date("2024-01-01"),
                end: date("2024-12-31"),
            },
            ratings: (1..=5).collect(),
            categories: BTreeSet::new(),
            brand: None,
            category_match: CategoryMatch::default(),
        }
    }

    #[test]
    fn all_permissive_criteria_return_everything() {
        let ds = sample();
        let idx = filter_indices(&ds, &span_all()).unwrap();
        assert_eq!(idx, vec![0, 1, 2, 3]);
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let ds = sample();
        let mut c = span_all();
        c.date_range = DateRange {
            start: date("2024-02-01"),
            end: date("2024-02-15"),
        };
        assert_eq!(filter_indices(&ds, &c).unwrap(), vec![1, 2]);
    }

    #[test]
    fn rating_filter_narrows() {
        let ds = sample();
        let mut c = span_all();
        c.ratings = BTreeSet::from([1, 2]);
        assert_eq!(filter_indices(&ds, &c).unwrap(), vec![1, 2]);
    }

    #[test]
    fn empty_rating_set_means_no_rating_filter() {
        let ds = sample();
        let mut c = span_all();
        c.ratings.clear();
        assert_eq!(filter_indices(&ds, &c).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_category_set_means_no_category_filter() {
        let ds = sample();
        let idx = filter_indices(&ds, &span_all()).unwrap();
        assert_eq!(idx.len(), ds.len());
    }

    #[test]
    fn full_enumeration_returns_input_unchanged() {
        // review 3 carries no tags; selecting every category must still
        // keep it
        let ds = sample();
        let mut c = span_all();
        c.categories = Category::ALL.into_iter().collect();
        assert_eq!(filter_indices(&ds, &c).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn category_intersection_semantics() {
        let ds = sample();
        let mut c = span_all();
        c.categories = BTreeSet::from([Category::DeliveryIssues, Category::ProductIssues]);
        assert_eq!(filter_indices(&ds, &c).unwrap(), vec![1, 2]);
    }

    #[test]
    fn category_contains_all_semantics() {
        let ds = sample();
        let mut c = span_all();
        c.categories = BTreeSet::from([Category::DeliveryIssues, Category::Expectations]);
        c.category_match = CategoryMatch::ContainsAll;
        assert_eq!(filter_indices(&ds, &c).unwrap(), vec![2]);
    }

    #[test]
    fn brand_filter() {
        let ds = sample();
        let mut c = span_all();
        c.brand = Some("Odd Muse".to_string());
        assert_eq!(filter_indices(&ds, &c).unwrap(), vec![2, 3]);
    }

    #[test]
    fn inverted_range_is_an_error() {
        let ds = sample();
        let mut c = span_all();
        c.date_range = DateRange {
            start: date("2024-02-01"),
            end: date("2024-01-01"),
        };
        let err = filter_indices(&ds, &c).unwrap_err();
        assert!(matches!(err, FilterError::InvalidRange { .. }));
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = sample();
        let mut c = span_all();
        c.ratings = BTreeSet::from([1, 2, 4]);
        c.categories = BTreeSet::from([Category::DeliveryIssues]);

        let once = filter_indices(&ds, &c).unwrap();
        let subset = ReviewDataset::from_reviews(
            once.iter().map(|&i| ds.reviews[i].clone()).collect(),
        );
        let twice = filter_indices(&subset, &c).unwrap();
        assert_eq!(twice.len(), once.len());
        assert_eq!(twice, (0..once.len()).collect::<Vec<_>>());
    }

    #[test]
    fn output_preserves_input_order() {
        let ds = sample();
        let mut c = span_all();
        c.ratings = BTreeSet::from([5, 1, 4]);
        let idx = filter_indices(&ds, &c).unwrap();
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
    }
}
