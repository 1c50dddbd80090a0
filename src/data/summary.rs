use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use super::model::{Category, ReviewDataset, Sentiment};

// ---------------------------------------------------------------------------
// Timeline bucketing
// ---------------------------------------------------------------------------

/// Granularity of the timeline chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBucket {
    Day,
    /// ISO weeks, keyed by their Monday.
    Week,
    /// Calendar months, keyed by the 1st.
    #[default]
    Month,
}

impl TimeBucket {
    pub fn label(self) -> &'static str {
        match self {
            TimeBucket::Day => "Day",
            TimeBucket::Week => "Week",
            TimeBucket::Month => "Month",
        }
    }

    /// Map a date to the key of the bucket it falls into.
    pub fn bucket_of(self, date: NaiveDate) -> NaiveDate {
        match self {
            TimeBucket::Day => date,
            TimeBucket::Week => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            TimeBucket::Month => {
                // day 1 always exists for a valid (year, month)
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
            }
        }
    }
}

/// Per-bucket counts split by sentiment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentBuckets {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentBuckets {
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    fn bump(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary aggregates
// ---------------------------------------------------------------------------

/// Aggregated counts over a filtered review set, feeding the charts and the
/// metric strip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total: usize,
    /// Count per star value. Counts sum to `total`.
    pub rating_histogram: BTreeMap<u8, usize>,
    /// Count per category; a review increments every category it holds, so
    /// the counts may sum to more than `total`.
    pub category_counts: BTreeMap<Category, usize>,
    /// Count per sentiment band. Sums to `total`.
    pub sentiment_counts: BTreeMap<Sentiment, usize>,
    /// Per calendar bucket, counts split by sentiment.
    pub timeline: BTreeMap<NaiveDate, SentimentBuckets>,
    /// None when the filtered set is empty.
    pub average_rating: Option<f64>,
    /// Share of 4–5 star reviews, 0–100.
    pub positive_pct: f64,
    /// Share of 1–2 star reviews, 0–100.
    pub negative_pct: f64,
}

/// Compute summary aggregates for the reviews selected by `indices`.
pub fn summarize(dataset: &ReviewDataset, indices: &[usize], bucket: TimeBucket) -> Summary {
    let mut summary = Summary {
        total: indices.len(),
        ..Summary::default()
    };
    let mut rating_sum: u64 = 0;

    for &i in indices {
        let r = &dataset.reviews[i];
        *summary.rating_histogram.entry(r.rating).or_default() += 1;
        for cat in &r.categories {
            *summary.category_counts.entry(*cat).or_default() += 1;
        }
        let sentiment = r.sentiment();
        *summary.sentiment_counts.entry(sentiment).or_default() += 1;
        summary
            .timeline
            .entry(bucket.bucket_of(r.date))
            .or_default()
            .bump(sentiment);
        rating_sum += r.rating as u64;
    }

    if summary.total > 0 {
        let n = summary.total as f64;
        summary.average_rating = Some(rating_sum as f64 / n);
        let positive = summary
            .sentiment_counts
            .get(&Sentiment::Positive)
            .copied()
            .unwrap_or(0);
        let negative = summary
            .sentiment_counts
            .get(&Sentiment::Negative)
            .copied()
            .unwrap_or(0);
        summary.positive_pct = positive as f64 / n * 100.0;
        summary.negative_pct = negative as f64 / n * 100.0;
    }

    summary
}

// ---------------------------------------------------------------------------
// Per-category breakdown (Dashboard "Category Analysis" table)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub count: usize,
    pub average_rating: f64,
    pub positive_pct: f64,
}

/// Per-category stats over the filtered set, one row per category that
/// appears at least once.
pub fn category_breakdown(dataset: &ReviewDataset, indices: &[usize]) -> Vec<CategoryBreakdown> {
    let mut rows = Vec::new();
    for cat in Category::ALL {
        let mut count = 0usize;
        let mut rating_sum = 0u64;
        let mut positive = 0usize;
        for &i in indices {
            let r = &dataset.reviews[i];
            if r.categories.contains(&cat) {
                count += 1;
                rating_sum += r.rating as u64;
                if r.sentiment() == Sentiment::Positive {
                    positive += 1;
                }
            }
        }
        if count > 0 {
            rows.push(CategoryBreakdown {
                category: cat,
                count,
                average_rating: rating_sum as f64 / count as f64,
                positive_pct: positive as f64 / count as f64 * 100.0,
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Review;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn review(id: u64, day: &str, rating: u8, cats: &[Category]) -> Review {
        Review {
            id,
            brand: "Wanderdoll".to_string(),
            customer: format!("c{id}"),
            date: date(day),
            rating,
            categories: cats.iter().copied().collect(),
            text: String::new(),
        }
    }

    fn sample() -> ReviewDataset {
        ReviewDataset::from_reviews(vec![
            review(0, "2024-01-05", 5, &[Category::PositiveExperiences]),
            review(1, "2024-01-20", 2, &[Category::DeliveryIssues, Category::Expectations]),
            review(2, "2024-02-03", 3, &[]),
            review(3, "2024-02-10", 1, &[Category::DeliveryIssues]),
        ])
    }

    #[test]
    fn histogram_counts_sum_to_total() {
        let ds = sample();
        let indices: Vec<usize> = (0..ds.len()).collect();
        let s = summarize(&ds, &indices, TimeBucket::Month);
        assert_eq!(s.total, 4);
        assert_eq!(s.rating_histogram.values().sum::<usize>(), s.total);
        assert_eq!(s.rating_histogram[&5], 1);
        assert_eq!(s.rating_histogram[&1], 1);
    }

    #[test]
    fn category_counts_can_exceed_total() {
        let ds = sample();
        let indices: Vec<usize> = (0..ds.len()).collect();
        let s = summarize(&ds, &indices, TimeBucket::Month);
        // review 1 holds two categories
        assert_eq!(s.category_counts.values().sum::<usize>(), 4);
        assert_eq!(s.category_counts[&Category::DeliveryIssues], 2);
    }

    #[test]
    fn sentiment_and_percentages() {
        let ds = sample();
        let indices: Vec<usize> = (0..ds.len()).collect();
        let s = summarize(&ds, &indices, TimeBucket::Month);
        assert_eq!(s.sentiment_counts[&Sentiment::Positive], 1);
        assert_eq!(s.sentiment_counts[&Sentiment::Neutral], 1);
        assert_eq!(s.sentiment_counts[&Sentiment::Negative], 2);
        assert!((s.positive_pct - 25.0).abs() < 1e-9);
        assert!((s.negative_pct - 50.0).abs() < 1e-9);
        assert_eq!(s.average_rating, Some(11.0 / 4.0));
    }

    #[test]
    fn monthly_timeline_buckets() {
        let ds = sample();
        let indices: Vec<usize> = (0..ds.len()).collect();
        let s = summarize(&ds, &indices, TimeBucket::Month);
        assert_eq!(s.timeline.len(), 2);
        let jan = &s.timeline[&date("2024-01-01")];
        assert_eq!(jan.total(), 2);
        assert_eq!(jan.positive, 1);
        assert_eq!(jan.negative, 1);
        let total: usize = s.timeline.values().map(|b| b.total()).sum();
        assert_eq!(total, s.total);
    }

    #[test]
    fn week_bucket_lands_on_monday() {
        // 2024-01-05 is a Friday; its ISO week starts Monday 2024-01-01.
        assert_eq!(TimeBucket::Week.bucket_of(date("2024-01-05")), date("2024-01-01"));
        assert_eq!(TimeBucket::Week.bucket_of(date("2024-01-01")), date("2024-01-01"));
        assert_eq!(TimeBucket::Day.bucket_of(date("2024-01-05")), date("2024-01-05"));
    }

    #[test]
    fn empty_selection_yields_empty_summary() {
        let ds = sample();
        let s = summarize(&ds, &[], TimeBucket::Day);
        assert_eq!(s.total, 0);
        assert_eq!(s.average_rating, None);
        assert!(s.timeline.is_empty());
        assert_eq!(s.positive_pct, 0.0);
    }

    #[test]
    fn breakdown_rows_only_for_present_categories() {
        let ds = sample();
        let indices: Vec<usize> = (0..ds.len()).collect();
        let rows = category_breakdown(&ds, &indices);
        assert_eq!(rows.len(), 3);
        let delivery = rows
            .iter()
            .find(|r| r.category == Category::DeliveryIssues)
            .unwrap();
        assert_eq!(delivery.count, 2);
        assert!((delivery.average_rating - 1.5).abs() < 1e-9);
        assert_eq!(delivery.positive_pct, 0.0);
    }
}
