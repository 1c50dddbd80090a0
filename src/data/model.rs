use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Category – fixed review-content taxonomy
// ---------------------------------------------------------------------------

/// Fixed classification of review content.
///
/// Each category carries a keyword list used to tag free-text reviews that
/// arrive without an explicit category column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    ProductIssues,
    ServiceIssues,
    Expectations,
    DeliveryIssues,
    PositiveExperiences,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::ProductIssues,
        Category::ServiceIssues,
        Category::Expectations,
        Category::DeliveryIssues,
        Category::PositiveExperiences,
    ];

    /// Human-readable label shown in the UI and in exports.
    pub fn label(self) -> &'static str {
        match self {
            Category::ProductIssues => "Product Issues",
            Category::ServiceIssues => "Service Issues",
            Category::Expectations => "Expectations",
            Category::DeliveryIssues => "Delivery Issues",
            Category::PositiveExperiences => "Positive Experiences",
        }
    }

    /// Lowercase phrases whose presence in a review text assigns the category.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::ProductIssues => &[
                "too small", "too big", "wrong size", "poor fit", "too tight",
                "too loose", "didn't fit", "sizing", "what size", "which size",
                "how tall",
            ],
            Category::ServiceIssues => &[
                "no reply", "didn't respond", "ignored", "bad service",
                "no response", "unhelpful", "rude", "no answer",
            ],
            Category::Expectations => &["refund", "return", "exchange", "compensation"],
            Category::DeliveryIssues => &[
                "not delivered", "didn't receive", "lost order", "missing item",
                "delivery delay", "still waiting",
            ],
            Category::PositiveExperiences => &[
                "fantastic", "great", "smooth", "excellent", "thank you",
                "amazing", "outstanding", "resolved", "fast", "quick",
            ],
        }
    }

    /// Tag a free-text review: every category with at least one keyword hit.
    /// Case-insensitive substring match, same semantics as the source data's
    /// `matched_keywords` column.
    pub fn classify(text: &str) -> BTreeSet<Category> {
        let lower = text.to_lowercase();
        Category::ALL
            .into_iter()
            .filter(|c| c.keywords().iter().any(|kw| lower.contains(kw)))
            .collect()
    }

    /// Parse a category from a label, a snake_case id, or a close variant.
    pub fn from_label(s: &str) -> Option<Category> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match norm.as_str() {
            "productissues" | "productissue" => Some(Category::ProductIssues),
            "serviceissues" | "serviceissue" => Some(Category::ServiceIssues),
            "expectations" | "expectation" => Some(Category::Expectations),
            "deliveryissues" | "deliveryissue" => Some(Category::DeliveryIssues),
            "positiveexperiences" | "positiveexperience" => {
                Some(Category::PositiveExperiences)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Sentiment – derived from the star rating
// ---------------------------------------------------------------------------

/// Rating bands used by the sentiment charts: 1–2 negative, 3 neutral,
/// 4–5 positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub fn from_rating(rating: u8) -> Sentiment {
        match rating {
            0..=2 => Sentiment::Negative,
            3 => Sentiment::Neutral,
            _ => Sentiment::Positive,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive (4-5★)",
            Sentiment::Neutral => "Neutral (3★)",
            Sentiment::Negative => "Negative (1-2★)",
        }
    }
}

// ---------------------------------------------------------------------------
// Review – one record of the dataset
// ---------------------------------------------------------------------------

/// A single customer review. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: u64,
    pub brand: String,
    pub customer: String,
    pub date: NaiveDate,
    /// Star rating, 1–5.
    pub rating: u8,
    pub categories: BTreeSet<Category>,
    pub text: String,
}

impl Review {
    pub fn sentiment(&self) -> Sentiment {
        Sentiment::from_rating(self.rating)
    }
}

// ---------------------------------------------------------------------------
// ReviewDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full loaded dataset with precomputed indexes.
#[derive(Debug, Clone)]
pub struct ReviewDataset {
    /// All reviews, in load order.
    pub reviews: Vec<Review>,
    /// Sorted unique brand names.
    pub brands: Vec<String>,
    /// (earliest, latest) review date, None for an empty dataset.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

impl ReviewDataset {
    /// Build a dataset from raw reviews, dropping exact duplicates on
    /// (brand, customer, text, rating, date) and keeping the first occurrence.
    pub fn from_reviews(reviews: Vec<Review>) -> Self {
        let mut seen: BTreeSet<(String, String, String, u8, NaiveDate)> = BTreeSet::new();
        let mut kept: Vec<Review> = Vec::with_capacity(reviews.len());
        let total = reviews.len();

        for r in reviews {
            let key = (
                r.brand.clone(),
                r.customer.clone(),
                r.text.clone(),
                r.rating,
                r.date,
            );
            if seen.insert(key) {
                kept.push(r);
            }
        }
        let dropped = total - kept.len();
        if dropped > 0 {
            log::info!("Dropped {dropped} duplicate reviews ({total} loaded)");
        }

        let mut brands: BTreeSet<String> = BTreeSet::new();
        let mut date_span: Option<(NaiveDate, NaiveDate)> = None;
        for r in &kept {
            brands.insert(r.brand.clone());
            date_span = Some(match date_span {
                None => (r.date, r.date),
                Some((lo, hi)) => (lo.min(r.date), hi.max(r.date)),
            });
        }

        ReviewDataset {
            reviews: kept,
            brands: brands.into_iter().collect(),
            date_span,
        }
    }

    /// Merge additional reviews (e.g. a second brand's file) into this
    /// dataset, re-running deduplication.
    pub fn merge(self, extra: Vec<Review>) -> Self {
        let mut all = self.reviews;
        all.extend(extra);
        ReviewDataset::from_reviews(all)
    }

    /// Number of reviews.
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}
