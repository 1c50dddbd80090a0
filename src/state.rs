use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use crate::data::filter::{CategoryMatch, DateRange, FilterCriteria, filter_indices};
use crate::data::model::{Category, Review, ReviewDataset};
use crate::data::summary::{CategoryBreakdown, Summary, TimeBucket, category_breakdown, summarize};

// ---------------------------------------------------------------------------
// UI enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Data,
}

/// Date-range presets offered in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePreset {
    #[default]
    AllTime,
    Last6Months,
    Last12Months,
    Custom,
}

impl DatePreset {
    pub const ALL: [DatePreset; 4] = [
        DatePreset::AllTime,
        DatePreset::Last6Months,
        DatePreset::Last12Months,
        DatePreset::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DatePreset::AllTime => "All Time",
            DatePreset::Last6Months => "Last 6 months",
            DatePreset::Last12Months => "Last 12 months",
            DatePreset::Custom => "Custom",
        }
    }
}

/// Sort column for the Data tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    Rating,
    Customer,
    Brand,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Date, SortKey::Rating, SortKey::Customer, SortKey::Brand];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Rating => "rating",
            SortKey::Customer => "customer",
            SortKey::Brand => "brand",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<ReviewDataset>,

    // -- filter selections --
    pub ratings: BTreeSet<u8>,
    pub categories: BTreeSet<Category>,
    pub category_match: CategoryMatch,
    /// None = all brands.
    pub brand: Option<String>,
    pub date_preset: DatePreset,
    pub custom_start: NaiveDate,
    pub custom_end: NaiveDate,
    pub bucket: TimeBucket,

    // -- derived, cached after each refilter --
    /// Indices of reviews passing the current filters, in dataset order.
    pub visible: Vec<usize>,
    pub summary: Summary,
    pub breakdown: Vec<CategoryBreakdown>,

    // -- chrome --
    pub tab: Tab,
    pub sort_key: SortKey,
    pub sort_ascending: bool,
    /// Validation / empty-state / error message shown in the UI.
    pub status_message: Option<String>,
    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            dataset: None,
            ratings: (1..=5).collect(),
            categories: BTreeSet::new(),
            category_match: CategoryMatch::default(),
            brand: None,
            date_preset: DatePreset::default(),
            custom_start: today - Duration::days(365),
            custom_end: today,
            bucket: TimeBucket::default(),
            visible: Vec::new(),
            summary: Summary::default(),
            breakdown: Vec::new(),
            tab: Tab::default(),
            sort_key: SortKey::default(),
            sort_ascending: false,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset, resetting filters to all-permissive.
    pub fn set_dataset(&mut self, dataset: ReviewDataset) {
        self.ratings = (1..=5).collect();
        self.categories.clear();
        self.brand = None;
        self.date_preset = DatePreset::AllTime;
        if let Some((lo, hi)) = dataset.date_span {
            self.custom_start = lo;
            self.custom_end = hi;
        }
        self.dataset = Some(dataset);
        self.status_message = None;
        self.loading = false;
        self.refilter();
    }

    /// Merge additional reviews (File → Append…) into the loaded dataset.
    pub fn append_reviews(&mut self, reviews: Vec<Review>) {
        let merged = match self.dataset.take() {
            Some(ds) => ds.merge(reviews),
            None => ReviewDataset::from_reviews(reviews),
        };
        // keep current filter selections; a newly appended brand shows up
        // once the brand filter is All
        if let Some((lo, hi)) = merged.date_span {
            self.custom_start = self.custom_start.min(lo);
            self.custom_end = self.custom_end.max(hi);
        }
        self.dataset = Some(merged);
        self.loading = false;
        self.refilter();
    }

    /// Concrete date range for the active preset, resolved against the
    /// dataset's date span the way the source dashboard does (180/365 days
    /// back from the latest review).
    pub fn resolved_date_range(&self) -> Option<DateRange> {
        let (lo, hi) = self.dataset.as_ref()?.date_span?;
        Some(match self.date_preset {
            DatePreset::AllTime => DateRange { start: lo, end: hi },
            DatePreset::Last6Months => DateRange {
                start: hi - Duration::days(180),
                end: hi,
            },
            DatePreset::Last12Months => DateRange {
                start: hi - Duration::days(365),
                end: hi,
            },
            DatePreset::Custom => DateRange {
                start: self.custom_start,
                end: self.custom_end,
            },
        })
    }

    fn criteria(&self) -> Option<FilterCriteria> {
        Some(FilterCriteria {
            date_range: self.resolved_date_range()?,
            ratings: self.ratings.clone(),
            categories: self.categories.clone(),
            brand: self.brand.clone(),
            category_match: self.category_match,
        })
    }

    /// Recompute visible indices and aggregates after any filter change.
    ///
    /// An inverted custom range surfaces as a validation message with zero
    /// rows; an empty result shows a non-fatal empty-state message.
    pub fn refilter(&mut self) {
        let (Some(ds), Some(criteria)) = (&self.dataset, self.criteria()) else {
            self.visible.clear();
            self.summary = Summary::default();
            self.breakdown.clear();
            return;
        };

        match filter_indices(ds, &criteria) {
            Ok(indices) => {
                self.status_message = if indices.is_empty() {
                    Some("No reviews match the selected filters.".to_string())
                } else {
                    None
                };
                self.summary = summarize(ds, &indices, self.bucket);
                self.breakdown = category_breakdown(ds, &indices);
                self.visible = indices;
            }
            Err(e) => {
                self.status_message = Some(e.to_string());
                self.visible.clear();
                self.summary = Summary::default();
                self.breakdown.clear();
            }
        }
    }

    /// Visible indices reordered for the Data tab's sort selection.
    /// Exports keep `visible` (filter order) untouched.
    pub fn display_order(&self) -> Vec<usize> {
        let Some(ds) = &self.dataset else {
            return Vec::new();
        };
        let mut order = self.visible.clone();
        order.sort_by(|&a, &b| {
            let (ra, rb) = (&ds.reviews[a], &ds.reviews[b]);
            let ord = match self.sort_key {
                SortKey::Date => ra.date.cmp(&rb.date),
                SortKey::Rating => ra.rating.cmp(&rb.rating),
                SortKey::Customer => ra.customer.cmp(&rb.customer),
                SortKey::Brand => ra.brand.cmp(&rb.brand),
            };
            if self.sort_ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        order
    }
}
