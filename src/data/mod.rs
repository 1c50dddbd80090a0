/// Data layer: core types, loading, filtering, aggregation, and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<Review> (malformed rows skipped)
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ ReviewDataset  │  deduplicated reviews, brand/date indexes
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐     ┌──────────┐     ┌──────────┐
///   │  filter   │ ──▶ │ summary  │     │  export   │
///   └──────────┘     └──────────┘     └──────────┘
///    indices of       histogram,       flat rows →
///    matching rows    timeline, …      CSV / JSON
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
