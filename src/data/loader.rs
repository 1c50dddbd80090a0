use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use chrono::{Duration, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Category, Review};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load reviews from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row; column names resolved flexibly (see below)
/// * `.json`    – `[{ "date": "...", "rating": 4, "review": "...", ... }, ...]`
/// * `.parquet` – scalar columns, as written by Pandas/Polars
///
/// Rows with a missing or unparseable date or rating are skipped with a
/// warning; they never fail the whole load.
///
/// `id_offset` shifts the row-number fallback ids so that appending a
/// second id-less file to an already loaded dataset keeps ids unique;
/// explicit `id` columns are taken as-is.
pub fn load_file(path: &Path, id_offset: u64) -> Result<Vec<Review>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path, id_offset),
        "json" => load_json(path, id_offset),
        "parquet" | "pq" => load_parquet(path, id_offset),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Brand used when the file carries no brand column: the file stem with
/// underscores as spaces (`odd_muse_reviews.csv` → `odd muse reviews`).
fn default_brand(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .replace('_', " ")
}

// ---------------------------------------------------------------------------
// Field parsing shared by all formats
// ---------------------------------------------------------------------------

/// Parse a calendar date from the formats seen in review exports:
/// ISO (`2024-01-31`), ISO timestamps, `31/01/2024`, `January 31, 2024`.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%B %d, %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // ISO timestamp: keep the date prefix
    s.get(..10)
        .and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok())
}

/// Parse a star rating; accepts `"5"`, `"5.0"`, rejects anything outside 1–5.
fn parse_rating(s: &str) -> Option<u8> {
    let v: f64 = s.trim().parse().ok()?;
    let r = v.round();
    if (1.0..=5.0).contains(&r) {
        Some(r as u8)
    } else {
        None
    }
}

/// Resolve a category cell: labels/ids separated by `;` or `,`.  When no
/// token parses as a category label (e.g. a `matched_keywords` column), the
/// whole cell is classified by keyword instead.
fn parse_categories(cell: &str) -> BTreeSet<Category> {
    let tags: BTreeSet<Category> = cell
        .split([';', ','])
        .filter_map(Category::from_label)
        .collect();
    if tags.is_empty() {
        Category::classify(cell)
    } else {
        tags
    }
}

/// Assemble a review from raw cells, or None (with a logged skip) when the
/// date or rating is unusable.
#[allow(clippy::too_many_arguments)]
fn build_review(
    row_no: usize,
    id: u64,
    brand: String,
    customer: String,
    date: Option<&str>,
    rating: Option<&str>,
    text: String,
    categories: Option<&str>,
) -> Option<Review> {
    let date = match date.and_then(parse_date) {
        Some(d) => d,
        None => {
            log::warn!("Row {row_no}: missing or malformed date, skipping");
            return None;
        }
    };
    let rating = match rating.and_then(parse_rating) {
        Some(r) => r,
        None => {
            log::warn!("Row {row_no}: missing or out-of-range rating, skipping");
            return None;
        }
    };
    let categories = match categories {
        Some(cell) if !cell.trim().is_empty() => parse_categories(cell),
        _ => Category::classify(&text),
    };

    Some(Review {
        id,
        brand,
        customer,
        date,
        rating,
        categories,
        text,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Column name candidates, covering the cleaned Trustpilot exports this tool
/// is pointed at (`rating_clean`, `date of experience`, `matched_keywords`).
const DATE_COLS: [&str; 3] = ["date", "date of experience", "review_date"];
const RATING_COLS: [&str; 2] = ["rating", "rating_clean"];
const TEXT_COLS: [&str; 3] = ["review", "review_text", "text"];
const CUSTOMER_COLS: [&str; 2] = ["customer name", "customer"];
const CATEGORY_COLS: [&str; 2] = ["categories", "matched_keywords"];

fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|c| headers.iter().position(|h| h.eq_ignore_ascii_case(c)))
}

fn load_csv(path: &Path, id_offset: u64) -> Result<Vec<Review>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let date_idx = find_column(&headers, &DATE_COLS)
        .context("CSV has no date column (expected 'date' or 'date of experience')")?;
    let rating_idx = find_column(&headers, &RATING_COLS)
        .context("CSV has no rating column (expected 'rating' or 'rating_clean')")?;
    let text_idx = find_column(&headers, &TEXT_COLS);
    let customer_idx = find_column(&headers, &CUSTOMER_COLS);
    let brand_idx = find_column(&headers, &["brand"]);
    let id_idx = find_column(&headers, &["id", "review_id"]);
    let category_idx = find_column(&headers, &CATEGORY_COLS);

    let file_brand = default_brand(path);
    let mut reviews = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(str::trim);

        let id = cell(id_idx)
            .and_then(|s| s.parse().ok())
            .unwrap_or(id_offset + row_no as u64);
        let brand = cell(brand_idx)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| file_brand.clone());
        let customer = cell(customer_idx).unwrap_or("").to_string();
        let text = cell(text_idx).unwrap_or("").to_string();

        if let Some(review) = build_review(
            row_no,
            id,
            brand,
            customer,
            cell(Some(date_idx)),
            cell(Some(rating_idx)),
            text,
            cell(category_idx),
        ) {
            reviews.push(review);
        }
    }

    Ok(reviews)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "customer name": "A. N. Other",
///     "date": "2024-01-31",
///     "rating": 2,
///     "review": "Still waiting for my order...",
///     "categories": ["Delivery Issues"]
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path, id_offset: u64) -> Result<Vec<Review>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;
    let file_brand = default_brand(path);
    let mut reviews = Vec::new();

    for (row_no, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {row_no} is not a JSON object"))?;

        let field = |names: &[&str]| names.iter().find_map(|n| obj.get(*n));
        let str_field = |names: &[&str]| {
            field(names).map(|v| match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
        };

        let id = field(&["id", "review_id"])
            .and_then(|v| v.as_u64())
            .unwrap_or(id_offset + row_no as u64);
        let brand = str_field(&["brand"]).unwrap_or_else(|| file_brand.clone());
        let customer = str_field(&CUSTOMER_COLS).unwrap_or_default();
        let text = str_field(&TEXT_COLS).unwrap_or_default();
        let date = str_field(&DATE_COLS);
        let rating = str_field(&RATING_COLS);

        // categories may be an array of labels or a delimited string
        let categories = match field(&CATEGORY_COLS) {
            Some(JsonValue::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Some(JsonValue::String(s)) => Some(s.clone()),
            _ => None,
        };

        if let Some(review) = build_review(
            row_no,
            id,
            brand,
            customer,
            date.as_deref(),
            rating.as_deref(),
            text,
            categories.as_deref(),
        ) {
            reviews.push(review);
        }
    }

    Ok(reviews)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load reviews from a Parquet file with scalar columns.  Dates may be Utf8
/// strings or Date32; ratings Int32/Int64/Float64.  Works with files written
/// by both **Pandas** (`df.to_parquet()`) and **Polars**
/// (`df.write_parquet()`).
fn load_parquet(path: &Path, id_offset: u64) -> Result<Vec<Review>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let file_brand = default_brand(path);
    let mut reviews = Vec::new();
    let mut row_no = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let col = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|c| schema.index_of(c).ok())
                .map(|i| batch.column(i).clone())
        };

        let date_col = col(&DATE_COLS).context("Parquet file missing a date column")?;
        let rating_col = col(&RATING_COLS).context("Parquet file missing a rating column")?;
        let text_col = col(&TEXT_COLS);
        let customer_col = col(&CUSTOMER_COLS);
        let brand_col = col(&["brand"]);
        let id_col = col(&["id", "review_id"]);
        let category_col = col(&CATEGORY_COLS);

        for row in 0..batch.num_rows() {
            let id = id_col
                .as_ref()
                .and_then(|c| cell_i64(c, row))
                .map(|v| v as u64)
                .unwrap_or(id_offset + row_no as u64);
            let brand = brand_col
                .as_ref()
                .and_then(|c| cell_string(c, row))
                .unwrap_or_else(|| file_brand.clone());
            let customer = customer_col
                .as_ref()
                .and_then(|c| cell_string(c, row))
                .unwrap_or_default();
            let text = text_col
                .as_ref()
                .and_then(|c| cell_string(c, row))
                .unwrap_or_default();
            let date = cell_date_string(&date_col, row);
            let rating = cell_string(&rating_col, row);
            let categories = category_col.as_ref().and_then(|c| cell_string(c, row));

            if let Some(review) = build_review(
                row_no,
                id,
                brand,
                customer,
                date.as_deref(),
                rating.as_deref(),
                text,
                categories.as_deref(),
            ) {
                reviews.push(review);
            }
            row_no += 1;
        }
    }

    Ok(reviews)
}

// -- Arrow cell helpers --

/// Render a scalar Arrow cell as a string (Utf8, ints, floats, Date32).
fn cell_string(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).to_string()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row).to_string()),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row).to_string()),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row).to_string()),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row).to_string()),
        DataType::Date32 => cell_date32(col, row).map(|d| d.format("%Y-%m-%d").to_string()),
        _ => None,
    }
}

fn cell_i64(col: &Arc<dyn Array>, row: usize) -> Option<i64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as i64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row)),
        _ => None,
    }
}

/// Date cells are either text or Date32 (days since the Unix epoch).
fn cell_date_string(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    match col.data_type() {
        DataType::Date32 => cell_date32(col, row).map(|d| d.format("%Y-%m-%d").to_string()),
        _ => cell_string(col, row),
    }
}

fn cell_date32(col: &Arc<dyn Array>, row: usize) -> Option<NaiveDate> {
    if col.is_null(row) {
        return None;
    }
    let days = col.as_any().downcast_ref::<Date32Array>()?.value(row);
    NaiveDate::from_ymd_opt(1970, 1, 1).map(|epoch| epoch + Duration::days(days as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("reviewlens-{}-{name}", std::process::id()))
    }

    #[test]
    fn parses_common_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(parse_date("2024-01-31"), Some(expected));
        assert_eq!(parse_date("2024-01-31T09:15:00"), Some(expected));
        assert_eq!(parse_date("31/01/2024"), Some(expected));
        assert_eq!(parse_date("January 31, 2024"), Some(expected));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn rating_bounds() {
        assert_eq!(parse_rating("5"), Some(5));
        assert_eq!(parse_rating("2.0"), Some(2));
        assert_eq!(parse_rating("0"), None);
        assert_eq!(parse_rating("6"), None);
        assert_eq!(parse_rating(""), None);
    }

    #[test]
    fn category_cell_accepts_labels_or_keywords() {
        let tags = parse_categories("Delivery Issues; Expectations");
        assert!(tags.contains(&Category::DeliveryIssues));
        assert!(tags.contains(&Category::Expectations));

        // matched_keywords style cell falls back to classification
        let tags = parse_categories("wrong size, refund");
        assert!(tags.contains(&Category::ProductIssues));
        assert!(tags.contains(&Category::Expectations));
    }

    #[test]
    fn csv_load_skips_malformed_rows() {
        let path = temp_path("reviews.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "customer name,review,rating_clean,date of experience").unwrap();
        writeln!(f, "Ann,\"Amazing dress, thank you\",5.0,2024-01-05").unwrap();
        writeln!(f, "Ben,Still waiting for a refund,1.0,2024-02-10").unwrap();
        writeln!(f, "Cat,no rating here,,2024-02-11").unwrap();
        writeln!(f, "Dan,bad date,3.0,someday").unwrap();
        drop(f);

        let reviews = load_file(&path, 0).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].customer, "Ann");
        assert_eq!(reviews[0].rating, 5);
        assert!(reviews[0].categories.contains(&Category::PositiveExperiences));
        assert!(reviews[1].categories.contains(&Category::DeliveryIssues));
        // brand defaults to the file stem
        assert_eq!(reviews[0].brand, reviews[1].brand);
    }

    #[test]
    fn json_load_with_explicit_categories() {
        let path = temp_path("reviews.json");
        std::fs::write(
            &path,
            r#"[
                {"brand": "Odd Muse", "customer": "Eve", "date": "2024-03-01",
                 "rating": 4, "review": "lovely", "categories": ["Positive Experiences"]},
                {"brand": "Odd Muse", "customer": "Fay", "date": "2024-03-02",
                 "rating": "2", "review": "ignored my emails"}
            ]"#,
        )
        .unwrap();

        let reviews = load_file(&path, 0).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].brand, "Odd Muse");
        assert_eq!(
            reviews[0].categories,
            BTreeSet::from([Category::PositiveExperiences])
        );
        // no categories field: classified from text
        assert_eq!(
            reviews[1].categories,
            BTreeSet::from([Category::ServiceIssues])
        );
    }

    #[test]
    fn parquet_round_trip() {
        use arrow::array::{Int64Array as IdArray, StringArray as Strings};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("date", DataType::Utf8, false),
            Field::new("rating", DataType::Int64, false),
            Field::new("review", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(IdArray::from(vec![7, 8])),
                Arc::new(Strings::from(vec!["2024-01-05", "2024-02-10"])),
                Arc::new(IdArray::from(vec![5, 1])),
                Arc::new(Strings::from(vec!["great quality", "missing item"])),
            ],
        )
        .unwrap();

        let path = temp_path("reviews.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let reviews = load_file(&path, 0).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].id, 7);
        assert_eq!(reviews[0].rating, 5);
        assert_eq!(reviews[1].date, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        assert!(reviews[1].categories.contains(&Category::DeliveryIssues));
    }

    #[test]
    fn fallback_ids_honor_offset() {
        let path = temp_path("offset.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "customer name,review,rating,date").unwrap();
        writeln!(f, "Gia,lovely fit,5,2024-04-01").unwrap();
        writeln!(f, "Hal,too small,2,2024-04-02").unwrap();
        drop(f);

        // ids for an id-less file continue after the loaded dataset
        let reviews = load_file(&path, 100).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(
            reviews.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![100, 101]
        );
    }

    #[test]
    fn explicit_id_column_ignores_offset() {
        let path = temp_path("explicit-ids.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "id,customer name,review,rating,date").unwrap();
        writeln!(f, "42,Ivy,great dress,5,2024-04-03").unwrap();
        drop(f);

        let reviews = load_file(&path, 100).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(reviews[0].id, 42);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        assert!(load_file(Path::new("reviews.xlsx"), 0).is_err());
    }
}
