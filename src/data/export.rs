use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use super::model::ReviewDataset;

// ---------------------------------------------------------------------------
// Flat export rows (CSV / JSON download of the Data tab)
// ---------------------------------------------------------------------------

/// One review flattened for tabular serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub id: u64,
    pub brand: String,
    pub customer: String,
    /// ISO-8601 calendar date.
    pub date: String,
    pub rating: u8,
    /// Category labels joined with "; ".
    pub categories: String,
    pub text: String,
}

/// Flatten the reviews selected by `indices`, preserving filter order.
pub fn export_rows(dataset: &ReviewDataset, indices: &[usize]) -> Vec<ExportRow> {
    indices
        .iter()
        .map(|&i| {
            let r = &dataset.reviews[i];
            ExportRow {
                id: r.id,
                brand: r.brand.clone(),
                customer: r.customer.clone(),
                date: r.date.format("%Y-%m-%d").to_string(),
                rating: r.rating,
                categories: r
                    .categories
                    .iter()
                    .map(|c| c.label())
                    .collect::<Vec<_>>()
                    .join("; "),
                text: r.text.clone(),
            }
        })
        .collect()
}

/// Serialize rows as CSV with a header record.
pub fn write_csv<W: Write>(writer: W, rows: &[ExportRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row).context("writing CSV row")?;
    }
    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

/// Serialize rows as a pretty-printed JSON array.
pub fn write_json<W: Write>(writer: W, rows: &[ExportRow]) -> Result<()> {
    serde_json::to_writer_pretty(writer, rows).context("writing JSON export")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Category, Review};
    use chrono::NaiveDate;

    fn sample() -> ReviewDataset {
        let mk = |id: u64, day: u32, rating: u8, cats: &[Category], text: &str| Review {
            id,
            brand: "Wanderdoll".to_string(),
            customer: format!("c{id}"),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            rating,
            categories: cats.iter().copied().collect(),
            text: text.to_string(),
        };
        ReviewDataset::from_reviews(vec![
            mk(0, 1, 5, &[Category::PositiveExperiences], "amazing, thank you"),
            mk(1, 2, 2, &[Category::DeliveryIssues, Category::Expectations], "want a refund"),
        ])
    }

    #[test]
    fn rows_preserve_order_and_join_categories() {
        let ds = sample();
        let rows = export_rows(&ds, &[1, 0]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].categories, "Expectations; Delivery Issues");
        assert_eq!(rows[1].date, "2024-01-01");
    }

    #[test]
    fn csv_output_has_header_and_records() {
        let ds = sample();
        let rows = export_rows(&ds, &[0, 1]);
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,brand,customer,date,rating,categories,text"
        );
        assert_eq!(lines.count(), 2);
        assert!(text.contains("\"amazing, thank you\""));
    }

    #[test]
    fn json_output_round_trips() {
        let ds = sample();
        let rows = export_rows(&ds, &[0]);
        let mut buf = Vec::new();
        write_json(&mut buf, &rows).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["rating"], 5);
        assert_eq!(parsed[0]["brand"], "Wanderdoll");
    }
}
