use std::sync::Arc;

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Draw a star rating from per-brand cumulative weights.
fn draw_rating(rng: &mut SimpleRng, weights: &[f64; 5]) -> u8 {
    let roll = rng.next_f64();
    let mut acc = 0.0;
    for (i, w) in weights.iter().enumerate() {
        acc += w;
        if roll < acc {
            return (i + 1) as u8;
        }
    }
    5
}

fn review_text(rng: &mut SimpleRng, rating: u8) -> &'static str {
    const POSITIVE: [&str; 4] = [
        "Amazing quality, thank you!",
        "Fast delivery and the dress is fantastic.",
        "Outstanding service, my issue was resolved within a day.",
        "Great fit, smooth checkout, would order again.",
    ];
    const NEUTRAL: [&str; 3] = [
        "Dress is fine but nothing special for the price.",
        "Okay overall, though the sizing runs a little small.",
        "Decent quality, delivery took longer than expected.",
    ];
    const NEGATIVE: [&str; 5] = [
        "Still waiting for my order and no reply from support.",
        "Wrong size arrived and my refund request was ignored.",
        "Item not delivered, missing item from my parcel.",
        "Too small, and the exchange process was a nightmare.",
        "Bad service, didn't respond to any of my messages.",
    ];

    match rating {
        4 | 5 => rng.pick(&POSITIVE),
        3 => rng.pick(&NEUTRAL),
        _ => rng.pick(&NEGATIVE),
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // (brand, review count, rating weights for 1..=5 stars)
    let brands: [(&str, usize, [f64; 5]); 2] = [
        ("Wanderdoll", 400, [0.10, 0.08, 0.12, 0.25, 0.45]),
        ("Odd Muse", 300, [0.20, 0.15, 0.15, 0.20, 0.30]),
    ];
    let first_names = ["Alice", "Ben", "Carla", "Dev", "Ella", "Femi", "Grace", "Hana"];
    let last_initials = ["B.", "C.", "D.", "K.", "M.", "O.", "S.", "T."];

    let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");
    let span_days = 730;

    let mut ids: Vec<i64> = Vec::new();
    let mut brand_col: Vec<String> = Vec::new();
    let mut customer_col: Vec<String> = Vec::new();
    let mut date_col: Vec<String> = Vec::new();
    let mut rating_col: Vec<i64> = Vec::new();
    let mut text_col: Vec<String> = Vec::new();

    let mut id: i64 = 0;
    for (brand, count, weights) in &brands {
        for _ in 0..*count {
            let rating = draw_rating(&mut rng, weights);
            let date = start + Duration::days((rng.next_u64() % span_days) as i64);

            ids.push(id);
            brand_col.push(brand.to_string());
            customer_col.push(format!(
                "{} {}",
                rng.pick(&first_names),
                rng.pick(&last_initials)
            ));
            date_col.push(date.format("%Y-%m-%d").to_string());
            rating_col.push(rating as i64);
            text_col.push(review_text(&mut rng, rating).to_string());
            id += 1;
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("brand", DataType::Utf8, false),
        Field::new("customer name", DataType::Utf8, false),
        Field::new("date", DataType::Utf8, false),
        Field::new("rating", DataType::Int64, false),
        Field::new("review", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(ids)),
            Arc::new(StringArray::from(brand_col)),
            Arc::new(StringArray::from(customer_col)),
            Arc::new(StringArray::from(date_col)),
            Arc::new(Int64Array::from(rating_col)),
            Arc::new(StringArray::from(text_col)),
        ],
    )
    .expect("Failed to create RecordBatch");

    let output_path = "sample_reviews.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {id} reviews to {output_path}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_returns_elements_by_value() {
        let mut rng = SimpleRng::new(1);
        let names = ["Alice", "Ben", "Carla"];
        for _ in 0..32 {
            let name: &str = rng.pick(&names);
            assert!(names.contains(&name));
        }
    }

    #[test]
    fn draw_rating_respects_weights() {
        let mut rng = SimpleRng::new(7);
        // all mass on 5 stars
        for _ in 0..16 {
            assert_eq!(draw_rating(&mut rng, &[0.0, 0.0, 0.0, 0.0, 1.0]), 5);
        }
    }

    #[test]
    fn review_text_matches_rating_band() {
        let mut rng = SimpleRng::new(42);
        for rating in 1..=5u8 {
            let text = review_text(&mut rng, rating);
            assert!(!text.is_empty());
        }
    }
}
