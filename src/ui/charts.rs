use chrono::NaiveDate;
use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::color::{CategoryColors, sentiment_color};
use crate::data::model::Sentiment;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Dashboard tab (central panel)
// ---------------------------------------------------------------------------

/// Render the analytics overview: metric strip, rating distribution,
/// sentiment split, sentiment timeline, and the category breakdown.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to analyze reviews  (File → Open…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            metric_strip(ui, state);
            ui.separator();

            ui.columns(2, |cols: &mut [Ui]| {
                rating_chart(&mut cols[0], state);
                sentiment_chart(&mut cols[1], state);
            });

            ui.separator();
            timeline_chart(ui, state);

            ui.separator();
            category_chart(ui, state);

            if !state.breakdown.is_empty() && !state.categories.is_empty() {
                ui.separator();
                breakdown_grid(ui, state);
            }
        });
}

// ---------------------------------------------------------------------------
// Metric strip
// ---------------------------------------------------------------------------

fn metric_strip(ui: &mut Ui, state: &AppState) {
    let s = &state.summary;
    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Total Reviews", format!("{}", s.total));
        metric(
            ui,
            "Average Rating",
            s.average_rating
                .map(|r| format!("{r:.1}"))
                .unwrap_or_else(|| "–".to_string()),
        );
        metric(ui, "Positive Reviews", format!("{:.1}%", s.positive_pct));
        metric(ui, "Negative Reviews", format!("{:.1}%", s.negative_pct));
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).heading());
    });
    ui.add_space(24.0);
}

// ---------------------------------------------------------------------------
// Rating distribution (bar chart)
// ---------------------------------------------------------------------------

fn rating_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Rating Distribution");
    let bars: Vec<Bar> = (1..=5u8)
        .map(|rating| {
            let count = state
                .summary
                .rating_histogram
                .get(&rating)
                .copied()
                .unwrap_or(0);
            Bar::new(rating as f64, count as f64)
                .width(0.6)
                .fill(sentiment_color(Sentiment::from_rating(rating)))
                .name(format!("{rating}★"))
        })
        .collect();

    Plot::new("rating_chart")
        .height(220.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_label("Star Rating")
        .y_axis_label("Reviews")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Reviews by Star Rating"));
        });
}

// ---------------------------------------------------------------------------
// Sentiment split (bar chart)
// ---------------------------------------------------------------------------

fn sentiment_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Sentiment Distribution");
    let sentiments = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];
    let bars: Vec<Bar> = sentiments
        .iter()
        .enumerate()
        .map(|(i, &sentiment)| {
            let count = state
                .summary
                .sentiment_counts
                .get(&sentiment)
                .copied()
                .unwrap_or(0);
            Bar::new(i as f64, count as f64)
                .width(0.6)
                .fill(sentiment_color(sentiment))
                .name(sentiment.label())
        })
        .collect();

    Plot::new("sentiment_chart")
        .height(220.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .y_axis_label("Reviews")
        .show_axes([false, true])
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Sentiment"));
        });
}

// ---------------------------------------------------------------------------
// Sentiment timeline (line chart)
// ---------------------------------------------------------------------------

fn date_to_x(date: NaiveDate) -> f64 {
    date.signed_duration_since(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
        .num_days() as f64
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .map(|epoch| epoch + chrono::Duration::days(x.round() as i64))
}

fn timeline_chart(ui: &mut Ui, state: &AppState) {
    ui.strong(format!(
        "Sentiment Trends Over Time (per {})",
        state.bucket.label().to_lowercase()
    ));
    if state.summary.timeline.is_empty() {
        ui.label("Not enough data points for timeline visualization.");
        return;
    }

    let series = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    Plot::new("timeline_chart")
        .height(260.0)
        .x_axis_formatter(|mark, _range| {
            x_to_date(mark.value)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .y_axis_label("Reviews")
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for sentiment in series {
                let points: PlotPoints = state
                    .summary
                    .timeline
                    .iter()
                    .map(|(date, buckets)| [date_to_x(*date), buckets.get(sentiment) as f64])
                    .collect();
                plot_ui.line(
                    Line::new(points)
                        .name(sentiment.label())
                        .color(sentiment_color(sentiment))
                        .width(1.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Category mentions (bar chart)
// ---------------------------------------------------------------------------

/// One bar per category; a review counts once per category it holds, so the
/// bars may sum to more than the review total.
fn category_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Category Mentions");
    let colors = CategoryColors::default();
    let bars: Vec<Bar> = crate::data::model::Category::ALL
        .into_iter()
        .enumerate()
        .map(|(i, category)| {
            let count = state
                .summary
                .category_counts
                .get(&category)
                .copied()
                .unwrap_or(0);
            Bar::new(i as f64, count as f64)
                .width(0.6)
                .fill(colors.color_for(category))
                .name(category.label())
        })
        .collect();

    Plot::new("category_chart")
        .height(220.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .y_axis_label("Reviews")
        .show_axes([false, true])
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Categories"));
        });
}

// ---------------------------------------------------------------------------
// Category breakdown grid
// ---------------------------------------------------------------------------

fn breakdown_grid(ui: &mut Ui, state: &AppState) {
    ui.strong("Category Analysis");
    let colors = CategoryColors::default();

    egui::Grid::new("category_breakdown")
        .striped(true)
        .num_columns(4)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Category");
            ui.strong("Count");
            ui.strong("Avg Rating");
            ui.strong("Positive %");
            ui.end_row();

            for row in &state.breakdown {
                ui.label(
                    RichText::new(row.category.label()).color(colors.color_for(row.category)),
                );
                ui.label(format!("{}", row.count));
                ui.label(format!("{:.1}", row.average_rating));
                ui.label(format!("{:.1}%", row.positive_pct));
                ui.end_row();
            }
        });
}
