use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Catalog entry as returned by the book service
///
/// Records are snapshots: every fetch replaces them wholesale, nothing
/// mutates a record after it has been decoded.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BookRecord {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub genre: String,
    #[serde(deserialize_with = "de_decimal")]
    pub rating: f64,
    pub publication_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub pages: u32,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(deserialize_with = "de_decimal")]
    pub price: f64,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl BookRecord {
    /// Year the book was published, if the date can be read
    pub fn publication_year(&self) -> Option<i32> {
        parse_year(&self.publication_date)
    }

    /// Cover reference, ignoring blank values
    pub fn cover_reference(&self) -> Option<&str> {
        self.cover_image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Accepts a JSON number or a decimal string ("12.99").
///
/// Django REST Framework renders `DecimalField` values as strings by default.
fn de_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Number(f64),
        Text(String),
    }

    match Decimal::deserialize(deserializer)? {
        Decimal::Number(n) => Ok(n),
        Decimal::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid decimal {s:?}: {e}"))),
    }
}

/// Extract the year from a `YYYY-MM-DD` date, or from a bare leading year
pub fn parse_year(date: &str) -> Option<i32> {
    let date = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year());
    }

    let digits: String = date.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

/// Convert an RFC 3339 timestamp to a short UTC string
pub fn format_timestamp(timestamp: &str) -> Option<String> {
    let dt = DateTime::parse_from_rfc3339(timestamp.trim()).ok()?;
    Some(dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string())
}

/// Five-star rendering of a 0-5 rating, e.g. `★★★★☆ 4.2`
pub fn star_rating(rating: f64) -> String {
    let filled = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{} {:.1}", "★".repeat(filled), "☆".repeat(5 - filled), rating)
}
