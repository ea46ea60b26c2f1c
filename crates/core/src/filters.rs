//! Structured search constraints
//!
//! `FilterSpec` is replaced, never edited in place: every user edit produces a
//! `FilterPatch` which is merged into a fresh `FilterSpec`. Nested year-range bounds
//! merge field by field, so a patch carrying only `start` keeps the existing
//! `end`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Genre value meaning "no genre constraint"
pub const ALL_GENRES: &str = "All Genres";

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// Error type for filter validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("rating {0} is outside the 0-5 range")]
    RatingOutOfRange(f64),

    #[error("minimum rating {min} is greater than maximum rating {max}")]
    InvertedRatingRange { min: f64, max: f64 },

    #[error("start year {start} is after end year {end}")]
    InvertedYearRange { start: i32, end: i32 },

    #[error("unknown sort field: {0} (expected title, author, rating, publicationDate or price)")]
    UnknownSortField(String),

    #[error("unknown sort order: {0} (expected asc or desc)")]
    UnknownSortOrder(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortField {
    #[default]
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "author")]
    Author,
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "publicationDate")]
    PublicationDate,
    #[serde(rename = "price")]
    Price,
}

impl SortField {
    /// Value sent as `sort_by`
    pub fn as_param(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Author => "author",
            SortField::Rating => "rating",
            SortField::PublicationDate => "publicationDate",
            SortField::Price => "price",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for SortField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "author" => Ok(SortField::Author),
            "rating" => Ok(SortField::Rating),
            "publicationdate" | "publication-date" | "publication_date" | "date" => {
                Ok(SortField::PublicationDate)
            }
            "price" => Ok(SortField::Price),
            _ => Err(FilterError::UnknownSortField(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Value sent as `sort_order`
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for SortOrder {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(FilterError::UnknownSortOrder(s.to_string())),
        }
    }
}

/// Publication-year bounds. A missing bound means "unbounded on that side".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YearRange {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Both bounds, when both are set
    pub fn bounds(&self) -> Option<(i32, i32)> {
        self.start.zip(self.end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Current search constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub genre: String,
    pub min_rating: f64,
    pub max_rating: f64,
    pub author: String,
    pub year_range: YearRange,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            genre: ALL_GENRES.to_string(),
            min_rating: MIN_RATING,
            max_rating: MAX_RATING,
            author: String::new(),
            year_range: YearRange::default(),
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl FilterSpec {
    /// Merge a partial update into a copy of these filters
    ///
    /// Only the fields present in `patch` change. The result is validated and
    /// `self` is left untouched when validation fails.
    pub fn merged(&self, patch: &FilterPatch) -> Result<FilterSpec, FilterError> {
        let mut next = self.clone();

        if let Some(genre) = &patch.genre {
            next.genre = genre.clone();
        }
        if let Some(min_rating) = patch.min_rating {
            next.min_rating = min_rating;
        }
        if let Some(max_rating) = patch.max_rating {
            next.max_rating = max_rating;
        }
        if let Some(author) = &patch.author {
            next.author = author.clone();
        }
        if let Some(years) = &patch.year_range {
            if let Some(start) = years.start {
                next.year_range.start = start;
            }
            if let Some(end) = years.end {
                next.year_range.end = end;
            }
        }
        if let Some(sort_by) = patch.sort_by {
            next.sort_by = sort_by;
        }
        if let Some(sort_order) = patch.sort_order {
            next.sort_order = sort_order;
        }

        next.validate()?;
        Ok(next)
    }

    /// Check the rating and year range invariants
    pub fn validate(&self) -> Result<(), FilterError> {
        for rating in [self.min_rating, self.max_rating] {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(FilterError::RatingOutOfRange(rating));
            }
        }

        if self.min_rating > self.max_rating {
            return Err(FilterError::InvertedRatingRange {
                min: self.min_rating,
                max: self.max_rating,
            });
        }

        if let Some((start, end)) = self.year_range.bounds() {
            if start > end {
                return Err(FilterError::InvertedYearRange { start, end });
            }
        }

        Ok(())
    }

    /// Genre to constrain on, `None` for the sentinel
    pub fn genre_constraint(&self) -> Option<&str> {
        let genre = self.genre.trim();
        if genre.is_empty() || genre == ALL_GENRES {
            None
        } else {
            Some(genre)
        }
    }

    /// Whether any constraint is narrower than the defaults. Sorting does not count.
    pub fn is_active(&self) -> bool {
        self.genre_constraint().is_some()
            || self.min_rating > MIN_RATING
            || self.max_rating < MAX_RATING
            || !self.author.trim().is_empty()
            || !self.year_range.is_unbounded()
    }
}

/// Partial year-range update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YearRangePatch {
    /// `Some(None)` clears the bound, `None` keeps it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Option<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Option<i32>>,
}

/// Partial filter update. Allows to specify only a few fields and patch the current filters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_range: Option<YearRangePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl FilterPatch {
    pub fn genre(genre: impl Into<String>) -> Self {
        Self {
            genre: Some(genre.into()),
            ..Self::default()
        }
    }

    pub fn rating(min: f64, max: f64) -> Self {
        Self {
            min_rating: Some(min),
            max_rating: Some(max),
            ..Self::default()
        }
    }

    pub fn author(author: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            ..Self::default()
        }
    }

    pub fn years(start: Option<i32>, end: Option<i32>) -> Self {
        Self {
            year_range: Some(YearRangePatch {
                start: Some(start),
                end: Some(end),
            }),
            ..Self::default()
        }
    }

    pub fn year_start(start: i32) -> Self {
        Self {
            year_range: Some(YearRangePatch {
                start: Some(Some(start)),
                end: None,
            }),
            ..Self::default()
        }
    }

    pub fn year_end(end: i32) -> Self {
        Self {
            year_range: Some(YearRangePatch {
                start: None,
                end: Some(Some(end)),
            }),
            ..Self::default()
        }
    }

    pub fn sort(sort_by: SortField, sort_order: Option<SortOrder>) -> Self {
        Self {
            sort_by: Some(sort_by),
            sort_order,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_is_unconstrained() {
        let spec = FilterSpec::default();

        assert_eq!(spec.genre, ALL_GENRES);
        assert_eq!(spec.min_rating, 0.0);
        assert_eq!(spec.max_rating, 5.0);
        assert!(spec.author.is_empty());
        assert!(spec.year_range.is_unbounded());
        assert_eq!(spec.sort_by, SortField::Title);
        assert_eq!(spec.sort_order, SortOrder::Asc);
        assert!(!spec.is_active());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_merge_overwrites_only_supplied_fields() {
        let base = FilterSpec {
            author: "Le Guin".to_string(),
            sort_by: SortField::Rating,
            ..FilterSpec::default()
        };

        let merged = base.merged(&FilterPatch::genre("Fantasy")).unwrap();

        assert_eq!(merged.genre, "Fantasy");
        assert_eq!(merged.author, "Le Guin");
        assert_eq!(merged.sort_by, SortField::Rating);
        assert_eq!(merged.min_rating, 0.0);
    }

    #[test]
    fn test_merge_year_start_preserves_end() {
        let base = FilterSpec {
            year_range: YearRange::new(1900, 2020),
            ..FilterSpec::default()
        };

        let merged = base.merged(&FilterPatch::year_start(1950)).unwrap();

        assert_eq!(merged.year_range, YearRange::new(1950, 2020));
    }

    #[test]
    fn test_merge_year_end_preserves_start() {
        let base = FilterSpec {
            year_range: YearRange::new(1900, 2020),
            ..FilterSpec::default()
        };

        let merged = base.merged(&FilterPatch::year_end(1990)).unwrap();

        assert_eq!(merged.year_range, YearRange::new(1900, 1990));
    }

    #[test]
    fn test_merge_can_clear_a_year_bound() {
        let base = FilterSpec {
            year_range: YearRange::new(1900, 2020),
            ..FilterSpec::default()
        };
        let patch = FilterPatch {
            year_range: Some(YearRangePatch {
                start: Some(None),
                end: None,
            }),
            ..FilterPatch::default()
        };

        let merged = base.merged(&patch).unwrap();

        assert_eq!(merged.year_range.start, None);
        assert_eq!(merged.year_range.end, Some(2020));
    }

    #[test]
    fn test_merge_from_json_partial() {
        let base = FilterSpec {
            year_range: YearRange::new(1900, 2020),
            ..FilterSpec::default()
        };
        let patch: FilterPatch =
            serde_json::from_str(r#"{"yearRange": {"start": 1950}, "minRating": 3}"#).unwrap();

        let merged = base.merged(&patch).unwrap();

        assert_eq!(merged.year_range, YearRange::new(1950, 2020));
        assert_eq!(merged.min_rating, 3.0);
        assert_eq!(merged.max_rating, 5.0);
    }

    #[test]
    fn test_merge_rejects_inverted_ratings() {
        let base = FilterSpec::default();
        let result = base.merged(&FilterPatch::rating(4.0, 2.0));

        assert_eq!(
            result,
            Err(FilterError::InvertedRatingRange { min: 4.0, max: 2.0 })
        );
    }

    #[test]
    fn test_merge_rejects_rating_out_of_range() {
        let base = FilterSpec::default();

        assert_eq!(
            base.merged(&FilterPatch::rating(0.0, 6.0)),
            Err(FilterError::RatingOutOfRange(6.0))
        );
        assert_eq!(
            base.merged(&FilterPatch::rating(-1.0, 5.0)),
            Err(FilterError::RatingOutOfRange(-1.0))
        );
    }

    #[test]
    fn test_merge_rejects_inverted_years() {
        let base = FilterSpec {
            year_range: YearRange::new(1950, 1960),
            ..FilterSpec::default()
        };

        assert_eq!(
            base.merged(&FilterPatch::year_start(1970)),
            Err(FilterError::InvertedYearRange {
                start: 1970,
                end: 1960
            })
        );
    }

    #[test]
    fn test_merge_empty_patch_is_identity() {
        let base = FilterSpec {
            genre: "Horror".to_string(),
            ..FilterSpec::default()
        };
        let patch = FilterPatch::default();

        assert!(patch.is_empty());
        assert_eq!(base.merged(&patch).unwrap(), base);
    }

    #[test]
    fn test_genre_constraint() {
        let mut spec = FilterSpec::default();
        assert_eq!(spec.genre_constraint(), None);

        spec.genre = String::new();
        assert_eq!(spec.genre_constraint(), None);

        spec.genre = "Sci-Fi".to_string();
        assert_eq!(spec.genre_constraint(), Some("Sci-Fi"));
    }

    #[test]
    fn test_is_active() {
        let base = FilterSpec::default();

        assert!(base.merged(&FilterPatch::genre("Poetry")).unwrap().is_active());
        assert!(base.merged(&FilterPatch::rating(1.0, 5.0)).unwrap().is_active());
        assert!(base.merged(&FilterPatch::rating(0.0, 4.0)).unwrap().is_active());
        assert!(base.merged(&FilterPatch::author("Austen")).unwrap().is_active());
        assert!(base.merged(&FilterPatch::year_start(1900)).unwrap().is_active());
        assert!(!base.merged(&FilterPatch::author("   ")).unwrap().is_active());
        assert!(!base
            .merged(&FilterPatch::sort(SortField::Price, Some(SortOrder::Desc)))
            .unwrap()
            .is_active());
    }

    #[test]
    fn test_sort_field_from_str() {
        assert_eq!("title".parse::<SortField>().unwrap(), SortField::Title);
        assert_eq!("Rating".parse::<SortField>().unwrap(), SortField::Rating);
        assert_eq!(
            "publicationDate".parse::<SortField>().unwrap(),
            SortField::PublicationDate
        );
        assert_eq!(
            "publication-date".parse::<SortField>().unwrap(),
            SortField::PublicationDate
        );
        assert!("pages".parse::<SortField>().is_err());
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert_eq!("descending".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_field_serializes_wire_names() {
        assert_eq!(
            serde_json::to_string(&SortField::PublicationDate).unwrap(),
            "\"publicationDate\""
        );
        assert_eq!(serde_json::to_string(&SortOrder::Desc).unwrap(), "\"desc\"");
    }
}
