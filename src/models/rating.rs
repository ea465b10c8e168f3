use crate::errors::RatingError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::convert::TryFrom;
use std::fmt;

/// A star rating, always one of 1..=5.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct RatingValue(u8);

impl RatingValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Every valid rating, lowest first.
    pub fn all() -> impl Iterator<Item = RatingValue> {
        (Self::MIN..=Self::MAX).map(RatingValue)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Validates a rating as it arrives on the wire: a JSON integer or a
    /// string holding one. Fractions, booleans and anything else are refused.
    pub fn parse(raw: &serde_json::Value) -> Result<Self, RatingError> {
        match raw {
            serde_json::Value::Number(number) => number
                .as_i64()
                .ok_or_else(|| RatingError::InvalidRating(number.to_string()))
                .and_then(Self::try_from),
            serde_json::Value::String(text) => text.parse::<Self>(),
            other => Err(RatingError::InvalidRating(other.to_string())),
        }
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(RatingValue(value as u8))
        } else {
            Err(RatingError::InvalidRating(value.to_string()))
        }
    }
}

impl std::str::FromStr for RatingValue {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map_err(|_| RatingError::InvalidRating(s.to_string()))
            .and_then(Self::try_from)
    }
}

impl From<RatingValue> for i32 {
    fn from(value: RatingValue) -> Self {
        value.0 as i32
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Absent comments are stored as the empty string so the comment log stays
/// aligned with the number of ratings.
pub fn normalize_comment(comment: Option<String>) -> String {
    comment.unwrap_or_default()
}

/// One rating submission. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingEvent {
    pub product_id: i32,
    pub rating: RatingValue,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
