use crate::errors::RatingError;
use crate::models::RatingValue;
use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregated vote counts keyed by rating value.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Votes(BTreeMap<RatingValue, u64>);

impl Votes {
    /// Every rating present, each with a zero count.
    pub fn zeroed() -> Self {
        Self(RatingValue::all().map(|rating| (rating, 0)).collect())
    }

    pub fn add(&mut self, rating: RatingValue, count: u64) {
        *self.0.entry(rating).or_insert(0) += count;
    }

    pub fn get(&self, rating: RatingValue) -> Option<u64> {
        self.0.get(&rating).copied()
    }

    pub fn merge(mut self, other: &Votes) -> Self {
        for (rating, count) in other.iter() {
            self.add(rating, count);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (RatingValue, u64)> + '_ {
        self.0.iter().map(|(rating, count)| (*rating, *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(RatingValue, u64)> for Votes {
    fn from_iter<I: IntoIterator<Item = (RatingValue, u64)>>(iter: I) -> Self {
        let mut votes = Votes::default();
        for (rating, count) in iter {
            votes.add(rating, count);
        }
        votes
    }
}

/// Closed interval `[start, end]`, both bounds inclusive.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Precision of stored rating timestamps.
pub const TIMESTAMP_DIGITS: u16 = 6;

impl TimeWindow {
    /// Bounds are truncated to microseconds, the precision events are stored with.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RatingError> {
        let start = start.trunc_subsecs(TIMESTAMP_DIGITS);
        let end = end.trunc_subsecs(TIMESTAMP_DIGITS);
        if start > end {
            return Err(RatingError::InvalidWindow);
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}
