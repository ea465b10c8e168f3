use crate::models::RatingValue;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Vote count per rating value. All five buckets always exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally([u64; 5]);

impl Tally {
    pub fn increment(&mut self, rating: RatingValue) {
        self.0[Self::slot(rating)] += 1;
    }

    pub fn count(&self, rating: RatingValue) -> u64 {
        self.0[Self::slot(rating)]
    }

    pub fn set(&mut self, rating: RatingValue, count: u64) {
        self.0[Self::slot(rating)] = count;
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RatingValue, u64)> + '_ {
        RatingValue::all().map(move |rating| (rating, self.count(rating)))
    }

    fn slot(rating: RatingValue) -> usize {
        (rating.get() - RatingValue::MIN) as usize
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        for (rating, count) in self.iter() {
            map.serialize_entry(&rating, &count)?;
        }
        map.end()
    }
}

/// A rated catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub ratings: Tally,
    pub comments: Vec<String>,
}

impl Product {
    pub fn new(id: i32, name: String) -> Self {
        Self {
            id,
            name,
            ratings: Tally::default(),
            comments: vec![],
        }
    }

    /// Counts the vote and logs its comment in one step.
    pub fn rate(&mut self, rating: RatingValue, comment: String) {
        self.ratings.increment(rating);
        self.comments.push(comment);
    }
}
