//! Vote aggregation over either per-product tallies or raw rating events.
//!
//! The tally backend answers "how many votes per rating right now", summing the
//! tally of every live product. The event backend answers the same question for
//! a closed time window and, like a SQL `GROUP BY`, leaves out ratings that got
//! no votes in that window.

use crate::models::{RatingEvent, Tally, TimeWindow, Votes};

/// What an administrator asks for when reading aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteQuery {
    Overall,
    Window(TimeWindow),
}

pub fn overall_votes<'a, I>(tallies: I) -> Votes
where
    I: IntoIterator<Item = &'a Tally>,
{
    tallies
        .into_iter()
        .fold(Votes::zeroed(), |mut votes, tally| {
            for (rating, count) in tally.iter() {
                votes.add(rating, count);
            }
            votes
        })
}

pub fn windowed_votes<'a, I>(events: I, window: &TimeWindow) -> Votes
where
    I: IntoIterator<Item = &'a RatingEvent>,
{
    events
        .into_iter()
        .filter(|event| window.contains(event.created_at))
        .map(|event| (event.rating, 1))
        .collect()
}
