use crate::models::Votes;
use crate::services::VoteQuery;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    pub votes: Votes,
}

impl Report {
    pub fn new(query: VoteQuery, votes: Votes) -> Self {
        match query {
            VoteQuery::Overall => Self {
                start: None,
                end: None,
                votes,
            },
            VoteQuery::Window(window) => Self {
                start: Some(window.start),
                end: Some(window.end),
                votes,
            },
        }
    }
}
