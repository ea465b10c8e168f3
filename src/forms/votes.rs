use crate::errors::RatingError;
use crate::helpers::parse_timestamp;
use crate::models::TimeWindow;
use crate::services::VoteQuery;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const DEFAULT_WINDOW_START: &str = "2015-01-01 00:00:00";

/// Query string of the admin aggregate endpoint.
#[derive(Deserialize, Debug, Default)]
pub struct VotesQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl VotesQuery {
    /// No bounds means overall votes. With at least one bound the other one
    /// falls back to the service epoch or to `now`.
    pub fn to_query(&self, now: DateTime<Utc>) -> Result<VoteQuery, RatingError> {
        if self.start.is_none() && self.end.is_none() {
            return Ok(VoteQuery::Overall);
        }

        let start = parse_timestamp(self.start.as_deref().unwrap_or(DEFAULT_WINDOW_START))
            .map_err(RatingError::Validation)?;
        let end = match self.end.as_deref() {
            Some(end) => parse_timestamp(end).map_err(RatingError::Validation)?,
            None => now,
        };

        TimeWindow::new(start, end).map(VoteQuery::Window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn no_bounds_means_overall() {
        assert_eq!(VotesQuery::default().to_query(now()).unwrap(), VoteQuery::Overall);
    }

    #[test]
    fn missing_bound_falls_back() {
        let query = VotesQuery {
            start: None,
            end: Some("2015-09-21 10:45:00".into()),
        };
        match query.to_query(now()).unwrap() {
            VoteQuery::Window(window) => {
                assert_eq!(window.start, Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap());
                assert_eq!(window.end, Utc.with_ymd_and_hms(2015, 9, 21, 10, 45, 0).unwrap());
            }
            other => panic!("expected a window, got {other:?}"),
        }

        let query = VotesQuery {
            start: Some("2015-09-21T10:00:00Z".into()),
            end: None,
        };
        match query.to_query(now()).unwrap() {
            VoteQuery::Window(window) => assert_eq!(window.end, now()),
            other => panic!("expected a window, got {other:?}"),
        }
    }

    #[test]
    fn bad_bounds_are_rejected() {
        let query = VotesQuery {
            start: Some("not a date".into()),
            end: None,
        };
        assert!(matches!(query.to_query(now()), Err(RatingError::Validation(_))));

        let query = VotesQuery {
            start: Some("2015-09-21 11:00:00".into()),
            end: Some("2015-09-21 10:00:00".into()),
        };
        assert!(matches!(query.to_query(now()), Err(RatingError::InvalidWindow)));
    }
}
