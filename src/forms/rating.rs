use crate::errors::RatingError;
use crate::models::{normalize_comment, RatingValue};
use serde::Deserialize;
use serde_valid::Validate;

/// Vote submitted by a client. Older clients send `ratings`/`comments`.
#[derive(Deserialize, Debug, Default, Validate)]
pub struct RatingForm {
    #[serde(default, alias = "ratings")]
    pub rating: Option<serde_json::Value>, // number or numeric string
    #[serde(default, alias = "comments")]
    #[validate(max_length = 1000)]
    pub comment: Option<String>,
}

impl RatingForm {
    pub fn rating(&self) -> Result<RatingValue, RatingError> {
        self.rating
            .as_ref()
            .ok_or(RatingError::MissingField("You must provide rating in 1 to 5"))
            .and_then(RatingValue::parse)
    }

    pub fn comment(&self) -> String {
        normalize_comment(self.comment.clone())
    }
}
