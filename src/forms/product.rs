use crate::errors::RatingError;
use serde::Deserialize;
use serde_valid::Validate;

#[derive(Deserialize, Debug, Default, Validate)]
pub struct ProductForm {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    #[validate(min_length = 1)]
    #[validate(max_length = 255)]
    pub name: Option<String>,
}

impl ProductForm {
    /// Both fields are required; the id is checked first.
    pub fn into_parts(self) -> Result<(i32, String), RatingError> {
        let id = self.id.ok_or(RatingError::MissingField("No product id provided"))?;
        let name = self
            .name
            .ok_or(RatingError::MissingField("No product name provided"))?;
        Ok((id, name))
    }
}
