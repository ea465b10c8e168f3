use crate::models;
use serde::Serialize;
use std::convert::From;

/// Product as listed publicly.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub id: i32,
    pub name: String,
}

impl From<models::Product> for Summary {
    fn from(product: models::Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
        }
    }
}

/// Product with its tally and comment log.
#[derive(Debug, Serialize)]
pub struct Detail {
    pub id: i32,
    pub name: String,
    pub ratings: models::Tally,
    pub comments: Vec<String>,
}

impl From<models::Product> for Detail {
    fn from(product: models::Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            ratings: product.ratings,
            comments: product.comments,
        }
    }
}
