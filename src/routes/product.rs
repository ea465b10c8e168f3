use crate::db::ProductRepository;
use crate::errors::RatingError;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::views;
use actix_web::http::StatusCode;
use actix_web::{get, put, web, Responder, Result};
use serde_valid::Validate;
use std::sync::Arc;

#[tracing::instrument(name = "List products.", skip(repository))]
#[get("")]
pub async fn list_handler(
    repository: web::Data<Arc<dyn ProductRepository>>,
) -> Result<impl Responder> {
    let products = repository
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect::<Vec<views::product::Summary>>();

    Ok(JsonResponse::build().set_list(products).ok("OK"))
}

#[tracing::instrument(name = "Get product.", skip(repository))]
#[get("/{id}")]
pub async fn get_handler(
    path: web::Path<(i32,)>,
    repository: web::Data<Arc<dyn ProductRepository>>,
) -> Result<impl Responder> {
    let (id,) = path.into_inner();
    let product = repository.get(id).await?;

    Ok(JsonResponse::build()
        .set_id(id)
        .set_item(views::product::Detail::from(product))
        .ok("OK"))
}

#[tracing::instrument(name = "Rate product.", skip(repository))]
#[put("/{id}")]
pub async fn rate_handler(
    path: web::Path<(i32,)>,
    form: web::Json<forms::RatingForm>,
    repository: web::Data<Arc<dyn ProductRepository>>,
) -> Result<impl Responder> {
    let (id,) = path.into_inner();
    // an unknown product wins over a bad vote
    if !repository.exists(id).await? {
        return Err(RatingError::NotFound(id).into());
    }

    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<views::product::Detail>::build().bad_request(errors.to_string()));
    }

    let rating = match form.rating() {
        Ok(rating) => rating,
        Err(RatingError::InvalidRating(raw)) => {
            tracing::info!("Rejected rating {} for product {}", raw, id);
            return Ok(JsonResponse::<views::product::Detail>::build()
                .set_id(id)
                .failure(
                    StatusCode::BAD_REQUEST,
                    "Failed! Please enter your rating between 1 to 5",
                ));
        }
        Err(err) => return Err(err.into()),
    };

    let product = repository.record(id, rating, form.comment()).await?;

    Ok(JsonResponse::build()
        .set_id(id)
        .set_item(views::product::Detail::from(product))
        .accepted("Your rating successfully added"))
}
