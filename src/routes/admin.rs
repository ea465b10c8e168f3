use crate::db::ProductRepository;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use crate::views;
use actix_web::{delete, get, post, web, Responder, Result};
use chrono::Utc;
use serde_valid::Validate;
use std::sync::Arc;

#[tracing::instrument(name = "Admin add product.", skip(repository))]
#[post("")]
pub async fn add_handler(
    admin: web::ReqData<Arc<models::Admin>>,
    form: web::Json<forms::ProductForm>,
    repository: web::Data<Arc<dyn ProductRepository>>,
) -> Result<impl Responder> {
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<views::product::Detail>::build().bad_request(errors.to_string()));
    }

    let (id, name) = form.into_inner().into_parts()?;
    let product = repository.create(id, name).await?;
    tracing::info!("Product {} added by {}", product.id, admin.username);

    Ok(JsonResponse::build()
        .set_id(product.id)
        .set_item(views::product::Detail::from(product))
        .created("New product successfully added"))
}

#[tracing::instrument(name = "Admin delete product.", skip(repository))]
#[delete("/{id}")]
pub async fn delete_handler(
    admin: web::ReqData<Arc<models::Admin>>,
    path: web::Path<(i32,)>,
    repository: web::Data<Arc<dyn ProductRepository>>,
) -> Result<impl Responder> {
    let (id,) = path.into_inner();
    repository.delete(id).await?;
    tracing::info!("Product {} deleted by {}", id, admin.username);

    Ok(JsonResponse::<views::product::Detail>::build()
        .set_id(id)
        .ok("Product successfully deleted"))
}

#[tracing::instrument(name = "Admin get votes.", skip(repository))]
#[get("")]
pub async fn votes_handler(
    admin: web::ReqData<Arc<models::Admin>>,
    query: web::Query<forms::VotesQuery>,
    repository: web::Data<Arc<dyn ProductRepository>>,
) -> Result<impl Responder> {
    let query = query.to_query(Utc::now())?;
    let votes = repository.votes(query).await?;

    Ok(JsonResponse::build()
        .set_item(views::votes::Report::new(query, votes))
        .ok("OK"))
}
