use crate::configuration::{SeedProduct, Settings};
use crate::db::ProductRepository;
use crate::errors::RatingError;
use crate::helpers::JsonResponse;
use crate::middleware::authentication::{CredentialVerifier, StaticCredentials};
use crate::routes;
use actix_cors::Cors;
use actix_web::{dev::Server, error, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

/// Prefix the first generation of clients talks to.
pub const API_PREFIX: &str = "/ratings/api/v2.0";

pub async fn run(
    listener: TcpListener,
    repository: Arc<dyn ProductRepository>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let verifier: Arc<dyn CredentialVerifier> = Arc::new(StaticCredentials::from(&settings.admin));
    let repository = web::Data::new(repository);

    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let msg = match &err {
            error::JsonPayloadError::Deserialize(err) => format!(
                "Malformed request body at line {}, column {}: {}",
                err.line(),
                err.column(),
                err
            ),
            other => format!("Malformed request body: {}", other),
        };
        JsonResponse::<serde_json::Value>::build().bad_request(msg)
    });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(json_config.clone())
            .app_data(repository.clone())
            .service(web::scope("/health_check").service(routes::health_check))
            .service(
                web::scope(API_PREFIX).configure(|cfg| routes::configure(cfg, verifier.clone())),
            )
            .configure(|cfg| routes::configure(cfg, verifier.clone()))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Creates the configured starter products that don't exist yet.
pub async fn seed_products(
    repository: &dyn ProductRepository,
    seed: &[SeedProduct],
) -> Result<(), RatingError> {
    for product in seed {
        match repository.create(product.id, product.name.clone()).await {
            Ok(_) => tracing::info!("Seeded product {}", product.id),
            Err(RatingError::DuplicateId(id)) => tracing::debug!("Product {} already present", id),
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
