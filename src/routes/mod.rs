pub mod admin;
pub mod health_checks;
pub mod product;

pub use health_checks::*;

use crate::middleware::authentication::{CredentialVerifier, Manager};
use actix_web::web;
use std::sync::Arc;

/// Public product routes and the admin routes behind the credential check.
pub fn configure(cfg: &mut web::ServiceConfig, verifier: Arc<dyn CredentialVerifier>) {
    cfg.service(
        web::scope("/products")
            .service(product::list_handler)
            .service(product::get_handler)
            .service(product::rate_handler),
    )
    .service(
        web::scope("/admin")
            .wrap(Manager::new(verifier))
            .service(admin::votes_handler)
            .service(admin::add_handler)
            .service(admin::delete_handler),
    );
}
