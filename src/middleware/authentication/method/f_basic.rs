use crate::errors::RatingError;
use crate::middleware::authentication::{get_header, CredentialVerifier};
use crate::models;
use actix_web::dev::ServiceRequest;
use base64::{engine::general_purpose::STANDARD, Engine as _};

fn basic_credentials(req: &ServiceRequest) -> Result<Option<(String, String)>, String> {
    let header = match get_header::<String>(req, "authorization")? {
        Some(header) => header,
        None => return Ok(None),
    };

    let (scheme, encoded) = header
        .split_once(' ')
        .ok_or_else(|| "malformed authorization header".to_string())?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(format!("unsupported authorization scheme {scheme}"));
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| "credentials are not valid base64".to_string())?;
    let decoded = String::from_utf8(decoded).map_err(|_| "credentials are not utf-8".to_string())?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| "credentials must be username:password".to_string())?;

    Ok(Some((username.to_string(), password.to_string())))
}

/// HTTP Basic check against the configured verifier. Every request is checked
/// on its own; nothing is remembered between requests.
#[tracing::instrument(name = "authenticate admin via basic auth", skip_all)]
pub fn try_basic(
    req: &ServiceRequest,
    verifier: &dyn CredentialVerifier,
) -> Result<models::Admin, RatingError> {
    let (username, password) = match basic_credentials(req) {
        Ok(Some(credentials)) => credentials,
        Ok(None) => {
            tracing::warn!("admin request without credentials");
            return Err(RatingError::Forbidden);
        }
        Err(msg) => {
            tracing::warn!("admin request with unusable credentials: {}", msg);
            return Err(RatingError::Forbidden);
        }
    };

    if !verifier.verify(&username, &password) {
        tracing::warn!(username = %username, "admin credentials rejected");
        return Err(RatingError::Forbidden);
    }

    Ok(models::Admin { username })
}
