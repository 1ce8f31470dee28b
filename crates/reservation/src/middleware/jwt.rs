use axum::{
    Extension,
    body::Body,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use shared::{abstract_trait::DynJwtService, errors::HttpError};
use tracing::debug;

/// Requester identity for routes where a token is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer(pub Option<i32>);

fn extract_token(cookie_jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    cookie_jar
        .get("token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| auth_value.strip_prefix("Bearer ").map(str::to_owned))
        })
}

fn resolve_user(jwt: &DynJwtService, token: &str) -> Result<i32, HttpError> {
    let user_id = jwt
        .verify_token(token, "access")
        .map_err(|_| HttpError::Unauthorized("Invalid token".to_string()))?;

    i32::try_from(user_id).map_err(|_| HttpError::Unauthorized("Invalid token".to_string()))
}

pub async fn auth_middleware(
    cookie_jar: CookieJar,
    Extension(jwt): Extension<DynJwtService>,
    mut req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = extract_token(&cookie_jar, req.headers()).ok_or_else(|| {
        HttpError::Unauthorized("You are not logged in, please provide token".to_string())
    })?;

    let user_id = resolve_user(&jwt, &token)?;

    req.extensions_mut().insert(user_id);

    Ok(next.run(req).await)
}

/// Like [`auth_middleware`] but never rejects; a missing or bad token yields
/// an anonymous [`Viewer`].
pub async fn optional_auth_middleware(
    cookie_jar: CookieJar,
    Extension(jwt): Extension<DynJwtService>,
    mut req: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let viewer = match extract_token(&cookie_jar, req.headers()) {
        Some(token) => match resolve_user(&jwt, &token) {
            Ok(user_id) => Some(user_id),
            Err(_) => {
                debug!("Ignoring invalid token on public route");
                None
            }
        },
        None => None,
    };

    req.extensions_mut().insert(Viewer(viewer));

    next.run(req).await
}
