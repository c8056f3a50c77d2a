//! Authentication and authorization
//!
//! Bearer tokens come from configuration. Each route needs the permission
//! `<collection>:read` for GET and `<collection>:write` for anything else.
//! `/debug/vars` needs `metrics:view`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request},
    middleware::Next,
    response::Response,
};

use crate::config::TokenGrant;
use crate::error::ApiError;
use crate::AppState;

/// Paths reachable without a token.
const PUBLIC_PATHS: &[&str] = &["/v1/healthcheck"];

/// Operational endpoints and the permission each needs, whatever the method.
const OPERATOR_PATHS: &[(&str, &str)] = &[("/debug/vars", "metrics:view")];

/// Permission codes granted to each configured token.
#[derive(Debug, Clone, Default)]
pub struct AccessTable {
    grants: HashMap<String, HashSet<String>>,
}

impl AccessTable {
    pub fn from_grants(grants: &[TokenGrant]) -> Self {
        let mut table = AccessTable::default();
        for grant in grants {
            table
                .grants
                .entry(grant.token.clone())
                .or_default()
                .extend(grant.permissions.iter().cloned());
        }
        table
    }

    pub fn permissions(&self, token: &str) -> Option<&HashSet<String>> {
        self.grants.get(token)
    }
}

/// The permission a request needs, or `None` for public paths.
pub fn required_permission(method: &Method, path: &str) -> Option<String> {
    if PUBLIC_PATHS.contains(&path) {
        return None;
    }
    if let Some((_, permission)) = OPERATOR_PATHS.iter().find(|(p, _)| *p == path) {
        return Some(permission.to_string());
    }
    let collection = path.strip_prefix("/v1/")?.split('/').next()?;
    if collection.is_empty() {
        return None;
    }
    let action = if method == Method::GET || method == Method::HEAD {
        "read"
    } else {
        "write"
    };
    Some(format!("{}:{}", collection, action))
}

fn bearer_token(request: &Request<Body>) -> Result<&str, ApiError> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::AuthenticationRequired)?;

    header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::InvalidToken)
}

/// Rejects requests whose token lacks the route's permission
pub async fn require_permission(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(permission) = required_permission(request.method(), request.uri().path()) else {
        return Ok(next.run(request).await);
    };

    let token = bearer_token(&request)?;
    let granted = state
        .access
        .permissions(token)
        .ok_or(ApiError::InvalidToken)?;

    if !granted.contains(&permission) {
        tracing::debug!(%permission, "permission denied");
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(request).await)
}
