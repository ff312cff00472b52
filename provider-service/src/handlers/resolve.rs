use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use validator::Validate;

use crate::models::{Channel, RequestContext, ResolvedProviderList, UserIdentity};
use crate::services::{ResolutionSource, ResolveOptions};
use crate::startup::AppState;
use service_core::error::AppError;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

#[derive(Debug, Deserialize, Validate)]
pub struct ResolveProvidersRequest {
    pub channel: Channel,
    #[validate(length(min = 1, message = "Login must not be empty"))]
    pub login: String,
    #[serde(default)]
    pub realm: String,
    pub scope: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveProvidersResponse {
    pub channel: Channel,
    pub providers: ResolvedProviderList,
    pub source: ResolutionSource,
    pub policies: Vec<String>,
}

#[tracing::instrument(skip(state, peer, headers, request), fields(peer = %peer))]
pub async fn resolve_providers(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<ResolveProvidersRequest>,
) -> Result<Json<ResolveProvidersResponse>, AppError> {
    request.validate()?;

    let context = RequestContext::with_client(client_address(&headers, peer));
    let user = UserIdentity::new(request.login, request.realm);
    let options = ResolveOptions {
        scope: request.scope,
        action: request.action,
        realm: None,
    };

    let resolution = state
        .resolver
        .resolve_with(request.channel, &user, &context, &options)
        .await?;

    Ok(Json(ResolveProvidersResponse {
        channel: request.channel,
        providers: resolution.providers,
        source: resolution.source,
        policies: resolution.policies,
    }))
}

/// First `X-Forwarded-For` entry, else the peer address.
fn client_address(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.ip().to_string())
}
