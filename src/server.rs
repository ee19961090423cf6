//! Thin axum glue around the core: routing, trailing slash normalization and
//! 404 logging. Everything interesting happens in the extractors and the
//! renderer.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;

use crate::context::ClientRequestContext;
use crate::extract::{ExtractorKey, NOT_AVAILABLE};
use crate::negotiate::negotiate;
use crate::render::render;
use crate::report::InfoReport;
use crate::resolve::Resolver;

struct AppState<R> {
    resolver: R,
}

/// Build the service router around a reverse resolver
pub fn app<R>(resolver: R) -> Router
where
    R: Resolver + Send + Sync + 'static,
{
    let state = Arc::new(AppState { resolver });

    Router::new()
        .route(
            "/info/{key}",
            get(attribute::<R>).post(attribute::<R>),
        )
        .fallback(full_report::<R>)
        .with_state(state)
}

/// `/info/<key>`: one attribute, raw stringified value, no wrapping
async fn attribute<R>(
    Path(key): Path<String>,
    State(state): State<Arc<AppState<R>>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response
where
    R: Resolver + Send + Sync + 'static,
{
    // drop the body so the handler future stays Send
    let (parts, _) = request.into_parts();

    let Some(key) = ExtractorKey::from_name(&key) else {
        return not_found(&parts.uri);
    };

    let ctx = ClientRequestContext::from_socket(peer, &parts);
    let value = key.extract(&ctx, &state.resolver, NOT_AVAILABLE).await;

    ([(header::CONTENT_TYPE, "text/plain")], value).into_response()
}

/// `/info` and `/info.<extension>`, plus the 404 catch-all
async fn full_report<R>(
    State(state): State<Arc<AppState<R>>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response
where
    R: Resolver + Send + Sync + 'static,
{
    let (parts, _) = request.into_parts();
    let path = parts.uri.path();

    // trailing slashes are normalized with a redirect, like `/info/` -> `/info`
    if path != "/" && path.ends_with('/') {
        let stripped = path.trim_end_matches('/');
        let target = if stripped.is_empty() { "/" } else { stripped };

        return Redirect::temporary(target).into_response();
    }

    let extension = match path.strip_prefix("/info") {
        Some("") => None,
        Some(rest) => match rest.strip_prefix('.') {
            Some(ext) => Some(ext),
            None => return not_found(&parts.uri),
        },
        None => return not_found(&parts.uri),
    };

    let ctx = ClientRequestContext::from_socket(peer, &parts);

    let Some(format) = negotiate(extension, &ctx) else {
        return not_found(&parts.uri);
    };

    let report = InfoReport::collect(&ctx, &state.resolver).await;
    let body = render(format, &report, ctx.host());

    ([(header::CONTENT_TYPE, format.content_type())], body).into_response()
}

fn not_found(uri: &Uri) -> Response {
    tracing::warn!("404: {uri}");

    (StatusCode::NOT_FOUND, "Not found").into_response()
}
