//! Request dispatcher: resolves the action result of a request and serves the
//! template it lands on, either as the whole response (forward) or as a
//! fragment for a composing parent (include).

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::{
        HeaderMap, HeaderName, HeaderValue, StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;

use crate::{
    application::{
        error::HttpError,
        ports::ContentStore,
        target::{Resolution, TargetResolver},
    },
    domain::paths::{PATH_SEPARATOR, ResolvedTarget},
};

use super::middleware::{log_responses, set_request_context};

/// Set by a composing parent on requests whose output it embeds.
pub const INCLUDE_MARKER_HEADER: &str = "x-include-request-uri";
/// Carries the resolved template path on successful dispatches.
pub const TARGET_HEADER: &str = "x-view-target";

const SOURCE: &str = "infra::http::dispatch";

#[derive(Clone)]
pub struct DispatchState {
    pub resolver: Arc<TargetResolver>,
    pub store: Arc<dyn ContentStore>,
    pub content_type: HeaderValue,
}

impl DispatchState {
    /// Fails when `content_type` is not a valid header value.
    pub fn new(
        resolver: Arc<TargetResolver>,
        store: Arc<dyn ContentStore>,
        content_type: &str,
    ) -> Result<Self, axum::http::header::InvalidHeaderValue> {
        Ok(Self {
            resolver,
            store,
            content_type: HeaderValue::from_str(content_type)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Forward,
    Include,
}

impl DispatchMode {
    pub fn detect(headers: &HeaderMap) -> Self {
        if headers.contains_key(INCLUDE_MARKER_HEADER) {
            DispatchMode::Include
        } else {
            DispatchMode::Forward
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DispatchQuery {
    result: Option<String>,
}

pub fn build_router(state: DispatchState) -> Router {
    Router::new()
        .route("/{*action}", get(dispatch))
        .fallback(missing_action)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn dispatch(
    State(state): State<DispatchState>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Query(query): Query<DispatchQuery>,
) -> Result<Response, HttpError> {
    let action = format!("{PATH_SEPARATOR}{action}");
    let mode = DispatchMode::detect(&headers);

    let target = match state
        .resolver
        .resolve(&action, query.result.as_deref())
        .await?
    {
        Resolution::Found(target) => target,
        missing @ Resolution::NotFound { .. } => {
            return Err(HttpError::not_found(SOURCE, missing.to_string()));
        }
    };

    // The cache may outlive the resource it points at.
    let Some(body) = state.store.open(target.as_str()).await? else {
        return Err(HttpError::not_found(
            SOURCE,
            format!("Result not found: {target}"),
        ));
    };

    debug!(action = %action, target = %target, mode = ?mode, "dispatching template");
    Ok(build_response(&state, mode, &target, body))
}

fn build_response(
    state: &DispatchState,
    mode: DispatchMode,
    target: &ResolvedTarget,
    body: Bytes,
) -> Response {
    let length = body.len();
    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.remove(CONTENT_TYPE);

    match HeaderValue::from_str(target.as_str()) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(TARGET_HEADER), value);
        }
        Err(err) => {
            debug!(target = %target, error = %err, "target is not a valid header value");
        }
    }

    if mode == DispatchMode::Forward {
        headers.insert(CONTENT_TYPE, state.content_type.clone());
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    }

    response
}

async fn missing_action() -> HttpError {
    HttpError::new(
        SOURCE,
        StatusCode::NOT_FOUND,
        "Not Found",
        "request did not name an action",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::mapper::ResultMapper,
        cache::TargetCache,
        domain::paths::TemplateExtension,
        infra::content::MemoryStore,
    };

    fn state() -> DispatchState {
        let store = Arc::new(MemoryStore::new());
        let resolver = TargetResolver::new(
            Arc::new(ResultMapper::default()),
            store.clone(),
            Arc::new(TargetCache::new()),
            TemplateExtension::default(),
        );
        DispatchState::new(Arc::new(resolver), store, "text/html").expect("state")
    }

    #[test]
    fn unrepresentable_target_omits_the_target_header() {
        let target = ResolvedTarget::new("/caf\u{e9}\n.jsp".to_string());
        let response = build_response(
            &state(),
            DispatchMode::Forward,
            &target,
            Bytes::from_static(b"body"),
        );

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(TARGET_HEADER).is_none());
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
    }

    #[test]
    fn include_marker_selects_include_mode() {
        let mut headers = HeaderMap::new();
        assert_eq!(DispatchMode::detect(&headers), DispatchMode::Forward);

        headers.insert(INCLUDE_MARKER_HEADER, HeaderValue::from_static("/layout"));
        assert_eq!(DispatchMode::detect(&headers), DispatchMode::Include);
    }
}
