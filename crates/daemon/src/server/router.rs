//! Route table and request handlers.
//!
//! Handlers only check that required fields are present and translate
//! failures into [`ApiError`]s; the work is done by the store and gpg modules.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use protocol::error::{MSG_SEARCH_FAILED, MSG_TREE_FAILED};
use protocol::{
    from_json_slice, DecryptRequest, DecryptResponse, ErrorKind, SearchRequest, TreeResponse,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use super::error::ApiError;
use super::AppState;
use crate::store::filter;
use crate::ui::INDEX_HTML;

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/tree", get(get_tree))
        .route("/api/search", post(search))
        .route("/api/decrypt", post(decrypt))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn get_tree(State(state): State<Arc<AppState>>) -> Result<Json<TreeResponse>, ApiError> {
    let tree = state.load_tree().await.map_err(|e| {
        error!("Error generating password tree: {:#}", e);
        ApiError::new(ErrorKind::InternalError, MSG_TREE_FAILED)
    })?;

    Ok(Json(TreeResponse { tree }))
}

async fn search(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TreeResponse>, ApiError> {
    let request: SearchRequest = from_json_slice(&body).unwrap_or_else(|e| {
        debug!("Unreadable search body, using empty query: {}", e);
        SearchRequest::default()
    });

    let tree = state.load_tree().await.map_err(|e| {
        error!("Error during password search: {:#}", e);
        ApiError::new(ErrorKind::InternalError, MSG_SEARCH_FAILED)
    })?;

    Ok(Json(TreeResponse {
        tree: filter(&tree, &request.query),
    }))
}

async fn decrypt(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<DecryptResponse>, ApiError> {
    let request: DecryptRequest = from_json_slice(&body).unwrap_or_else(|e| {
        debug!("Unreadable decrypt body: {}", e);
        DecryptRequest::default()
    });

    let Some((filepath, passphrase)) = request.required_fields() else {
        return Err(ApiError::decrypt(ErrorKind::MissingField));
    };

    let content = state
        .decryptor
        .decrypt(filepath, passphrase.as_bytes())
        .await
        .map_err(|e| {
            if e.kind() == ErrorKind::InternalError {
                error!("Unexpected error during decryption of {}: {}", filepath, e);
            }
            ApiError::from(e)
        })?;

    Ok(Json(DecryptResponse::ok(content)))
}
