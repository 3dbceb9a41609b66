use axum::{
    body::Body,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;

use super::page::BlockPage;

const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
const CACHE_CONTROL_NONE: &str = "no-cache, no-store, must-revalidate";

/// Router that answers every path and method with the block page.
pub fn block_page_router(page: Arc<BlockPage>) -> Router {
    Router::new().fallback(serve_block_page).with_state(page)
}

async fn serve_block_page(State(page): State<Arc<BlockPage>>, method: Method) -> Response {
    let body = if method == Method::GET || method == Method::POST {
        Body::from(page.body().clone())
    } else {
        Body::empty()
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, CONTENT_TYPE_HTML),
            (header::CACHE_CONTROL, CACHE_CONTROL_NONE),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        body,
    )
        .into_response()
}
