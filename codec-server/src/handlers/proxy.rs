//! Dev-server passthrough under the configured prefix.

use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::proxy::unavailable_page;
use crate::state::AppState;

pub async fn forward(State(state): State<AppState>, req: Request) -> Response {
    match state.proxy.forward(req).await {
        Ok(resp) => resp,
        Err(AppError::Upstream(detail)) => {
            tracing::error!("Proxy error: {}", detail);
            unavailable_page(&detail)
        }
        Err(e) => e.into_response(),
    }
}
