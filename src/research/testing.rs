//! Local axum fixtures for exercising the network adapters offline.

use std::sync::Arc;

use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

pub struct Reply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn json(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn html(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "text/html; charset=utf-8",
            body: body.to_string(),
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            status: StatusCode::from_u16(code).unwrap(),
            content_type: "text/plain",
            body: String::new(),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// Serve `handler(path)` on a random local port; returns `http://127.0.0.1:<port>`.
pub async fn serve<F>(handler: F) -> String
where
    F: Fn(&str) -> Reply + Send + Sync + 'static,
{
    serve_with_base(move |_, path| handler(path)).await
}

/// Like [`serve`], but the handler also sees the server's own base URL.
/// Every method and path is routed to the handler; the path includes the
/// query string.
pub async fn serve_with_base<F>(handler: F) -> String
where
    F: Fn(&str, &str) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handler = Arc::new(handler);
    let server_base = base.clone();

    let app = Router::new().fallback(move |uri: Uri| {
        let handler = handler.clone();
        let base = server_base.clone();
        async move {
            let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
            (*handler)(&base, path)
        }
    });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    base
}
