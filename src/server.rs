use std::net::SocketAddr;
use std::path::PathBuf;

use axum::extract::{Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{Result, ServeError};
use crate::files;

/// State shared into request handling: the serve root and the precomputed
/// cookie header. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub cookie: Option<HeaderValue>,
}

/// Static file server that appends a `Set-Cookie` header to every response.
pub struct CookieServer {
    listener: TcpListener,
    state: AppState,
}

impl CookieServer {
    /// Binds `0.0.0.0:<port>`. An unavailable port (already taken, or
    /// privileged) surfaces here as [`ServeError::Bind`] and is fatal.
    pub async fn bind(config: &ServerConfig, root: PathBuf) -> Result<Self> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServeError::Bind { addr, source })?;
        Ok(Self {
            listener,
            state: AppState {
                root,
                cookie: config.cookie_header(),
            },
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves requests until an interrupt signal arrives, then returns
    /// after the listener is released.
    pub async fn serve(self) -> Result<()> {
        info!("Listening on {}", self.listener.local_addr()?);
        let router = Self::router(self.state);
        axum::serve(self.listener, router.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    fn router(state: AppState) -> Router {
        Router::new()
            .fallback(get(files::serve_path))
            .layer(middleware::from_fn_with_state(state.clone(), set_cookie))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

/// Appends the configured `Set-Cookie` header to every outbound response,
/// whatever its status.
async fn set_cookie(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if let Some(cookie) = &state.cookie {
        response.headers_mut().append(SET_COOKIE, cookie.clone());
    }
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
