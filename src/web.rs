//! Minimal web form over `QueryClient`.
//!
//! `GET /` shows an empty form. `POST /` asks the submitted question and renders the
//! answer as HTML. API failures still render a normal page, since the client always
//! answers with text; only invalid questions get an error status.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::query::QueryClient;
use crate::render::{markdown_to_html, render_page};

/// Form body posted by the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskForm {
    /// The question text; a missing field is treated as empty
    #[serde(default)]
    pub question: String,
}

/// Builds the application router around a shared client.
pub fn router(client: Arc<QueryClient>) -> Router {
    Router::new()
        .route("/", get(home).post(ask_question))
        .with_state(client)
}

/// Serves the router on `listener` until Ctrl-C is received.
pub async fn serve(listener: TcpListener, client: Arc<QueryClient>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, model = client.model(), "web server listening");
    }

    axum::serve(listener, router(client))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

/// `GET /`: the empty form.
pub async fn home() -> Html<String> {
    Html(render_page(None, None, None))
}

/// `POST /`: asks the submitted question and renders the answer.
///
/// The blocking client runs on tokio's blocking pool so retries and backoff sleeps
/// never stall the async workers.
pub async fn ask_question(
    State(client): State<Arc<QueryClient>>,
    Form(form): Form<AskForm>,
) -> (StatusCode, Html<String>) {
    let question = form.question;
    let asked = question.clone();

    match tokio::task::spawn_blocking(move || client.ask(&asked)).await {
        Ok(Ok(answer)) => {
            let answer_html = markdown_to_html(&answer);
            (
                StatusCode::OK,
                Html(render_page(Some(&question), Some(&answer_html), None)),
            )
        }
        Ok(Err(e)) => {
            info!("rejected question: {e}");
            (
                StatusCode::BAD_REQUEST,
                Html(render_page(Some(&question), None, Some(&e.to_string()))),
            )
        }
        Err(e) => {
            error!("question task failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_page(
                    Some(&question),
                    None,
                    Some("Something went wrong while answering. Please try again."),
                )),
            )
        }
    }
}
