use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, warn};

use crate::banner::BannerConfig;
use crate::codegen::{GenerateOptions, SnippetArtifacts, generate};
use crate::config::GeneratorSettings;
use crate::studio::OutputTab;

#[derive(Clone)]
struct AppState {
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

pub fn router(settings: &GeneratorSettings) -> Router {
    let state = AppState {
        options: settings.generate_options(),
    };
    Router::new()
        .route("/health", get(handle_health))
        .route("/config/default", get(handle_default_config))
        .route("/generate", post(handle_generate))
        .route("/generate/:tab", post(handle_generate_tab))
        .with_state(state)
}

pub async fn run_http_server(settings: &GeneratorSettings, bind: &str) -> Result<()> {
    let app = router(settings);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind HTTP server to `{bind}`"))?;
    let local_addr = listener.local_addr().ok();

    info!(
        text_escaping = %settings.text_escaping,
        requested_bind = %bind,
        bound_addr = local_addr.map(|addr| addr.to_string()),
        "starting HTTP server"
    );

    axum::serve(listener, app)
        .await
        .context("HTTP server exited with an error")
}

async fn handle_health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn handle_default_config() -> Json<BannerConfig> {
    Json(BannerConfig::default())
}

async fn handle_generate(
    State(state): State<AppState>,
    Json(config): Json<BannerConfig>,
) -> Json<SnippetArtifacts> {
    let snippet = generate(&config, &state.options);
    Json(snippet.to_artifacts())
}

async fn handle_generate_tab(
    State(state): State<AppState>,
    Path(tab): Path<String>,
    Json(config): Json<BannerConfig>,
) -> Response {
    let tab = match tab.parse::<OutputTab>() {
        Ok(tab) => tab,
        Err(error) => {
            warn!(status = 404, error = %error, "unknown artifact requested");
            let body = ErrorBody {
                error: error.to_string(),
            };
            return (StatusCode::NOT_FOUND, Json(body)).into_response();
        }
    };

    let artifacts = generate(&config, &state.options).to_artifacts();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, tab.content_type())],
        tab.select(&artifacts).to_owned(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::router;
    use crate::config::GeneratorSettings;

    const BODY_LIMIT: usize = 1 << 20;

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .expect("request should build")
    }

    #[tokio::test]
    async fn generate_returns_every_artifact() {
        let response = router(&GeneratorSettings::default())
            .oneshot(post_json("/generate", r#"{"position":"top"}"#))
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("body should be readable");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        for key in ["html", "css", "js", "complete"] {
            assert!(body[key].is_string(), "missing `{key}`");
        }
        assert!(
            body["html"]
                .as_str()
                .unwrap_or_default()
                .contains("top:0;left:0;right:0;")
        );
    }

    #[tokio::test]
    async fn single_artifact_uses_matching_content_type() {
        let response = router(&GeneratorSettings::default())
            .oneshot(post_json("/generate/css", "{}"))
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/css; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn unknown_artifact_is_not_found() {
        let response = router(&GeneratorSettings::default())
            .oneshot(post_json("/generate/pdf", "{}"))
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("body should be readable");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert!(
            body["error"]
                .as_str()
                .unwrap_or_default()
                .contains("`pdf`")
        );
    }
}
