use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{SystemTime, UNIX_EPOCH},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{ApiAnalyzeRequest, ApiAnalyzeResponse, ApiGateRequest};
use comment_pulse::{AnalysisConfig, AnalysisPipeline, EntitlementDecision, EntitlementGate};

#[derive(Clone)]
struct AppState {
    config: Arc<AnalysisConfig>,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub async fn serve(args: crate::ServeArgs, config: AnalysisConfig) -> Result<(), String> {
    let state = AppState {
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/replies/gate", post(gate_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| format!("failed to bind server: {}", err))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .await
        .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<ApiAnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiAnalyzeResponse>, (StatusCode, String)> {
    let Json(request) = payload.map_err(bad_request)?;
    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);
    let (batch, config) = request.into_parts(&state.config);

    let report = AnalysisPipeline::from_config(&config).run(&batch);
    info!(
        request_id = %request_id,
        total = report.total_count,
        skipped = report.skipped_count,
        "analyzed batch"
    );

    Ok(Json(ApiAnalyzeResponse::from_report(report, request_id)))
}

async fn gate_handler(
    State(state): State<AppState>,
    payload: Result<Json<ApiGateRequest>, JsonRejection>,
) -> Result<Json<EntitlementDecision>, (StatusCode, String)> {
    let Json(request) = payload.map_err(bad_request)?;
    let (tier, free_limit) = request
        .resolve(&state.config)
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;

    let decision = EntitlementGate::new(free_limit).gate(&request.candidates, tier);
    info!(
        tier = tier.label(),
        visible = decision.visible_replies.len(),
        locked = decision.locked_count,
        truncated = decision.truncated_count,
        "gated replies"
    );

    Ok(Json(decision))
}

fn bad_request(rejection: JsonRejection) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, rejection.body_text())
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::FromRequest,
        http::{header, Request},
    };
    use serde::de::DeserializeOwned;

    fn state() -> AppState {
        AppState {
            config: Arc::new(AnalysisConfig::default()),
        }
    }

    async fn payload<T: DeserializeOwned>(
        body: &str,
        content_type: Option<&str>,
    ) -> Result<Json<T>, JsonRejection> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        Json::<T>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn analyze_keeps_good_records_next_to_malformed_ones() {
        let body = r#"{"comments": [
            {"id": 1, "text": "So clear", "sentimentLabel": "positive", "confidence": 0.9},
            {"id": 2, "text": null, "sentimentLabel": "negative", "confidence": 0.8}
        ]}"#;
        let request = payload::<ApiAnalyzeRequest>(body, Some("application/json")).await;

        let Json(response) = analyze_handler(State(state()), request).await.unwrap();
        assert_eq!(response.total_count, 1);
        assert_eq!(response.skipped_count, 1);
        assert_eq!(response.top_positive[0].id, "1");
    }

    #[tokio::test]
    async fn analyze_rejects_bad_payloads_with_400() {
        let wrong_shape =
            payload::<ApiAnalyzeRequest>(r#"{"comments": 5}"#, Some("application/json")).await;
        let (status, _) = analyze_handler(State(state()), wrong_shape).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let not_json =
            payload::<ApiAnalyzeRequest>(r#"{"comments": ["#, Some("application/json")).await;
        let (status, _) = analyze_handler(State(state()), not_json).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let no_content_type = payload::<ApiAnalyzeRequest>(r#"{"comments": []}"#, None).await;
        let (status, _) = analyze_handler(State(state()), no_content_type).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn gate_rejects_bad_payloads_with_400() {
        let wrong_shape =
            payload::<ApiGateRequest>(r#"{"candidates": "all"}"#, Some("application/json")).await;
        let (status, _) = gate_handler(State(state()), wrong_shape).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = r#"{"candidates": [], "tier": "gold"}"#;
        let unknown_tier = payload::<ApiGateRequest>(body, Some("application/json")).await;
        let (status, message) = gate_handler(State(state()), unknown_tier).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("unknown tier"));
    }
}
