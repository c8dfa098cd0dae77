use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::BytesRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;

use crate::{
    alert::AlertBatch,
    pipeline::IncidentPipeline,
    telemetry_endpoint::{self, Metrics},
};

/// body of every webhook answer, `status` repeats the http status code
#[derive(Debug, Serialize)]
struct JsonResponse {
    status: u16,
    message: String,
}

struct State {
    pipeline: IncidentPipeline,
    metrics: Arc<Metrics>,
}

fn json_response(metrics: &Metrics, status: StatusCode, message: String) -> Response {
    metrics.record_request(status);

    (
        status,
        Json(JsonResponse {
            status: status.as_u16(),
            message,
        }),
    )
        .into_response()
}

async fn prometheus_receiver(
    Extension(state): Extension<Arc<State>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let State { pipeline, metrics } = &*state;

    // a `null` document is an empty batch, like absent fields inside it
    let batch = match body.map_err(|err| err.body_text()).and_then(|body| {
        serde_json::from_slice::<Option<AlertBatch>>(&body).map_err(|err| err.to_string())
    }) {
        Ok(batch) => batch.unwrap_or_default(),
        Err(err) => {
            tracing::error!("Error reading request body : {}", err);
            return json_response(metrics, StatusCode::BAD_REQUEST, err);
        }
    };

    if let Err(err) = pipeline.process_batch(&batch).await {
        tracing::error!("Error managing incident from alert : {}", err);
        return json_response(metrics, StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
    }

    json_response(metrics, StatusCode::OK, "Success".to_owned())
}

/// `POST /webhook` for alertmanager and `GET /metrics`
pub fn router(pipeline: IncidentPipeline, metrics: Arc<Metrics>) -> Router {
    let state = Arc::new(State {
        pipeline,
        metrics: metrics.clone(),
    });

    Router::new()
        .route("/webhook", post(prometheus_receiver))
        .route("/metrics", get(telemetry_endpoint::metrics_handler))
        .layer(Extension(state))
        .layer(Extension(metrics))
}

pub async fn run_prometheus_receiver(
    addr: SocketAddr,
    pipeline: IncidentPipeline,
    metrics: Arc<Metrics>,
) -> Result<()> {
    let app = router(pipeline, metrics);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("failed to listen on {}", addr))?;

    tracing::info!("listening on: {}", addr);

    axum::serve(listener, app)
        .await
        .context("prometheus endpoint crashed")?;

    Ok(())
}
