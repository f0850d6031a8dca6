// file: src/server/routes.rs
// description: route table and JSON handlers for summaries, questions, cache and health
// reference: https://docs.rs/axum/0.7/axum/routing

use super::{AppError, AppResult, AppState};
use crate::config::SelectionPolicy;
use crate::llm::prompts::{ANSWER_FALLBACK, SUMMARY_FALLBACK};
use crate::pipeline::{PipelineStats, ProgressTracker};
use crate::utils::{HealthCheck, HealthReport};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ozet", post(summarize))
        .route("/soru-cevap", post(answer))
        .route("/cache-temizle", post(clear_cache))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Default, Deserialize)]
struct OzetRequest {
    ilac: Option<String>,
}

#[derive(Debug, Serialize)]
struct OzetResponse {
    ozet: String,
    metin_uzunlugu: usize,
    ozet_uzunlugu: usize,
}

#[derive(Debug, Default, Deserialize)]
struct SoruCevapRequest {
    soru: Option<String>,
    ozet: Option<String>,
    ilac_adi: Option<String>,
}

#[derive(Debug, Serialize)]
struct SoruCevapResponse {
    cevap: String,
    kullanilan_metin_uzunlugu: usize,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    mesaj: String,
}

#[derive(Debug, Serialize)]
struct ServiceStats {
    cache_entries: usize,
    cache_capacity: usize,
    selection_policy: SelectionPolicy,
    cache_hit_rate: f64,
    summary_success_rate: f64,
    #[serde(flatten)]
    pipeline: PipelineStats,
}

/// Trimmed, non-empty field value.
fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Malformed bodies are treated as bodies with every field missing.
fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection);
            T::default()
        }
    }
}

async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<OzetRequest>, JsonRejection>,
) -> AppResult<Json<OzetResponse>> {
    let request = body_or_default(payload);
    let drug_name = field(&request.ilac).ok_or_else(|| AppError::bad_request("İlaç adı gerekli"))?;

    info!("Summary requested for '{}'", drug_name);
    let progress = ProgressTracker::hidden();

    let attempt = state
        .pipeline
        .attempt_summary(drug_name, &progress)
        .await
        .map_err(AppError::from_summary_failure)?;
    let metin_uzunlugu = attempt.document.char_len();

    match attempt.summary {
        Ok(summary) => Ok(Json(OzetResponse {
            ozet: summary.text,
            metin_uzunlugu: summary.source_text_length,
            ozet_uzunlugu: summary.summary_length,
        })),
        Err(e) if state.fallback_on_llm_error => {
            warn!("Summarization failed for '{}', serving fallback: {}", drug_name, e);
            Ok(Json(OzetResponse {
                ozet: SUMMARY_FALLBACK.to_string(),
                metin_uzunlugu,
                ozet_uzunlugu: SUMMARY_FALLBACK.chars().count(),
            }))
        }
        Err(e) => Err(AppError::from_summary_failure(e.into())),
    }
}

async fn answer(
    State(state): State<AppState>,
    payload: Result<Json<SoruCevapRequest>, JsonRejection>,
) -> AppResult<Json<SoruCevapResponse>> {
    let request = body_or_default(payload);
    let (Some(question), Some(summary)) = (field(&request.soru), field(&request.ozet)) else {
        return Err(AppError::bad_request("Soru ve özet gerekli"));
    };
    let drug_name = field(&request.ilac_adi);

    let progress = ProgressTracker::hidden();
    let attempt = state
        .pipeline
        .attempt_answer(question, summary, drug_name, &progress)
        .await
        .map_err(AppError::from_answer_failure)?;

    match attempt.answer {
        Ok(answer) => Ok(Json(SoruCevapResponse {
            cevap: answer.text,
            kullanilan_metin_uzunlugu: answer.grounding_text_length,
        })),
        Err(e) if state.fallback_on_llm_error => {
            warn!("Question answering failed, serving fallback: {}", e);
            Ok(Json(SoruCevapResponse {
                cevap: ANSWER_FALLBACK.to_string(),
                kullanilan_metin_uzunlugu: attempt.grounding_text_length,
            }))
        }
        Err(e) => Err(AppError::from_answer_failure(e.into())),
    }
}

async fn clear_cache(State(state): State<AppState>) -> Json<MessageResponse> {
    state.pipeline.clear_cache().await;
    Json(MessageResponse {
        mesaj: "Cache temizlendi".to_string(),
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthReport<ServiceStats>> {
    let cache = state.pipeline.cache();
    let pipeline = state.pipeline.stats();
    let stats = ServiceStats {
        cache_entries: cache.len().await,
        cache_capacity: cache.capacity(),
        selection_policy: state.pipeline.policy(),
        cache_hit_rate: pipeline.cache_hit_rate(),
        summary_success_rate: pipeline.summary_success_rate(),
        pipeline,
    };

    let mut checks = vec![HealthCheck::healthy(
        "cache",
        Some(format!("{}/{} entries", stats.cache_entries, stats.cache_capacity)),
    )];

    let served = stats.pipeline.summaries_served + stats.pipeline.answers_served;
    let failed = stats.pipeline.summaries_failed + stats.pipeline.answers_failed;
    checks.push(if failed > 0 && served == 0 {
        HealthCheck::degraded("inference", format!("{} failed calls, none succeeded", failed))
    } else {
        HealthCheck::healthy("inference", None)
    });

    Json(HealthReport::new(checks, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::config::Config;
    use crate::error::SummarizationError;
    use crate::extractor::testing::FakeFetcher;
    use crate::llm::testing::ScriptedModel;
    use crate::llm::{ChatModel, CompletionRequest};
    use crate::pipeline::ProspectusPipeline;
    use crate::search::testing::StaticSearch;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    const LEAFLET_URL: &str = "https://www.ilacprospektusu.com/parol";
    const LEAFLET: &str = "KULLANMA TALİMATI\nPAROL 500 mg tablet\nEtkin madde: parasetamol\n\
                           Günde en fazla 4 kez kullanınız.";

    fn state_with(model: ScriptedModel, fallback: bool) -> AppState {
        let pipeline = ProspectusPipeline::with_components(
            &Config::default_config(),
            Arc::new(StaticSearch::new(&[LEAFLET_URL])),
            Arc::new(FakeFetcher::new().with_page(LEAFLET_URL, LEAFLET)),
            Arc::new(model),
        );
        AppState::new(pipeline, fallback)
    }

    fn empty_search_state() -> AppState {
        let pipeline = ProspectusPipeline::with_components(
            &Config::default_config(),
            Arc::new(StaticSearch::new(&[])),
            Arc::new(FakeFetcher::new()),
            Arc::new(ScriptedModel::replying("özet")),
        );
        AppState::new(pipeline, false)
    }

    async fn post(state: &AppState, uri: &str, body: Value) -> (StatusCode, Value) {
        send(
            state,
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_summary_then_question_uses_cached_text() {
        let state = state_with(
            ScriptedModel::sequence(&["<think>x</think>Parol ağrı kesicidir.", "Günde 4 kez."]),
            false,
        );

        let (status, body) = post(&state, "/ozet", json!({ "ilac": "Parol" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ozet"], "Parol ağrı kesicidir.");
        assert_eq!(body["metin_uzunlugu"], LEAFLET.chars().count());
        assert_eq!(body["ozet_uzunlugu"], "Parol ağrı kesicidir.".chars().count());

        let (status, body) = post(
            &state,
            "/soru-cevap",
            json!({ "soru": "Günde kaç kez?", "ozet": "kısa", "ilac_adi": "parol" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cevap"], "Günde 4 kez.");
        assert_eq!(body["kullanilan_metin_uzunlugu"], LEAFLET.chars().count());
    }

    #[tokio::test]
    async fn test_unknown_drug_is_404_and_not_cached() {
        let state = empty_search_state();

        let (status, body) = post(&state, "/ozet", json!({ "ilac": "yokilac" })).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Prospektüs bulunamadı");
        assert!(state.pipeline.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_fields_are_400() {
        let state = state_with(ScriptedModel::replying("x"), false);

        let (status, body) = post(&state, "/ozet", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "İlaç adı gerekli");

        let (status, _) = post(&state, "/ozet", json!({ "ilac": "   " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post(&state, "/soru-cevap", json!({ "soru": "Ne?" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Soru ve özet gerekli");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let state = state_with(ScriptedModel::replying("x"), false);

        let (status, body) = send(
            &state,
            Request::builder()
                .method("POST")
                .uri("/ozet")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "İlaç adı gerekli");
    }

    #[tokio::test]
    async fn test_inference_failure_is_500_by_default() {
        let state = state_with(ScriptedModel::failing(), false);

        let (status, body) = post(&state, "/ozet", json!({ "ilac": "parol" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("İşlem başarısız:"));
    }

    #[tokio::test]
    async fn test_fallback_mode_serves_fixed_texts() {
        let state = state_with(ScriptedModel::failing(), true);

        let (status, body) = post(&state, "/ozet", json!({ "ilac": "parol" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ozet"], SUMMARY_FALLBACK);
        assert_eq!(body["metin_uzunlugu"], LEAFLET.chars().count());

        let (status, body) = post(
            &state,
            "/soru-cevap",
            json!({ "soru": "Ne?", "ozet": "kısa", "ilac_adi": "parol" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cevap"], ANSWER_FALLBACK);
        assert_eq!(body["kullanilan_metin_uzunlugu"], LEAFLET.chars().count());
    }

    #[tokio::test]
    async fn test_clear_twice_succeeds() {
        let state = state_with(ScriptedModel::replying("özet"), false);
        post(&state, "/ozet", json!({ "ilac": "parol" })).await;
        assert_eq!(state.pipeline.cache().len().await, 1);

        for _ in 0..2 {
            let (status, body) = post(&state, "/cache-temizle", Value::Null).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["mesaj"], "Cache temizlendi");
        }
        assert!(state.pipeline.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_health_reports_cache_and_counters() {
        let state = state_with(ScriptedModel::replying("özet"), false);
        post(&state, "/ozet", json!({ "ilac": "parol" })).await;

        let (status, body) = send(
            &state,
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overall_status"], "Healthy");
        assert_eq!(body["stats"]["cache_entries"], 1);
        assert_eq!(body["stats"]["cache_capacity"], 256);
        assert_eq!(body["stats"]["selection_policy"], "allowlist");
        assert_eq!(body["stats"]["summaries_served"], 1);
        assert_eq!(body["stats"]["summary_success_rate"], 100.0);
        assert_eq!(body["stats"]["cache_hit_rate"], 0.0);
    }

    /// Answers the first call at once; every later call fails after a delay.
    struct SlowlyFailingModel {
        calls: AtomicUsize,
        fail_from: usize,
    }

    #[async_trait]
    impl ChatModel for SlowlyFailingModel {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> std::result::Result<String, SummarizationError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.fail_from {
                return Ok("Parol ağrı kesicidir.".to_string());
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
            Err(SummarizationError::Request("timed out".to_string()))
        }
    }

    fn slow_state(fail_from: usize) -> AppState {
        let pipeline = ProspectusPipeline::with_components(
            &Config::default_config(),
            Arc::new(StaticSearch::new(&[LEAFLET_URL])),
            Arc::new(FakeFetcher::new().with_page(LEAFLET_URL, LEAFLET)),
            Arc::new(SlowlyFailingModel {
                calls: AtomicUsize::new(0),
                fail_from,
            }),
        );
        AppState::new(pipeline, true)
    }

    async fn clear_after(state: &AppState, delay: Duration) {
        tokio::time::sleep(delay).await;
        state.pipeline.clear_cache().await;
    }

    #[tokio::test]
    async fn test_fallback_summary_length_survives_concurrent_clear() {
        let state = slow_state(0);

        let ((status, body), ()) = tokio::join!(
            post(&state, "/ozet", json!({ "ilac": "parol" })),
            clear_after(&state, Duration::from_millis(50)),
        );

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ozet"], SUMMARY_FALLBACK);
        assert_eq!(body["metin_uzunlugu"], LEAFLET.chars().count());
        assert!(state.pipeline.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_fallback_answer_length_survives_concurrent_clear() {
        let state = slow_state(1);
        let (status, _) = post(&state, "/ozet", json!({ "ilac": "parol" })).await;
        assert_eq!(status, StatusCode::OK);

        let ((status, body), ()) = tokio::join!(
            post(
                &state,
                "/soru-cevap",
                json!({ "soru": "Ne?", "ozet": "kısa", "ilac_adi": "parol" }),
            ),
            clear_after(&state, Duration::from_millis(50)),
        );

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cevap"], ANSWER_FALLBACK);
        assert_eq!(body["kullanilan_metin_uzunlugu"], LEAFLET.chars().count());
    }
}
