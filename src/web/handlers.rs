//! HTTP request handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::page::{render_page, FormState};
use super::AppState;
use crate::language::Language;

/// JSON body for `/api/process`
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub url: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LanguageEntry {
    pub name: &'static str,
    pub code: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Empty form with configured defaults
/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_page(&FormState::defaults(&state.ui), None))
}

/// Run the pipeline for a form submission and render the results
/// POST /process
pub async fn process_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<FormState>,
) -> Html<String> {
    let form = form.or_defaults(&state.ui);
    let report = state.pipeline.run(&form.url, &form.language).await;
    Html(render_page(&form, Some(&report)))
}

/// Run the pipeline and return the report as JSON.
/// POST /api/process
///
/// Fatal runs are answered with 422 so API clients can tell them apart.
pub async fn process_json(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProcessRequest>,
) -> Response {
    let language = request
        .language
        .unwrap_or_else(|| state.ui.default_language.clone());
    let report = state.pipeline.run(&request.url, &language).await;

    let status = if report.is_fatal() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    (status, Json(report)).into_response()
}

/// Supported target languages
/// GET /api/languages
pub async fn languages() -> Json<Vec<LanguageEntry>> {
    Json(
        Language::ALL
            .iter()
            .map(|lang| LanguageEntry {
                name: lang.name(),
                code: lang.code(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CorrectionConfig, UiConfig};
    use crate::correct::{openai::MockChatCompletion, Corrector};
    use crate::credentials::CredentialChain;
    use crate::extractors::{CaptionEntry, CaptionTrack, MockCaptionSource};
    use crate::pipeline::Pipeline;
    use crate::translate::{MockTranslationBackend, Translator};
    use crate::web::create_router;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::util::ServiceExt;

    /// Captions always succeed, correction has no key, translation tags the text
    fn app() -> axum::Router {
        let mut captions = MockCaptionSource::new();
        captions.expect_platform_name().return_const("mock");
        captions.expect_fetch_track().returning(|_| {
            Ok(CaptionTrack::new(vec![CaptionEntry {
                text: "a <b>bold</b> claim".to_string(),
                start: 0.0,
                duration: 2.0,
            }]))
        });

        let mut backend = MockTranslationBackend::new();
        backend.expect_name().return_const("mock");
        backend
            .expect_translate()
            .returning(|text, code| Ok(format!("{}:{}", code, text)));

        let corrector = Corrector::new(
            Box::new(MockChatCompletion::new()),
            Arc::new(CredentialChain::new()),
            CorrectionConfig::default(),
        );
        let pipeline = Pipeline::new(Box::new(captions), corrector, Translator::new(Box::new(backend)));

        create_router(Arc::new(AppState::new(pipeline, UiConfig::default())))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/process")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_index_renders_form() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Enter YouTube Video URL"));
        assert!(html.contains(r#"<option value="English" selected>English</option>"#));
        assert!(!html.contains("Original Transcript"));
    }

    #[tokio::test]
    async fn test_process_form_renders_panels_in_order() {
        let body = "url=https%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ&language=Turkish&font=Georgia&theme=Dark+Mode";
        let response = app().oneshot(form_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        let original = html.find("<h2>Original Transcript</h2>").unwrap();
        let corrected = html.find("<h2>Corrected Transcript</h2>").unwrap();
        let translated = html.find("<h2>Translated Text (Turkish)</h2>").unwrap();
        assert!(original < corrected && corrected < translated);

        assert!(html.contains("OpenAI API key not found"));
        assert!(html.contains("tr:a &lt;b&gt;bold&lt;/b&gt; claim"));
        assert!(html.contains("#121212"));
    }

    #[tokio::test]
    async fn test_process_form_without_selections_uses_defaults() {
        let body = "url=https%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ";
        let response = app().oneshot(form_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("<h2>Original Transcript</h2>"));
        assert!(html.contains("<h2>Corrected Transcript</h2>"));
        assert!(html.contains("<h2>Translated Text (English)</h2>"));
        assert!(html.contains("en:a &lt;b&gt;bold&lt;/b&gt; claim"));
        assert!(html.contains(r#"<option value="English" selected>English</option>"#));
    }

    #[tokio::test]
    async fn test_process_form_invalid_url_shows_only_error() {
        let body = "url=https%3A%2F%2Fexample.com&language=English&font=Roboto&theme=Light+Mode";
        let html = body_text(app().oneshot(form_request(body)).await.unwrap()).await;

        assert!(html.contains("Invalid YouTube URL. Please check and try again."));
        assert!(!html.contains("<h2>"));
    }

    #[tokio::test]
    async fn test_api_process() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/process")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"url":"https://www.youtube.com/watch?v=dQw4w9WgXcQ","language":"German"}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["video_id"], "dQw4w9WgXcQ");
        assert_eq!(json["target_code"], "de");
        assert_eq!(json["translated"], "de:a <b>bold</b> claim");
        assert_eq!(json["notices"][0]["kind"], "correction_degraded");
    }

    #[tokio::test]
    async fn test_api_process_fatal_is_unprocessable() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/process")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"url":""}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["notices"][0]["kind"], "empty_url");
        assert_eq!(json["target_language"], "English");
    }

    #[tokio::test]
    async fn test_api_languages() {
        let response = app()
            .oneshot(Request::builder().uri("/api/languages").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 7);
        assert_eq!(json[6], serde_json::json!({"name": "Turkish", "code": "tr"}));
    }
}
