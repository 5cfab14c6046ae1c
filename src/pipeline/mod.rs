use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::correct::Corrector;
use crate::credentials::{CredentialChain, CredentialProvider};
use crate::extractors::{self, youtube::YoutubeCaptionSource, CaptionSource, VideoId};
use crate::language::code_for;
use crate::translate::Translator;
use crate::utils::preview;
use crate::{PipelineError, ServiceError};

/// Pipeline stage that calls an external service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    Correction,
    Translation,
}

impl Stage {
    /// Label shown next to the busy indicator
    pub fn activity(&self) -> &'static str {
        match self {
            Stage::Fetch => "Fetching subtitles...",
            Stage::Correction => "Correcting text...",
            Stage::Translation => "Translating text...",
        }
    }
}

/// Why a stage fell back to its input
#[derive(Debug)]
pub struct Degradation {
    pub stage: Stage,
    pub error: ServiceError,
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.stage, &self.error) {
            (Stage::Fetch, err) => write!(f, "Error fetching subtitles: {}", err),
            (Stage::Correction, ServiceError::MissingCredential(name)) => write!(
                f,
                "OpenAI API key not found. Please set the {} environment variable or add it to the secrets file.",
                name
            ),
            (Stage::Translation, ServiceError::MissingCredential(name)) => write!(
                f,
                "Translation API key not found. Please set the {} environment variable or add it to the secrets file.",
                name
            ),
            (Stage::Correction, err) => write!(f, "Error during text correction: {}", err),
            (Stage::Translation, err) => write!(f, "Error during translation: {}", err),
        }
    }
}

/// Result of a single pipeline stage
#[derive(Debug)]
pub enum StageOutcome {
    /// The stage produced new text
    Ok(String),

    /// The stage failed and handed back its input unchanged
    Degraded { text: String, reason: Degradation },

    /// The run cannot continue
    Fatal(PipelineError),
}

impl StageOutcome {
    pub fn degraded(stage: Stage, text: impl Into<String>, error: ServiceError) -> Self {
        StageOutcome::Degraded {
            text: text.into(),
            reason: Degradation { stage, error },
        }
    }

    /// Text to hand to the next stage, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            StageOutcome::Ok(text) | StageOutcome::Degraded { text, .. } => Some(text),
            StageOutcome::Fatal(_) => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, StageOutcome::Ok(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded { .. })
    }

    /// User-facing message for a degraded or fatal outcome
    pub fn message(&self) -> Option<String> {
        match self {
            StageOutcome::Ok(_) => None,
            StageOutcome::Degraded { reason, .. } => Some(reason.to_string()),
            StageOutcome::Fatal(err) => Some(err.to_string()),
        }
    }
}

/// Category of a message shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    EmptyUrl,
    InvalidUrl,
    FetchError,
    CorrectionDegraded,
    TranslationDegraded,
}

impl NoticeKind {
    pub fn is_fatal(&self) -> bool {
        matches!(self, NoticeKind::EmptyUrl | NoticeKind::InvalidUrl | NoticeKind::FetchError)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// A labelled block of output text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub title: String,
    pub body: String,
}

/// Everything a single run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,

    /// URL as entered by the user
    pub url: String,

    pub video_id: Option<VideoId>,

    /// Language name as selected by the user
    pub target_language: String,

    /// Code actually sent to the translator
    pub target_code: String,

    pub original: Option<String>,
    pub corrected: Option<String>,
    pub translated: Option<String>,

    /// Errors and warnings, in the order they happened
    pub notices: Vec<Notice>,

    pub completed_at: Option<DateTime<Utc>>,
}

impl RunReport {
    fn new(url: &str, target_language: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            url: url.to_string(),
            video_id: None,
            target_language: target_language.to_string(),
            target_code: code_for(target_language).to_string(),
            original: None,
            corrected: None,
            translated: None,
            notices: Vec::new(),
            completed_at: None,
        }
    }

    fn notice(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let message = message.into();
        if kind.is_fatal() {
            tracing::error!("{}", message);
        } else {
            tracing::warn!("{}", message);
        }
        self.notices.push(Notice { kind, message });
    }

    /// Whether the run stopped before producing any text
    pub fn is_fatal(&self) -> bool {
        self.notices.iter().any(|n| n.kind.is_fatal())
    }

    /// Output panels for every stage reached, in pipeline order
    pub fn panels(&self) -> Vec<Panel> {
        let titled = [
            ("Original Transcript".to_string(), &self.original),
            ("Corrected Transcript".to_string(), &self.corrected),
            (format!("Translated Text ({})", self.target_language), &self.translated),
        ];

        titled
            .into_iter()
            .filter_map(|(title, body)| {
                body.as_ref().map(|body| Panel {
                    title,
                    body: body.clone(),
                })
            })
            .collect()
    }
}

/// Hooks for showing progress while a stage's call is in flight
pub trait StageObserver: Send + Sync {
    fn stage_started(&self, _stage: Stage) {}

    fn stage_finished(&self, _stage: Stage, _outcome: &StageOutcome) {}
}

impl StageObserver for () {}

/// The sequential fetch, correct, translate pipeline
pub struct Pipeline {
    captions: Box<dyn CaptionSource>,
    corrector: Corrector,
    translator: Translator,
}

impl Pipeline {
    pub fn new(captions: Box<dyn CaptionSource>, corrector: Corrector, translator: Translator) -> Self {
        Self {
            captions,
            corrector,
            translator,
        }
    }

    /// Build the production pipeline from configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        let credentials: Arc<dyn CredentialProvider> = Arc::new(CredentialChain::from_config(config));
        tracing::debug!("Credential sources: {}", credentials.describe());

        let captions = YoutubeCaptionSource::new(config)?;
        let corrector = Corrector::from_config(config, credentials.clone())?;
        let translator = Translator::from_config(config, credentials).await?;

        Ok(Self::new(Box::new(captions), corrector, translator))
    }

    /// Run every stage for `url`, translating into `target_language`
    pub async fn run(&self, url: &str, target_language: &str) -> RunReport {
        self.run_with_observer(url, target_language, &()).await
    }

    pub async fn run_with_observer(
        &self,
        url: &str,
        target_language: &str,
        observer: &dyn StageObserver,
    ) -> RunReport {
        let mut report = RunReport::new(url, target_language);
        let span = tracing::info_span!("run", run_id = %report.run_id);

        async {
            self.execute(&mut report, observer).await;
            report.completed_at = Some(Utc::now());
        }
        .instrument(span)
        .await;

        report
    }

    async fn execute(&self, report: &mut RunReport, observer: &dyn StageObserver) {
        let video_id = match parse_url(&report.url) {
            Ok(id) => id,
            Err(err) => {
                let kind = match err {
                    PipelineError::EmptyUrl => NoticeKind::EmptyUrl,
                    _ => NoticeKind::InvalidUrl,
                };
                report.notice(kind, err.to_string());
                return;
            }
        };
        tracing::info!("Processing video {}", video_id);
        report.video_id = Some(video_id.clone());

        observer.stage_started(Stage::Fetch);
        let fetched = self.fetch(&video_id).await;
        observer.stage_finished(Stage::Fetch, &fetched);
        let original = match fetched {
            StageOutcome::Ok(text) | StageOutcome::Degraded { text, .. } => text,
            StageOutcome::Fatal(err) => {
                report.notice(NoticeKind::FetchError, err.to_string());
                return;
            }
        };
        tracing::debug!("Original transcript: {}", preview(&original, 120));
        report.original = Some(original.clone());

        observer.stage_started(Stage::Correction);
        let corrected = self.corrector.correct(&original).await;
        observer.stage_finished(Stage::Correction, &corrected);
        let corrected = self.settle(report, corrected, NoticeKind::CorrectionDegraded, original);
        report.corrected = Some(corrected.clone());

        observer.stage_started(Stage::Translation);
        let translated = self.translator.translate(&corrected, &report.target_code).await;
        observer.stage_finished(Stage::Translation, &translated);
        let translated = self.settle(report, translated, NoticeKind::TranslationDegraded, corrected);
        report.translated = Some(translated);
    }

    async fn fetch(&self, video_id: &VideoId) -> StageOutcome {
        match extractors::get_transcript(self.captions.as_ref(), video_id).await {
            Ok(text) => StageOutcome::Ok(text),
            Err(err) => StageOutcome::Fatal(err.into()),
        }
    }

    /// Record a non-fatal stage's notice and return the text to carry forward
    fn settle(&self, report: &mut RunReport, outcome: StageOutcome, kind: NoticeKind, input: String) -> String {
        match outcome {
            StageOutcome::Ok(text) => text,
            StageOutcome::Degraded { text, reason } => {
                report.notice(kind, reason.to_string());
                text
            }
            StageOutcome::Fatal(err) => {
                report.notice(kind, err.to_string());
                input
            }
        }
    }
}

/// Validate user input and extract the video identifier
pub fn parse_url(url: &str) -> Result<VideoId, PipelineError> {
    if url.trim().is_empty() {
        return Err(PipelineError::EmptyUrl);
    }

    extractors::extract_video_id(url).ok_or_else(|| PipelineError::InvalidUrl(url.to_string()))
}
