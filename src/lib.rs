//! Subtitle Enhancer - fetch YouTube captions, correct them with an LLM and translate them
//!
//! This library provides the sequential pipeline behind the web UI and CLI:
//! URL parsing, caption retrieval, text correction through an OpenAI-compatible
//! completion endpoint, and translation through Google Cloud Translation or Amazon Translate.

pub mod cli;
pub mod config;
pub mod correct;
pub mod credentials;
pub mod extractors;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod translate;
pub mod utils;
pub mod web;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use credentials::{CredentialChain, CredentialProvider};
pub use extractors::{extract_video_id, CaptionEntry, CaptionSource, CaptionTrack, VideoId};
pub use language::{code_for, Language};
pub use pipeline::{Pipeline, RunReport, StageOutcome};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Errors that stop a run before any panel is produced
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Please enter a YouTube URL.")]
    EmptyUrl,

    #[error("Invalid YouTube URL. Please check and try again.")]
    InvalidUrl(String),

    #[error("Error fetching subtitles: {0}")]
    Fetch(#[from] FetchError),
}

/// Caption retrieval failures
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Subtitles are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("No transcript found for video {video_id} in languages {languages:?}")]
    NoTranscriptFound {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("Video {0} is unavailable")]
    VideoUnavailable(String),

    #[error("Video {video_id} is unplayable: {reason}")]
    VideoUnplayable { video_id: String, reason: String },

    #[error("YouTube is blocking requests for video {0}")]
    RequestBlocked(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Could not parse YouTube data for video {video_id}: {detail}")]
    Unparsable { video_id: String, detail: String },
}

/// Failures from the correction and translation services
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("credential {0} not found")]
    MissingCredential(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Request(err.to_string())
    }
}
