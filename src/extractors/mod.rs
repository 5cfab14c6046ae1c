use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Compile a literal pattern once.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

pub mod youtube;

use crate::FetchError;

/// Length of a YouTube video identifier
pub const VIDEO_ID_LEN: usize = 11;

/// A validated 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Accept `candidate` only if it is exactly 11 identifier characters
    pub fn parse(candidate: &str) -> Option<Self> {
        let valid = candidate.len() == VIDEO_ID_LEN
            && candidate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        valid.then(|| Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VideoId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid video id: {}", value))
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

fn url_patterns() -> [&'static Regex; 2] {
    [
        // watch?v=<id>, /embed/<id>, /shorts/<id> and any other /<id> segment
        regex!(r"(?:v=|/)([0-9A-Za-z_-]{11}).*"),
        // Shortened links
        regex!(r"youtu\.be/([0-9A-Za-z_-]{11})"),
    ]
}

/// Extract the video identifier from a YouTube URL.
///
/// Patterns are tried in order and the first match wins. Whether the
/// video actually exists is left to the caption fetch.
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    let url = url.trim();

    url_patterns()
        .into_iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .and_then(|id| VideoId::parse(id.as_str()))
}

/// A single timed caption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    pub text: String,

    /// Start offset in seconds
    pub start: f64,

    /// Display duration in seconds
    pub duration: f64,
}

/// Ordered caption entries for one video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Language code of the track that was selected
    pub language_code: Option<String>,

    /// Whether the track was generated by speech recognition
    pub is_generated: bool,

    pub entries: Vec<CaptionEntry>,
}

impl CaptionTrack {
    pub fn new(entries: Vec<CaptionEntry>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }

    /// Join every entry's text with single spaces, keeping order
    pub fn flatten(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trait for retrieving caption tracks
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the caption track of a video
    async fn fetch_track(&self, video_id: &VideoId) -> Result<CaptionTrack, FetchError>;

    /// Get the name of this platform
    fn platform_name(&self) -> &'static str;
}

/// Fetch captions for `video_id` and flatten them into one text blob
pub async fn get_transcript(
    source: &dyn CaptionSource,
    video_id: &VideoId,
) -> Result<String, FetchError> {
    tracing::info!("Fetching captions for {} from {}", video_id, source.platform_name());

    let track = source.fetch_track(video_id).await?;
    tracing::debug!(
        "Caption track has {} entries (language: {:?}, generated: {})",
        track.entries.len(),
        track.language_code,
        track.is_generated
    );

    Ok(track.flatten())
}
