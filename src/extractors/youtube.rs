use async_trait::async_trait;
use serde_json::Value;

use super::{CaptionEntry, CaptionSource, CaptionTrack, VideoId};
use crate::config::{CaptionConfig, Config};
use crate::FetchError;

/// InnerTube client identity used for the player request
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

/// YouTube caption retrieval through the watch page and InnerTube player API
pub struct YoutubeCaptionSource {
    client: reqwest::Client,
    captions: CaptionConfig,
}

/// Caption track advertised by the player response
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub language_code: String,
    pub base_url: String,
    pub is_generated: bool,
}

impl YoutubeCaptionSource {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            captions: config.captions.clone(),
        })
    }

    async fn fetch_watch_page(&self, video_id: &VideoId) -> Result<String, FetchError> {
        let url = self
            .captions
            .watch_url
            .replace("{video_id}", &urlencoding::encode(video_id.as_str()));

        tracing::debug!("Fetching watch page: {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Http(format!("Failed to fetch watch page: {}", e)))?;

        check_http_status(&response, video_id)?;

        response
            .text()
            .await
            .map_err(|e| FetchError::Http(format!("Failed to read watch page: {}", e)))
    }

    async fn fetch_player_data(&self, video_id: &VideoId, api_key: &str) -> Result<Value, FetchError> {
        let url = self
            .captions
            .player_url
            .replace("{api_key}", &urlencoding::encode(api_key));

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video_id.as_str()
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FetchError::Http(format!("Failed to fetch player data: {}", e)))?;

        check_http_status(&response, video_id)?;

        response.json().await.map_err(|e| FetchError::Unparsable {
            video_id: video_id.to_string(),
            detail: format!("player response is not JSON: {}", e),
        })
    }

    async fn fetch_timedtext(&self, video_id: &VideoId, track: &TrackInfo) -> Result<String, FetchError> {
        if track.base_url.contains("&exp=xpe") {
            return Err(FetchError::RequestBlocked(video_id.to_string()));
        }

        let response = self
            .client
            .get(&track.base_url)
            .send()
            .await
            .map_err(|e| FetchError::Http(format!("Failed to fetch captions: {}", e)))?;

        check_http_status(&response, video_id)?;

        response
            .text()
            .await
            .map_err(|e| FetchError::Http(format!("Failed to read captions: {}", e)))
    }
}

#[async_trait]
impl CaptionSource for YoutubeCaptionSource {
    async fn fetch_track(&self, video_id: &VideoId) -> Result<CaptionTrack, FetchError> {
        let html = self.fetch_watch_page(video_id).await?;
        let api_key = extract_innertube_api_key(&html, video_id)?;
        let player = self.fetch_player_data(video_id, &api_key).await?;

        check_playability(video_id, &player)?;

        let tracks = list_caption_tracks(video_id, &player)?;
        let track = select_track(video_id, &tracks, &self.captions.languages)?;
        tracing::info!(
            "Using {} caption track '{}'",
            if track.is_generated { "generated" } else { "manual" },
            track.language_code
        );

        let xml = self.fetch_timedtext(video_id, track).await?;
        let entries = parse_timedtext(&xml);
        if entries.is_empty() {
            return Err(FetchError::TranscriptsDisabled(video_id.to_string()));
        }

        Ok(CaptionTrack {
            language_code: Some(track.language_code.clone()),
            is_generated: track.is_generated,
            entries,
        })
    }

    fn platform_name(&self) -> &'static str {
        "YouTube"
    }
}

fn check_http_status(response: &reqwest::Response, video_id: &VideoId) -> Result<(), FetchError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RequestBlocked(video_id.to_string()));
    }
    if !status.is_success() {
        return Err(FetchError::Http(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        )));
    }
    Ok(())
}

/// Pull the InnerTube API key out of the watch page
pub fn extract_innertube_api_key(html: &str, video_id: &VideoId) -> Result<String, FetchError> {
    if html.contains("g-recaptcha") {
        return Err(FetchError::RequestBlocked(video_id.to_string()));
    }

    regex!(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#)
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|key| key.as_str().to_string())
        .ok_or_else(|| FetchError::Unparsable {
            video_id: video_id.to_string(),
            detail: "INNERTUBE_API_KEY not found in watch page".to_string(),
        })
}

/// Translate the player's playability status into a fetch error
pub fn check_playability(video_id: &VideoId, player: &Value) -> Result<(), FetchError> {
    let Some(playability) = player.get("playabilityStatus") else {
        return Ok(());
    };

    let status = playability["status"].as_str().unwrap_or("");
    let reason = playability["reason"].as_str().unwrap_or("");

    match status {
        "OK" => Ok(()),
        "LOGIN_REQUIRED" if reason.contains("not a bot") => {
            Err(FetchError::RequestBlocked(video_id.to_string()))
        }
        "ERROR" if reason.contains("unavailable") => {
            Err(FetchError::VideoUnavailable(video_id.to_string()))
        }
        _ => Err(FetchError::VideoUnplayable {
            video_id: video_id.to_string(),
            reason: if reason.is_empty() { status.to_string() } else { reason.to_string() },
        }),
    }
}

/// List the caption tracks advertised by the player response
pub fn list_caption_tracks(video_id: &VideoId, player: &Value) -> Result<Vec<TrackInfo>, FetchError> {
    let tracks: Vec<TrackInfo> = player["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"]
        .as_array()
        .map(|tracks| {
            tracks
                .iter()
                .filter_map(|track| {
                    Some(TrackInfo {
                        language_code: track["languageCode"].as_str()?.to_string(),
                        base_url: track["baseUrl"].as_str()?.replace("&fmt=srv3", ""),
                        is_generated: track["kind"].as_str() == Some("asr"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(FetchError::TranscriptsDisabled(video_id.to_string()));
    }

    Ok(tracks)
}

/// Pick a track for the first matching language, preferring manual over generated
pub fn select_track<'a>(
    video_id: &VideoId,
    tracks: &'a [TrackInfo],
    languages: &[String],
) -> Result<&'a TrackInfo, FetchError> {
    languages
        .iter()
        .find_map(|lang| {
            let manual = tracks
                .iter()
                .find(|t| &t.language_code == lang && !t.is_generated);
            manual.or_else(|| tracks.iter().find(|t| &t.language_code == lang))
        })
        .ok_or_else(|| FetchError::NoTranscriptFound {
            video_id: video_id.to_string(),
            languages: languages.to_vec(),
        })
}

/// Parse timed-text XML into caption entries.
///
/// Self-closing entries carry no text and are skipped; markup inside an
/// entry is removed, surrounding whitespace is kept.
pub fn parse_timedtext(xml: &str) -> Vec<CaptionEntry> {
    let attr_re = regex!(r#"(\w+)="([^"]*)""#);
    let tag_re = regex!(r"(?i)<[^>]*>");

    regex!(r"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)")
        .captures_iter(xml)
        .filter_map(|captures| {
            let raw = captures.get(2)?.as_str();

            let mut start = 0.0;
            let mut duration = 0.0;
            for attr in attr_re.captures_iter(captures.get(1).map_or("", |m| m.as_str())) {
                match &attr[1] {
                    "start" => start = attr[2].parse().unwrap_or(0.0),
                    "dur" => duration = attr[2].parse().unwrap_or(0.0),
                    _ => {}
                }
            }

            // Caption text is entity-escaped twice: once by the XML and once as HTML
            let unescaped = decode_entities(&decode_entities(raw));
            let text = tag_re.replace_all(&unescaped, "").into_owned();

            Some(CaptionEntry { text, start, duration })
        })
        .collect()
}

/// Decode the XML/HTML entities YouTube emits
fn decode_entities(input: &str) -> String {
    regex!(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);")
        .replace_all(input, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}
