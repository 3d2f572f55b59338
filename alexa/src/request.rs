pub mod intent;

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

pub use intent::{Intent, IntentName};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    pub version: String,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
    pub request: Request,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    pub session_id: String,
    pub application: Application,
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(rename = "type")]
    pub kind: RequestType,
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub intent: Option<Intent>,
    // SessionEndedRequest
    #[serde(default)]
    pub reason: Option<String>,
    // AudioPlayer requests
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub offset_in_milliseconds: Option<u64>,
}

impl Request {
    pub fn intent_name(&self) -> Option<&IntentName> {
        self.intent.as_ref().map(|intent| &intent.name)
    }
}

/// The `type` field of a request.
///
/// Anything this skill does not know about ends up in `Other`, so the set of
/// variants stays closed and every `match` on it has to be exhaustive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RequestType {
    Launch,
    Intent,
    SessionEnded,
    AudioPlayer(AudioPlayerEvent),
    Other(String),
}

impl From<String> for RequestType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "LaunchRequest" => Self::Launch,
            "IntentRequest" => Self::Intent,
            "SessionEndedRequest" => Self::SessionEnded,
            _ => match value.strip_prefix("AudioPlayer.") {
                Some(event) => Self::AudioPlayer(event.to_owned().into()),
                None => Self::Other(value),
            },
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Launch => write!(f, "LaunchRequest"),
            Self::Intent => write!(f, "IntentRequest"),
            Self::SessionEnded => write!(f, "SessionEndedRequest"),
            Self::AudioPlayer(event) => write!(f, "AudioPlayer.{event}"),
            Self::Other(other) => write!(f, "{other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPlayerEvent {
    PlaybackStarted,
    PlaybackFinished,
    PlaybackStopped,
    PlaybackNearlyFinished,
    PlaybackFailed,
    Other(String),
}

impl From<String> for AudioPlayerEvent {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PlaybackStarted" => Self::PlaybackStarted,
            "PlaybackFinished" => Self::PlaybackFinished,
            "PlaybackStopped" => Self::PlaybackStopped,
            "PlaybackNearlyFinished" => Self::PlaybackNearlyFinished,
            "PlaybackFailed" => Self::PlaybackFailed,
            _ => Self::Other(value),
        }
    }
}

impl fmt::Display for AudioPlayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaybackStarted => write!(f, "PlaybackStarted"),
            Self::PlaybackFinished => write!(f, "PlaybackFinished"),
            Self::PlaybackStopped => write!(f, "PlaybackStopped"),
            Self::PlaybackNearlyFinished => write!(f, "PlaybackNearlyFinished"),
            Self::PlaybackFailed => write!(f, "PlaybackFailed"),
            Self::Other(other) => write!(f, "{other}"),
        }
    }
}
