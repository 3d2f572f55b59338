pub mod directive;

use std::collections::HashMap;

use serde::Serialize;

pub use directive::{AudioItem, Directive, PlayBehavior, Stream};

const VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    version: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub session_attributes: HashMap<String, serde_json::Value>,
    pub response: Response,
}

impl ResponseEnvelope {
    pub fn new(response: Response) -> Self {
        Self {
            version: VERSION.into(),
            session_attributes: HashMap::new(),
            response,
        }
    }

    /// Response without speech or directives.
    pub fn empty() -> Self {
        Self::new(Response::default())
    }

    /// Speak `text` and end the session.
    pub fn tell(text: &str) -> Self {
        Self::new(Response {
            output_speech: Some(OutputSpeech::plain_text(text)),
            should_end_session: Some(true),
            ..Default::default()
        })
    }

    pub fn audio_player_play(behavior: PlayBehavior, url: &str, token: &str) -> Self {
        Self::new(Response {
            directives: vec![Directive::play(behavior, url, token)],
            should_end_session: Some(true),
            ..Default::default()
        })
    }

    pub fn audio_player_stop() -> Self {
        Self::new(Response {
            directives: vec![Directive::Stop],
            should_end_session: Some(true),
            ..Default::default()
        })
    }

    pub fn set_should_end_session(mut self, should_end_session: bool) -> Self {
        self.response.should_end_session = Some(should_end_session);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    PlainText { text: String },
    #[serde(rename = "SSML")]
    Ssml { ssml: String },
}

impl OutputSpeech {
    pub fn plain_text(text: &str) -> Self {
        Self::PlainText { text: text.into() }
    }
}
