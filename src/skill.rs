use alexa::{IntentName, PlayBehavior, Request, RequestType, ResponseEnvelope};

use crate::config::StreamConfig;

const WELCOME: &str = "Welcome to KEXP 90.3FM";
const HELP: &str = "Say PLAY to play the KEXP live stream";
const NEXT_PREVIOUS_UNSUPPORTED: &str = "Sorry, Next and Previous are not supported.";
const LOOP_UNSUPPORTED: &str = "Sorry, looping is not supported.";
const SHUFFLE_UNSUPPORTED: &str = "Sorry, shuffle is not supported.";
const REPEAT_UNSUPPORTED: &str = "Sorry, Repeat is not supported.";

/// What the skill decided to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Speak {
        text: &'static str,
        keep_session_open: bool,
    },
    Audio(AudioDirective),
    Empty {
        end_session: bool,
    },
    /// Nothing useful to say, the platform still expects a successful reply
    Unhandled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioDirective {
    Play {
        behavior: PlayBehavior,
        stream_url: String,
        token: String,
    },
    Stop,
}

impl Outcome {
    fn speak(text: &'static str) -> Self {
        Self::Speak {
            text,
            keep_session_open: false,
        }
    }

    /// Convert into the response sent back to Alexa, `Unhandled` has no body.
    pub fn into_response(self) -> Option<ResponseEnvelope> {
        match self {
            Self::Speak {
                text,
                keep_session_open,
            } => Some(ResponseEnvelope::tell(text).set_should_end_session(!keep_session_open)),
            Self::Audio(AudioDirective::Play {
                behavior,
                stream_url,
                token,
            }) => Some(ResponseEnvelope::audio_player_play(
                behavior,
                &stream_url,
                &token,
            )),
            Self::Audio(AudioDirective::Stop) => Some(ResponseEnvelope::audio_player_stop()),
            Self::Empty { end_session } => {
                Some(ResponseEnvelope::empty().set_should_end_session(end_session))
            }
            Self::Unhandled => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Skill {
    stream: StreamConfig,
}

impl Skill {
    pub fn new(stream: StreamConfig) -> Self {
        Self { stream }
    }

    pub fn dispatch(&self, request: &Request) -> Outcome {
        match &request.kind {
            RequestType::Launch => Outcome::Speak {
                text: WELCOME,
                keep_session_open: true,
            },
            RequestType::Intent => match request.intent_name() {
                Some(name) => self.intent(name),
                None => Outcome::Unhandled,
            },
            // Nothing to do for these, but they need to be acknowledged
            RequestType::AudioPlayer(_) => Outcome::Empty { end_session: false },
            RequestType::SessionEnded => Outcome::Empty { end_session: true },
            RequestType::Other(_) => Outcome::Unhandled,
        }
    }

    fn intent(&self, name: &IntentName) -> Outcome {
        match name {
            IntentName::Play | IntentName::Resume | IntentName::StartOver => {
                Outcome::Audio(AudioDirective::Play {
                    behavior: PlayBehavior::ReplaceAll,
                    stream_url: self.stream.url.clone(),
                    token: self.stream.token.clone(),
                })
            }
            IntentName::Cancel | IntentName::Pause | IntentName::Stop => {
                Outcome::Audio(AudioDirective::Stop)
            }
            IntentName::Help => Outcome::Speak {
                text: HELP,
                keep_session_open: true,
            },
            IntentName::Next | IntentName::Previous => Outcome::speak(NEXT_PREVIOUS_UNSUPPORTED),
            IntentName::LoopOn | IntentName::LoopOff => Outcome::speak(LOOP_UNSUPPORTED),
            IntentName::ShuffleOn | IntentName::ShuffleOff => Outcome::speak(SHUFFLE_UNSUPPORTED),
            IntentName::Repeat => Outcome::speak(REPEAT_UNSUPPORTED),
            IntentName::Unrecognized(_) => Outcome::Unhandled,
        }
    }
}
