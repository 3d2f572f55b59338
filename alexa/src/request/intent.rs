use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: IntentName,
    #[serde(default)]
    pub confirmation_status: Option<String>,
}

/// Intents this skill knows how to answer, matched on the exact intent name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum IntentName {
    Play,
    Resume,
    StartOver,
    Cancel,
    Help,
    Pause,
    Stop,
    Next,
    Previous,
    LoopOn,
    LoopOff,
    ShuffleOn,
    ShuffleOff,
    Repeat,
    Unrecognized(String),
}

impl IntentName {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Play => "Play",
            Self::Resume => "AMAZON.ResumeIntent",
            Self::StartOver => "AMAZON.StartOverIntent",
            Self::Cancel => "AMAZON.CancelIntent",
            Self::Help => "AMAZON.HelpIntent",
            Self::Pause => "AMAZON.PauseIntent",
            Self::Stop => "AMAZON.StopIntent",
            Self::Next => "AMAZON.NextIntent",
            Self::Previous => "AMAZON.PreviousIntent",
            Self::LoopOn => "AMAZON.LoopOnIntent",
            Self::LoopOff => "AMAZON.LoopOffIntent",
            Self::ShuffleOn => "AMAZON.ShuffleOnIntent",
            Self::ShuffleOff => "AMAZON.ShuffleOffIntent",
            Self::Repeat => "AMAZON.RepeatIntent",
            Self::Unrecognized(name) => name,
        }
    }
}

impl From<String> for IntentName {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Play" => Self::Play,
            "AMAZON.ResumeIntent" => Self::Resume,
            "AMAZON.StartOverIntent" => Self::StartOver,
            "AMAZON.CancelIntent" => Self::Cancel,
            "AMAZON.HelpIntent" => Self::Help,
            "AMAZON.PauseIntent" => Self::Pause,
            "AMAZON.StopIntent" => Self::Stop,
            "AMAZON.NextIntent" => Self::Next,
            "AMAZON.PreviousIntent" => Self::Previous,
            "AMAZON.LoopOnIntent" => Self::LoopOn,
            "AMAZON.LoopOffIntent" => Self::LoopOff,
            "AMAZON.ShuffleOnIntent" => Self::ShuffleOn,
            "AMAZON.ShuffleOffIntent" => Self::ShuffleOff,
            "AMAZON.RepeatIntent" => Self::Repeat,
            _ => Self::Unrecognized(value),
        }
    }
}

impl fmt::Display for IntentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
