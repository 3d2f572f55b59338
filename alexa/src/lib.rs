pub mod request;
pub mod response;

pub use request::{AudioPlayerEvent, Intent, IntentName, Request, RequestEnvelope, RequestType};
pub use response::{Directive, PlayBehavior, Response, ResponseEnvelope};
