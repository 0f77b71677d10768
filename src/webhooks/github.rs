use chrono::Utc;
use rocket::{
    data::{ByteUnit, FromData, Outcome},
    http::{ContentType, Status},
    serde::json::Json,
    Data, Request, State,
};
use serde_json::Value;
use tracing::{debug, info, trace};

pub mod events;
pub use events::*;

use crate::{
    api::{ApiError, StatusReply},
    feed::{normalize, Normalized},
    store::Store,
};

#[rocket::post("/webhook", data = "<payload>")]
pub async fn webhook(
    payload: Result<WebhookPayload, PayloadError>,
    store: &State<Store>,
) -> Result<Json<StatusReply>, ApiError> {
    let WebhookPayload(payload) = payload?;

    let event = match normalize(&payload, Utc::now())? {
        Normalized::Record(event) => event,
        Normalized::Ignored { action } => {
            debug!("ignored pull request action `{}`", action);
            return Ok(Json(StatusReply::new("ignored")));
        }
        Normalized::Unsupported => {
            debug!("unsupported webhook payload");
            return Ok(Json(StatusReply::new("unsupported event")));
        }
    };

    let summary = event.message.clone();
    let id = store.insert(event).await?;
    info!("stored event {}: {}", id, summary);

    Ok(Json(StatusReply::new("success")))
}

/// Webhook body, parsed as JSON but not yet classified.
#[derive(Debug)]
pub struct WebhookPayload(pub Value);

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("empty request body")]
    Empty,
    #[error("request body isn't valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("data limit exceeded")]
    TooLarge,
    #[error("couldn't read request body: {0}")]
    Io(#[from] std::io::Error),
}

/// Largest payload GitHub delivers. Overridable with the `webhook` key of Rocket's `limits`.
const LIMIT: ByteUnit = ByteUnit::Mebibyte(25);

#[rocket::async_trait]
impl<'r> FromData<'r> for WebhookPayload {
    type Error = PayloadError;

    async fn from_data(request: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        trace!("received payload on webhook endpoint: {:?}", request);

        if request.content_type() != Some(&ContentType::JSON) {
            trace!(
                "content type `{:?}` isn't json, parsing the body anyway",
                request.content_type()
            );
        }

        let size_limit = request.limits().get("webhook").unwrap_or(LIMIT);
        let content = match data.open(size_limit).into_string().await {
            Ok(s) if s.is_complete() => s.into_inner(),
            Ok(_) => {
                trace!("payload was too big");
                return Outcome::Error((Status::PayloadTooLarge, PayloadError::TooLarge));
            }
            Err(e) => return Outcome::Error((Status::BadRequest, e.into())),
        };

        if content.trim().is_empty() {
            trace!("payload was empty");
            return Outcome::Error((Status::BadRequest, PayloadError::Empty));
        }

        match serde_json::from_str(&content) {
            Ok(value) => Outcome::Success(WebhookPayload(value)),
            Err(e) => {
                trace!("couldn't parse payload as json: {}", e);
                Outcome::Error((Status::BadRequest, PayloadError::InvalidJson(e)))
            }
        }
    }
}
