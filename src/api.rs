use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request, State,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::{
    feed::NormalizeError,
    store::{Store, StoreError, StoredEvent},
    webhooks::PayloadError,
};

/// Lists every stored event, newest first.
#[rocket::get("/events")]
pub async fn events(store: &State<Store>) -> Result<Json<Vec<StoredEvent>>, ApiError> {
    let events = store.query_all().await?;
    Ok(Json(events))
}

/// JSON body of every reply that isn't an event listing: `{"status": "..."}`.
#[derive(Debug, Serialize)]
pub struct StatusReply {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StatusReply {
    pub fn new(status: &'static str) -> Self {
        Self {
            status,
            reason: None,
        }
    }

    fn with_reason(status: &'static str, reason: String) -> Self {
        Self {
            status,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> Status {
        match self {
            Self::Payload(PayloadError::TooLarge) => Status::PayloadTooLarge,
            Self::Payload(_) | Self::Normalize(NormalizeError::NoData) => Status::BadRequest,
            Self::Normalize(NormalizeError::Malformed { .. }) | Self::Store(_) => {
                Status::InternalServerError
            }
        }
    }

    fn reply(&self) -> StatusReply {
        match self {
            Self::Payload(PayloadError::Empty) | Self::Normalize(NormalizeError::NoData) => {
                StatusReply::new("no data")
            }
            Self::Payload(PayloadError::TooLarge) => StatusReply::new("payload too large"),
            Self::Payload(e) => StatusReply::with_reason("invalid payload", e.to_string()),
            Self::Normalize(e) => StatusReply::with_reason("malformed payload", e.to_string()),
            Self::Store(e) => StatusReply::with_reason("storage failure", e.to_string()),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            error!("{} {} failed: {}", request.method(), request.uri(), self);
        } else {
            warn!("rejected {} {}: {}", request.method(), request.uri(), self);
        }

        (status, Json(self.reply())).respond_to(request)
    }
}
