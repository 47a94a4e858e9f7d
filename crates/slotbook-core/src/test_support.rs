//! Shared fixtures for unit tests: a scripted transport and client builders.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::api::transport::{OutgoingRequest, Transport, TransportError, TransportResponse};
use crate::api::ApiClient;
use crate::auth::{CredentialMode, CredentialStore};

pub(crate) const TEST_BASE_URL: &str = "http://api.test";

/// Replays queued responses in order and records every request it receives.
/// Running out of responses is reported as a transport failure.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<TransportResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<OutgoingRequest>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&self, response: Result<TransportResponse, TransportError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_json(&self, status: u16, body: Value) {
        self.push_raw(status, &body.to_string());
    }

    pub(crate) fn push_raw(&self, status: u16, body: &str) {
        self.push(Ok(TransportResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.as_bytes().to_vec(),
        }));
    }

    pub(crate) fn push_empty(&self, status: u16) {
        self.push_raw(status, "");
    }

    pub(crate) fn push_network_error(&self, message: &str) {
        self.push(Err(TransportError::Unavailable(message.to_string())));
    }

    pub(crate) fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> OutgoingRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Unavailable("no scripted response".to_string())))
    }
}

/// Client over `transport` (shared, so the test keeps its handle).
pub(crate) fn client_with(
    mode: CredentialMode,
    transport: &ScriptedTransport,
    store: Arc<dyn CredentialStore>,
) -> ApiClient {
    ApiClient::with_transport(TEST_BASE_URL, mode, Arc::new(transport.clone()), store)
}

pub(crate) fn user_json(role: &str) -> Value {
    json!({
        "id": "u1",
        "name": "Ana",
        "email": "ana@example.com",
        "role": role,
        "phone": "11999990000",
        "created_at": "2024-05-01T12:00:00Z",
        "updated_at": "2024-05-01T12:00:00Z"
    })
}

pub(crate) fn notification_json(id: &str, read: bool) -> Value {
    json!({
        "id": id,
        "providerId": "p1",
        "type": "NEW_BOOKING",
        "title": "Nova reserva",
        "message": "Você tem uma nova reserva",
        "read": read,
        "bookingId": "b1",
        "created_at": "2024-05-01T12:00:00Z"
    })
}

/// Wrap `data` in a single-page paginated envelope.
pub(crate) fn page_json(data: Vec<Value>) -> Value {
    let total = data.len();
    json!({
        "data": data,
        "pagination": {"total": total, "page": 1, "limit": 20, "totalPages": 1}
    })
}
