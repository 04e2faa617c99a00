//! Mock implementations for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use vitrine_sandbox::{
    AjaxRequest, AjaxResponse, NotificationKind, Notifier, SandboxError, SandboxResult, Transport,
};

pub use vitrine_filters::RecordingNavigator;

/// Mock implementation of the `Transport` trait.
///
/// Replies with queued responses in order and records every request. Once
/// the queue is empty it answers `404` with an empty body, or fails with
/// [`SandboxError::Transport`] when built with [`MockTransport::offline`].
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<AjaxResponse>>>,
    requests: Arc<Mutex<Vec<AjaxRequest>>>,
    offline: bool,
}

impl MockTransport {
    /// Create a mock with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every request fails.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Queue a response.
    #[must_use]
    pub fn with_response(self, status: u16, body: impl Into<String>) -> Self {
        self.push(AjaxResponse {
            status,
            body: body.into(),
        });
        self
    }

    /// Queue a `200` response with a JSON body.
    #[must_use]
    pub fn with_json(self, body: &Value) -> Self {
        self.with_response(200, body.to_string())
    }

    /// Queue a response after construction.
    pub fn push(&self, response: AjaxResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<AjaxRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: AjaxRequest) -> SandboxResult<AjaxResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        if self.offline {
            return Err(SandboxError::Transport("mock transport is offline".to_owned()));
        }

        Ok(self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| AjaxResponse {
                status: 404,
                body: String::new(),
            }))
    }
}

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Title.
    pub title: String,
    /// Body.
    pub message: String,
    /// Severity.
    pub kind: NotificationKind,
}

/// Notifier that records notifications instead of showing them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Notifications of one kind.
    #[must_use]
    pub fn of_kind(&self, kind: NotificationKind) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|n| n.kind == kind)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str, kind: NotificationKind) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                title: title.to_owned(),
                message: message.to_owned(),
                kind,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_transport_replays_in_order() {
        let transport = MockTransport::new()
            .with_json(&json!({"success": true}))
            .with_response(500, "boom");

        let first = transport.send(AjaxRequest::get("/a")).await.unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(first.json::<Value>().unwrap()["success"], json!(true));

        let second = transport.send(AjaxRequest::get("/b")).await.unwrap();
        assert!(!second.is_success());

        let third = transport.send(AjaxRequest::get("/c")).await.unwrap();
        assert_eq!(third.status, 404);

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["/a", "/b", "/c"]);
    }

    #[tokio::test]
    async fn test_offline_transport() {
        let transport = MockTransport::offline();
        assert!(transport.send(AjaxRequest::get("/a")).await.is_err());
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.notify("Saved", "Dataset updated", NotificationKind::Success);
        notifier.notify("Oops", "Upload failed", NotificationKind::Error);
        assert_eq!(notifier.notifications().len(), 2);
        assert_eq!(notifier.of_kind(NotificationKind::Error)[0].title, "Oops");
    }
}
