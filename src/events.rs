use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::errors::{AppError, AppResult};

pub const ROUTE_HOME: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
}

/// Something the UI layer should react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    Toast { level: ToastLevel, message: String },
    RefetchQuery { key: String },
    Navigate { route: String },
}

impl UiEvent {
    pub fn success(message: &str) -> Self {
        UiEvent::Toast {
            level: ToastLevel::Success,
            message: message.to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        UiEvent::Toast {
            level: ToastLevel::Error,
            message: message.to_string(),
        }
    }
}

/// View the upload surface was opened from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginView {
    Home,
    Other(String),
}

impl OriginView {
    pub fn from_path(path: &str) -> Self {
        if path == ROUTE_HOME {
            OriginView::Home
        } else {
            OriginView::Other(path.to_string())
        }
    }

    pub fn is_home(&self) -> bool {
        matches!(self, OriginView::Home)
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: UiEvent) -> AppResult<()>;
}

/// Sink for headless use: every event becomes a log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: UiEvent) -> AppResult<()> {
        match &event {
            UiEvent::Toast {
                level: ToastLevel::Error,
                message,
            } => log::error!("{}", message),
            UiEvent::Toast { message, .. } => log::info!("{}", message),
            UiEvent::RefetchQuery { key } => log::info!("Refetching cached query '{}'", key),
            UiEvent::Navigate { route } => log::info!("Navigating to {}", route),
        }
        Ok(())
    }
}

impl EventSink for UnboundedSender<UiEvent> {
    fn emit(&self, event: UiEvent) -> AppResult<()> {
        self.send(event)
            .map_err(|e| AppError::Internal(format!("event receiver dropped: {}", e)))
    }
}

/// Emit UI event with error handling
pub fn safe_emit_event(sink: &dyn EventSink, event: UiEvent) -> bool {
    let description = format!("{:?}", event);
    match sink.emit(event) {
        Ok(()) => {
            log::debug!("Successfully emitted event {}", description);
            true
        }
        Err(e) => {
            log::warn!(
                "Failed to emit event {} (non-critical): {}",
                description,
                e
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_origin_view_from_path() {
        assert!(OriginView::from_path("/").is_home());
        assert!(!OriginView::from_path("/users/3").is_home());
    }

    #[test]
    fn test_channel_sink_delivers_events() {
        let (tx, mut rx) = unbounded_channel();
        assert!(safe_emit_event(&tx, UiEvent::success("done")));
        assert_eq!(rx.try_recv().unwrap(), UiEvent::success("done"));
    }

    #[test]
    fn test_closed_channel_is_non_critical() {
        let (tx, rx) = unbounded_channel::<UiEvent>();
        drop(rx);
        assert!(!safe_emit_event(&tx, UiEvent::error("lost")));
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let json = serde_json::to_value(UiEvent::RefetchQuery {
            key: "allArtworks".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "refetch_query", "key": "allArtworks"})
        );
    }
}
