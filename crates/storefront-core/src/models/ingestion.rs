use serde::Serialize;

/// Visible state of an upload controller.
///
/// Derived from the controller's internals; exactly one variant holds at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum IngestionState {
    #[default]
    Empty,
    /// File chosen, upload not started. Collapses into `Uploading` immediately.
    Selected,
    Uploading,
    Confirmed(String),
    Failed(String),
    /// Upload or persist stopped on request before completing.
    Cancelled,
}

impl IngestionState {
    pub fn is_uploading(&self) -> bool {
        matches!(self, IngestionState::Uploading)
    }

    /// Terminal states stay until the next select or remove.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IngestionState::Confirmed(_) | IngestionState::Failed(_) | IngestionState::Cancelled
        )
    }

    pub fn confirmed_url(&self) -> Option<&str> {
        match self {
            IngestionState::Confirmed(url) => Some(url),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            IngestionState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_follow_variant() {
        let confirmed = IngestionState::Confirmed("https://cdn/x.png".into());
        assert_eq!(confirmed.confirmed_url(), Some("https://cdn/x.png"));
        assert!(confirmed.is_terminal());
        assert!(confirmed.error_message().is_none());

        let failed = IngestionState::Failed("upload failed".into());
        assert_eq!(failed.error_message(), Some("upload failed"));
        assert!(!IngestionState::Uploading.is_terminal());
        assert!(IngestionState::Uploading.is_uploading());
    }

    #[test]
    fn serializes_tagged() {
        let json = serde_json::to_value(IngestionState::Confirmed("u".into())).unwrap();
        assert_eq!(json, serde_json::json!({"state": "confirmed", "detail": "u"}));
        let json = serde_json::to_value(IngestionState::Empty).unwrap();
        assert_eq!(json, serde_json::json!({"state": "empty"}));
    }
}
