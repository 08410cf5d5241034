use serde::Serialize;
use storefront_core::{FeatureAsset, IngestionState};
use storefront_ingest::CommitOutcome;

/// Outcome of `storefront ingest`, printed as JSON.
#[derive(Debug, Serialize)]
pub struct IngestReport {
    pub file: String,
    pub state: IngestionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_error: Option<String>,
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render feature images as a fixed-width table.
pub fn format_feature_table(assets: &[FeatureAsset]) -> String {
    if assets.is_empty() {
        return "No feature images.\n".to_string();
    }

    let mut out = format!("{:<4} {:<26} {}\n", "#", "ID", "IMAGE");
    out.push_str(&"-".repeat(100));
    out.push('\n');
    for (position, asset) in assets.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<26} {}\n",
            position + 1,
            truncate_string(&asset.id, 26),
            truncate_string(&asset.remote_url, 68)
        ));
    }
    out
}

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so stdout carries only the JSON output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_counts_characters() {
        assert_eq!(truncate_string("bannière-été.png", 9), "banniè...");
    }

    #[test]
    fn table_lists_assets_in_order() {
        let table = format_feature_table(&[
            FeatureAsset::new("1", "https://cdn.example.com/a.png"),
            FeatureAsset::new("2", "https://cdn.example.com/b.png"),
        ]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("1 "));
        assert!(lines[2].ends_with("https://cdn.example.com/a.png"));
        assert!(lines[3].ends_with("https://cdn.example.com/b.png"));
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(format_feature_table(&[]), "No feature images.\n");
    }

    #[test]
    fn report_serializes_state() {
        let report = IngestReport {
            file: "photo.png".to_string(),
            state: IngestionState::Failed("upload failed".to_string()),
            commit: None,
            commit_error: None,
        };
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["state"]["state"], "failed");
        assert_eq!(json["state"]["detail"], "upload failed");
        assert!(json.get("commit").is_none());
    }
}
