//! Fixed user-facing reply strings and outcome rendering.

use atelia_common::types::GenerationOutcome;

pub const CMD_SET_PARAMS: &str = "/imgset";
pub const CMD_GET_PARAMS: &str = "/imgget";
pub const CANCEL_KEYWORD: &str = "cancel";

pub const RETRY: &str = "Something went wrong on our side, please try again shortly.";
pub const GENERATING: &str =
    "Generating now. Wait about 30 seconds, then send any text message to fetch the result.";
pub const STILL_GENERATING: &str =
    "Still generating, send any text message in a moment to fetch the result.";
pub const LINK_DISCLAIMER: &str =
    "⚠️ Each link allows only 2 visits, please save your images promptly.";
pub const REFERENCE_SAVED: &str = "Image saved as reference. Send a text description to start \
                                   generating, or send \"cancel\" to drop the reference.";
pub const REFERENCE_REPLACED: &str = "Reference image replaced. Send a text description to start \
                                      generating, or send \"cancel\" to drop the reference.";
pub const REFERENCE_CANCELLED: &str = "Reference image cancelled.";
pub const REFERENCE_DOWNLOAD_FAILED: &str = "Failed to download the reference image.";
pub const GENERATION_FAILED: &str = "Generation failed, please try again shortly.";
pub const PARAMS_SAVED: &str = "Generation parameters saved.";
pub const PARAMS_HEADER: &str = "Current generation parameters:";
pub const LINK_ACCOUNT_FIRST: &str = "Please link your account first.";
pub const UNKNOWN_COMMAND: &str = "Unknown command.";

/// Render a consumed generation outcome as a reply.
///
/// Success lists the image links numbered, followed by the visit-limit
/// disclaimer; failure surfaces the backend's message.
pub fn render_outcome(outcome: &GenerationOutcome) -> String {
    if !outcome.success {
        return outcome
            .message
            .clone()
            .unwrap_or_else(|| GENERATION_FAILED.to_string());
    }

    let mut lines: Vec<String> = outcome
        .image_urls
        .iter()
        .enumerate()
        .map(|(i, url)| format!("{}. {url}", i + 1))
        .collect();
    if !lines.is_empty() {
        lines.push(String::new());
        lines.push(LINK_DISCLAIMER.to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_success_numbers_urls_and_appends_disclaimer() {
        let outcome = GenerationOutcome::success(
            vec!["https://img/a.png".into(), "https://img/b.png".into()],
            None,
        );
        let reply = render_outcome(&outcome);
        assert!(reply.starts_with("1. https://img/a.png\n2. https://img/b.png"));
        assert!(reply.ends_with(LINK_DISCLAIMER));
    }

    #[test]
    fn test_render_success_without_urls_is_empty() {
        let outcome = GenerationOutcome::success(vec![], None);
        assert_eq!(render_outcome(&outcome), "");
    }

    #[test]
    fn test_render_failure_uses_backend_message() {
        let outcome = GenerationOutcome::failure("quota exhausted");
        assert_eq!(render_outcome(&outcome), "quota exhausted");

        let bare = GenerationOutcome {
            success: false,
            message: None,
            image_urls: vec![],
        };
        assert_eq!(render_outcome(&bare), GENERATION_FAILED);
    }
}
