//! Manual-review policy for fetched articles.

use crate::models::{FetchOutcome, ReviewDecision, ReviewReason};

/// Decide whether a human should check the row produced from `outcome`.
///
/// Failed downloads are always flagged with `download_failed`. Successful
/// downloads shorter than `min_text_length` characters are flagged with
/// `text_retrieved_is_too_small`. Absent text counts as length 0.
pub fn classify(outcome: &FetchOutcome, min_text_length: usize) -> ReviewDecision {
    if !outcome.status.is_success() {
        return ReviewDecision {
            manual_check_suggested: true,
            reason: Some(ReviewReason::DownloadFailed),
        };
    }

    let length = outcome.text.as_deref().map_or(0, |t| t.chars().count());
    if length < min_text_length {
        ReviewDecision {
            manual_check_suggested: true,
            reason: Some(ReviewReason::TextRetrievedIsTooSmall),
        }
    } else {
        ReviewDecision {
            manual_check_suggested: false,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FetchStatus;

    #[test]
    fn test_failed_download_always_flagged() {
        for text in [None, Some(String::new()), Some("x".repeat(5000))] {
            let outcome = FetchOutcome {
                status: FetchStatus::Failed("timeout".into()),
                text,
            };
            let decision = classify(&outcome, 50);
            assert!(decision.manual_check_suggested);
            assert_eq!(decision.reason, Some(ReviewReason::DownloadFailed));
        }
    }

    #[test]
    fn test_short_text_flagged() {
        let decision = classify(&FetchOutcome::success("x".repeat(49)), 50);
        assert!(decision.manual_check_suggested);
        assert_eq!(decision.reason, Some(ReviewReason::TextRetrievedIsTooSmall));
    }

    #[test]
    fn test_text_at_threshold_passes() {
        let decision = classify(&FetchOutcome::success("x".repeat(50)), 50);
        assert_eq!(
            decision,
            ReviewDecision {
                manual_check_suggested: false,
                reason: None
            }
        );
    }

    #[test]
    fn test_success_without_text_counts_as_empty() {
        let outcome = FetchOutcome {
            status: FetchStatus::Success,
            text: None,
        };
        assert_eq!(
            classify(&outcome, 1).reason,
            Some(ReviewReason::TextRetrievedIsTooSmall)
        );
        assert!(!classify(&outcome, 0).manual_check_suggested);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let outcome = FetchOutcome::success("é".repeat(10));
        assert!(!classify(&outcome, 10).manual_check_suggested);
    }
}
