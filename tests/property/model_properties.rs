//! Property-based tests for the domain model (wire values and validation).
//!
//! Uses proptest to verify:
//! 1. Arbitrary strings never panic when parsed as enums, colors or sort options.
//! 2. Palette colors parse regardless of hex digit case and surrounding spaces.
//! 3. Comment normalization enforces the character limit and is idempotent.
//! 4. A task patch serializes to an empty body exactly when it changes nothing.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use taskflow_proto::history::normalize_comment;
use taskflow_proto::{
    MAX_COMMENT_LENGTH, Priority, ProjectColor, SortOption, Status, TaskPatch, UserId,
    ValidationError,
};

proptest! {
    #[test]
    fn parsing_never_panics(s in "\\PC{0,24}") {
        let _ = s.parse::<Priority>();
        let _ = s.parse::<Status>();
        let _ = s.parse::<ProjectColor>();
        let _ = s.parse::<SortOption>();
    }

    #[test]
    fn palette_parse_ignores_case(
        color in prop::sample::select(ProjectColor::PALETTE.to_vec()),
        upper in prop::collection::vec(any::<bool>(), 7),
        pad in " {0,3}",
    ) {
        let mixed: String = color
            .hex()
            .chars()
            .zip(std::iter::once(false).chain(upper))
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
            .collect();
        let input = format!("{pad}{mixed}{pad}");
        prop_assert_eq!(input.parse::<ProjectColor>().unwrap(), color);
    }

    #[test]
    fn comment_limit_is_enforced(comment in "[a-zçãé ]{0,200}") {
        let trimmed_len = comment.trim().chars().count();
        match normalize_comment(Some(comment.clone())) {
            Ok(None) => prop_assert_eq!(trimmed_len, 0),
            Ok(Some(normalized)) => {
                prop_assert!(normalized.chars().count() <= MAX_COMMENT_LENGTH);
                prop_assert_eq!(
                    normalize_comment(Some(normalized.clone())).unwrap(),
                    Some(normalized)
                );
            }
            Err(ValidationError::CommentTooLong { len, max }) => {
                prop_assert_eq!(len, trimmed_len);
                prop_assert!(len > max);
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_patch_has_empty_body(
        title in prop::option::of("[a-z]{1,8}"),
        priority in prop::option::of(prop::sample::select(Priority::ALL.to_vec())),
        status in prop::option::of(prop::sample::select(Status::ALL.to_vec())),
        clear_assignee in any::<bool>(),
    ) {
        let patch = TaskPatch {
            title,
            priority,
            status,
            assigned_to: clear_assignee.then_some(None::<UserId>),
            ..TaskPatch::default()
        };
        let body = serde_json::to_string(&patch).unwrap();
        prop_assert_eq!(body == "{}", patch.is_empty());
        if clear_assignee {
            prop_assert!(body.contains("\"assigned_to\":null"));
        }
    }
}
