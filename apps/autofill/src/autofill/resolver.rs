//! Direct-value resolver: maps a classified field to what should be written.
//!
//! Free text is never invented. A field the engine cannot fill from the profile is
//! left blank and counted as review-needed or manual-required.

use crate::autofill::classifier::FieldTag;
use crate::autofill::context::{FieldOption, WidgetType};
use crate::autofill::patterns;
use crate::autofill::profile::ApplicantProfile;
use crate::autofill::stats::FillOutcome;
use crate::dom::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Answer affirmatively through the knockout responder.
    Affirm,
    /// Write this text.
    Value(String),
    /// Pick one of the field's options.
    MatchOption {
        wanted: Option<String>,
        allow_safe_patterns: bool,
    },
    /// Leave the field untouched and count it under this outcome.
    Skip(FillOutcome),
}

pub fn resolve(tag: FieldTag, widget: WidgetType, profile: &ApplicantProfile) -> Resolution {
    match tag {
        FieldTag::Knockout | FieldTag::YesNo => Resolution::Affirm,
        FieldTag::TextareaGeneric => Resolution::Skip(FillOutcome::ManualRequired),
        FieldTag::TextGeneric => Resolution::Skip(FillOutcome::ReviewNeeded),
        FieldTag::DropdownGeneric => Resolution::MatchOption {
            wanted: None,
            allow_safe_patterns: true,
        },
        _ => {
            let value = profile.value_for(tag).unwrap_or_default();
            if value.is_empty() {
                return Resolution::Skip(FillOutcome::ManualRequired);
            }
            match widget {
                WidgetType::Select | WidgetType::Radio => Resolution::MatchOption {
                    wanted: Some(value.to_string()),
                    allow_safe_patterns: false,
                },
                WidgetType::Checkbox => Resolution::Skip(FillOutcome::ReviewNeeded),
                WidgetType::Text | WidgetType::Textarea => Resolution::Value(value.to_string()),
            }
        }
    }
}

/// Result of option matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionChoice {
    /// The profile value matched this option.
    Matched(NodeId),
    /// A safe pattern or the first-non-empty fallback picked this option.
    Guessed(NodeId),
    /// Something is already selected; leave it.
    Keep,
    /// No usable option.
    Unavailable,
}

fn norm(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether `needle` occurs in `haystack` with no letter or digit on either side.
fn contains_word(haystack: &str, needle: &str) -> bool {
    !needle.is_empty()
        && haystack.match_indices(needle).any(|(i, _)| {
            let before = haystack[..i].chars().next_back();
            let after = haystack[i + needle.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
}

/// Exact match, then whole-word substring either direction (option text before
/// value), then (when allowed) the safe patterns, then the first non-empty option
/// if nothing non-empty is selected yet.
pub fn match_option(
    options: &[FieldOption],
    wanted: Option<&str>,
    allow_safe_patterns: bool,
    already_answered: bool,
) -> OptionChoice {
    let candidates: Vec<(&FieldOption, String, String)> = options
        .iter()
        .map(|o| (o, norm(&o.value), norm(&o.text)))
        .filter(|(_, value, text)| !value.is_empty() || !text.is_empty())
        .collect();

    if let Some(wanted) = wanted.map(norm).filter(|w| !w.is_empty()) {
        if let Some((o, _, _)) = candidates
            .iter()
            .find(|(_, value, text)| *value == wanted || *text == wanted)
        {
            return OptionChoice::Matched(o.node);
        }

        // Visible text first; short codes like "at" only count as whole words.
        let overlaps = |candidate: &str| {
            candidate.len() >= 2
                && (contains_word(candidate, &wanted) || contains_word(&wanted, candidate))
        };
        if let Some((o, _, _)) = candidates.iter().find(|(_, _, text)| overlaps(text)) {
            return OptionChoice::Matched(o.node);
        }
        if let Some((o, _, _)) = candidates.iter().find(|(_, value, _)| overlaps(value)) {
            return OptionChoice::Matched(o.node);
        }
    }

    if allow_safe_patterns {
        for pattern in patterns::safe_option_patterns() {
            if let Some((o, _, _)) = candidates
                .iter()
                .find(|(_, value, text)| pattern.is_match(text) || pattern.is_match(value))
            {
                return OptionChoice::Guessed(o.node);
            }
        }
    }

    if already_answered {
        return OptionChoice::Keep;
    }
    candidates
        .iter()
        .find(|(_, value, _)| !value.is_empty())
        .map(|(o, _, _)| OptionChoice::Guessed(o.node))
        .unwrap_or(OptionChoice::Unavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn options(texts: &[(&str, &str)]) -> (Document, Vec<FieldOption>) {
        let html = format!(
            "<select id='s'>{}</select>",
            texts
                .iter()
                .map(|(v, t)| format!("<option value='{v}'>{t}</option>"))
                .collect::<String>()
        );
        let d = Document::parse("https://example.com", &html).unwrap();
        let s = d.element_by_id("s").unwrap();
        let opts = d
            .options(s)
            .into_iter()
            .map(|node| FieldOption {
                node,
                value: d.option_value(node),
                text: d.option_text(node),
            })
            .collect();
        (d, opts)
    }

    #[test]
    fn test_resolve_routes_by_tag() {
        let profile = ApplicantProfile::default();
        assert_eq!(
            resolve(FieldTag::Knockout, WidgetType::Radio, &profile),
            Resolution::Affirm
        );
        assert_eq!(
            resolve(FieldTag::YesNo, WidgetType::Select, &profile),
            Resolution::Affirm
        );
        assert_eq!(
            resolve(FieldTag::Email, WidgetType::Text, &profile),
            Resolution::Value("applicant@example.com".into())
        );
        assert_eq!(
            resolve(FieldTag::Country, WidgetType::Select, &profile),
            Resolution::MatchOption {
                wanted: Some("United States".into()),
                allow_safe_patterns: false
            }
        );
        assert_eq!(
            resolve(FieldTag::TextareaGeneric, WidgetType::Textarea, &profile),
            Resolution::Skip(FillOutcome::ManualRequired)
        );
        assert_eq!(
            resolve(FieldTag::TextGeneric, WidgetType::Text, &profile),
            Resolution::Skip(FillOutcome::ReviewNeeded)
        );
    }

    #[test]
    fn test_missing_link_is_manual_required() {
        let profile = ApplicantProfile::default();
        assert_eq!(
            resolve(FieldTag::Linkedin, WidgetType::Text, &profile),
            Resolution::Skip(FillOutcome::ManualRequired)
        );
    }

    #[test]
    fn test_identity_tags_always_resolve_to_values() {
        let profile = ApplicantProfile::default();
        for tag in [
            FieldTag::FirstName,
            FieldTag::LastName,
            FieldTag::FullName,
            FieldTag::Phone,
            FieldTag::Address,
            FieldTag::City,
            FieldTag::State,
            FieldTag::Zip,
            FieldTag::Country,
        ] {
            match resolve(tag, WidgetType::Text, &profile) {
                Resolution::Value(v) => assert!(!v.is_empty()),
                other => panic!("{tag:?} resolved to {other:?}"),
            }
        }
    }

    #[test]
    fn test_exact_match_beats_substring() {
        let (_d, opts) = options(&[("", "Select"), ("usmo", "United States Minor Outlying Islands"), ("us", "United States")]);
        assert_eq!(
            match_option(&opts, Some("united states"), false, false),
            OptionChoice::Matched(opts[2].node)
        );
    }

    #[test]
    fn test_substring_either_direction() {
        let (_d, opts) = options(&[("", "--"), ("CA", "Canada"), ("US", "USA")]);
        assert_eq!(
            match_option(&opts, Some("Canada (CA)"), false, false),
            OptionChoice::Matched(opts[1].node)
        );
        let (_d, opts) = options(&[("", "--"), ("ny", "New York (NY)")]);
        assert_eq!(
            match_option(&opts, Some("new york"), false, false),
            OptionChoice::Matched(opts[1].node)
        );
    }

    #[test]
    fn test_short_codes_do_not_match_inside_words() {
        let (_d, opts) = options(&[
            ("", "Select"),
            ("AF", "Afghanistan"),
            ("AT", "Austria"),
            ("US", "United States of America"),
        ]);
        assert_eq!(
            match_option(&opts, Some("United States"), false, false),
            OptionChoice::Matched(opts[3].node)
        );

        let (_d, opts) = options(&[("", "Select"), ("AF", "Afghanistan"), ("AT", "Austria")]);
        assert_eq!(
            match_option(&opts, Some("United States"), false, false),
            OptionChoice::Guessed(opts[1].node)
        );
    }

    #[test]
    fn test_safe_patterns_only_when_allowed() {
        let (_d, opts) = options(&[("", "Choose"), ("pt", "Part-time"), ("ft", "Full-time")]);
        assert_eq!(
            match_option(&opts, None, true, false),
            OptionChoice::Guessed(opts[2].node)
        );
        assert_eq!(
            match_option(&opts, None, false, false),
            OptionChoice::Guessed(opts[1].node)
        );
    }

    #[test]
    fn test_fallback_respects_existing_selection() {
        let (_d, opts) = options(&[("", "Choose"), ("a", "Alpha")]);
        assert_eq!(match_option(&opts, Some("zeta"), false, true), OptionChoice::Keep);
        assert_eq!(
            match_option(&opts, Some("zeta"), false, false),
            OptionChoice::Guessed(opts[1].node)
        );
    }

    #[test]
    fn test_no_usable_options() {
        let (_d, opts) = options(&[("", "")]);
        assert_eq!(match_option(&opts, None, true, false), OptionChoice::Unavailable);
    }
}
