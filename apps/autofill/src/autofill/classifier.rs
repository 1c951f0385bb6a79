//! Field classifier.
//!
//! `RULES` is the whole decision procedure: an ordered list of (tag, matcher) pairs.
//! `classify` walks it top to bottom and returns the first tag whose matcher accepts
//! the field. There is no scoring; a field that matches a knockout pattern and a name
//! pattern is a knockout because that rule comes first.

use once_cell::sync::Lazy;
use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::autofill::context::{FieldContext, WidgetType};
use crate::autofill::patterns::{self, build_set};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldTag {
    Knockout,
    YesNo,
    FirstName,
    LastName,
    FullName,
    Email,
    Phone,
    Address,
    City,
    State,
    Zip,
    Country,
    Linkedin,
    Github,
    Portfolio,
    Location,
    Salary,
    Experience,
    Availability,
    DropdownGeneric,
    TextareaGeneric,
    TextGeneric,
}

impl FieldTag {
    /// Tags whose value comes from the candidate's identity or contact details.
    pub fn is_identity(self) -> bool {
        matches!(
            self,
            FieldTag::FirstName
                | FieldTag::LastName
                | FieldTag::FullName
                | FieldTag::Email
                | FieldTag::Phone
                | FieldTag::Address
                | FieldTag::City
                | FieldTag::State
                | FieldTag::Zip
                | FieldTag::Country
        )
    }

    pub fn is_link(self) -> bool {
        matches!(self, FieldTag::Linkedin | FieldTag::Github | FieldTag::Portfolio)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Any pattern matches the combined search text.
    Text(&'static [&'static str]),
    /// At most three options, at least one non-empty, every non-empty one yes/no shaped.
    YesNoOptions,
    Widget(WidgetType),
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub tag: FieldTag,
    pub matcher: Matcher,
}

const fn text(tag: FieldTag, patterns: &'static [&'static str]) -> Rule {
    Rule {
        tag,
        matcher: Matcher::Text(patterns),
    }
}

/// Classification rules in priority order.
pub const RULES: &[Rule] = &[
    text(FieldTag::Knockout, patterns::KNOCKOUT),
    Rule {
        tag: FieldTag::YesNo,
        matcher: Matcher::YesNoOptions,
    },
    text(
        FieldTag::FirstName,
        &[r"first[\s_.-]*name", r"\bfname\b", r"given[\s_.-]*name", r"forename", r"preferred[\s_.-]*name"],
    ),
    text(
        FieldTag::LastName,
        &[r"last[\s_.-]*name", r"\blname\b", r"sur[\s_.-]*name", r"family[\s_.-]*name"],
    ),
    text(
        FieldTag::FullName,
        &[r"full[\s_.-]*name", r"legal[\s_.-]*name", r"\byour name\b", r"^\s*name\b"],
    ),
    text(FieldTag::Email, &[r"e[\s_.-]*mail"]),
    text(
        FieldTag::Phone,
        &[r"phone", r"mobile", r"\bcell\b", r"\btel\b", r"telephone"],
    ),
    text(
        FieldTag::Address,
        &[r"address", r"street", r"\baddr\b"],
    ),
    text(FieldTag::City, &[r"\bcity\b", r"\btown\b"]),
    text(FieldTag::State, &[r"\bstate\b", r"\bprovince\b", r"\bregion\b"]),
    text(
        FieldTag::Zip,
        &[r"\bzip\b", r"zip[\s_.-]*code", r"postal", r"post[\s_.-]*code"],
    ),
    text(FieldTag::Country, &[r"\bcountry\b"]),
    text(FieldTag::Linkedin, &[r"linked[\s_.-]*in"]),
    text(FieldTag::Github, &[r"git[\s_.-]*hub"]),
    text(
        FieldTag::Portfolio,
        &[r"portfolio", r"personal[\s_.-]*(web)?site", r"\bwebsite\b", r"\bblog\b"],
    ),
    text(
        FieldTag::Location,
        &[r"\blocation\b", r"where are you (located|based)", r"currently (located|based)", r"\bbased in\b"],
    ),
    text(
        FieldTag::Salary,
        &[r"salary", r"compensation", r"\bpay\b", r"\bwage", r"desired (pay|rate)", r"expected (pay|rate)"],
    ),
    text(
        FieldTag::Experience,
        &[r"experience", r"years of", r"\byrs\b", r"how (long|many years)"],
    ),
    text(
        FieldTag::Availability,
        &[r"availab", r"start[\s_.-]*date", r"notice[\s_.-]*period", r"when can you start", r"earliest start"],
    ),
    Rule {
        tag: FieldTag::DropdownGeneric,
        matcher: Matcher::Widget(WidgetType::Select),
    },
    Rule {
        tag: FieldTag::TextareaGeneric,
        matcher: Matcher::Widget(WidgetType::Textarea),
    },
];

/// Compiled text matchers, index-aligned with `RULES`.
static COMPILED: Lazy<Vec<Option<RegexSet>>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|rule| match rule.matcher {
            Matcher::Text(patterns) => Some(build_set(patterns)),
            _ => None,
        })
        .collect()
});

fn is_yes_no_field(ctx: &FieldContext) -> bool {
    let texts: Vec<&str> = ctx
        .options
        .iter()
        .map(|o| o.text.trim())
        .filter(|t| !t.is_empty())
        .collect();
    ctx.options.len() <= 3 && !texts.is_empty() && texts.iter().all(|t| patterns::is_yes_no_option(t))
}

fn rule_matches(index: usize, rule: &Rule, ctx: &FieldContext) -> bool {
    match rule.matcher {
        Matcher::Text(_) => COMPILED[index]
            .as_ref()
            .map(|set| set.is_match(&ctx.combined_search_text))
            .unwrap_or(false),
        Matcher::YesNoOptions => is_yes_no_field(ctx),
        Matcher::Widget(widget) => ctx.widget_type == widget,
    }
}

/// Pure and deterministic: first matching rule wins, `TextGeneric` otherwise.
pub fn classify(ctx: &FieldContext) -> FieldTag {
    RULES
        .iter()
        .enumerate()
        .find(|(i, rule)| rule_matches(*i, rule, ctx))
        .map(|(_, rule)| rule.tag)
        .unwrap_or(FieldTag::TextGeneric)
}
