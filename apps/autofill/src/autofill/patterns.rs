//! Text pattern tables shared by the classifier and the knockout responder.
//!
//! Every table is plain data so it can be reviewed on its own; the compiled forms
//! are built once on first use. All matching is case-insensitive.

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet, RegexSetBuilder};

/// Screening questions whose answer can reject an application outright.
pub const KNOCKOUT: &[&str] = &[
    // work authorization / sponsorship
    r"authori[sz]ed\b",
    r"authori[sz]ation",
    r"eligib(le|ility) to work",
    r"right to work",
    r"legally (able|permitted|eligible)",
    r"sponsor",
    r"\bvisa\b",
    // minimum experience / credentials
    r"(at least|minimum( of)?|more than|over)\s+\d+\+?\s*(years?|yrs)",
    r"(do|have|with|possess)\b[^?]{0,40}\b\d+\+\s*(years?|yrs)",
    r"(do|have|are) you[^?]{0,80}(licen[cs]e|certifi|degree|diploma|clearance|credential)",
    r"security clearance",
    // relocation / travel / shifts
    r"relocat",
    r"(willing|able) to (travel|commute|work)",
    r"\b(shifts?|nights|weekends|overtime|on[\s-]?call)\b",
    r"\bon[\s-]?site\b",
    // technical proficiency
    r"proficien",
    r"\bfluent",
    r"do you have[^?]{0,60}experience (with|in|using)",
    // background / drug test
    r"background (check|screen|investigation)",
    r"drug (test|screen)",
    // legal agreement
    r"agree\s+to\s+(the\s+)?(terms|privacy|arbitration|policy|conditions)",
    r"\bi (hereby )?(certify|attest|acknowledge)",
    // minimum age
    r"\b(18|eighteen|21|twenty[\s-]one)\b[^?]{0,20}(years|yrs)",
    r"legal (working )?age",
    r"over the age",
];

/// Option texts that make a field a yes/no question.
pub const YES_NO_OPTION: &str = r"^(yes|no|y|n|true|false|agree|disagree|i agree|i disagree|accept|decline|i accept|i decline)\b";

/// Affirmative answers, checked against an option's label and its value.
pub const AFFIRMATIVE: &[&str] = &[
    r"\b(yes|true|agree|accept|consent|confirm|acknowledge|authori[sz]ed|willing|i do|i am|i have)\b",
    r"^\s*y\s*$",
];

/// Answers that look affirmative but negate it ("not authorized", "I do not agree").
pub const NEGATION: &str = r"\b(no|not|don'?t|do not|disagree|decline|unable|unwilling|never|n/a)\b";

/// Fallback option patterns for generic dropdowns, in preference order.
pub const SAFE_OPTIONS: &[&str] = &[
    r"\byes\b",
    r"\bagree\b",
    r"\bauthori[sz]ed\b",
    r"\bunited states\b",
    r"\bfull[\s-]?time\b",
    r"\bpermanent\b",
    r"\bavailable\b",
];

pub(crate) fn build_set(patterns: &[&str]) -> RegexSet {
    RegexSetBuilder::new(patterns)
        .case_insensitive(true)
        .build()
        .expect("static pattern table must compile")
}

fn build_regex(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("static pattern must compile")
}

static KNOCKOUT_SET: Lazy<RegexSet> = Lazy::new(|| build_set(KNOCKOUT));
static YES_NO_RE: Lazy<Regex> = Lazy::new(|| build_regex(YES_NO_OPTION));
static AFFIRMATIVE_SET: Lazy<RegexSet> = Lazy::new(|| build_set(AFFIRMATIVE));
static NEGATION_RE: Lazy<Regex> = Lazy::new(|| build_regex(NEGATION));
static SAFE_OPTION_RES: Lazy<Vec<Regex>> =
    Lazy::new(|| SAFE_OPTIONS.iter().map(|p| build_regex(p)).collect());

pub fn is_knockout(text: &str) -> bool {
    KNOCKOUT_SET.is_match(text)
}

pub fn is_yes_no_option(text: &str) -> bool {
    YES_NO_RE.is_match(text.trim())
}

fn is_affirmative_text(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && AFFIRMATIVE_SET.is_match(text) && !NEGATION_RE.is_match(text)
}

/// True when either the option's label or its value reads as "yes".
pub fn is_affirmative(label: &str, value: &str) -> bool {
    is_affirmative_text(label) || is_affirmative_text(value)
}

pub fn safe_option_patterns() -> &'static [Regex] {
    &SAFE_OPTION_RES
}
