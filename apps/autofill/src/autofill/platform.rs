//! ATS vendor detection: hostname table first, DOM selector table second.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Workday,
    Greenhouse,
    Lever,
    SmartRecruiters,
    Icims,
    Taleo,
    SuccessFactors,
    Jobvite,
    Ashby,
    BambooHr,
    Workable,
    JazzHr,
    Breezy,
    Recruitee,
    Personio,
    Teamtailor,
    OracleCloud,
    Adp,
    Ukg,
    Paylocity,
    Generic,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Workday => "workday",
            Platform::Greenhouse => "greenhouse",
            Platform::Lever => "lever",
            Platform::SmartRecruiters => "smartrecruiters",
            Platform::Icims => "icims",
            Platform::Taleo => "taleo",
            Platform::SuccessFactors => "successfactors",
            Platform::Jobvite => "jobvite",
            Platform::Ashby => "ashby",
            Platform::BambooHr => "bamboohr",
            Platform::Workable => "workable",
            Platform::JazzHr => "jazzhr",
            Platform::Breezy => "breezy",
            Platform::Recruitee => "recruitee",
            Platform::Personio => "personio",
            Platform::Teamtailor => "teamtailor",
            Platform::OracleCloud => "oraclecloud",
            Platform::Adp => "adp",
            Platform::Ukg => "ukg",
            Platform::Paylocity => "paylocity",
            Platform::Generic => "generic",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registrable domains per vendor. A host matches a domain or any subdomain of it.
/// Checked top to bottom; first hit wins.
pub const HOST_RULES: &[(Platform, &[&str])] = &[
    (Platform::Workday, &["myworkdayjobs.com", "myworkdaysite.com", "workday.com"]),
    (Platform::Greenhouse, &["greenhouse.io", "grnh.se"]),
    (Platform::Lever, &["lever.co"]),
    (Platform::SmartRecruiters, &["smartrecruiters.com"]),
    (Platform::Icims, &["icims.com"]),
    (Platform::Taleo, &["taleo.net"]),
    (Platform::SuccessFactors, &["successfactors.com", "successfactors.eu", "sapsf.com"]),
    (Platform::Jobvite, &["jobvite.com"]),
    (Platform::Ashby, &["ashbyhq.com"]),
    (Platform::BambooHr, &["bamboohr.com"]),
    (Platform::Workable, &["workable.com"]),
    (Platform::JazzHr, &["applytojob.com", "jazzhr.com"]),
    (Platform::Breezy, &["breezy.hr"]),
    (Platform::Recruitee, &["recruitee.com"]),
    (Platform::Personio, &["personio.de", "personio.com"]),
    (Platform::Teamtailor, &["teamtailor.com"]),
    (Platform::OracleCloud, &["oraclecloud.com"]),
    (Platform::Adp, &["workforcenow.adp.com", "recruiting.adp.com"]),
    (Platform::Ukg, &["ultipro.com", "ukg.com", "ukg.net"]),
    (Platform::Paylocity, &["recruiting.paylocity.com", "paylocity.com"]),
];

/// Markup fingerprints per vendor, used when the page is served from a custom domain.
pub const SELECTOR_RULES: &[(Platform, &[&str])] = &[
    (
        Platform::Workday,
        &["[data-automation-id='applyFlowPage']", "[data-automation-id^='formField']"],
    ),
    (Platform::Greenhouse, &["#grnhse_app", "#application_form", "iframe[src*='greenhouse']"]),
    (Platform::Lever, &[".lever-application", ".application-question"]),
    (Platform::SmartRecruiters, &["[data-test='application-form']", "spl-form-element"]),
    (Platform::Icims, &[".iCIMS_MainWrapper", "#iCIMS_Content"]),
    (Platform::Taleo, &["#requisitionDescriptionInterface", "[id^='et-ef-content-ftf']"]),
    (Platform::SuccessFactors, &[".sfDialogBox", "[id*='careerSection']"]),
    (Platform::Jobvite, &[".jv-page", "#jv-careersite"]),
    (Platform::Ashby, &["[class*='ashby-application-form']", "._applicationForm"]),
    (Platform::BambooHr, &["#BambooHR-ATS", ".BambooHR-ATS-board"]),
    (Platform::Workable, &["[data-ui='application-form']"]),
    (Platform::JazzHr, &["#resumator-application-form", ".resumator-field"]),
    (Platform::Breezy, &[".breezy-portal", "#breezy-apply"]),
    (Platform::Recruitee, &[".c-careers-apply", "[data-rec-component]"]),
    (Platform::Personio, &["[data-test-id='personio-application-form']"]),
    (Platform::Teamtailor, &["[data-controller*='careersite']"]),
    (Platform::OracleCloud, &["[data-bind*='candidateSelfService']", ".apply-flow"]),
    (Platform::Adp, &["sdf-form-control", "[id^='adp-']"]),
    (Platform::Ukg, &["[data-automation='opportunity-apply']"]),
    (Platform::Paylocity, &["#paylocity-application"]),
];

/// Classifies the page. Always returns a value; `Generic` when nothing matches.
pub fn detect(document: &Document) -> Platform {
    let host = document.hostname().to_ascii_lowercase();
    if let Some(platform) = detect_by_host(&host) {
        debug!(%host, %platform, "Platform matched by hostname");
        return platform;
    }

    let probe = document.selector_probe();
    for (platform, selectors) in SELECTOR_RULES {
        for selector in *selectors {
            match probe.matches(selector) {
                Ok(true) => {
                    debug!(%selector, %platform, "Platform matched by selector");
                    return *platform;
                }
                Ok(false) => {}
                Err(e) => debug!("Skipping selector: {e}"),
            }
        }
    }

    Platform::Generic
}

fn detect_by_host(host: &str) -> Option<Platform> {
    HOST_RULES
        .iter()
        .find(|(_, domains)| domains.iter().any(|d| host_in_domain(host, d)))
        .map(|(platform, _)| *platform)
}

fn host_in_domain(host: &str, domain: &str) -> bool {
    host.strip_suffix(domain)
        .is_some_and(|rest| rest.is_empty() || rest.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_for(url: &str, html: &str) -> Platform {
        detect(&Document::parse(url, html).unwrap())
    }

    #[test]
    fn test_hostname_match() {
        assert_eq!(
            detect_for("https://acme.wd5.myworkdayjobs.com/en-US/careers/job/1", "<p></p>"),
            Platform::Workday
        );
        assert_eq!(
            detect_for("https://jobs.lever.co/acme/123/apply", "<p></p>"),
            Platform::Lever
        );
        assert_eq!(
            detect_for("https://careers-acme.icims.com/jobs/1/login", "<p></p>"),
            Platform::Icims
        );
    }

    #[test]
    fn test_hostname_beats_selectors() {
        let html = r#"<div id="grnhse_app"></div>"#;
        assert_eq!(
            detect_for("https://jobs.smartrecruiters.com/acme/1", html),
            Platform::SmartRecruiters
        );
    }

    #[test]
    fn test_host_must_end_on_a_domain_boundary() {
        assert_eq!(
            detect_for("https://careers.clever.com/apply", "<p></p>"),
            Platform::Generic
        );
        assert_eq!(detect_for("https://lever.co/acme", "<p></p>"), Platform::Lever);
        assert_eq!(
            detect_for("https://notgreenhouse.io.example.com/apply", "<p></p>"),
            Platform::Generic
        );
    }

    #[test]
    fn test_selector_fallback_on_custom_domain() {
        let html = r#"<div class="application-page lever-application"><form></form></div>"#;
        assert_eq!(detect_for("https://careers.acme.com/apply", html), Platform::Lever);

        let html = r#"<div data-automation-id="applyFlowPage"></div>"#;
        assert_eq!(detect_for("https://careers.acme.com/apply", html), Platform::Workday);
    }

    #[test]
    fn test_generic_when_nothing_matches() {
        assert_eq!(
            detect_for("https://careers.acme.com/apply", "<form><input name='x'></form>"),
            Platform::Generic
        );
    }

    #[test]
    fn test_every_selector_parses() {
        let probe = Document::parse("https://example.com", "<p></p>")
            .unwrap()
            .selector_probe();
        for (platform, selectors) in SELECTOR_RULES {
            for selector in *selectors {
                assert!(probe.matches(selector).is_ok(), "{platform}: {selector}");
            }
        }
    }

    #[test]
    fn test_serde_tag() {
        assert_eq!(
            serde_json::to_string(&Platform::SmartRecruiters).unwrap(),
            "\"smartrecruiters\""
        );
        assert_eq!(Platform::BambooHr.to_string(), "bamboohr");
    }
}
