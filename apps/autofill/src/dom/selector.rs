//! CSS selector probing over a snapshot of the document.

use scraper::{Html, Selector};

use crate::dom::document::Document;
use crate::dom::error::DomError;

/// Parsed snapshot of a document used to evaluate CSS selectors.
///
/// The snapshot is taken once; build a new probe after mutating the document.
pub struct SelectorProbe {
    html: Html,
}

impl SelectorProbe {
    pub fn new(document: &Document) -> Self {
        Self {
            html: Html::parse_document(&document.to_html()),
        }
    }

    /// Returns whether `selector` matches at least one element.
    pub fn matches(&self, selector: &str) -> Result<bool, DomError> {
        let parsed = Selector::parse(selector).map_err(|e| DomError::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(self.html.select(&parsed).next().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Document {
        Document::parse("https://example.com/apply", html).unwrap()
    }

    #[test]
    fn test_attribute_selector_matches() {
        let d = doc(r#"<div data-automation-id="applyFlowPage"><input name="a"></div>"#);
        let probe = SelectorProbe::new(&d);
        assert!(probe.matches("[data-automation-id='applyFlowPage']").unwrap());
        assert!(!probe.matches("#grnhse_app").unwrap());
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let probe = SelectorProbe::new(&doc("<p>hi</p>"));
        let err = probe.matches("div[[").unwrap_err();
        assert!(matches!(err, DomError::InvalidSelector { .. }));
    }

    #[test]
    fn test_probe_sees_inserted_nodes_when_rebuilt() {
        let mut d = doc("<body><main id='app'></main></body>");
        let app = d.element_by_id("app").unwrap();
        assert!(!SelectorProbe::new(&d).matches(".lever-application").unwrap());
        d.insert_html(app, "<div class='lever-application'></div>").unwrap();
        assert!(SelectorProbe::new(&d).matches(".lever-application").unwrap());
    }
}
