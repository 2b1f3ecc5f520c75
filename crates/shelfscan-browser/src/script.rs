//! Locators compiled to page JavaScript.
//!
//! Selectors are embedded as JSON string literals, so quotes inside CSS
//! attribute selectors or XPath predicates need no further escaping.

use shelfscan_core::Locator;

fn literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Expression evaluating to an array of every matching element.
pub(crate) fn query_all(locator: &Locator) -> String {
    match locator {
        Locator::Css(selector) => {
            format!("Array.from(document.querySelectorAll({}))", literal(selector))
        }
        Locator::XPath(expression) => format!(
            "(() => {{ const r = document.evaluate({}, document, null, \
             XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
             for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
             return out; }})()",
            literal(expression)
        ),
    }
}

/// Expression evaluating to the number of matching elements.
pub(crate) fn count(locator: &Locator) -> String {
    match locator {
        Locator::Css(selector) => {
            format!("document.querySelectorAll({}).length", literal(selector))
        }
        Locator::XPath(expression) => format!(
            "document.evaluate({}, document, null, \
             XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
            literal(expression)
        ),
    }
}

/// Function declaration returning the first match below `this`, or null.
/// Takes the selector as its only argument.
pub(crate) fn query_child(locator: &Locator) -> &'static str {
    match locator {
        Locator::Css(_) => "function(selector) { return this.querySelector(selector); }",
        Locator::XPath(_) => {
            "function(expression) { return document.evaluate(expression, this, null, \
             XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue; }"
        }
    }
}

pub(crate) const INNER_TEXT: &str = "function() { return this.innerText ?? this.textContent ?? ''; }";

pub(crate) const GET_ATTRIBUTE: &str = "function(name) { return this.getAttribute(name); }";

pub(crate) const SCRIPT_CLICK: &str = "function() { this.click(); }";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_query_all() {
        let js = query_all(&Locator::css(".vertical.ng-star-inserted"));
        assert_eq!(
            js,
            r#"Array.from(document.querySelectorAll(".vertical.ng-star-inserted"))"#
        );
    }

    #[test]
    fn test_css_quotes_are_escaped() {
        let js = count(&Locator::parse("a[href^=\"/departamentos/\"]"));
        assert_eq!(
            js,
            r#"document.querySelectorAll("a[href^=\"/departamentos/\"]").length"#
        );
    }

    #[test]
    fn test_xpath_query_all() {
        let js = query_all(&Locator::parse("//button[contains(text(), 'Fechar')]"));
        assert!(js.contains(r#"document.evaluate("//button[contains(text(), 'Fechar')]", document"#));
        assert!(js.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
        assert!(js.ends_with("})()"));
    }

    #[test]
    fn test_xpath_count() {
        let js = count(&Locator::parse("//span[contains(text(), 'Entrar')]"));
        assert!(js.ends_with(".snapshotLength"));
    }

    #[test]
    fn test_query_child_kind() {
        assert!(query_child(&Locator::css(".font-bold")).contains("querySelector"));
        assert!(query_child(&Locator::parse("//span")).contains("FIRST_ORDERED_NODE_TYPE"));
    }
}
