//! Descriptor-based element location.
//!
//! Elements are addressed by accessible role plus human-readable name, so
//! flows stay independent of markup structure (CSS classes, DOM nesting).
//! The descriptor is compiled to a JavaScript probe that runs in the page:
//! candidates are collected from the role's implicit HTML elements and
//! explicit `[role=...]` attributes, then filtered by accessible name.
//!
//! Name matching is whitespace-normalized, case-insensitive substring
//! matching over the ARIA-style name computation (`aria-label`,
//! `aria-labelledby`, `alt`, `title`, text content, in that order).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Accessible role of a UI element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Link,
    Button,
    Heading,
    Textbox,
    Checkbox,
    Radio,
    Img,
    Listitem,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Link => "link",
            Role::Button => "button",
            Role::Heading => "heading",
            Role::Textbox => "textbox",
            Role::Checkbox => "checkbox",
            Role::Radio => "radio",
            Role::Img => "img",
            Role::Listitem => "listitem",
        }
    }

    /// CSS selector list covering the implicit HTML elements for this role
    /// plus an explicit `role` attribute.
    fn css_candidates(self) -> &'static str {
        match self {
            Role::Link => r#"a[href], [role="link"]"#,
            Role::Button => {
                r#"button, input[type="button"], input[type="submit"], input[type="reset"], [role="button"]"#
            }
            Role::Heading => r#"h1, h2, h3, h4, h5, h6, [role="heading"]"#,
            Role::Textbox => {
                r#"input:not([type]), input[type="text"], input[type="email"], input[type="search"], input[type="tel"], input[type="url"], input[type="password"], textarea, [role="textbox"]"#
            }
            Role::Checkbox => r#"input[type="checkbox"], [role="checkbox"]"#,
            Role::Radio => r#"input[type="radio"], [role="radio"]"#,
            Role::Img => r#"img, [role="img"]"#,
            Role::Listitem => r#"li, [role="listitem"]"#,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role + accessible name pair locating one UI element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub role: Role,
    pub name: String,
}

impl Descriptor {
    pub fn new(role: Role, name: impl Into<String>) -> Self {
        Self {
            role,
            name: name.into(),
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.role, self.name)
    }
}

/// Result of evaluating a probe script against the live DOM.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct Probe {
    /// Number of elements matching role + name.
    pub count: usize,
    /// At least one match is rendered and visible.
    pub visible: bool,
    /// Exactly one match exists and it is visible and not disabled.
    pub interactable: bool,
}

/// Result of evaluating a click script.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct ClickOutcome {
    pub clicked: bool,
    pub count: usize,
}

/// Shared JS prelude: computes `matches`, `isVisible` and name helpers.
///
/// Both the selector list and the target name are injected as JSON string
/// literals so arbitrary flow input cannot break out of the script.
fn prelude(descriptor: &Descriptor) -> String {
    let selector = serde_json::to_string(descriptor.role.css_candidates())
        .unwrap_or_else(|_| "\"\"".to_string());
    let name = serde_json::to_string(&descriptor.name).unwrap_or_else(|_| "\"\"".to_string());

    format!(
        r#"
const norm = s => (s || '').replace(/\s+/g, ' ').trim().toLowerCase();
const name = norm({name});
const accName = el => {{
    const aria = el.getAttribute('aria-label');
    if (aria) return norm(aria);
    const refs = el.getAttribute('aria-labelledby');
    if (refs) {{
        const text = refs
            .split(/\s+/)
            .map(id => {{ const r = document.getElementById(id); return r ? r.textContent : ''; }})
            .join(' ');
        if (text.trim()) return norm(text);
    }}
    const alt = el.getAttribute('alt');
    if (alt) return norm(alt);
    const title = el.getAttribute('title');
    if (title) return norm(title);
    return norm(el.textContent);
}};
const isVisible = el => {{
    const rect = el.getBoundingClientRect();
    const style = getComputedStyle(el);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
}};
const matches = Array.from(document.querySelectorAll({selector}))
    .filter(el => accName(el).includes(name));
"#
    )
}

/// Script returning a JSON-encoded [`Probe`] for the descriptor.
pub(crate) fn probe_js(descriptor: &Descriptor) -> String {
    format!(
        r#"(() => {{
{prelude}
return JSON.stringify({{
    count: matches.length,
    visible: matches.some(isVisible),
    interactable: matches.length === 1 && isVisible(matches[0]) && !matches[0].disabled,
}});
}})()"#,
        prelude = prelude(descriptor),
    )
}

/// Script clicking the single match, returning a JSON-encoded [`ClickOutcome`].
pub(crate) fn click_js(descriptor: &Descriptor) -> String {
    format!(
        r#"(() => {{
{prelude}
if (matches.length === 1) {{
    matches[0].click();
    return JSON.stringify({{ clicked: true, count: 1 }});
}}
return JSON.stringify({{ clicked: false, count: matches.length }});
}})()"#,
        prelude = prelude(descriptor),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serde_is_lowercase() {
        let role: Role = serde_json::from_str("\"heading\"").unwrap();
        assert_eq!(role, Role::Heading);
        assert_eq!(serde_json::to_string(&Role::Link).unwrap(), "\"link\"");
    }

    #[test]
    fn descriptor_display_names_role_and_name() {
        let descriptor = Descriptor::new(Role::Link, "Relatórios");
        assert_eq!(descriptor.to_string(), "link \"Relatórios\"");
    }

    #[test]
    fn probe_js_queries_role_candidates() {
        let js = probe_js(&Descriptor::new(Role::Heading, "Financial Reports"));
        assert!(js.contains("querySelectorAll"));
        assert!(js.contains("h1, h2, h3"));
        assert!(js.contains("financial reports") || js.contains("Financial Reports"));
        assert!(js.contains("JSON.stringify"));
    }

    #[test]
    fn click_js_clicks_only_on_single_match() {
        let js = click_js(&Descriptor::new(Role::Button, "Save"));
        assert!(js.contains("matches.length === 1"));
        assert!(js.contains("matches[0].click()"));
    }

    #[test]
    fn hostile_names_stay_inside_string_literals() {
        // Quotes and backticks must arrive JSON-escaped, not raw.
        let descriptor = Descriptor::new(Role::Button, r#"x"); alert('pwned'); ("#);
        let js = probe_js(&descriptor);
        assert!(!js.contains(r#"x"); alert"#));
        assert!(js.contains(r#"x\"); alert"#));
    }

    #[test]
    fn probe_deserializes_from_page_json() {
        let probe: Probe =
            serde_json::from_str(r#"{"count":1,"visible":true,"interactable":false}"#).unwrap();
        assert_eq!(probe.count, 1);
        assert!(probe.visible);
        assert!(!probe.interactable);
    }
}
