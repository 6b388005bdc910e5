//! Element queries handed to the page port.
//!
//! An [`ElementQuery`] is the Rust shape of `locator(selector).filter({ hasText })`:
//! a CSS selector plus an optional filter over the candidate's rendered text.
//! Drivers resolve the selector and keep the first candidate whose text
//! satisfies the filter. A query may also be confined to a [`Scope`]: only
//! containers holding a matching marker element are searched.

use std::fmt;

use regex::Regex;

/// Text filter applied to a candidate's rendered text.
#[derive(Debug, Clone)]
pub enum TextMatcher {
    /// Case-insensitive substring match on whitespace-normalized text
    Contains(String),

    /// Regular expression evaluated against whitespace-normalized text
    Pattern(Regex),
}

impl TextMatcher {
    pub fn contains(text: impl Into<String>) -> Self {
        TextMatcher::Contains(text.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(TextMatcher::Pattern)
    }

    pub fn matches(&self, text: &str) -> bool {
        let text = normalize_text(text);
        match self {
            TextMatcher::Contains(needle) => text
                .to_lowercase()
                .contains(&normalize_text(needle).to_lowercase()),
            TextMatcher::Pattern(regex) => regex.is_match(&text),
        }
    }
}

impl fmt::Display for TextMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatcher::Contains(needle) => write!(f, "text~\"{}\"", needle),
            TextMatcher::Pattern(regex) => write!(f, "text=/{}/", regex.as_str()),
        }
    }
}

/// Container that must also hold a marker element, e.g. the expanded panel
/// whose header carries a given title.
#[derive(Debug, Clone)]
pub struct Scope {
    pub container: String,
    pub marker: Box<ElementQuery>,
}

impl Scope {
    pub fn new(container: impl Into<String>, marker: ElementQuery) -> Self {
        Self {
            container: container.into(),
            marker: Box::new(marker),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has [{}]", self.container, self.marker)
    }
}

/// Selector plus optional text filter and scope.
#[derive(Debug, Clone)]
pub struct ElementQuery {
    pub selector: String,
    pub has_text: Option<TextMatcher>,
    pub within: Option<Scope>,
}

impl ElementQuery {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            has_text: None,
            within: None,
        }
    }

    /// Only search descendants of containers matching `scope`.
    pub fn within(mut self, scope: Scope) -> Self {
        self.within = Some(scope);
        self
    }

    pub fn with_text(mut self, matcher: TextMatcher) -> Self {
        self.has_text = Some(matcher);
        self
    }

    /// True when `text` passes the filter (always true without one).
    pub fn accepts_text(&self, text: &str) -> bool {
        self.has_text
            .as_ref()
            .map(|matcher| matcher.matches(text))
            .unwrap_or(true)
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.within {
            write!(f, "{} >> ", scope)?;
        }
        match &self.has_text {
            Some(matcher) => write!(f, "{} >> {}", self.selector, matcher),
            None => write!(f, "{}", self.selector),
        }
    }
}

/// Collapse runs of whitespace (including the newlines Angular templates leave
/// inside buttons) and trim the ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
