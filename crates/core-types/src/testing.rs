//! In-memory [`PageHandle`] for exercising locators without a browser.
//!
//! The fake models the document as a flat list of nodes. A node answers to
//! the exact selector strings it lists, so tests spell out which queries reach
//! it instead of relying on a CSS engine. Every call is recorded so tests can
//! assert on ordering and counts, and waits return immediately.
//!
//! Nesting is one level deep: a node may name a container node as its
//! parent. A scoped query reaches a node only when its parent answers the
//! scope's container selector and a sibling answers the scope's marker.
//!
//! The fake does not run scripts: every evaluation returns the rendered text
//! of the button-like nodes (any node with a selector mentioning `button`).

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::PageError;
use crate::page::PageHandle;
use crate::query::ElementQuery;

#[derive(Debug, Clone)]
pub struct FakeNode {
    pub id: String,
    pub selectors: Vec<String>,
    pub text: String,
    pub visible: bool,
    pub attributes: HashMap<String, String>,
    pub parent: Option<String>,
}

impl FakeNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            selectors: Vec::new(),
            text: String::new(),
            visible: true,
            attributes: HashMap::new(),
            parent: None,
        }
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Place the node inside the container node `parent`.
    pub fn inside(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    fn has_selector(&self, selector: &str) -> bool {
        self.selectors.iter().any(|s| s == selector)
    }

    fn is_button_like(&self) -> bool {
        self.selectors.iter().any(|s| s.contains("button"))
    }
}

#[derive(Debug, Default)]
pub struct FakeDom {
    nodes: Vec<FakeNode>,
}

impl FakeDom {
    pub fn insert(&mut self, node: FakeNode) {
        self.nodes.push(node);
    }

    pub fn remove(&mut self, id: &str) {
        self.nodes.retain(|node| node.id != id);
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(node) = self.node_mut(id) {
            node.visible = visible;
        }
    }

    pub fn set_attr(&mut self, id: &str, name: &str, value: &str) {
        if let Some(node) = self.node_mut(id) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn answers(&self, node: &FakeNode, query: &ElementQuery) -> bool {
        if !node.has_selector(&query.selector) || !query.accepts_text(&node.text) {
            return false;
        }
        let Some(scope) = &query.within else {
            return true;
        };
        let Some(parent) = node.parent.as_deref().and_then(|id| self.node(id)) else {
            return false;
        };
        parent.has_selector(&scope.container)
            && self.nodes.iter().any(|sibling| {
                sibling.parent.as_deref() == Some(parent.id.as_str())
                    && self.answers(sibling, &scope.marker)
            })
    }

    fn node(&self, id: &str) -> Option<&FakeNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut FakeNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }
}

/// Element handle returned by [`FakePage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement {
    pub id: String,
}

/// One recorded interaction with the fake page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageCall {
    WaitFor(String),
    IsVisible(String),
    Attribute(String, String),
    Click(String),
    Evaluate,
    PressKey(String),
    MouseClick(f64, f64),
    Sleep(Duration),
}

type ClickHook = Box<dyn Fn(&mut FakeDom) + Send + Sync>;

#[derive(Default)]
struct State {
    dom: FakeDom,
    calls: Vec<PageCall>,
    hooks: HashMap<String, ClickHook>,
    failing_clicks: HashSet<String>,
    key_fails: bool,
    mouse_fails: bool,
    evaluate_fails: bool,
    closed: bool,
}

#[derive(Default)]
pub struct FakePage {
    state: Mutex<State>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(self, node: FakeNode) -> Self {
        self.state.lock().dom.insert(node);
        self
    }

    /// Run `hook` against the document whenever `id` is clicked.
    pub fn on_click(
        self,
        id: impl Into<String>,
        hook: impl Fn(&mut FakeDom) + Send + Sync + 'static,
    ) -> Self {
        self.state.lock().hooks.insert(id.into(), Box::new(hook));
        self
    }

    pub fn fail_clicks_on(self, id: impl Into<String>) -> Self {
        self.state.lock().failing_clicks.insert(id.into());
        self
    }

    pub fn fail_key_presses(self) -> Self {
        self.state.lock().key_fails = true;
        self
    }

    pub fn fail_mouse_clicks(self) -> Self {
        self.state.lock().mouse_fails = true;
        self
    }

    pub fn fail_evaluations(self) -> Self {
        self.state.lock().evaluate_fails = true;
        self
    }

    pub fn close(&self) {
        self.state.lock().closed = true;
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.state.lock().calls.clone()
    }

    pub fn clicks_on(&self, id: &str) -> usize {
        self.count(|call| matches!(call, PageCall::Click(target) if target == id))
    }

    pub fn sleeps_of(&self, duration: Duration) -> usize {
        self.count(|call| matches!(call, PageCall::Sleep(d) if *d == duration))
    }

    pub fn waits_for(&self, query: &str) -> usize {
        self.count(|call| matches!(call, PageCall::WaitFor(q) if q == query))
    }

    pub fn count(&self, predicate: impl Fn(&PageCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: PageCall) -> Result<(), PageError> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.closed {
            return Err(PageError::Closed("fake page closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PageHandle for FakePage {
    type Element = FakeElement;

    async fn wait_for(
        &self,
        query: &ElementQuery,
        timeout: Duration,
    ) -> Result<FakeElement, PageError> {
        self.record(PageCall::WaitFor(query.to_string()))?;
        let state = self.state.lock();
        let dom = &state.dom;
        let found = dom
            .nodes
            .iter()
            .find(|node| dom.answers(node, query))
            .map(|node| FakeElement {
                id: node.id.clone(),
            });
        found.ok_or_else(|| PageError::timeout(query.to_string(), timeout))
    }

    async fn is_visible(&self, element: &FakeElement) -> Result<bool, PageError> {
        self.record(PageCall::IsVisible(element.id.clone()))?;
        let visible = self.state.lock().dom.node(&element.id).map(|node| node.visible);
        visible.ok_or_else(|| PageError::Detached(element.id.clone()))
    }

    async fn attribute(
        &self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        self.record(PageCall::Attribute(element.id.clone(), name.to_string()))?;
        let value = self
            .state
            .lock()
            .dom
            .node(&element.id)
            .map(|node| node.attributes.get(name).cloned());
        value.ok_or_else(|| PageError::Detached(element.id.clone()))
    }

    async fn click(&self, element: &FakeElement) -> Result<(), PageError> {
        self.record(PageCall::Click(element.id.clone()))?;
        let mut state = self.state.lock();
        if state.failing_clicks.contains(&element.id) {
            return Err(PageError::Input(format!("click on {} rejected", element.id)));
        }
        if state.dom.node(&element.id).is_none() {
            return Err(PageError::Detached(element.id.clone()));
        }
        let State { dom, hooks, .. } = &mut *state;
        if let Some(hook) = hooks.get(&element.id) {
            hook(dom);
        }
        Ok(())
    }

    async fn evaluate(&self, _expression: &str) -> Result<Value, PageError> {
        self.record(PageCall::Evaluate)?;
        let state = self.state.lock();
        if state.evaluate_fails {
            return Err(PageError::Script("evaluation disabled".into()));
        }
        let texts = state
            .dom
            .nodes
            .iter()
            .filter(|node| node.is_button_like())
            .map(|node| Value::String(node.text.clone()))
            .collect();
        Ok(Value::Array(texts))
    }

    async fn press_key(&self, key: &str) -> Result<(), PageError> {
        self.record(PageCall::PressKey(key.to_string()))?;
        if self.state.lock().key_fails {
            return Err(PageError::Input(format!("key {} rejected", key)));
        }
        Ok(())
    }

    async fn mouse_click(&self, x: f64, y: f64) -> Result<(), PageError> {
        self.record(PageCall::MouseClick(x, y))?;
        if self.state.lock().mouse_fails {
            return Err(PageError::Input(format!("mouse click at ({x}, {y}) rejected")));
        }
        Ok(())
    }

    async fn wait_for_timeout(&self, duration: Duration) {
        let _ = self.record(PageCall::Sleep(duration));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Scope, TextMatcher};

    #[tokio::test]
    async fn test_wait_for_respects_text_filter() {
        let page = FakePage::new()
            .with_node(FakeNode::new("remove").selector("button").text("Remover"))
            .with_node(FakeNode::new("add").selector("button").text("Adicionar"));

        let query = ElementQuery::new("button").with_text(TextMatcher::contains("adicionar"));
        let found = page.wait_for(&query, Duration::from_millis(10)).await.unwrap();
        assert_eq!(found.id, "add");
    }

    #[tokio::test]
    async fn test_scoped_query_only_reaches_marked_container() {
        let page = FakePage::new()
            .with_node(FakeNode::new("contacts").selector("section"))
            .with_node(
                FakeNode::new("contacts-title")
                    .selector("h2")
                    .text("Contatos")
                    .inside("contacts"),
            )
            .with_node(
                FakeNode::new("add-phone")
                    .selector("button")
                    .text("Adicionar")
                    .inside("contacts"),
            )
            .with_node(FakeNode::new("organs").selector("section"))
            .with_node(
                FakeNode::new("organs-title")
                    .selector("h2")
                    .text("Órgãos")
                    .inside("organs"),
            )
            .with_node(
                FakeNode::new("add-organ")
                    .selector("button")
                    .text("Adicionar")
                    .inside("organs"),
            );

        let marker = ElementQuery::new("h2").with_text(TextMatcher::contains("Órgãos"));
        let query = ElementQuery::new("button")
            .with_text(TextMatcher::contains("Adicionar"))
            .within(Scope::new("section", marker));
        let found = page.wait_for(&query, Duration::from_millis(10)).await.unwrap();
        assert_eq!(found.id, "add-organ");

        let loose = ElementQuery::new("button").within(Scope::new(
            "section",
            ElementQuery::new("h2").with_text(TextMatcher::contains("Processo")),
        ));
        assert!(page.wait_for(&loose, Duration::from_millis(10)).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_node_times_out() {
        let page = FakePage::new();
        let err = page
            .wait_for(&ElementQuery::new("mat-icon"), Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_click_hook_mutates_dom() {
        let page = FakePage::new()
            .with_node(FakeNode::new("header").selector("h"))
            .with_node(FakeNode::new("body").selector("b").hidden())
            .on_click("header", |dom| dom.set_visible("body", true));

        let body = FakeElement { id: "body".into() };
        assert!(!page.is_visible(&body).await.unwrap());
        page.click(&FakeElement { id: "header".into() }).await.unwrap();
        assert!(page.is_visible(&body).await.unwrap());
        assert_eq!(page.clicks_on("header"), 1);
    }

    #[tokio::test]
    async fn test_closed_page_fails_but_records() {
        let page = FakePage::new();
        page.close();
        let err = page.press_key("Escape").await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(page.calls(), vec![PageCall::PressKey("Escape".into())]);
    }
}
