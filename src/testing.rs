//! Testing utilities: an in-memory browser for exercising page objects.
//!
//! [`ScriptedBrowser`] and [`ScriptedPage`] implement the [`Browser`] and
//! [`Page`] seams against a fixed site built with [`SiteBuilder`]. Every call
//! is counted, and transient failures can be queued per operation, so retry
//! behavior is observable without a real browser.
//!
//! # Example
//!
//! ```rust
//! use steadfast::page::{Page, PageActions};
//! use steadfast::testing::{Element, FailOp, SiteBuilder};
//!
//! # tokio_test::block_on(async {
//! let page = SiteBuilder::new()
//!     .page("https://example.com", "Example Domain", vec![Element::new("h1", "Example Domain")])
//!     .build();
//!
//! page.fail_next(FailOp::TextContent, 1);
//! let actions = PageActions::new(&page);
//! page.goto("https://example.com").await.unwrap();
//!
//! // the first read fails; the retry picks up the heading
//! assert_eq!(actions.text_content("h1").await.as_deref(), Some("Example Domain"));
//! assert_eq!(page.calls(FailOp::TextContent), 2);
//! # });
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::page::{Browser, Page, PageError};
use crate::scenario::LaunchOptions;

/// An element on a scripted page.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    selector: String,
    text: Option<String>,
    visible: bool,
    target: Option<String>,
}

impl Element {
    /// A visible element with the given text.
    pub fn new(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            text: Some(text.into()),
            visible: true,
            target: None,
        }
    }

    /// An element with no text content.
    pub fn empty(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            text: None,
            visible: true,
            target: None,
        }
    }

    /// Mark the element as hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Clicking the element navigates to `url`.
    pub fn navigates_to(mut self, url: impl Into<String>) -> Self {
        self.target = Some(url.into());
        self
    }

    fn matches(&self, selector: &str) -> bool {
        selector.split(',').any(|s| s.trim() == self.selector)
    }
}

#[derive(Debug, Clone)]
struct SitePage {
    title: String,
    elements: Vec<Element>,
}

/// Builder for a scripted site.
#[derive(Debug, Default)]
pub struct SiteBuilder {
    pages: HashMap<String, SitePage>,
}

impl SiteBuilder {
    /// Start an empty site.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document at `url`.
    pub fn page(mut self, url: impl Into<String>, title: impl Into<String>, elements: Vec<Element>) -> Self {
        self.pages.insert(
            url.into(),
            SitePage {
                title: title.into(),
                elements,
            },
        );
        self
    }

    /// A single page over this site.
    pub fn build(self) -> ScriptedPage {
        ScriptedPage::new(Arc::new(self.pages))
    }

    /// A browser whose pages all share this site.
    pub fn browser(self) -> ScriptedBrowser {
        ScriptedBrowser::new(Arc::new(self.pages))
    }
}

/// Page operations that can be counted and made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailOp {
    /// [`Page::goto`]
    Goto,
    /// [`Page::fill`]
    Fill,
    /// [`Page::click`] and [`Page::click_nth`]
    Click,
    /// [`Page::text_content`]
    TextContent,
    /// [`Page::wait_for_selector`]
    WaitForSelector,
    /// [`Page::is_visible`]
    IsVisible,
    /// [`Page::contains_text`]
    ContainsText,
    /// [`Page::title`]
    Title,
    /// [`Page::close`]
    Close,
}

#[derive(Debug, Default)]
struct PageState {
    current_url: Option<String>,
    inputs: HashMap<String, String>,
    pending_failures: HashMap<FailOp, u32>,
    calls: HashMap<FailOp, u32>,
    closed: bool,
}

/// An in-memory [`Page`] over a scripted site.
///
/// Clones share state, so a test can keep a handle while a scenario owns
/// another.
#[derive(Debug, Clone)]
pub struct ScriptedPage {
    site: Arc<HashMap<String, SitePage>>,
    state: Arc<Mutex<PageState>>,
}

impl ScriptedPage {
    fn new(site: Arc<HashMap<String, SitePage>>) -> Self {
        Self {
            site,
            state: Arc::new(Mutex::new(PageState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next `n` calls of `op` fail with a transient error.
    pub fn fail_next(&self, op: FailOp, n: u32) {
        self.state().pending_failures.insert(op, n);
    }

    /// How many times `op` has been called.
    pub fn calls(&self, op: FailOp) -> u32 {
        self.state().calls.get(&op).copied().unwrap_or(0)
    }

    /// The URL currently loaded.
    pub fn current_url(&self) -> Option<String> {
        self.state().current_url.clone()
    }

    /// The value last filled into `selector`.
    pub fn input_value(&self, selector: &str) -> Option<String> {
        self.state().inputs.get(selector).cloned()
    }

    /// Whether the page has been closed.
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    /// Count the call and apply any queued failure.
    fn enter(&self, op: FailOp) -> Result<MutexGuard<'_, PageState>, PageError> {
        let mut state = self.state();
        *state.calls.entry(op).or_insert(0) += 1;
        if state.closed && op != FailOp::Close {
            return Err(PageError::Closed);
        }
        if let Some(pending) = state.pending_failures.get_mut(&op) {
            if *pending > 0 {
                *pending -= 1;
                return Err(injected(op));
            }
        }
        Ok(state)
    }

    fn document<'a>(&'a self, state: &PageState) -> Result<&'a SitePage, PageError> {
        state
            .current_url
            .as_ref()
            .and_then(|url| self.site.get(url))
            .ok_or_else(|| PageError::driver("no document loaded"))
    }

    fn find<'a>(&'a self, state: &PageState, selector: &str) -> Result<&'a Element, PageError> {
        self.document(state)?
            .elements
            .iter()
            .find(|e| e.matches(selector))
            .ok_or_else(|| not_found(selector))
    }
}

fn injected(op: FailOp) -> PageError {
    match op {
        FailOp::Goto => PageError::Navigation {
            url: String::new(),
            reason: "net::ERR_CONNECTION_RESET".to_string(),
        },
        other => PageError::driver(format!("transient {:?} failure", other)),
    }
}

fn not_found(selector: &str) -> PageError {
    PageError::ElementNotFound {
        selector: selector.to_string(),
    }
}

impl Page for ScriptedPage {
    async fn goto(&self, url: &str) -> Result<(), PageError> {
        let mut state = self.enter(FailOp::Goto).map_err(|e| match e {
            PageError::Navigation { reason, .. } => PageError::Navigation {
                url: url.to_string(),
                reason,
            },
            other => other,
        })?;
        if !self.site.contains_key(url) {
            return Err(PageError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        state.current_url = Some(url.to_string());
        state.inputs.clear();
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<(), PageError> {
        let mut state = self.enter(FailOp::Fill)?;
        self.find(&state, selector)?;
        state.inputs.insert(selector.to_string(), text.to_string());
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), PageError> {
        self.click_nth(selector, 0).await
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<(), PageError> {
        let mut state = self.enter(FailOp::Click)?;
        let element = self
            .document(&state)?
            .elements
            .iter()
            .filter(|e| e.matches(selector))
            .nth(index)
            .ok_or_else(|| not_found(selector))?;
        if let Some(target) = &element.target {
            state.current_url = Some(target.clone());
        }
        Ok(())
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>, PageError> {
        let state = self.enter(FailOp::TextContent)?;
        Ok(self.find(&state, selector)?.text.clone())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), PageError> {
        let state = self.enter(FailOp::WaitForSelector)?;
        self.find(&state, selector)
            .map(|_| ())
            .map_err(|_| PageError::Timeout {
                selector: selector.to_string(),
                timeout,
            })
    }

    async fn is_visible(&self, selector: &str, _timeout: Duration) -> Result<bool, PageError> {
        let state = self.enter(FailOp::IsVisible)?;
        Ok(self.find(&state, selector).map(|e| e.visible).unwrap_or(false))
    }

    async fn contains_text(
        &self,
        selector: &str,
        expected: &str,
        _timeout: Duration,
    ) -> Result<bool, PageError> {
        let state = self.enter(FailOp::ContainsText)?;
        let element = self.find(&state, selector)?;
        Ok(element
            .text
            .as_deref()
            .is_some_and(|text| text.contains(expected)))
    }

    async fn title(&self) -> Result<String, PageError> {
        let state = self.enter(FailOp::Title)?;
        Ok(self.document(&state)?.title.clone())
    }

    async fn close(&self) -> Result<(), PageError> {
        let mut state = self.enter(FailOp::Close)?;
        state.closed = true;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct BrowserState {
    options: Mutex<Option<LaunchOptions>>,
    pages: Mutex<Vec<ScriptedPage>>,
    closed: AtomicBool,
    close_calls: AtomicU32,
    fail_close: AtomicBool,
}

/// An in-memory [`Browser`] that opens [`ScriptedPage`]s.
///
/// Clones share state.
#[derive(Debug, Clone)]
pub struct ScriptedBrowser {
    site: Arc<HashMap<String, SitePage>>,
    state: Arc<BrowserState>,
}

impl ScriptedBrowser {
    fn new(site: Arc<HashMap<String, SitePage>>) -> Self {
        Self {
            site,
            state: Arc::new(BrowserState::default()),
        }
    }

    /// Record the options this browser was "launched" with.
    pub fn launched_with(self, options: LaunchOptions) -> Self {
        *self
            .state
            .options
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(options);
        self
    }

    /// The options recorded at launch.
    pub fn launch_options(&self) -> Option<LaunchOptions> {
        self.state
            .options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make [`Browser::close`] fail.
    pub fn fail_close(&self) {
        self.state.fail_close.store(true, Ordering::SeqCst);
    }

    /// Every page opened so far.
    pub fn pages(&self) -> Vec<ScriptedPage> {
        self.state
            .pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the browser has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// How many times close was called.
    pub fn close_calls(&self) -> u32 {
        self.state.close_calls.load(Ordering::SeqCst)
    }
}

impl Browser for ScriptedBrowser {
    type Page = ScriptedPage;

    async fn new_page(&self) -> Result<ScriptedPage, PageError> {
        if self.is_closed() {
            return Err(PageError::Closed);
        }
        let page = ScriptedPage::new(self.site.clone());
        self.state
            .pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(page.clone());
        Ok(page)
    }

    async fn close(&self) -> Result<(), PageError> {
        self.state.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_close.load(Ordering::SeqCst) {
            return Err(PageError::driver("browser process did not exit"));
        }
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
