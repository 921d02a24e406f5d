//! The browser-automation seam and retrying page actions.
//!
//! [`Page`] and [`Browser`] describe only what this crate consumes from a
//! browser-automation driver. Page objects never call a [`Page`] directly for
//! fallible work; they go through [`PageActions`], which runs each call under
//! the [`RetryPolicy`](crate::retry::RetryPolicy) for its
//! [`OperationKind`](crate::retry::OperationKind).

mod actions;
mod error;

use std::future::Future;
use std::time::Duration;

pub use actions::{PageActions, RetryPolicies, DEFAULT_ELEMENT_TIMEOUT, DEFAULT_EXPECT_TIMEOUT};
pub use error::PageError;

/// One open browser tab.
///
/// Implementations apply their own timeouts to waits; the retry executor
/// treats a timeout like any other failure.
pub trait Page: Send + Sync {
    /// Navigate to `url`, resolving once the document has loaded.
    fn goto(&self, url: &str) -> impl Future<Output = Result<(), PageError>> + Send;

    /// Replace the value of the input matched by `selector`.
    fn fill(&self, selector: &str, text: &str)
        -> impl Future<Output = Result<(), PageError>> + Send;

    /// Click the first element matched by `selector`.
    fn click(&self, selector: &str) -> impl Future<Output = Result<(), PageError>> + Send;

    /// Click the `index`-th element matched by `selector`.
    fn click_nth(
        &self,
        selector: &str,
        index: usize,
    ) -> impl Future<Output = Result<(), PageError>> + Send;

    /// Text content of the first element matched by `selector`.
    ///
    /// `Ok(None)` means the element exists but has no text.
    fn text_content(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<String>, PageError>> + Send;

    /// Wait until an element matches `selector`.
    fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), PageError>> + Send;

    /// Wait up to `timeout` for the element to be visible.
    fn is_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<bool, PageError>> + Send;

    /// Wait up to `timeout` for the element's text to contain `expected`.
    fn contains_text(
        &self,
        selector: &str,
        expected: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<bool, PageError>> + Send;

    /// The document title.
    fn title(&self) -> impl Future<Output = Result<String, PageError>> + Send;

    /// Close the tab.
    fn close(&self) -> impl Future<Output = Result<(), PageError>> + Send;
}

/// A launched browser that can open pages.
pub trait Browser: Send + Sync {
    /// The page type this browser opens.
    type Page: Page;

    /// Open a new tab.
    fn new_page(&self) -> impl Future<Output = Result<Self::Page, PageError>> + Send;

    /// Shut the browser down.
    fn close(&self) -> impl Future<Output = Result<(), PageError>> + Send;
}
