//! Page objects for example.com.

use crate::page::{Page, PageActions, PageError};

/// The example.com landing page.
#[derive(Debug)]
pub struct ExamplePage<'p, P> {
    actions: PageActions<'p, P>,
}

impl<'p, P: Page> ExamplePage<'p, P> {
    /// Where the page lives.
    pub const URL: &'static str = "https://example.com";

    /// Wrap `actions`.
    pub fn new(actions: PageActions<'p, P>) -> Self {
        Self { actions }
    }

    /// Open the page.
    pub async fn goto(&self) -> Result<(), PageError> {
        self.actions.goto(Self::URL).await
    }

    /// The document title.
    pub async fn title(&self) -> Result<String, PageError> {
        self.actions.title().await
    }
}

/// A generic document with a heading and a paragraph.
#[derive(Debug)]
pub struct DemoPage<'p, P> {
    actions: PageActions<'p, P>,
}

impl<'p, P: Page> DemoPage<'p, P> {
    /// Heading selector.
    pub const HEADING: &'static str = "h1";
    /// Paragraph selector.
    pub const PARAGRAPH: &'static str = "p";

    /// Wrap `actions`.
    pub fn new(actions: PageActions<'p, P>) -> Self {
        Self { actions }
    }

    /// Open `url`.
    pub async fn goto(&self, url: &str) -> Result<(), PageError> {
        self.actions.goto(url).await
    }

    /// Check the page rendered its heading.
    pub async fn verify_loaded(&self) -> Result<(), PageError> {
        tracing::info!("verifying page is loaded");
        self.actions.assert_element_visible(Self::HEADING).await?;
        tracing::info!("page loaded");
        Ok(())
    }

    /// Heading text, if readable.
    pub async fn heading_text(&self) -> Option<String> {
        self.actions.text_content(Self::HEADING).await
    }

    /// Paragraph text, if readable.
    pub async fn paragraph_text(&self) -> Option<String> {
        self.actions.text_content(Self::PARAGRAPH).await
    }

    /// The underlying actions, for one-off interactions.
    pub fn actions(&self) -> &PageActions<'p, P> {
        &self.actions
    }
}
