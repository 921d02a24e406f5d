//! Page objects built on [`PageActions`](crate::page::PageActions).
//!
//! Each page object borrows the actions of one scenario and exposes the
//! interactions a test step needs, named for what the user does.

pub mod amazon;
pub mod example;

pub use amazon::{AmazonHomePage, AmazonProductPage, AmazonSearchResultsPage};
pub use example::{DemoPage, ExamplePage};
