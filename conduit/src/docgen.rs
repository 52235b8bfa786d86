//! # Documentation Generator
//!
//! Renders a catalog [`Schema`](conduit_core::catalog::Schema) as a set of Markdown pages: one
//! page per app, with one section per method, plus an `index.md` linking them together.
mod markdown;

pub use markdown::generate;
