//! Content module - parses post files and derives post records

mod error;
mod frontmatter;
pub mod loader;
pub mod markdown;
mod post;

pub use error::ContentError;
pub use frontmatter::{AuthorField, FrontMatter};
pub use markdown::MarkdownRenderer;
pub use post::{
    default_image, Author, CategoryCount, NavPost, Navigation, Post, PostStatus, PostSummary,
    TagCount,
};

#[cfg(test)]
pub(crate) use post::fixtures;
