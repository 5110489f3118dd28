//! Post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Post author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl Author {
    pub fn named(name: String) -> Self {
        Self {
            name,
            avatar: None,
            bio: None,
        }
    }
}

/// Publication state; only published posts are publicly listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

/// A blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier, derived from the file name
    pub slug: String,

    /// Post title
    pub title: String,

    /// Short summary
    pub excerpt: String,

    /// Raw markdown body
    pub content: String,

    /// Rendered HTML body
    pub content_html: String,

    pub author: Author,

    pub category: String,

    pub tags: Vec<String>,

    /// Publication date
    pub published_at: DateTime<Utc>,

    /// Last updated date, `published_at` unless front-matter says otherwise
    pub updated_at: DateTime<Utc>,

    /// Estimated reading time in minutes, never below 1
    pub read_time: usize,

    /// Image URL from front-matter
    pub featured_image: Option<String>,

    pub status: PostStatus,

    /// Source file path relative to the content directory
    pub source: String,

    /// Unrecognised front-matter fields
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Case-insensitive category comparison
    pub fn in_category(&self, category: &str) -> bool {
        self.category.to_lowercase() == category.to_lowercase()
    }

    /// The featured image, or a default picked by slug when none was set
    pub fn display_image<'a>(&'a self, defaults: &'a [String]) -> Option<&'a str> {
        self.featured_image
            .as_deref()
            .or_else(|| default_image(&self.slug, defaults))
    }
}

/// Pick a fallback image as a pure function of the slug
pub fn default_image<'a>(slug: &str, defaults: &'a [String]) -> Option<&'a str> {
    if defaults.is_empty() {
        return None;
    }
    let index = (fnv1a(slug.as_bytes()) % defaults.len() as u64) as usize;
    Some(defaults[index].as_str())
}

/// 64-bit FNV-1a; stable across platforms and releases
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes.iter().fold(OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(PRIME)
    })
}

/// A single entry of post navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavPost {
    pub slug: String,
    pub title: String,
}

impl From<&Post> for NavPost {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
        }
    }
}

/// Chronological neighbours of a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// The next older post
    pub previous: Option<NavPost>,
    /// The next newer post
    pub next: Option<NavPost>,
}

/// Listing data for a post, without the body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub author: Author,
    pub category: String,
    pub tags: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub read_time: usize,
    pub featured_image: Option<String>,
}

impl PostSummary {
    pub fn new(post: &Post, default_images: &[String]) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            published_at: post.published_at,
            updated_at: post.updated_at,
            read_time: post.read_time,
            featured_image: post.display_image(default_images).map(str::to_string),
        }
    }
}

/// A category with the number of posts filed under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub slug: String,
    pub count: usize,
}

impl CategoryCount {
    pub fn new(name: &str, count: usize) -> Self {
        Self {
            name: name.to_string(),
            slug: slug::slugify(name),
            count,
        }
    }
}

/// A tag with the number of posts carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}
