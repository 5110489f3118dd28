//! Query layer - read-only views over a loaded post collection
//!
//! A [`PostCollection`] is an immutable snapshot produced by one load cycle.
//! Every query borrows from it; nothing here touches the filesystem.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use crate::content::{CategoryCount, NavPost, Navigation, Post, TagCount};

mod detail;

pub use detail::PostDetail;

/// Number of related posts returned when the caller does not say
pub const DEFAULT_RELATED_LIMIT: usize = 3;

const CATEGORY_SCORE: usize = 3;
const SHARED_TAG_SCORE: usize = 1;

/// Posts sorted newest first, indexed by slug
#[derive(Debug, Clone, Default)]
pub struct PostCollection {
    posts: Vec<Post>,
    by_slug: HashMap<String, usize>,
}

impl PostCollection {
    /// Build a collection, sorting by publication date (newest first) with
    /// the slug as tiebreak. Later duplicates of a slug are dropped.
    pub fn new(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.slug.cmp(&b.slug))
        });

        let mut by_slug = HashMap::with_capacity(posts.len());
        let mut unique = Vec::with_capacity(posts.len());
        for post in posts {
            if by_slug.contains_key(&post.slug) {
                tracing::warn!("Dropping duplicate slug {:?} ({})", post.slug, post.source);
                continue;
            }
            by_slug.insert(post.slug.clone(), unique.len());
            unique.push(post);
        }

        Self {
            posts: unique,
            by_slug,
        }
    }

    /// All posts, newest first
    pub fn all(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// A collection restricted to published posts
    pub fn published(&self) -> PostCollection {
        PostCollection::new(
            self.posts
                .iter()
                .filter(|p| p.is_published())
                .cloned()
                .collect(),
        )
    }

    /// Exact, case-sensitive slug lookup
    pub fn get_by_slug(&self, slug: &str) -> Option<&Post> {
        self.by_slug.get(slug).map(|&i| &self.posts[i])
    }

    /// Chronological neighbours; `None` when the slug is unknown
    pub fn navigation(&self, slug: &str) -> Option<Navigation> {
        let pos = *self.by_slug.get(slug)?;

        // Sorted newest first: older posts sit after `pos`
        let previous = self.posts.get(pos + 1).map(NavPost::from);
        let next = pos
            .checked_sub(1)
            .and_then(|i| self.posts.get(i))
            .map(NavPost::from);

        Some(Navigation { previous, next })
    }

    /// Posts whose category matches, ignoring case
    pub fn filter_by_category(&self, category: &str) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|p| p.in_category(category))
            .collect()
    }

    /// Posts carrying exactly this tag
    pub fn filter_by_tag(&self, tag: &str) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|p| p.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Case-insensitive substring search over title, excerpt, tags and
    /// category. Unranked; a blank query matches every post.
    pub fn search(&self, query: &str) -> Vec<&Post> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.posts.iter().collect();
        }

        self.posts
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.excerpt.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
                    || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Score every other post against `slug` and return the best `limit`.
    ///
    /// Same category scores 3, each shared tag scores 1, zero scores are
    /// dropped. Ties go to the newer post, then to the smaller slug.
    pub fn related_posts(&self, slug: &str, limit: usize) -> Vec<&Post> {
        let Some(source) = self.get_by_slug(slug) else {
            return Vec::new();
        };

        let mut scored: Vec<(usize, &Post)> = self
            .posts
            .iter()
            .filter(|p| p.slug != source.slug)
            .map(|p| (relatedness(source, p), p))
            .filter(|(score, _)| *score > 0)
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| {
            sb.cmp(sa)
                .then_with(|| b.published_at.cmp(&a.published_at))
                .then_with(|| a.slug.cmp(&b.slug))
        });

        scored.into_iter().take(limit).map(|(_, p)| p).collect()
    }

    /// Distinct categories (grouped ignoring case) with their post counts,
    /// sorted by name. The display name is the newest post's spelling.
    pub fn categories_with_counts(&self) -> Vec<CategoryCount> {
        let mut groups: BTreeMap<String, (&str, usize)> = BTreeMap::new();
        for post in &self.posts {
            groups
                .entry(post.category.to_lowercase())
                .or_insert((post.category.as_str(), 0))
                .1 += 1;
        }

        groups
            .into_values()
            .map(|(name, count)| CategoryCount::new(name, count))
            .collect()
    }

    /// Distinct tags with their post counts, most used first
    pub fn tags_with_counts(&self) -> Vec<TagCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for post in &self.posts {
            for tag in &post.tags {
                *counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }

        let mut tags: Vec<TagCount> = counts
            .into_iter()
            .map(|(name, count)| TagCount {
                name: name.to_string(),
                count,
            })
            .collect();
        // Stable sort keeps the alphabetical order among equal counts
        tags.sort_by_key(|t| Reverse(t.count));
        tags
    }
}

/// How related `candidate` is to `source`
pub fn relatedness(source: &Post, candidate: &Post) -> usize {
    let category = if candidate.in_category(&source.category) {
        CATEGORY_SCORE
    } else {
        0
    };

    let mut shared: Vec<&String> = candidate
        .tags
        .iter()
        .filter(|t| source.tags.contains(t))
        .collect();
    shared.sort();
    shared.dedup();

    category + shared.len() * SHARED_TAG_SCORE
}
