//! Full view of one post, as handed to the presentation layer

use serde::Serialize;

use super::PostCollection;
use crate::config::SiteConfig;
use crate::content::{Navigation, PostSummary};

/// A post with its rendered body, neighbours and related posts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content_html: String,
    pub navigation: Navigation,
    pub related: Vec<PostSummary>,
}

impl PostDetail {
    /// Assemble the detail view; `None` when the slug is unknown
    pub fn build(posts: &PostCollection, slug: &str, config: &SiteConfig) -> Option<Self> {
        let post = posts.get_by_slug(slug)?;
        let navigation = posts.navigation(slug)?;
        let related = posts
            .related_posts(slug, config.related_limit)
            .into_iter()
            .map(|p| PostSummary::new(p, &config.default_images))
            .collect();

        Some(Self {
            summary: PostSummary::new(post, &config.default_images),
            content_html: post.content_html.clone(),
            navigation,
            related,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures::post;

    #[test]
    fn test_build_detail() {
        let posts = PostCollection::new(vec![
            post("a", 1, "Tech", &["AI", "ML"]),
            post("b", 2, "Tech", &["AI"]),
            post("c", 3, "Other", &[]),
        ]);
        let mut config = SiteConfig::default();
        config.default_images = vec!["/img/default.png".to_string()];

        let detail = PostDetail::build(&posts, "a", &config).unwrap();
        assert_eq!(detail.summary.slug, "a");
        assert_eq!(
            detail.summary.featured_image.as_deref(),
            Some("/img/default.png")
        );
        assert!(detail.navigation.previous.is_none());
        assert_eq!(detail.navigation.next.as_ref().unwrap().slug, "b");
        assert_eq!(detail.related.len(), 1);
        assert_eq!(detail.related[0].slug, "b");

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["slug"], "a");
        assert_eq!(json["readTime"], 1);
        assert!(json.get("contentHtml").is_some());

        assert!(PostDetail::build(&posts, "missing", &config).is_none());
    }
}
