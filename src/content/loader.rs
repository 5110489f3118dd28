//! Content loader - turns the content directory into a post collection

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::frontmatter::AuthorField;
use super::markdown::{plain_excerpt, reading_time, strip_markdown, MORE_MARKER};
use super::{Author, ContentError, FrontMatter, MarkdownRenderer, Navigation, Post};
use crate::query::PostCollection;
use crate::Site;

/// Loads posts from the content directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        let highlight = &site.config.highlight;
        let renderer = MarkdownRenderer::with_options(&highlight.theme, highlight.line_number);
        Self { site, renderer }
    }

    /// Load every post into a sorted, immutable collection.
    ///
    /// Never fails: files that do not parse are skipped, and an unavailable
    /// content directory yields an empty collection.
    pub fn load_all(&self) -> PostCollection {
        match self.load_posts() {
            Ok(posts) => PostCollection::new(posts),
            Err(e) => {
                tracing::error!("{}; serving an empty collection", e);
                PostCollection::default()
            }
        }
    }

    /// Load all posts in source path order, skipping bad and duplicate files
    pub fn load_posts(&self) -> Result<Vec<Post>, ContentError> {
        let content_dir = &self.site.content_dir;

        // read_dir surfaces both "missing" and "not readable"
        if let Err(e) = fs::read_dir(content_dir) {
            return Err(ContentError::RepositoryUnavailable {
                path: content_dir.clone(),
                reason: e.to_string(),
            });
        }

        // Hidden directories are pruned; the root itself may be hidden
        let mut files: Vec<(String, PathBuf)> = Vec::new();
        for entry in WalkDir::new(content_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Failed to walk content directory: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                files.push((self.relative_source(path), path.to_path_buf()));
            }
        }
        // Duplicate slugs resolve by relative path string, not walk order
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut posts = Vec::new();
        let mut seen: HashMap<String, String> = HashMap::new();

        for (_, path) in &files {
            let path = path.as_path();
            let post = match self.load_file(path) {
                Ok(post) => post,
                Err(e) => {
                    tracing::warn!("Skipping post {:?}: {}", path, e);
                    continue;
                }
            };

            if let Some(existing) = seen.get(&post.slug) {
                let e = ContentError::DuplicateSlug {
                    slug: post.slug.clone(),
                    existing: existing.clone(),
                };
                tracing::warn!("Skipping post {:?}: {}", path, e);
                continue;
            }

            seen.insert(post.slug.clone(), post.source.clone());
            posts.push(post);
        }

        tracing::debug!("Loaded {} posts from {:?}", posts.len(), content_dir);
        Ok(posts)
    }

    /// Load a single post from a file
    pub fn load_file(&self, path: &Path) -> Result<Post, ContentError> {
        let config = &self.site.config;
        let raw = fs::read_to_string(path).map_err(|e| ContentError::io(path, e))?;
        let (fm, body) = FrontMatter::parse(&raw)?;

        let title = fm.title()?.to_string();
        let published_at = fm.published_at()?;
        let updated_at = fm.updated_at()?.unwrap_or(published_at);
        let status = fm.status()?;

        let source = self.relative_source(path);
        let slug = derive_slug(&fm, path)?;
        let category = fm
            .category()
            .unwrap_or(&config.default_category)
            .to_string();
        let tags = fm.tags();

        let excerpt = fm
            .excerpt
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .or_else(|| MarkdownRenderer::split_excerpt(body).map(strip_markdown))
            .unwrap_or_else(|| plain_excerpt(body, config.excerpt_length));

        let author = fm
            .author
            .map(AuthorField::into_author)
            .unwrap_or_else(|| Author::named(config.author.clone()));

        let content_html = self.renderer.render(&body.replacen(MORE_MARKER, "", 1));

        Ok(Post {
            slug,
            title,
            excerpt,
            content: body.to_string(),
            content_html,
            author,
            category,
            tags,
            published_at,
            updated_at,
            read_time: reading_time(body, config.words_per_minute),
            featured_image: fm.image.filter(|i| !i.trim().is_empty()),
            status,
            source,
            extra: fm.extra,
        })
    }

    /// Path relative to the content directory, `/`-separated
    fn relative_source(&self, path: &Path) -> String {
        path.strip_prefix(&self.site.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Load everything and look up one post
    pub fn get_by_slug(&self, slug: &str) -> Option<Post> {
        self.load_all().get_by_slug(slug).cloned()
    }

    /// Load everything and find the chronological neighbours of one post
    pub fn get_navigation(&self, slug: &str) -> Option<Navigation> {
        self.load_all().navigation(slug)
    }
}

/// Front-matter `slug` wins; `<dir>/index.md` uses the directory name;
/// otherwise the file stem. The result must be a valid slug.
fn derive_slug(fm: &FrontMatter, path: &Path) -> Result<String, ContentError> {
    let slug = match fm.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slug.to_string(),
        None => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("untitled");
            let dir = path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|s| s.to_str());
            match dir {
                Some(dir) if stem == "index" => dir.to_string(),
                _ => stem.to_string(),
            }
        }
    };

    if is_valid_slug(&slug) {
        Ok(slug)
    } else {
        Err(ContentError::InvalidSlug(slug))
    }
}

/// Lowercase ASCII letters, digits and hyphens only
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

/// Dot-prefixed entries (`.git`, `.drafts`, editor swap files)
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PostStatus;
    use tempfile::TempDir;

    fn site_with_posts(files: &[(&str, &str)]) -> (TempDir, Site) {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        fs::create_dir_all(&site.content_dir).unwrap();
        for (name, content) in files {
            let path = site.content_dir.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        (dir, site)
    }

    fn post_file(title: &str, date: &str, extra: &str) -> String {
        format!(
            "---\ntitle: {}\ndate: {}\n{}---\n\nSome body text for {}.\n",
            title, date, extra, title
        )
    }

    #[test]
    fn test_load_all_sorted_newest_first() {
        let (_dir, site) = site_with_posts(&[
            ("old.md", &post_file("Old", "2023-05-01", "")),
            ("new.md", &post_file("New", "2024-05-01", "")),
            ("mid.markdown", &post_file("Mid", "2023-12-01", "")),
            ("notes.txt", "not a post"),
        ]);

        let posts = ContentLoader::new(&site).load_all();
        let slugs: Vec<_> = posts.all().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "mid", "old"]);
        assert!(posts.all().iter().all(|p| p.read_time >= 1));
    }

    #[test]
    fn test_same_date_ties_break_by_slug() {
        let (_dir, site) = site_with_posts(&[
            ("b.md", &post_file("B", "2024-01-01", "")),
            ("a.md", &post_file("A", "2024-01-01", "")),
            ("c.md", &post_file("C", "2024-01-01", "")),
        ]);

        let posts = ContentLoader::new(&site).load_all();
        let slugs: Vec<_> = posts.all().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let (_dir, site) = site_with_posts(&[
            ("good.md", &post_file("Good", "2024-01-01", "")),
            ("broken.md", "---\ntitle: [oops\n---\nBody"),
            ("no-date.md", "---\ntitle: Missing date\n---\nBody"),
            ("plain.md", "Just text, no header."),
        ]);

        let posts = ContentLoader::new(&site).load_all();
        assert_eq!(posts.len(), 1);
        assert!(posts.get_by_slug("good").is_some());
        assert!(posts.get_by_slug("broken").is_none());
    }

    #[test]
    fn test_missing_directory_yields_empty_collection() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let loader = ContentLoader::new(&site);
        assert!(matches!(
            loader.load_posts(),
            Err(ContentError::RepositoryUnavailable { .. })
        ));

        let posts = loader.load_all();
        assert!(posts.is_empty());
        assert!(posts.categories_with_counts().is_empty());
    }

    #[test]
    fn test_empty_directory() {
        let (_dir, site) = site_with_posts(&[]);
        let posts = ContentLoader::new(&site).load_all();
        assert!(posts.is_empty());
        assert!(posts.categories_with_counts().is_empty());
    }

    #[test]
    fn test_duplicate_slug_first_path_wins() {
        let (_dir, site) = site_with_posts(&[
            ("launch.md", &post_file("From file", "2024-01-01", "")),
            (
                "archive/launch.md",
                &post_file("From archive", "2024-02-01", ""),
            ),
            (
                "renamed.md",
                &post_file("Tagged slug", "2024-03-01", "slug: launch\n"),
            ),
        ]);

        let posts = ContentLoader::new(&site).load_all();
        assert_eq!(posts.len(), 1);
        // "archive/launch.md" sorts before "launch.md" and "renamed.md"
        assert_eq!(posts.get_by_slug("launch").unwrap().title, "From archive");
    }

    #[test]
    fn test_directory_post_uses_directory_name() {
        let (_dir, site) = site_with_posts(&[(
            "meet-nova/index.md",
            &post_file("Meet Nova", "2024-01-01", ""),
        )]);

        let posts = ContentLoader::new(&site).load_all();
        let post = posts.get_by_slug("meet-nova").unwrap();
        assert_eq!(post.source, "meet-nova/index.md");
    }

    #[test]
    fn test_derived_fields() {
        let body = "word ".repeat(450);
        let content = format!(
            "---\ntitle: Derived\ndate: 2024-04-01\nupdated: 2024-04-03\ntags: [AI, ML]\ncategory: Tech\nstatus: draft\nlayout: wide\n---\nIntro line.\n<!-- more -->\n{}\n",
            body
        );
        let (_dir, site) = site_with_posts(&[("derived.md", &content)]);

        let post = ContentLoader::new(&site).load_file(&site.content_dir.join("derived.md")).unwrap();
        assert_eq!(post.slug, "derived");
        assert_eq!(post.excerpt, "Intro line.");
        assert_eq!(post.read_time, 3);
        assert_eq!(post.tags, vec!["AI", "ML"]);
        assert_eq!(post.category, "Tech");
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.author.name, site.config.author);
        assert!(post.updated_at > post.published_at);
        assert!(post.extra.contains_key("layout"));
        assert!(!post.content_html.contains("<!-- more -->"));
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let (_dir, site) = site_with_posts(&[("bare.md", &post_file("Bare", "2024-01-01", ""))]);

        let post = ContentLoader::new(&site).load_file(&site.content_dir.join("bare.md")).unwrap();
        assert_eq!(post.category, "uncategorized");
        assert!(post.tags.is_empty());
        assert_eq!(post.updated_at, post.published_at);
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.excerpt, "Some body text for Bare.");
        assert_eq!(post.featured_image, None);
    }

    #[test]
    fn test_unreadable_file_is_io_error() {
        let (_dir, site) = site_with_posts(&[]);
        let err = ContentLoader::new(&site)
            .load_file(&PathBuf::from("/definitely/not/here.md"))
            .unwrap_err();
        assert!(matches!(err, ContentError::Io { .. }));
    }

    #[test]
    fn test_loader_lookups() {
        let (_dir, site) = site_with_posts(&[
            ("first.md", &post_file("First", "2024-01-01", "")),
            ("second.md", &post_file("Second", "2024-01-02", "")),
        ]);
        let loader = ContentLoader::new(&site);

        assert_eq!(loader.get_by_slug("first").unwrap().title, "First");
        assert!(loader.get_by_slug("First").is_none());

        let nav = loader.get_navigation("first").unwrap();
        assert!(nav.previous.is_none());
        assert_eq!(nav.next.unwrap().slug, "second");
    }

    #[test]
    fn test_invalid_slugs_are_rejected() {
        let (_dir, site) = site_with_posts(&[
            ("evil.md", &post_file("Evil", "2024-01-01", "slug: ../../../escaped\n")),
            ("parent.md", &post_file("Parent", "2024-01-01", "slug: ../x\n")),
            ("nested.md", &post_file("Nested", "2024-01-01", "slug: a/b\n")),
            ("spaced.md", &post_file("Spaced", "2024-01-01", "slug: Has Space\n")),
            ("Upper Case.md", &post_file("Upper", "2024-01-01", "")),
            ("fine.md", &post_file("Fine", "2024-01-01", "slug: fine-2024\n")),
        ]);
        let loader = ContentLoader::new(&site);

        for name in ["evil.md", "parent.md", "nested.md", "spaced.md", "Upper Case.md"] {
            let err = loader.load_file(&site.content_dir.join(name)).unwrap_err();
            assert!(matches!(err, ContentError::InvalidSlug(_)), "{}: {}", name, err);
        }

        let posts = loader.load_all();
        let slugs: Vec<_> = posts.all().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["fine-2024"]);
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("meet-nova-2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug(".."));
        assert!(!is_valid_slug("Nova"));
        assert!(!is_valid_slug("snake_case"));
    }

    #[test]
    fn test_duplicate_slug_uses_path_string_order() {
        // "a.md" < "a/x.md" as strings, although a walk visits "a/" first
        let (_dir, site) = site_with_posts(&[
            ("a.md", &post_file("Top level", "2024-01-01", "")),
            ("a/x.md", &post_file("Nested", "2024-02-01", "slug: a\n")),
        ]);

        let posts = ContentLoader::new(&site).load_all();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts.get_by_slug("a").unwrap().source, "a.md");
    }

    #[test]
    fn test_hidden_directories_are_skipped() {
        let (_dir, site) = site_with_posts(&[
            ("visible.md", &post_file("Visible", "2024-01-01", "")),
            (".drafts/secret.md", &post_file("Secret", "2024-01-02", "")),
            (".git/notes/log.md", &post_file("Log", "2024-01-03", "")),
            ("sub/.hidden.md", &post_file("Hidden", "2024-01-04", "")),
        ]);

        let posts = ContentLoader::new(&site).load_all();
        let slugs: Vec<_> = posts.all().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["visible"]);
    }
}
