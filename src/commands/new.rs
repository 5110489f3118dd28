//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Scaffold used when the site has no `scaffolds/post.md`
const DEFAULT_SCAFFOLD: &str = r#"---
title: "{{ title }}"
date: {{ date }}
author: {{ author }}
category: {{ category }}
tags: []
status: {{ status }}
---

Write the introduction here.

<!-- more -->

And the rest of the post here.
"#;

/// Create a new post file and return its path
pub fn create_post(site: &Site, title: &str, draft: bool, slug: Option<&str>) -> Result<PathBuf> {
    let now = chrono::Utc::now();

    fs::create_dir_all(&site.content_dir)?;

    let slug = slug
        .map(slug::slugify)
        .unwrap_or_else(|| slug::slugify(title));
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from title {:?}", title);
    }
    let file_path = site.content_dir.join(format!("{}.md", slug));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let scaffold_path = site.base_dir.join("scaffolds").join("post.md");
    let scaffold = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)?
    } else {
        DEFAULT_SCAFFOLD.to_string()
    };

    let content = scaffold
        .replace("{{ title }}", &yaml_escape(title))
        .replace("{{ date }}", &now.format("%Y-%m-%d %H:%M:%S").to_string())
        .replace("{{ author }}", &site.config.author)
        .replace("{{ category }}", &site.config.default_category)
        .replace("{{ status }}", if draft { "draft" } else { "published" });

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Escape a value for a double-quoted YAML scalar
fn yaml_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::loader::ContentLoader;
    use crate::content::PostStatus;
    use tempfile::TempDir;

    #[test]
    fn test_created_post_loads() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = create_post(&site, "Meet \"Nova\": our agent", true, None).unwrap();
        assert_eq!(path.file_name().unwrap(), "meet-nova-our-agent.md");

        let post = ContentLoader::new(&site).load_file(&path).unwrap();
        assert_eq!(post.title, "Meet \"Nova\": our agent");
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.excerpt, "Write the introduction here.");
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        create_post(&site, "Hello", false, Some("hello")).unwrap();
        assert!(create_post(&site, "Hello again", false, Some("hello")).is_err());
    }
}
