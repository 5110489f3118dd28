//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Default `_config.yml` written by `init`
const CONFIG_TEMPLATE: &str = r#"# Inkpress configuration

# Site
title: Inkpress
description: ''
author: Editorial Team
language: en

# URL
url: http://example.com
root: /
blog_dir: blog
category_dir: category

# Directory
content_dir: content/posts
public_dir: public

# Writing
default_category: uncategorized
render_drafts: false
highlight:
  theme: base16-ocean.dark
  line_number: true

# Derived fields
words_per_minute: 200
excerpt_length: 160
related_limit: 3
default_images: []

# Feed
feed_limit: 20
"#;

const POST_SCAFFOLD: &str = r#"---
title: "{{ title }}"
date: {{ date }}
author: {{ author }}
category: {{ category }}
tags: []
status: {{ status }}
---
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    if target_dir.join(crate::CONFIG_FILE).exists() {
        anyhow::bail!("{:?} already contains a site", target_dir);
    }

    fs::create_dir_all(target_dir.join("content/posts"))?;
    fs::create_dir_all(target_dir.join("scaffolds"))?;

    fs::write(target_dir.join(crate::CONFIG_FILE), CONFIG_TEMPLATE)?;
    fs::write(target_dir.join("scaffolds/post.md"), POST_SCAFFOLD)?;

    let now = chrono::Utc::now();
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
author: Editorial Team
category: Announcements
tags:
  - welcome
---

Welcome to your new blog. Every markdown file in `content/posts` becomes a
post; the file name is its slug.

<!-- more -->

## Writing posts

```bash
$ inkpress new "My New Post"
```

## Publishing

```bash
$ inkpress generate
$ inkpress server
```
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(target_dir.join("content/posts/hello-world.md"), sample_post)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Site;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_loadable_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();

        let site = Site::new(dir.path()).unwrap();
        let posts = site.load();
        assert_eq!(posts.len(), 1);

        let post = posts.get_by_slug("hello-world").unwrap();
        assert_eq!(post.category, "Announcements");
        assert!(post.excerpt.starts_with("Welcome to your new blog."));
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}
