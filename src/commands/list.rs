//! List site content

use anyhow::Result;

use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let posts = site.load();

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", posts.len());
            for post in posts.all() {
                let marker = if post.is_published() { "" } else { " (draft)" };
                println!(
                    "  {} - {} [{}] {}min{}",
                    post.published_at.format("%Y-%m-%d"),
                    post.title,
                    post.slug,
                    post.read_time,
                    marker
                );
            }
        }
        "tag" | "tags" => {
            let tags = posts.tags_with_counts();
            println!("Tags ({}):", tags.len());
            for tag in tags {
                println!("  {} ({})", tag.name, tag.count);
            }
        }
        "category" | "categories" => {
            let categories = posts.categories_with_counts();
            println!("Categories ({}):", categories.len());
            for category in categories {
                println!("  {} ({})", category.name, category.count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category",
                content_type
            );
        }
    }

    Ok(())
}
