//! Generate static artifacts

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::store::ContentStore;
use crate::Site;

/// Quiet period after the last event of a burst before rebuilding
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Load the content and generate every artifact
pub fn run(site: &Site) -> Result<()> {
    let store = ContentStore::new(site.clone());
    generate_from(&store)
}

/// Generate from a store's current public snapshot
pub fn generate_from(store: &ContentStore) -> Result<()> {
    let start = Instant::now();

    let all = store.snapshot();
    let posts = store.public_snapshot();
    tracing::info!(
        "Loaded {} posts ({} public)",
        all.len(),
        posts.len()
    );

    Generator::new(store.site()).generate(&posts)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());
    Ok(())
}

/// Watch the content directory and regenerate on change
pub async fn watch(site: &Site) -> Result<()> {
    let site = site.clone();
    tokio::task::spawn_blocking(move || {
        let store = ContentStore::new(site.clone());
        watch_content(&site, || {
            store.invalidate();
            if let Err(e) = generate_from(&store) {
                tracing::error!("Generation failed: {}", e);
            }
        })
    })
    .await?
}

/// Block on debounced changes under the content directory and the config
/// file, calling `on_change` once per burst of events
pub fn watch_content<F: FnMut()>(site: &Site, mut on_change: F) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(DEBOUNCE, tx)?;

    debouncer
        .watcher()
        .watch(&site.content_dir, RecursiveMode::Recursive)?;

    let config_path = site.base_dir.join(crate::CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching {:?} for changes. Press Ctrl+C to stop.", site.content_dir);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events.iter().filter(|e| is_relevant(&e.path)).collect();
                if changed.is_empty() {
                    continue;
                }
                for event in changed {
                    tracing::info!("File changed: {}", event.path.display());
                }
                on_change();
            }
            Ok(Err(e)) => tracing::error!("Watch error: {:?}", e),
            Err(_) => break,
        }
    }

    Ok(())
}

/// Editor droppings and VCS files never trigger a rebuild
fn is_relevant(path: &Path) -> bool {
    let path = path.to_string_lossy();
    !path.contains(".git") && !path.contains(".DS_Store") && !path.ends_with('~')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_generates_public_posts_only() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        fs::create_dir_all(&site.content_dir).unwrap();
        fs::write(
            site.content_dir.join("live.md"),
            "---\ntitle: Live\ndate: 2024-01-01\n---\nHello\n",
        )
        .unwrap();
        fs::write(
            site.content_dir.join("wip.md"),
            "---\ntitle: WIP\ndate: 2024-01-02\nstatus: draft\n---\nSoon\n",
        )
        .unwrap();

        run(&site).unwrap();

        assert!(site.public_dir.join("api/posts/live.json").exists());
        assert!(!site.public_dir.join("api/posts/wip.json").exists());
        let sitemap = fs::read_to_string(site.public_dir.join("sitemap.xml")).unwrap();
        assert!(!sitemap.contains("/wip/"));
    }

    #[test]
    fn test_run_with_missing_content_dir() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        run(&site).unwrap();
        let listing = fs::read_to_string(site.public_dir.join("api/posts.json")).unwrap();
        assert_eq!(listing.trim(), "[]");
    }

    #[test]
    fn test_slug_cannot_escape_public_dir() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        fs::create_dir_all(&site.content_dir).unwrap();
        fs::write(
            site.content_dir.join("evil.md"),
            "---\ntitle: Evil\ndate: 2024-01-01\nslug: ../../../escaped\n---\nBody\n",
        )
        .unwrap();
        fs::write(
            site.content_dir.join("nested.md"),
            "---\ntitle: Nested\ndate: 2024-01-01\nslug: a/b\n---\nBody\n",
        )
        .unwrap();

        run(&site).unwrap();

        assert!(!dir.path().join("escaped.json").exists());
        assert!(!site.public_dir.join("api/posts/a/b.json").exists());
        let listing = fs::read_to_string(site.public_dir.join("api/posts.json")).unwrap();
        assert_eq!(listing.trim(), "[]");
    }

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(Path::new("content/posts/hello.md")));
        assert!(!is_relevant(Path::new("content/.git/index")));
        assert!(!is_relevant(Path::new("content/posts/hello.md~")));
    }

    #[test]
    fn test_watch_sees_change_right_after_rebuild() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        fs::create_dir_all(&site.content_dir).unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        let watch_site = site.clone();
        std::thread::spawn(move || {
            let _ = watch_content(&watch_site, || {
                let _ = tx.send(());
            });
        });
        std::thread::sleep(Duration::from_millis(300));

        fs::write(site.content_dir.join("one.md"), "---\ntitle: One\ndate: 2024-01-01\n---\n").unwrap();
        rx.recv_timeout(Duration::from_secs(10)).unwrap();

        // A save straight after a rebuild must still trigger another one
        fs::write(site.content_dir.join("two.md"), "---\ntitle: Two\ndate: 2024-01-02\n---\n").unwrap();
        rx.recv_timeout(Duration::from_secs(10)).unwrap();
    }
}
