use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use eframe::egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use thiserror::Error;

const BADGE_PIXELS: u32 = 64;

pub(in crate::app) trait ImageResolver: Send + Sync {
    fn resolve(&self, url: &str) -> Option<PathBuf>;
}

pub(in crate::app) struct LocalImageResolver {
    root: PathBuf,
}

impl LocalImageResolver {
    pub(in crate::app) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageResolver for LocalImageResolver {
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let url = url.split(['?', '#']).next().unwrap_or_default().trim();
        if url.is_empty() {
            return None;
        }

        if let Some(path) = url.strip_prefix("file://") {
            let path = Path::new(path);
            return path.is_absolute().then(|| path.to_path_buf());
        }

        let name = url.rsplit('/').next().unwrap_or_default();
        if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
            return None;
        }
        Some(self.root.join(name))
    }
}

#[derive(Debug, Error)]
pub(in crate::app) enum BadgeError {
    #[error("no local image for {0}")]
    Unresolved(String),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub(in crate::app) fn load_badge(
    resolver: &dyn ImageResolver,
    url: &str,
) -> Result<ColorImage, BadgeError> {
    let path = resolver
        .resolve(url)
        .ok_or_else(|| BadgeError::Unresolved(url.to_owned()))?;
    let bytes = fs::read(&path).map_err(|source| BadgeError::Read {
        path: path.clone(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|source| BadgeError::Decode { path, source })?;

    let decoded = if decoded.width() > BADGE_PIXELS || decoded.height() > BADGE_PIXELS {
        decoded.thumbnail(BADGE_PIXELS, BADGE_PIXELS)
    } else {
        decoded
    };
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

enum Slot {
    Pending,
    Ready(TextureHandle),
    Failed,
}

type BadgeResult = (String, Result<ColorImage, BadgeError>);

pub(in crate::app) struct BadgeCache {
    slots: HashMap<String, Slot>,
    jobs: Option<Sender<String>>,
    results: Option<Receiver<BadgeResult>>,
}

impl BadgeCache {
    pub(in crate::app) fn new(resolver: Arc<dyn ImageResolver>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<String>();
        let (result_tx, result_rx) = mpsc::channel();

        thread::spawn(move || {
            for url in job_rx {
                let result = load_badge(resolver.as_ref(), &url);
                if result_tx.send((url, result)).is_err() {
                    break;
                }
            }
        });

        Self {
            slots: HashMap::new(),
            jobs: Some(job_tx),
            results: Some(result_rx),
        }
    }

    pub(in crate::app) fn disabled() -> Self {
        Self {
            slots: HashMap::new(),
            jobs: None,
            results: None,
        }
    }

    pub(in crate::app) fn request(&mut self, url: &str) {
        if url.is_empty() || self.slots.contains_key(url) {
            return;
        }
        let Some(jobs) = &self.jobs else {
            return;
        };

        if jobs.send(url.to_owned()).is_ok() {
            self.slots.insert(url.to_owned(), Slot::Pending);
        } else {
            self.slots.insert(url.to_owned(), Slot::Failed);
        }
    }

    pub(in crate::app) fn poll(&mut self, ctx: &Context) -> usize {
        let Some(results) = &self.results else {
            return 0;
        };

        let mut uploaded = 0;
        while let Ok((url, result)) = results.try_recv() {
            if !self.slots.contains_key(&url) {
                continue;
            }

            let slot = match result {
                Ok(image) => {
                    uploaded += 1;
                    let name = format!("badge:{url}");
                    Slot::Ready(ctx.load_texture(name, image, TextureOptions::LINEAR))
                }
                Err(error) => {
                    tracing::debug!(%url, %error, "badge unavailable");
                    Slot::Failed
                }
            };
            self.slots.insert(url, slot);
        }
        uploaded
    }

    pub(in crate::app) fn texture(&self, url: &str) -> Option<TextureId> {
        match self.slots.get(url) {
            Some(Slot::Ready(handle)) => Some(handle.id()),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(in crate::app) fn pending(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, Slot::Pending))
            .count()
    }

    pub(in crate::app) fn shutdown(&mut self) {
        self.jobs = None;
        self.results = None;
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use image::{Rgba, RgbaImage};

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let id = std::process::id();
        let dir = std::env::temp_dir().join(format!("coin-bubbles-{name}-{id}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn wait_for_uploads(cache: &mut BadgeCache, ctx: &Context) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while cache.pending() > 0 && Instant::now() < deadline {
            cache.poll(ctx);
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn resolver_keeps_only_the_file_name() {
        let resolver = LocalImageResolver::new("/srv/badges");

        assert_eq!(
            resolver.resolve("https://cdn.example.com/images/1/large/bitcoin.png?1696501400"),
            Some(PathBuf::from("/srv/badges/bitcoin.png"))
        );
        assert_eq!(
            resolver.resolve("file:///tmp/eth.png#frag"),
            Some(PathBuf::from("/tmp/eth.png"))
        );
        assert_eq!(resolver.resolve(""), None);
        assert_eq!(resolver.resolve("https://example.com/coins/"), None);
        assert_eq!(resolver.resolve("https://example.com/.."), None);
        assert_eq!(resolver.resolve("file://relative.png"), None);
    }

    #[test]
    fn large_images_are_downscaled() {
        let dir = scratch_dir("downscale");
        RgbaImage::from_pixel(200, 100, Rgba([250, 10, 10, 255]))
            .save(dir.join("big.png"))
            .unwrap();

        let resolver = LocalImageResolver::new(&dir);
        let image = load_badge(&resolver, "https://cdn.example.com/big.png").unwrap();
        assert_eq!(image.size, [64, 32]);

        let missing = load_badge(&resolver, "https://cdn.example.com/missing.png");
        assert!(matches!(missing, Err(BadgeError::Read { .. })));

        fs::write(dir.join("broken.png"), b"not an image").unwrap();
        let broken = load_badge(&resolver, "broken.png");
        assert!(matches!(broken, Err(BadgeError::Decode { .. })));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn worker_uploads_good_badges_and_skips_failures() {
        let dir = scratch_dir("worker");
        RgbaImage::from_pixel(16, 16, Rgba([0, 200, 0, 255]))
            .save(dir.join("ok.png"))
            .unwrap();

        let ctx = Context::default();
        let mut cache = BadgeCache::new(Arc::new(LocalImageResolver::new(&dir)));
        cache.request("https://cdn.example.com/ok.png");
        cache.request("https://cdn.example.com/absent.png");
        cache.request("https://cdn.example.com/ok.png");
        cache.request("");
        assert_eq!(cache.pending(), 2);

        wait_for_uploads(&mut cache, &ctx);
        assert!(cache.texture("https://cdn.example.com/ok.png").is_some());
        assert!(cache.texture("https://cdn.example.com/absent.png").is_none());

        cache.shutdown();
        assert!(cache.texture("https://cdn.example.com/ok.png").is_none());
        cache.request("https://cdn.example.com/ok.png");
        assert_eq!(cache.pending(), 0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn disabled_cache_never_loads() {
        let mut cache = BadgeCache::disabled();
        cache.request("https://cdn.example.com/ok.png");
        assert_eq!(cache.pending(), 0);
        assert_eq!(cache.poll(&Context::default()), 0);
    }
}
