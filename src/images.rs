use std::cell::RefCell;
use std::path::{Component, Path, PathBuf};

/// Side channel notified of every image reference the extractor meets.
///
/// Collecting is best effort: implementations log their failures and never
/// abort an extraction.
pub trait ImageCollector {
    /// Takes note of `src`. Returns the name the transcript should reference
    /// instead, or `None` to keep `src` as written.
    fn collect(&self, src: &str) -> Option<String>;
}

/// Ignores every image.
pub struct NoImages;

impl ImageCollector for NoImages {
    fn collect(&self, _src: &str) -> Option<String> {
        None
    }
}

/// Copies local images next to the generated document.
///
/// Relative sources are copied from `base` into `dest`, keeping their
/// relative path. Remote (Confluence attachment) sources are not downloaded;
/// they are recorded under the `images/<id>.<ext>` name the renderer expects,
/// and the transcript references that name instead of the URL.
pub struct ImageStager {
    base: PathBuf,
    dest: PathBuf,
    staged: RefCell<Vec<String>>,
}

impl ImageStager {
    pub fn new(base: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        ImageStager {
            base: base.into(),
            dest: dest.into(),
            staged: RefCell::new(Vec::new()),
        }
    }

    /// Staged image paths relative to `dest`, in the order first seen.
    pub fn staged(&self) -> Vec<String> {
        self.staged.borrow().clone()
    }

    fn record(&self, name: String) {
        let mut staged = self.staged.borrow_mut();
        if !staged.contains(&name) {
            staged.push(name);
        }
    }

    fn copy_local(&self, src: &str) -> std::io::Result<()> {
        let target = self.dest.join(src);
        if let Some(dir) = target.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::copy(self.base.join(src), &target)?;
        Ok(())
    }
}

impl ImageCollector for ImageStager {
    fn collect(&self, src: &str) -> Option<String> {
        if src.starts_with("http://") || src.starts_with("https://") {
            let Some(name) = attachment_name(src) else {
                log::warn!("Skipping image {src}: no supported file extension");
                return None;
            };
            self.record(name.clone());
            return Some(name);
        }

        if !is_contained(Path::new(src)) {
            log::warn!("Skipping image {src}: path leaves the document directory");
            return None;
        }
        if self.staged.borrow().iter().any(|s| s == src) {
            return None;
        }
        match self.copy_local(src) {
            Ok(()) => self.record(src.to_string()),
            Err(e) => log::warn!("Could not stage image {src}: {e}"),
        }
        None
    }
}

fn is_contained(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Staging name of a Confluence attachment URL: the attachment id (the
/// second-to-last path segment) plus the image extension.
///
/// `https://wiki/download/attachments/4242/diagram.png?version=1` becomes
/// `images/4242.png`.
pub fn attachment_name(url: &str) -> Option<String> {
    let ext = ["jpeg", "png", "jpg"]
        .into_iter()
        .find(|ext| url.contains(&format!(".{ext}")))?;
    let segments: Vec<&str> = url.split('/').collect();
    let id = segments.len().checked_sub(2).map(|i| segments[i])?;
    if id.is_empty() {
        return None;
    }
    Some(format!("images/{id}.{ext}"))
}
