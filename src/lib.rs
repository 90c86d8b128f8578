pub mod config;
mod error;
mod extract;
pub mod images;
mod list;
pub mod model;
pub mod source;
mod table;
pub mod tree;

pub use error::Error;
pub use extract::{DEFAULT_MAX_DEPTH, Extractor, apply_attribute};

use images::ImageCollector;
use model::Transcript;
use source::DocumentSource;
use tree::Tree;

/// Extracts the transcript of a parsed document. A non-empty `sections`
/// list restricts it to the content below headings with those titles.
pub fn extract_transcript(
    tree: &Tree,
    sections: &[String],
    images: &dyn ImageCollector,
) -> Result<Transcript, Error> {
    let segments = Extractor::new(tree, images).extract(tree.root(), sections)?;
    log::info!(
        "Extracted {} segments from {} nodes",
        segments.len(),
        tree.len()
    );
    Ok(Transcript { segments })
}

pub fn fetch_transcript(
    source: &dyn DocumentSource,
    title: &str,
    sections: &[String],
    images: &dyn ImageCollector,
) -> Result<Transcript, Error> {
    let tree = source.fetch(title)?;
    extract_transcript(&tree, sections, images)
}
