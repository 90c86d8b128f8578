//! Where markup comes from: local HTML/XHTML files and saved Confluence
//! REST responses.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::tree::Tree;

/// Yields the parsed tree of a document given its title.
pub trait DocumentSource {
    fn fetch(&self, title: &str) -> Result<Tree, Error>;

    /// Directory relative image sources of this source resolve against.
    fn image_base(&self) -> Option<&Path> {
        None
    }
}

/// Documents stored as files below a base directory; the title is the path
/// relative to it.
pub struct LocalSource {
    base: PathBuf,
}

impl LocalSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        LocalSource { base: base.into() }
    }
}

impl DocumentSource for LocalSource {
    fn fetch(&self, title: &str) -> Result<Tree, Error> {
        read_document(&self.base.join(title))
    }

    fn image_base(&self) -> Option<&Path> {
        Some(&self.base)
    }
}

/// Confluence pages saved as REST responses (`<title>.json`) in a directory.
pub struct ConfluenceExport {
    dir: PathBuf,
}

impl ConfluenceExport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ConfluenceExport { dir: dir.into() }
    }
}

impl DocumentSource for ConfluenceExport {
    fn fetch(&self, title: &str) -> Result<Tree, Error> {
        let json = std::fs::read_to_string(self.dir.join(format!("{title}.json")))?;
        Ok(Tree::parse_html(&page_body(&json)?))
    }
}

/// Reads and parses one file, picking the parser from its extension:
/// `.json` is a Confluence response, `.xhtml`/`.xml` strict XHTML and
/// anything else HTML.
pub fn read_document(path: &Path) -> Result<Tree, Error> {
    let content = std::fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => Ok(Tree::parse_html(&page_body(&content)?)),
        Some("xhtml" | "xml") => Tree::parse_xhtml(&content),
        _ => Ok(Tree::parse_html(&content)),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentResponse {
    Page(Page),
    Search { size: u64, results: Vec<Page> },
}

#[derive(Deserialize)]
struct Page {
    id: serde_json::Value,
    body: Option<PageBody>,
}

#[derive(Deserialize)]
struct PageBody {
    view: Option<PageView>,
}

#[derive(Deserialize)]
struct PageView {
    value: Option<String>,
}

/// Rendered HTML of the page in a Confluence content response. Both a single
/// page and a search result holding exactly one page are accepted.
pub fn page_body(json: &str) -> Result<String, Error> {
    let response: ContentResponse = serde_json::from_str(json)?;
    let page = match response {
        ContentResponse::Page(page) => page,
        ContentResponse::Search { size, mut results } => {
            if size != 1 || results.len() != 1 {
                return Err(Error::Payload(format!(
                    "expected exactly one page, found {}",
                    results.len()
                )));
            }
            results.remove(0)
        }
    };
    log::debug!("Reading body of Confluence page {}", page.id);
    page.body
        .and_then(|b| b.view)
        .and_then(|v| v.value)
        .filter(|html| !html.is_empty())
        .ok_or_else(|| Error::Payload("page has no body.view.value".into()))
}

/// A Confluence space addressed through the REST API.
pub struct ConfluenceSpace {
    base_url: String,
    space_key: String,
}

impl ConfluenceSpace {
    /// `base_url` includes the context path and a trailing slash, e.g.
    /// `https://example.com/confluence/`.
    pub fn new(base_url: &str, space_key: &str) -> Result<Self, Error> {
        if base_url.is_empty() {
            return Err(Error::Config("base URL cannot be blank".into()));
        }
        if space_key.is_empty() {
            return Err(Error::Config("space key cannot be blank".into()));
        }
        Ok(ConfluenceSpace {
            base_url: base_url.to_string(),
            space_key: space_key.to_string(),
        })
    }

    /// REST endpoint returning the rendered body of the page titled `title`.
    pub fn content_uri(&self, title: &str) -> Result<String, Error> {
        check_title(title)?;
        Ok(format!(
            "{}rest/api/content?spaceKey={}&title={}&expand=body.view",
            self.base_url, self.space_key, title
        ))
    }

    /// Browser URL of the page titled `title`.
    pub fn display_url(&self, title: &str) -> Result<String, Error> {
        check_title(title)?;
        Ok(format!("{}display/{}/{}", self.base_url, self.space_key, title))
    }
}

fn check_title(title: &str) -> Result<(), Error> {
    if title.is_empty() {
        return Err(Error::Config("page title cannot be blank".into()));
    }
    Ok(())
}
