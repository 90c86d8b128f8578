use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Local HTML/XHTML files (typically rendered from asciidoc).
    Asciidoc,
    /// Saved Confluence REST responses.
    Confluence,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Source {
    pub key: String,
    pub kind: SourceKind,
    /// Directory the documents of this source are read from.
    pub source: String,
    pub space: Option<String>,
    /// Confluence base URL, including the context path.
    pub context: Option<String>,
}

/// One document to extract, in output order.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub key: String,
    pub index: String,
    /// Section titles to restrict extraction to; empty means the whole document.
    pub sections: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub sources: Vec<Source>,
    pub nodes: Vec<Node>,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    sources: Vec<RawSource>,
    #[serde(default)]
    nodes: Vec<RawNode>,
}

#[derive(Deserialize)]
struct RawSource {
    #[serde(default)]
    key: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    source: String,
    space: Option<String>,
    context: Option<String>,
}

#[derive(Deserialize)]
struct RawNode {
    #[serde(default)]
    key: String,
    #[serde(default)]
    index: String,
    sections: Option<serde_json::Value>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, Error> {
        let json = std::fs::read_to_string(path)?;
        Config::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Config, Error> {
        let raw: RawConfig = serde_json::from_str(json)?;

        let mut sources = Vec::with_capacity(raw.sources.len());
        for src in raw.sources {
            sources.push(validate_source(src)?);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = sources.iter().find(|s| !seen.insert(s.key.as_str())) {
            return Err(Error::Config(format!("duplicate source key '{}'", dup.key)));
        }

        let mut nodes = Vec::with_capacity(raw.nodes.len());
        for node in raw.nodes {
            if node.key.is_empty() || node.index.is_empty() {
                return Err(Error::Config("every node needs a key and an index".into()));
            }
            if !sources.iter().any(|s| s.key == node.key) {
                return Err(Error::Config(format!(
                    "node '{}' refers to unknown source key '{}'",
                    node.index, node.key
                )));
            }
            let sections = parse_sections(&node.index, node.sections);
            nodes.push(Node {
                key: node.key,
                index: node.index,
                sections,
            });
        }

        Ok(Config { sources, nodes })
    }

    pub fn source(&self, key: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.key == key)
    }
}

fn validate_source(raw: RawSource) -> Result<Source, Error> {
    if raw.key.is_empty() {
        return Err(Error::Config("every source needs a key".into()));
    }
    let kind = match raw.kind.as_str() {
        "asciidoc" => SourceKind::Asciidoc,
        "confluence" => SourceKind::Confluence,
        other => {
            return Err(Error::Config(format!(
                "source '{}' has unsupported kind '{other}'",
                raw.key
            )));
        }
    };
    if kind == SourceKind::Confluence {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        if !present(&raw.space) || !present(&raw.context) {
            return Err(Error::Config(format!(
                "confluence source '{}' needs a space and a context",
                raw.key
            )));
        }
    }
    Ok(Source {
        key: raw.key,
        kind,
        source: raw.source,
        space: raw.space,
        context: raw.context,
    })
}

/// A malformed section list is not fatal: the whole document is loaded.
fn parse_sections(index: &str, value: Option<serde_json::Value>) -> Vec<String> {
    match value {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::String(s)) if s.is_empty() => Vec::new(),
        Some(value) => match serde_json::from_value::<Vec<String>>(value) {
            Ok(sections) => sections,
            Err(_) => {
                log::warn!(
                    "The sections of {index} are malformed, the whole document will be loaded"
                );
                Vec::new()
            }
        },
    }
}
