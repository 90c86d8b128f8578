use clap::Parser;
use std::path::{Path, PathBuf};

use wikiscribe::Error;
use wikiscribe::config::{Config, SourceKind};
use wikiscribe::images::{ImageStager, NoImages};
use wikiscribe::model::Transcript;
use wikiscribe::source::{ConfluenceExport, ConfluenceSpace, DocumentSource, LocalSource};

#[derive(Parser)]
#[command(
    name = "wikiscribe",
    about = "Extract wiki pages and HTML documents into JSON transcripts"
)]
struct Args {
    /// Input documents (.html, .xhtml, or a saved Confluence response .json)
    #[arg(required_unless_present = "config")]
    inputs: Vec<PathBuf>,
    /// JSON config listing sources and the documents to extract from them
    #[arg(long, conflicts_with = "inputs")]
    config: Option<PathBuf>,
    /// Only keep the content under headings with this title (repeatable)
    #[arg(long = "section")]
    sections: Vec<String>,
    /// Copy local images referenced by the documents into this directory and
    /// point Confluence attachments at their `images/<id>.<ext>` names
    #[arg(long)]
    images: Option<PathBuf>,
    /// Output JSON file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let transcripts = match &args.config {
        Some(config) => from_config(config, &args),
        None => from_inputs(&args),
    };
    let transcripts = match transcripts {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let json = match serde_json::to_string_pretty(&transcripts) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    match &args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, json) {
                eprintln!("Error: cannot write {}: {e}", path.display());
                std::process::exit(1);
            }
        }
        None => println!("{json}"),
    }
}

/// Extracts one document, staging its images into `images` when given.
fn extract_one(
    source: &dyn DocumentSource,
    title: &str,
    sections: &[String],
    images: Option<&Path>,
) -> Result<Transcript, Error> {
    let Some(dest) = images else {
        return wikiscribe::fetch_transcript(source, title, sections, &NoImages);
    };
    let base = source.image_base().unwrap_or(Path::new("."));
    let stager = ImageStager::new(base, dest);
    let transcript = wikiscribe::fetch_transcript(source, title, sections, &stager)?;
    let staged = stager.staged();
    log::info!(
        "Staged {} images for {title} in {}",
        staged.len(),
        dest.display()
    );
    for name in &staged {
        log::debug!("Staged {name}");
    }
    Ok(transcript)
}

fn from_inputs(args: &Args) -> Result<Vec<Transcript>, Error> {
    let mut transcripts = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        if !input.is_file() {
            return Err(Error::Config(format!("not a file: {}", input.display())));
        }
        let base = input.parent().unwrap_or(Path::new("."));
        let Some(name) = input.file_name().and_then(|n| n.to_str()) else {
            return Err(Error::Config(format!(
                "unreadable file name: {}",
                input.display()
            )));
        };
        let source = LocalSource::new(base);
        let transcript = extract_one(&source, name, &args.sections, args.images.as_deref())?;
        transcripts.push(transcript);
    }
    Ok(transcripts)
}

fn from_config(path: &Path, args: &Args) -> Result<Vec<Transcript>, Error> {
    let config = Config::load(path)?;
    let mut transcripts = Vec::with_capacity(config.nodes.len());
    for node in &config.nodes {
        let Some(src) = config.source(&node.key) else {
            continue;
        };
        let source: Box<dyn DocumentSource> = match src.kind {
            SourceKind::Asciidoc => Box::new(LocalSource::new(&src.source)),
            SourceKind::Confluence => {
                let space = ConfluenceSpace::new(
                    src.context.as_deref().unwrap_or_default(),
                    src.space.as_deref().unwrap_or_default(),
                )?;
                log::info!("Reading saved page {}", space.display_url(&node.index)?);
                Box::new(ConfluenceExport::new(&src.source))
            }
        };
        let sections = if node.sections.is_empty() {
            &args.sections
        } else {
            &node.sections
        };
        let images = args.images.as_deref();
        let transcript = extract_one(source.as_ref(), &node.index, sections, images)?;
        transcripts.push(transcript);
    }
    Ok(transcripts)
}
