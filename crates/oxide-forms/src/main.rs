//! oxide-forms CLI
//!
//! Binds a request described on the command line to a form declared in a
//! JSON schema and prints the result.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_forms::{
    read_chunks, BodyStream, BoundForm, FormRequest, FormSchema, Method, DEFAULT_CHUNK_SIZE,
};

/// Declarative form binding and validation.
#[derive(Parser)]
#[command(name = "oxide-forms")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON schema declaring the form.
    #[arg(short, long, env = "OXIDE_FORMS_SCHEMA")]
    schema: PathBuf,

    /// Request method.
    #[arg(short, long, default_value = "POST")]
    method: String,

    /// Request content type.
    #[arg(short = 't', long, default_value = "application/x-www-form-urlencoded")]
    content_type: String,

    /// File holding the request body, or `-` for stdin. Without a body the
    /// form is rendered with its defaults.
    #[arg(short, long)]
    body: Option<PathBuf>,

    /// Query string appended to the request URI.
    #[arg(short, long)]
    query: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut spec = FormSchema::from_path(&cli.schema)
        .with_context(|| format!("failed to load schema {}", cli.schema.display()))?
        .into_spec()?;
    debug!(fields = spec.field_specs().len(), "schema loaded");

    let out: BoundForm = match &cli.body {
        Some(path) => {
            let method = Method::parse(&cli.method)
                .with_context(|| format!("unknown request method `{}`", cli.method))?;
            let request = CliRequest {
                method,
                content_type: cli.content_type.clone(),
                query: cli.query.clone(),
                source: BodySource::open(path)?,
            };
            spec.bind(&request).context("failed to bind request")?
        }
        None => spec.render(),
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    if !out.is_valid() {
        std::process::exit(2);
    }
    Ok(())
}

/// Where the request body is streamed from.
enum BodySource {
    Stdin,
    File(File),
}

impl BodySource {
    fn open(path: &Path) -> anyhow::Result<Self> {
        if path.as_os_str() == "-" {
            return Ok(Self::Stdin);
        }
        let file =
            File::open(path).with_context(|| format!("failed to open body {}", path.display()))?;
        Ok(Self::File(file))
    }
}

/// A request assembled from command line arguments. The body is read in
/// chunks as the decoder asks for them.
struct CliRequest {
    method: Method,
    content_type: String,
    query: Option<String>,
    source: BodySource,
}

impl FormRequest for CliRequest {
    fn method(&self) -> Method {
        self.method
    }

    fn content_type(&self) -> Option<&str> {
        Some(&self.content_type)
    }

    fn content_length(&self) -> Option<u64> {
        match &self.source {
            BodySource::Stdin => None,
            BodySource::File(file) => file.metadata().ok().map(|m| m.len()),
        }
    }

    fn body(&self) -> Option<BodyStream<'_>> {
        Some(match &self.source {
            BodySource::Stdin => read_chunks(std::io::stdin(), DEFAULT_CHUNK_SIZE),
            BodySource::File(file) => read_chunks(file, DEFAULT_CHUNK_SIZE),
        })
    }

    fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}
