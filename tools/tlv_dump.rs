use anyhow::{bail, Context};
use asset_tlv::{ReadError, TlvEntry, TlvReader, TlvType};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::{info, warn, Subscriber};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Print the records of a packed resource file
#[derive(Parser)]
struct Cli {
    /// Resource file to inspect
    path: PathBuf,

    #[arg(long, value_enum, env = "TLV_DUMP_FORMAT", default_value = "text")]
    format: OutputFormat,

    /// Include a SHA-256 digest of each record's value
    #[arg(long)]
    hash: bool,

    /// Only show the texture or mesh with this name
    #[arg(long)]
    find: Option<String>,
}

#[derive(Debug, Clone)]
struct DumpConfig {
    path: PathBuf,
    format: OutputFormat,
    hash: bool,
    find: Option<String>,
}

impl DumpConfig {
    fn from_cli(cli: Cli) -> Self {
        Self {
            path: cli.path,
            format: cli.format,
            hash: cli.hash,
            find: cli.find,
        }
    }

    /// Validate configuration
    fn validate(&self) -> anyhow::Result<()> {
        if !self.path.is_file() {
            bail!("{} is not a file", self.path.display());
        }

        if let Some(name) = &self.find {
            if name.is_empty() {
                bail!("--find cannot be empty");
            }
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RecordSummary {
    offset: usize,
    tag: &'static str,
    length: usize,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
}

impl RecordSummary {
    fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        let line = match format {
            OutputFormat::Json => serde_json::to_string(self)?,
            OutputFormat::Text => {
                let mut line = format!(
                    "{:>10}  {:<20} {:>10}  {}",
                    self.offset, self.tag, self.length, self.summary
                );
                if let Some(digest) = &self.sha256 {
                    line.push_str(&format!("  sha256:{digest}"));
                }
                line
            }
        };

        Ok(line)
    }
}

fn summarize(entry: &TlvEntry<'_>) -> Result<String, ReadError> {
    let summary = match entry.tag() {
        TlvType::Uint32 => entry.as_u32()?.to_string(),
        TlvType::Uint32Array => format!("{} values", entry.as_u32_array()?.len()),
        TlvType::String => format!("{:?}", entry.as_str()?),
        TlvType::ByteArray => format!("{} bytes", entry.as_byte_array()?.len()),
        TlvType::TextureFormat => entry.as_texture_format()?.to_string(),
        TlvType::TextureUsage => entry.as_texture_usage()?.to_string(),
        TlvType::VertexData => format!("{:?}", entry.as_vertex()?.position),
        TlvType::VertexDataArray => format!("{} vertices", entry.as_vertex_array()?.len()),
        TlvType::TextureDescription => {
            let texture = entry.as_texture_description()?;
            format!(
                "{:?} {}x{} {} {} ({} bytes)",
                texture.name,
                texture.width,
                texture.height,
                texture.format,
                texture.usage,
                texture.data.len()
            )
        }
        TlvType::MeshData => {
            let mesh = entry.as_mesh_data()?;
            format!(
                "{:?} {} vertices, {} triangles",
                mesh.name,
                mesh.vertices.len(),
                mesh.triangle_count()
            )
        }
    };

    Ok(summary)
}

fn is_selected(entry: &TlvEntry<'_>, find: Option<&str>) -> Result<bool, ReadError> {
    match find {
        None => Ok(true),
        Some(name) => Ok(entry.is_texture_named(name)? || entry.is_mesh_named(name)?),
    }
}

/// Summarize the selected records of a buffer
///
/// The buffer is validated up front, so a malformed file yields an error
/// before any record is summarized.
fn collect_records(data: &[u8], config: &DumpConfig) -> anyhow::Result<Vec<RecordSummary>> {
    let reader = TlvReader::new(data);
    let count = reader.validate().context("malformed buffer")?;

    let mut records = Vec::new();
    let mut cursor = reader.begin();

    while cursor != reader.end() {
        let offset = cursor.offset();
        let entry = cursor
            .get()
            .with_context(|| format!("malformed record at offset {offset}"))?;

        let selected = is_selected(&entry, config.find.as_deref())
            .with_context(|| format!("malformed {} at offset {offset}", entry.tag()))?;

        if selected {
            let summary = summarize(&entry)
                .with_context(|| format!("cannot decode {} at offset {offset}", entry.tag()))?;
            records.push(RecordSummary {
                offset,
                tag: entry.tag().name(),
                length: entry.value().len(),
                summary,
                sha256: config
                    .hash
                    .then(|| hex::encode(Sha256::digest(entry.value()))),
            });
        }

        cursor
            .advance()
            .with_context(|| format!("cannot advance past offset {offset}"))?;
    }

    info!("{} of {} records selected", records.len(), count);
    Ok(records)
}

/// Log to stderr, as JSON when the records are printed as JSON lines
fn subscriber(format: OutputFormat) -> Box<dyn Subscriber + Send + Sync> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr);

    match format {
        OutputFormat::Json => Box::new(builder.json().finish()),
        OutputFormat::Text => Box::new(builder.finish()),
    }
}

fn main() -> anyhow::Result<()> {
    let config = DumpConfig::from_cli(Cli::parse());
    tracing::subscriber::set_global_default(subscriber(config.format))
        .context("failed to install tracing subscriber")?;
    config.validate()?;

    let path = config.path.display().to_string();
    let data = std::fs::read(&config.path).with_context(|| format!("failed to read {path}"))?;
    info!("Loaded {} ({} bytes)", path, data.len());

    let records =
        collect_records(&data, &config).with_context(|| format!("failed to dump {path}"))?;
    for record in &records {
        println!("{}", record.render(config.format)?);
    }

    if let (Some(name), true) = (&config.find, records.is_empty()) {
        warn!("No texture or mesh named {:?} in {}", name, path);
    }

    Ok(())
}
