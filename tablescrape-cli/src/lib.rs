//! Command-line front-end for tablescrape.
//!
//! Scrapes one page, prints what was found and optionally writes a
//! dataset to disk as CSV or XML.

use anyhow::{bail, Context};
use clap::{ArgAction, Parser};
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use tablescrape::config::ScrapeConfig;
use tablescrape::export::{to_csv, to_xml, ExportFormat, XmlOptions};
use tablescrape::extract::{Dataset, ExtractionResult};
use tablescrape::scrape::{ScrapeOptions, Scraper};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "tablescrape",
    about = "Scrape the tables and resource links of a web page",
    version
)]
pub struct Cli {
    /// Page to scrape.
    pub url: String,

    /// Extra request header, as "Name: value". Repeatable.
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// User agent to send instead of the default browser identity.
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Merge all tables into a single dataset.
    #[arg(long)]
    pub combine: bool,

    /// Export format (csv or xml).
    #[arg(short, long)]
    pub format: Option<ExportFormat>,

    /// Index of the dataset to export.
    #[arg(long, default_value_t = 0, conflicts_with = "all")]
    pub table: usize,

    /// Export every dataset, one file each.
    #[arg(long)]
    pub all: bool,

    /// Output file. Defaults to scraped_data.<ext>.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// XML document element.
    #[arg(long, default_value = "data")]
    pub root_tag: String,

    /// XML row element.
    #[arg(long, default_value = "row")]
    pub row_tag: String,

    /// Print the whole result as JSON.
    #[arg(long)]
    pub json: bool,

    /// JSON configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Splits a `Name: value` header argument.
pub fn parse_header(raw: &str) -> anyhow::Result<(String, String)> {
    let Some((name, value)) = raw.split_once(':') else {
        bail!("header '{raw}' must look like 'Name: value'");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("header '{raw}' has an empty name");
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Loads the configuration file, if any, and applies command-line overrides.
pub fn load_config(cli: &Cli) -> anyhow::Result<ScrapeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            ScrapeConfig::from_json(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ScrapeConfig::default(),
    };

    if let Some(user_agent) = &cli.user_agent {
        config.fetch.user_agent.clone_from(user_agent);
    }
    if let Some(timeout) = cli.timeout {
        config.fetch.timeout_seconds = timeout;
    }
    Ok(config)
}

fn scrape_options(cli: &Cli) -> anyhow::Result<ScrapeOptions> {
    let mut options = ScrapeOptions::new();
    for raw in &cli.headers {
        let (name, value) = parse_header(raw)?;
        options = options.with_header(name, value);
    }
    options.combine = cli.combine;
    Ok(options)
}

/// `base` with `_{index}` inserted before the extension.
pub fn indexed_path(base: &Path, index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map_or_else(|| "scraped_data".into(), |s| s.to_string_lossy().into_owned());
    let name = match base.extension() {
        Some(ext) => format!("{stem}_{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{index}"),
    };
    base.with_file_name(name)
}

/// Human-readable overview of a result.
pub fn render_summary(result: &ExtractionResult) -> String {
    // Writing into a String cannot fail.
    let mut out = String::new();
    if let Some(url) = &result.source_url {
        let _ = writeln!(out, "Scraped {url}");
    }

    let _ = writeln!(out, "Datasets: {}", result.datasets.len());
    for (i, dataset) in result.datasets.iter().enumerate() {
        let _ = write!(
            out,
            "  [{i}] {} row(s) x {} column(s): {}",
            dataset.len(),
            dataset.width(),
            dataset.column_names.join(", ")
        );
        if let Some(caption) = &dataset.caption {
            let _ = write!(out, " ({caption})");
        }
        out.push('\n');
    }

    let resources = &result.resources;
    let _ = writeln!(
        out,
        "Resources: {} stylesheet(s), {} script(s), {} image(s)",
        resources.stylesheets.len(),
        resources.scripts.len(),
        resources.images.len()
    );

    if !result.diagnostics.is_empty() {
        out.push_str("Diagnostics:\n");
        for message in result.diagnostic_messages() {
            let _ = writeln!(out, "  - {message}");
        }
    }
    out
}

fn encode(dataset: &Dataset, format: ExportFormat, cli: &Cli) -> anyhow::Result<Vec<u8>> {
    Ok(match format {
        ExportFormat::Csv => to_csv(dataset),
        ExportFormat::Xml => {
            let options = XmlOptions::default()
                .with_root_tag(cli.root_tag.clone())
                .with_row_tag(cli.row_tag.clone());
            to_xml(dataset, &options)?
        }
    })
}

/// Writes the selected dataset(s); returns the paths written.
pub fn write_exports(
    result: &ExtractionResult,
    format: ExportFormat,
    cli: &Cli,
) -> anyhow::Result<Vec<PathBuf>> {
    if result.datasets.is_empty() {
        bail!("no data found on {}", result.source_url.as_deref().unwrap_or("the page"));
    }

    let base = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format.default_filename()));

    let selected: Vec<(PathBuf, &Dataset)> = if cli.all {
        result
            .datasets
            .iter()
            .enumerate()
            .map(|(i, dataset)| (indexed_path(&base, i), dataset))
            .collect()
    } else {
        let Some(dataset) = result.datasets.get(cli.table) else {
            bail!(
                "table {} does not exist, found {} table(s)",
                cli.table,
                result.datasets.len()
            );
        };
        vec![(base, dataset)]
    };

    let mut written = Vec::with_capacity(selected.len());
    for (path, dataset) in selected {
        let bytes = encode(dataset, format, cli)?;
        std::fs::write(&path, &bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), mime = format.mime_type(), bytes = bytes.len(), "Wrote export");
        written.push(path);
    }
    Ok(written)
}

/// Runs one scrape as described by `cli`, printing to `out`.
pub async fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let options = scrape_options(cli)?;
    let scraper = Scraper::from_config(config)?;

    let result = scraper
        .scrape(&cli.url, &options)
        .await
        .with_context(|| format!("failed to scrape {}", cli.url))?;

    if cli.json {
        serde_json::to_writer_pretty(&mut *out, &result)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render_summary(&result))?;
    }

    if let Some(format) = cli.format {
        for path in write_exports(&result, format, cli)? {
            writeln!(out, "Wrote {}", path.display())?;
        }
    }
    Ok(())
}
