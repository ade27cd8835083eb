//! cvforge — turn flattened résumé text into DOCX, print-ready HTML, or a
//! structured preview.
//!
//! Supports two modes:
//!
//! - **stdin mode**: `cvforge -f html < resume.txt > resume.html`
//! - **file mode**: `cvforge -o out/ -f docx resumes/*.txt`

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cvforge::render::preview;
use cvforge::{create_renderer, Layout, Lexicon, Mode, Pipeline, Renderer, Revision};

#[derive(Parser)]
#[command(
    name = "cvforge",
    version,
    about = "Recover structure from résumé text and render it as DOCX, HTML, or a preview tree"
)]
struct Cli {
    /// Input files (glob patterns and directories supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: docx (default), html, preview, model
    #[arg(short = 'f', long, default_value = "docx")]
    format: String,

    /// HTML layout: classic (default) or modern
    #[arg(long, default_value = "classic")]
    layout: String,

    /// Rendering path: auto (confidence gate), structured, raw
    #[arg(long, default_value = "auto")]
    mode: String,

    /// Rewritten version of the résumé. It is rendered instead of the input,
    /// and `-f preview` shows both.
    #[arg(long)]
    revised: Option<PathBuf>,

    /// JSON file extending the built-in word tables
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let pipeline = build_pipeline(&cli)?;
    let layout: Layout = cli.layout.parse()?;
    let renderer = create_renderer(&cli.format, layout)?;

    if cli.files.is_empty() {
        return stdin_mode(&cli, &pipeline, renderer.as_ref());
    }

    file_mode(&cli, &pipeline, renderer.as_ref())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), level))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn build_pipeline(cli: &Cli) -> Result<Pipeline> {
    let lexicon = match &cli.lexicon {
        Some(path) => Lexicon::from_file(path)?,
        None => Lexicon::default(),
    };
    let mode: Mode = cli.mode.parse()?;
    Ok(Pipeline::new(lexicon.into()).with_mode(mode))
}

/// stdin mode: read résumé text from stdin, write the artifact to stdout.
fn stdin_mode(cli: &Cli, pipeline: &Pipeline, renderer: &dyn Renderer) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let revised = read_revised(cli)?;
    let revision = pipeline.revise(&input, revised.as_deref());
    let output = render(cli, &revision, renderer)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&output).context("failed to write stdout")?;
    stdout.flush().context("failed to write stdout")?;
    Ok(())
}

/// file mode: render each input into the output directory.
fn file_mode(cli: &Cli, pipeline: &Pipeline, renderer: &dyn Renderer) -> Result<()> {
    let output_dir = cli
        .output
        .as_deref()
        .context("--output is required when files are given")?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    let input_files = expand_globs(&cli.files)?;
    if input_files.is_empty() {
        bail!("no input files found");
    }
    if cli.revised.is_some() && input_files.len() > 1 {
        bail!("--revised needs exactly one input file, got {}", input_files.len());
    }
    let revised = read_revised(cli)?;

    for path in &input_files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        let revision = pipeline.revise(&content, revised.as_deref());
        let output = render(cli, &revision, renderer)?;

        let out_path = output_path(output_dir, path, input_files.len(), &renderer.file_name());
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        fs::write(&out_path, &output)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        info!(
            input = %path.display(),
            output = %out_path.display(),
            structured = revision.latest().is_structured(),
            "rendered"
        );
    }

    Ok(())
}

fn read_revised(cli: &Cli) -> Result<Option<String>> {
    cli.revised
        .as_deref()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read revised résumé {}", path.display()))
        })
        .transpose()
}

/// The preview of a revision shows both versions; every other format
/// renders the latest one.
fn render(cli: &Cli, revision: &Revision, renderer: &dyn Renderer) -> Result<Vec<u8>> {
    if cli.format == "preview" && revision.revised.is_some() {
        let mut out = serde_json::to_vec_pretty(&preview::compare(revision))
            .context("failed to serialize preview")?;
        out.push(b'\n');
        return Ok(out);
    }
    renderer
        .render(&revision.latest().source())
        .with_context(|| format!("failed to render {}", cli.format))
}

/// `DIR/optimized-resume.<ext>` for one input, `DIR/<stem>/…` for several.
fn output_path(output_dir: &Path, input: &Path, inputs: usize, file_name: &str) -> PathBuf {
    if inputs == 1 {
        return output_dir.join(file_name);
    }
    output_dir.join(derive_output_name(input)).join(file_name)
}

/// File extensions recognized as résumé text.
const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "text"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for supported file types.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // If it's a directory, scan for supported extensions (non-recursive)
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && has_supported_extension(&p) {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!(pattern = %pattern, "no files matched");
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// Per-input directory name: the file stem.
/// "resumes/jane.txt" → "jane"
fn derive_output_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "resume".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_from_path() {
        assert_eq!(derive_output_name(Path::new("resumes/jane.txt")), "jane");
        assert_eq!(derive_output_name(Path::new("jane.doe.md")), "jane.doe");
        assert_eq!(derive_output_name(Path::new("README")), "README");
    }

    #[test]
    fn single_input_writes_into_output_dir() {
        assert_eq!(
            output_path(Path::new("out"), Path::new("in/jane.txt"), 1, "optimized-resume.docx"),
            PathBuf::from("out/optimized-resume.docx")
        );
    }

    #[test]
    fn several_inputs_get_their_own_directory() {
        assert_eq!(
            output_path(Path::new("out"), Path::new("in/jane.txt"), 2, "optimized-resume.html"),
            PathBuf::from("out/jane/optimized-resume.html")
        );
    }

    #[test]
    fn supported_extensions() {
        assert!(has_supported_extension(Path::new("a.txt")));
        assert!(has_supported_extension(Path::new("a.md")));
        assert!(!has_supported_extension(Path::new("a.pdf")));
    }
}
