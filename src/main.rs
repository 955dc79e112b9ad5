use chrono::Utc;
use clap::{Parser, Subcommand};
use srcsetify::archive::ExportScope;
use srcsetify::batch::{BatchContext, BatchRequest, SourceInput, process_batch};
use srcsetify::presets::PresetTable;
use srcsetify::report::BatchReport;
use srcsetify::{config, imaging, output, widths};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "srcsetify")]
#[command(about = "Responsive image variants, srcset markup and zip export")]
#[command(long_about = "\
Responsive image variants, srcset markup and zip export

Every input image is resized to a ladder of widths (never upscaled, the
natural width is always kept) and re-encoded as jpg, webp or png. Variants
are named after their size preset:

  photo.jpg → photo-mob-sm.webp   320w
              photo-mob.webp      480w
              photo-tablet.webp   768w
              photo-desktop.webp 1024w

Size presets (--sizes):
  small-mobile 320   mobile 480   card 640
  tablet 768         desktop 1024 large 1536

Run 'srcsetify gen-config' to generate a documented srcsetify.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = defaults)
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Debug logging to stderr (RUST_LOG overrides the filter)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the widths that would be rendered for an image
    Widths {
        /// Natural width of the source in pixels
        natural_width: u32,
        /// Comma-separated preset labels (default: the configured ladder)
        #[arg(long)]
        sizes: Option<String>,
    },
    /// Process images, print srcset markup, optionally export a zip
    Build(BuildArgs),
    /// Print a stock srcsetify.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Image files or directories (walked recursively)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output format: jpg, webp or png
    #[arg(long)]
    format: Option<String>,

    /// Comma-separated preset labels
    #[arg(long)]
    sizes: Option<String>,

    /// Directory prefix used in srcset candidates
    #[arg(long)]
    base_dir: Option<String>,

    /// Write the zip archive into this directory
    #[arg(long)]
    out: Option<PathBuf>,

    /// Export only these widths (comma-separated)
    #[arg(long, value_delimiter = ',')]
    only: Vec<u32>,

    /// Write a JSON report to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.verbose {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("srcsetify=debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Command::Widths {
            natural_width,
            sizes,
        } => {
            let config = config::load_config(&cli.config)?;
            let labels = sizes.as_deref().map(widths::parse_labels).unwrap_or_default();
            let set = widths::resolve_widths(
                &PresetTable::standard(),
                &config.images.widths,
                natural_width,
                &labels,
            )?;
            output::print_widths(natural_width, &set);
        }
        Command::Build(args) => {
            let config = config::load_config(&cli.config)?;
            run_build(&config, args)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_build(
    config: &config::AppConfig,
    args: BuildArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let request =
        BatchRequest::from_config(config, args.format.as_deref(), args.sizes.as_deref())?;
    let base_dir = args
        .base_dir
        .as_deref()
        .unwrap_or(config.markup.base_dir.as_str());

    let paths = collect_inputs(&args.inputs)?;
    if paths.is_empty() {
        return Err("no supported images found in the given inputs".into());
    }
    let sources: Vec<SourceInput> = paths.iter().map(|p| SourceInput::load(p)).collect();

    println!("==> Processing {} images as {}", sources.len(), request.format);
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_batch_event(&event) {
                println!("{}", line);
            }
        }
    });
    let ctx = BatchContext::with_events(tx);
    let mut batch = process_batch(&sources, &request, &PresetTable::standard(), &ctx);
    drop(ctx);
    printer.join().map_err(|_| "progress printer panicked")?;

    let scope = if args.only.is_empty() {
        ExportScope::Batch
    } else {
        batch.select_widths(&args.only);
        ExportScope::Selected
    };

    println!();
    output::print_batch(&batch, Some(base_dir));

    if let Some(path) = &args.report {
        let json = BatchReport::from_batch(&batch, Some(base_dir)).to_json()?;
        std::fs::write(path, json)?;
        println!("Report → {}", path.display());
    }

    if let Some(dir) = &args.out {
        let archive = batch.export(scope, Utc::now())?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&archive.file_name);
        std::fs::write(&path, &archive.bytes)?;
        output::print_archive(&archive, &path);
    }

    if batch.results().is_empty() {
        return Err("no image could be processed".into());
    }
    Ok(())
}

/// Expand inputs: files are taken as given, directories are walked for
/// decodable images in file-name order. Duplicates are dropped.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && imaging::is_supported_input(entry.path()) {
                    paths.push(entry.into_path());
                }
            }
        } else {
            paths.push(input.clone());
        }
    }
    dedup_paths(&mut paths);
    Ok(paths)
}

fn dedup_paths(paths: &mut Vec<PathBuf>) {
    let mut seen = std::collections::HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn collect_walks_directories_for_images() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("b.jpg"));
        touch(&tmp.path().join("a.PNG"));
        touch(&tmp.path().join("notes.txt"));
        touch(&tmp.path().join("nested/c.webp"));

        let paths = collect_inputs(&[tmp.path().to_path_buf()]).unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.jpg", "nested/c.webp"]);
    }

    #[test]
    fn explicit_files_are_kept_once() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("photo.jpg");
        touch(&file);
        let paths = collect_inputs(&[file.clone(), tmp.path().to_path_buf()]).unwrap();
        assert_eq!(paths, vec![file]);
    }

    #[test]
    fn missing_input_does_not_stop_readable_siblings() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.png");
        image::RgbImage::from_pixel(40, 30, image::Rgb([200, 100, 50]))
            .save(&good)
            .unwrap();
        let missing = tmp.path().join("missing.jpg");

        let paths = collect_inputs(&[good, missing]).unwrap();
        let sources: Vec<SourceInput> = paths.iter().map(|p| SourceInput::load(p)).collect();
        let batch = process_batch(
            &sources,
            &BatchRequest::default(),
            &PresetTable::standard(),
            &BatchContext::default(),
        );

        assert_eq!(batch.results().len(), 1);
        let errors = batch.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].source_name(), "missing.jpg");
        assert!(errors[0].to_string().contains("invalid source"));
    }

    #[test]
    fn cli_parses_build_flags() {
        let cli = Cli::try_parse_from([
            "srcsetify",
            "build",
            "in",
            "--format",
            "webp",
            "--only",
            "320,640",
            "--out",
            "dist",
        ])
        .unwrap();
        match cli.command {
            Command::Build(args) => {
                assert_eq!(args.inputs, vec![PathBuf::from("in")]);
                assert_eq!(args.format.as_deref(), Some("webp"));
                assert_eq!(args.only, vec![320, 640]);
                assert_eq!(args.out, Some(PathBuf::from("dist")));
            }
            _ => panic!("expected build"),
        }
        assert_eq!(cli.config, PathBuf::from("srcsetify.toml"));
    }
}
