use std::path::PathBuf;

use anyhow::{bail, ensure, Result};
use clap::{Parser, ValueEnum};
use gb_tile_tools::{
    config::{get_global_config_path, load_global_config},
    convert::{convert_file, write_artifacts, ConvertOptions},
    export,
    palette::{FallbackStats, ImageKind},
};
use log::{error, info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Auto,
    Sprite,
    Background,
}

/// Convert PNG images into C arrays of packed 2bpp tiles.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PNG files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,
    /// Treat the inputs as sprites or backgrounds instead of detecting it
    #[arg(short, long, value_enum, default_value_t = Kind::Auto)]
    kind: Kind,
    /// Value added to every background map entry
    #[arg(short, long)]
    offset: Option<usize>,
    /// Array name prefix (single input only; default: derived from the file name)
    #[arg(short, long)]
    name: Option<String>,
    /// Directory for the generated headers
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Fail on pixel values missing from the palette instead of substituting
    #[arg(long)]
    strict: bool,
    /// Alternative config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Convert and report without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = vec![];
    for pattern in patterns {
        let mut matched = false;
        for entry in glob::glob(pattern)? {
            paths.push(entry?);
            matched = true;
        }
        if !matched {
            bail!("No files match {}", pattern);
        }
    }
    Ok(paths)
}

pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config_path = match &args.config {
        Some(p) => p.clone(),
        None => get_global_config_path()?,
    };
    let config = load_global_config(&config_path)?;

    let inputs = expand_inputs(&args.inputs)?;
    ensure!(
        args.name.is_none() || inputs.len() == 1,
        "--name can only be used with a single input"
    );
    let options = ConvertOptions {
        kind: match args.kind {
            Kind::Auto => None,
            Kind::Sprite => Some(ImageKind::Sprite),
            Kind::Background => Some(ImageKind::Background),
        },
        offset: args.offset.unwrap_or(config.map_offset),
        strict_colors: args.strict || config.strict_colors,
    };

    let mut failures = 0;
    let mut fallbacks = FallbackStats::default();
    for path in &inputs {
        let result = convert_file(path, args.name.as_deref(), &options).and_then(|conversion| {
            fallbacks.merge(&conversion.fallbacks);
            for artifact in &conversion.artifacts {
                if let Some(decl) = export::declaration(&artifact.contents) {
                    info!("{}: {}", artifact.file_name, decl);
                }
            }
            if args.dry_run {
                return Ok(());
            }
            let out_dir = match (&args.out_dir, &config.output_dir) {
                (Some(dir), _) | (None, Some(dir)) => dir.clone(),
                (None, None) => path
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_default(),
            };
            write_artifacts(&conversion.artifacts, &out_dir)?;
            Ok(())
        });
        if let Err(e) = result {
            error!("{:#}", e);
            failures += 1;
        }
    }

    if !fallbacks.is_empty() {
        warn!(
            "{} pixel(s) were not in their palette and were substituted; \
             use --strict to reject them",
            fallbacks.total
        );
    }
    if failures > 0 {
        bail!("{} of {} input(s) failed", failures, inputs.len());
    }
    Ok(())
}
