//! distfix - Post-build fixes for TypeScript packages
//!
//! Commands:
//! - exports: Rebuild package.json exports and typesVersions
//! - imports <DIR>: Append explicit extensions to relative ESM imports

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use devscripts_core::{format, Config, ExportRule, Paths};
use distfix::{ExportsOptions, ExportsPlan, ImportExtension};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "distfix")]
#[command(about = "Post-build fixes for TypeScript packages")]
#[command(version)]
#[command(after_help = r#"EXPORTS:
    Scans the declarations root (default dist/dts) and rewrites package.json:
    "."                  dts/index.d.ts, esm/index.js, cjs/index.js
    "./<module>/types"   first of types.d.ts, interfaces.d.ts in each module
    "./<pattern>/<name>" every *.d.ts inside a folder matched by --pattern

EXAMPLES:
    distfix exports                          # Defaults from devscripts.config.json
    distfix exports --dry-run --json         # Print the exports map only
    distfix exports --pattern date/plugins:plugins
    distfix imports dist/esm                 # './utils' -> './utils.js'
    distfix imports src --ext ts
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild package.json exports and typesVersions
    Exports {
        /// Declarations root
        #[arg(long)]
        dist: Option<PathBuf>,

        /// Path to package.json
        #[arg(long)]
        package: Option<PathBuf>,

        /// Types file name tried in each module, in order (repeatable)
        #[arg(long = "candidate")]
        candidates: Vec<String>,

        /// Extra export pattern as PATTERN[:FOLDER] (repeatable)
        #[arg(long = "pattern", value_parser = parse_rule)]
        patterns: Vec<ExportRule>,

        /// Compute without writing package.json
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Append explicit extensions to relative import specifiers
    Imports {
        /// Directory to rewrite
        dir: PathBuf,

        /// Extension to append
        #[arg(long, value_enum, default_value = "js")]
        ext: ImportExtension,
    },
}

/// `plugins` or `date/plugins:plugins`
fn parse_rule(s: &str) -> Result<ExportRule, String> {
    let (pattern, folder) = match s.split_once(':') {
        Some((pattern, folder)) => (pattern, folder),
        None => (s, s.rsplit('/').next().unwrap_or(s)),
    };
    if pattern.is_empty() || folder.is_empty() {
        return Err(format!("invalid pattern '{}', expected PATTERN[:FOLDER]", s));
    }
    Ok(ExportRule::new(pattern, folder))
}

#[derive(Serialize)]
struct ExportsOutput<'a> {
    manifest: &'a Path,
    written: bool,
    exports: serde_json::Value,
    #[serde(rename = "typesVersions")]
    types_versions: serde_json::Value,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = Paths::new().context("Failed to determine current directory")?;

    match cli.command {
        Commands::Exports {
            dist,
            package,
            candidates,
            patterns,
            dry_run,
            json,
        } => {
            let (config, loaded) = Config::discover(&paths)?;
            if let Some(path) = loaded {
                tracing::debug!(config = %path.display(), "using config");
            }

            let mut options = ExportsOptions::from_config(&paths, &config.fix_exports);
            if let Some(dist) = dist {
                options.dts_root = paths.resolve(dist);
            }
            if let Some(package) = package {
                options.manifest_path = paths.resolve(package);
            }
            if !candidates.is_empty() {
                options.type_file_candidates = candidates;
            }
            if !patterns.is_empty() {
                options.extra_patterns = patterns;
            }

            cmd_exports(&options, dry_run, json)
        }

        Commands::Imports { dir, ext } => cmd_imports(&paths.resolve(dir), ext),
    }
}

fn cmd_exports(options: &ExportsOptions, dry_run: bool, json: bool) -> Result<()> {
    if options.type_file_candidates.is_empty() {
        bail!("No type file candidates configured");
    }

    let start = Instant::now();
    let plan = if dry_run {
        distfix::synthesize(options)
    } else {
        distfix::fix_type_exports(options)
    }
    .with_context(|| format!("Failed to fix exports for {}", options.manifest_path.display()))?;

    if json {
        let output = ExportsOutput {
            manifest: &options.manifest_path,
            written: !dry_run,
            exports: plan.exports_value(),
            types_versions: plan.types_versions_value(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_plan(&plan);
    println!();

    let summary = format!(
        "{} and {}",
        format::count(plan.modules.len(), "module"),
        format::count(plan.matches.len(), "pattern export")
    );
    if dry_run {
        println!("info: Dry run, {} found. package.json not written", summary);
    } else {
        println!(
            "success: Updated {} with {} in {}",
            options.manifest_path.display(),
            summary,
            format::duration(start.elapsed())
        );
    }

    Ok(())
}

fn print_plan(plan: &ExportsPlan) {
    println!("\x1b[1mExports\x1b[0m");
    for (key, value) in &plan.exports {
        let target = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other
                .get("types")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string(),
        };
        println!("  \x1b[32m{:<32}\x1b[0m \x1b[2m{}\x1b[0m", key, target);
    }
}

fn cmd_imports(dir: &Path, ext: ImportExtension) -> Result<()> {
    let start = Instant::now();
    let summary = distfix::fix_import_extensions(dir, ext)
        .with_context(|| format!("Failed to fix imports in {}", dir.display()))?;

    println!(
        "success: Rewrote {} in {} of {} scanned ({}) in {}",
        format::count(summary.specifiers_rewritten, "specifier"),
        format::count(summary.files_changed, "file"),
        summary.files_scanned,
        ext,
        format::duration(start.elapsed())
    );

    Ok(())
}
