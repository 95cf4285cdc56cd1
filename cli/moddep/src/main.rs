//! moddep: collate C++ module dependency scan reports into build order.

mod commands;
mod logging;
mod manifest;
mod pipeline;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use moddep_core::ModuleMapFormat;

use logging::{init_logging, LoggingConfig};
use manifest::{ModdepManifest, MANIFEST_FILE};

#[derive(Parser)]
#[command(
    name = "moddep",
    version,
    about = "Order C++ module compilation from dependency scan reports"
)]
struct Cli {
    /// Log progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter moddep.toml
    Init {
        /// Directory to create the manifest in
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Module map format (gcc, clang, msvc)
        #[arg(long, default_value = "gcc")]
        format: ModuleMapFormat,
    },
    /// Collate all reports: write ordering edges, module maps and module indices
    Collate,
    /// Validate the module graph without writing anything
    Check,
    /// Print one legal compile order
    Order {
        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Re-emit a scanner report in canonical form
    Normalize {
        /// Report to read
        report: PathBuf,
        /// Source file the report was scanned from
        #[arg(long)]
        input: PathBuf,
        /// Where to write the canonical report
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(LoggingConfig::from_env(cli.verbose));

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { dir, format } => commands::init::run(&cwd.join(dir), format),

        Commands::Collate => {
            let (manifest, project_dir) = load_manifest_required(&cwd)?;
            commands::collate::run(&project_dir, &manifest)
        }

        Commands::Check => {
            let (manifest, project_dir) = load_manifest_required(&cwd)?;
            commands::check::run(&project_dir, &manifest)
        }

        Commands::Order { json } => {
            let (manifest, project_dir) = load_manifest_required(&cwd)?;
            commands::order::run(&project_dir, &manifest, json)
        }

        Commands::Normalize {
            report,
            input,
            output,
        } => commands::normalize::run(&cwd.join(report), &input, &cwd.join(output)),
    }
}

/// Load manifest, returning error if not found.
fn load_manifest_required(cwd: &Path) -> anyhow::Result<(ModdepManifest, PathBuf)> {
    match ModdepManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((manifest, dir)),
        None => anyhow::bail!("no {MANIFEST_FILE} found (run `moddep init` first)"),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::fs;

    use moddep_graph::BuildEdge;
    use moddep_registry::ModuleIndex;

    use crate::pipeline::fixtures;

    #[test]
    fn cli_parses_commands() {
        let cli =
            Cli::try_parse_from(["moddep", "-v", "init", "proj", "--format", "clang"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Init { dir, format } => {
                assert_eq!(dir, PathBuf::from("proj"));
                assert_eq!(format, ModuleMapFormat::Clang);
            }
            _ => panic!("expected init"),
        }

        assert!(Cli::try_parse_from(["moddep", "init", "--format", "icc"]).is_err());
        assert!(Cli::try_parse_from(["moddep", "normalize", "a.ddi"]).is_err());
    }

    #[test]
    fn missing_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest_required(dir.path()).unwrap_err();
        assert!(err.to_string().contains("moddep.toml"));
    }

    /// Full workflow: init → add targets → check → collate → normalize.
    #[test]
    fn init_check_collate_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        // 1. Init, then describe the build
        commands::init::run(root, ModuleMapFormat::Gcc).unwrap();
        fixtures::report(root, "m", &["M"], &[]);
        fixtures::report(root, "main", &[], &["M"]);
        let mut text = fs::read_to_string(root.join(MANIFEST_FILE)).unwrap();
        text.push_str(
            "\n[[targets]]\nname = \"app\"\nreports = [\"build/m.ddi\", \"build/main.ddi\"]\n",
        );
        fs::write(root.join(MANIFEST_FILE), text).unwrap();

        let (manifest, project_dir) = load_manifest_required(root).unwrap();
        assert_eq!(project_dir, root);

        // 2. Check
        commands::check::run(&project_dir, &manifest).unwrap();

        // 3. Collate
        commands::collate::run(&project_dir, &manifest).unwrap();
        let edges: Vec<BuildEdge> = serde_json::from_str(
            &fs::read_to_string(root.join("build/moddep/edges.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].producer_output, root.join("build/m.o"));

        let b = root.join("build");
        assert_eq!(
            fs::read_to_string(root.join("build/main.o.modmap")).unwrap(),
            format!("$root {b}\nM {b}/M.gcm\n", b = b.display())
        );
        let index = ModuleIndex::load(&root.join("build/moddep/app.modules.json")).unwrap();
        assert_eq!(index.target, "app");

        // 4. Normalize a report back out
        let out = root.join("norm/main.ddi");
        commands::normalize::run(&root.join("build/main.ddi"), Path::new("src/main.cxx"), &out)
            .unwrap();
        let info = moddep_scan::parse_file(&out).unwrap();
        assert_eq!(info.primary_output, root.join("build/main.o"));
    }
}
