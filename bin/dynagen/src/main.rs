//! `dynagen` — generate deployment and data-model artifacts from a
//! directory of YAML schema documents.
//!
//! Usage:
//!   dynagen --input <schema-dir> --output <out-dir> [--target <name>]...
//!
//! Exit codes distinguish the two failure families: 1 for schema errors
//! (bad input), 2 for emission or I/O failures.

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use tracing::info;

use dynagen_emit::{run, GenerateError, TargetKind};

/// One `--target` value: a single family, or `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetArg {
    All,
    One(TargetKind),
}

impl FromStr for TargetArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            other => other.parse::<TargetKind>().map(Self::One),
        }
    }
}

/// Expand the flag values into the target set. No flag, or any `all`,
/// selects every family; duplicates collapse.
fn selected_targets(args: &[TargetArg]) -> Vec<TargetKind> {
    if args.is_empty() || args.contains(&TargetArg::All) {
        return TargetKind::ALL.to_vec();
    }
    let mut targets: Vec<TargetKind> = args
        .iter()
        .filter_map(|a| match a {
            TargetArg::One(t) => Some(*t),
            TargetArg::All => None,
        })
        .collect();
    targets.sort();
    targets.dedup();
    targets
}

/// Schema-driven artifact generator.
#[derive(Parser, Debug)]
#[command(name = "dynagen", about = "Generate artifacts from YAML schema documents")]
struct Cli {
    /// Directory containing the schema documents.
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory; replaced atomically on success.
    #[arg(short, long)]
    output: PathBuf,

    /// Targets to generate (infra, interface, backend-model,
    /// frontend-model, resolver-template, all). Repeatable; defaults
    /// to all.
    #[arg(short, long = "target", value_name = "TARGET")]
    targets: Vec<TargetArg>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let targets = selected_targets(&cli.targets);

    match run(&cli.input, &cli.output, &targets) {
        Ok(written) => {
            info!("generated {written} files in {}", cli.output.display());
            ExitCode::SUCCESS
        }
        Err(GenerateError::Schema(e)) => {
            eprintln!("schema error: {e}");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_all_selects_every_family() {
        let arg = "all".parse::<TargetArg>().unwrap();
        assert_eq!(arg, TargetArg::All);
        assert_eq!(selected_targets(&[arg]), TargetKind::ALL.to_vec());
        // Mixed with a single family, `all` still wins.
        let mixed = [TargetArg::One(TargetKind::Infra), TargetArg::All];
        assert_eq!(selected_targets(&mixed), TargetKind::ALL.to_vec());
    }

    #[test]
    fn omitted_flag_defaults_to_every_family() {
        assert_eq!(selected_targets(&[]), TargetKind::ALL.to_vec());
    }

    #[test]
    fn repeated_targets_collapse() {
        let args = [
            TargetArg::One(TargetKind::Interface),
            TargetArg::One(TargetKind::Infra),
            TargetArg::One(TargetKind::Infra),
        ];
        assert_eq!(
            selected_targets(&args),
            vec![TargetKind::Infra, TargetKind::Interface]
        );
    }

    #[test]
    fn unknown_target_is_rejected() {
        assert!("velocity".parse::<TargetArg>().is_err());
    }
}
