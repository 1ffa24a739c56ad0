use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use snap_codec::{ByteContainer, CodecRegistry};
use snap_diff::{diff_lines, Hunk, MINUS_MARKER, PLUS_MARKER};
use snap_store::{BaselineStore, FsBaselineStore};
use snap_types::{BaselineId, ConfigOverrides, RecordMode, SnapshotConfig};
use snap_verify::{Verified, Verifier, VerifyError};
use tracing::debug;

use crate::cli::*;

/// Configuration file looked up under `--root` when `--config` is absent.
const CONFIG_FILE: &str = "snapline.toml";

/// How a command that ran to completion ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Content differs or a baseline is missing.
    Failure,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::Failure => ExitCode::from(1),
        }
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<Outcome> {
    let config = load_config(&cli.root, cli.config.as_deref())?;
    match cli.command {
        Command::Diff(args) => cmd_diff(args, &config),
        Command::Check(args) => cmd_check(&cli.root, args, &config, None),
        Command::Record(args) => cmd_check(&cli.root, args, &config, Some(RecordMode::All)),
        Command::List(args) => cmd_list(&cli.root, args, &config),
    }
}

fn load_config(root: &Path, explicit: Option<&Path>) -> anyhow::Result<SnapshotConfig> {
    let default_path = root.join(CONFIG_FILE);
    let path: Option<PathBuf> = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None if default_path.is_file() => Some(default_path),
        None => None,
    };
    let config = match &path {
        Some(path) => SnapshotConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SnapshotConfig::default(),
    };
    let config = config.apply_env().context("reading SNAPLINE_* environment")?;
    debug!(config = ?config, "configuration loaded");
    Ok(config)
}

fn cmd_diff(args: DiffArgs, config: &SnapshotConfig) -> anyhow::Result<Outcome> {
    let old = read_text(&args.old)?;
    let new = read_text(&args.new)?;
    let context = args.context.unwrap_or(config.context_lines);

    let diff = diff_lines(&old, &new, context);
    if diff.is_empty() {
        println!("{} Files are identical.", "✓".green().bold());
        return Ok(Outcome::Success);
    }

    println!("{} {}", MINUS_MARKER.to_string().red(), args.old.display());
    println!("{} {}", PLUS_MARKER.to_string().green(), args.new.display());
    for hunk in &diff.hunks {
        print_hunk(hunk);
    }
    println!(
        "\n{} additions, {} deletions",
        diff.additions().to_string().green(),
        diff.deletions().to_string().red()
    );
    Ok(Outcome::Failure)
}

fn print_hunk(hunk: &Hunk) {
    println!("{}", hunk.header().cyan());
    for line in &hunk.lines {
        if line.starts_with(MINUS_MARKER) {
            println!("{}", line.red());
        } else if line.starts_with(PLUS_MARKER) {
            println!("{}", line.green());
        } else {
            println!("{line}");
        }
    }
}

fn cmd_check(
    root: &Path,
    args: CheckArgs,
    config: &SnapshotConfig,
    forced: Option<RecordMode>,
) -> anyhow::Result<Outcome> {
    let registry = CodecRegistry::with_defaults();
    let codec = registry.get(&args.format)?;

    let bytes = fs::read(&args.candidate)
        .with_context(|| format!("reading candidate {}", args.candidate.display()))?;
    let candidate = ByteContainer::reader(bytes);

    let mut id = BaselineId::new(&args.suite, &args.test, codec.path_extension())?;
    if let Some(name) = &args.name {
        id = id.with_discriminator(name)?;
    }

    let overrides = ConfigOverrides {
        record_mode: forced.or(args.record),
        context_lines: args.context,
    };
    let config = config.with_overrides(&overrides);
    let store = FsBaselineStore::from_config(root, &config);
    let verifier = Verifier::new(std::sync::Arc::new(store));

    match verifier.verify(&id, &candidate, codec.as_ref(), &config) {
        Ok(verified) => {
            print_verified(&id, &verified);
            Ok(Outcome::Success)
        }
        Err(e) if e.is_expected_failure() => {
            print_failure(&e);
            Ok(Outcome::Failure)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_verified(id: &BaselineId, verified: &Verified) {
    if verified.recorded {
        println!("{} Recorded {}", "✓".green().bold(), id.to_string().yellow());
        if let Some(report) = &verified.report {
            println!("{}", "Previous baseline differed:".dimmed());
            println!("{}", report.message.dimmed());
        }
    } else {
        println!("{} {} matches", "✓".green().bold(), id.to_string().yellow());
    }
}

fn print_failure(e: &VerifyError) {
    println!("{} {}", "✗".red().bold(), e);
}

fn cmd_list(root: &Path, args: ListArgs, config: &SnapshotConfig) -> anyhow::Result<Outcome> {
    let store = FsBaselineStore::from_config(root, config);
    let ids: Vec<BaselineId> = store
        .list()?
        .into_iter()
        .filter(|id| args.suite.as_deref().map_or(true, |s| id.suite() == s))
        .collect();

    if ids.is_empty() {
        println!("No baselines under {}.", store.dir().display());
        return Ok(Outcome::Success);
    }
    for id in &ids {
        println!("  {}", id.to_string().yellow());
    }
    println!("{} baseline(s)", ids.len().to_string().bold());
    Ok(Outcome::Success)
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn arg(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    fn run(root: &Path, args: &[&str]) -> anyhow::Result<Outcome> {
        let root = arg(root);
        let mut argv = vec!["snap", "--root", root.as_str()];
        argv.extend_from_slice(args);
        run_command(Cli::try_parse_from(argv)?)
    }

    #[test]
    fn diff_reports_difference() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "one\ntwo\n").unwrap();
        fs::write(&b, "one\nthree\n").unwrap();

        let (a, b) = (arg(&a), arg(&b));
        assert_eq!(run(dir.path(), &["diff", &a, &a]).unwrap(), Outcome::Success);
        assert_eq!(run(dir.path(), &["diff", &a, &b]).unwrap(), Outcome::Failure);
    }

    #[test]
    fn check_record_and_compare() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = dir.path().join("out.txt");
        let candidate_arg = arg(&candidate);

        fs::write(&candidate, "v1").unwrap();
        let never = ["check", "S", "t", candidate_arg.as_str(), "--record", "never"];
        assert_eq!(run(dir.path(), &never).unwrap(), Outcome::Failure);

        let check = ["check", "S", "t", candidate_arg.as_str()];
        assert_eq!(run(dir.path(), &check).unwrap(), Outcome::Success);
        assert!(dir.path().join("__Snapshots__/S/t.txt").is_file());
        assert_eq!(run(dir.path(), &check).unwrap(), Outcome::Success);

        fs::write(&candidate, "v2").unwrap();
        assert_eq!(run(dir.path(), &check).unwrap(), Outcome::Failure);

        let record = ["record", "S", "t", candidate_arg.as_str()];
        assert_eq!(run(dir.path(), &record).unwrap(), Outcome::Success);
        assert_eq!(run(dir.path(), &check).unwrap(), Outcome::Success);
        assert_eq!(
            fs::read_to_string(dir.path().join("__Snapshots__/S/t.txt")).unwrap(),
            "v2"
        );
    }

    #[test]
    fn infrastructure_errors_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = arg(&dir.path().join("missing.txt"));
        assert!(run(dir.path(), &["check", "S", "t", &missing]).is_err());

        let candidate = dir.path().join("c.txt");
        fs::write(&candidate, "x").unwrap();
        let candidate = arg(&candidate);
        let err = run(dir.path(), &["check", "S", "t", &candidate, "--format", "png"])
            .unwrap_err();
        assert!(err.to_string().contains("png"));
    }

    #[test]
    fn config_file_under_root_is_used() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "snapshot_dir = \"baselines\"\n").unwrap();
        let candidate = dir.path().join("c.txt");
        fs::write(&candidate, "x").unwrap();
        let candidate = arg(&candidate);

        let record = ["record", "S", "t", candidate.as_str()];
        assert_eq!(run(dir.path(), &record).unwrap(), Outcome::Success);
        assert!(dir.path().join("baselines/S/t.txt").is_file());
        assert_eq!(run(dir.path(), &["list", "--suite", "S"]).unwrap(), Outcome::Success);
    }
}
