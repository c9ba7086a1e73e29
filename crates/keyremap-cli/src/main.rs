//! keyremap CLI
//!
//! Validation and compilation tool for keyremap rule sets.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use keyremap_config::Config;
use keyremap_core::{
    check_if_remappings_are_valid, get_orphaned_keys, parse_key, save_remappings,
    update_remap_buffer, validate_and_update_key_buffer_element, validate_rows,
    validate_shortcut_buffer_element, Column, ErrorKind, RuntimeTables, SaveError, Selection,
    ShortcutEdit, SnapshotSink,
};
use miette::IntoDiagnostic;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

#[derive(Parser, Debug)]
#[command(name = "keyremap")]
#[command(about = "Keyboard remapping rule validator and compiler")]
#[command(version)]
struct Cli {
    /// Path to rule-set file
    #[arg(short, long, default_value = "~/.config/keyremap/rules.kdl")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the rule set and report orphaned keys
    Check,

    /// Compile the rule set into runtime tables (JSON)
    Compile {
        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Try a single-key edit against the rule set
    EditKey {
        /// Row index (0-based, in file order)
        #[arg(long)]
        row: usize,

        /// Column to edit: source or target
        #[arg(long)]
        column: Column,

        /// Key name, `none`, or `unset`
        #[arg(long)]
        key: String,
    },

    /// Try a shortcut drop-down edit against the rule set
    EditShortcut {
        /// Row index (0-based, in file order)
        #[arg(long)]
        row: usize,

        /// Column to edit: source or target
        #[arg(long)]
        column: Column,

        /// Index of the drop-down that changed
        #[arg(long)]
        slot: usize,

        /// Comma-separated drop-down values; `_` is unset, `none` is none
        #[arg(long)]
        keys: String,

        /// The column also accepts a single key
        #[arg(long)]
        hybrid: bool,

        /// Target application of the row
        #[arg(long)]
        app: Option<String>,
    },
}

type LogHandle = reload::Handle<EnvFilter, Registry>;

fn main() -> miette::Result<()> {
    // Initialize tracing; the rule set's log-level applies once it is loaded
    let (filter, log_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Expand tilde in config path
    let config_path: PathBuf = shellexpand::tilde(&cli.config).into_owned().into();

    match cli.command {
        Commands::Check => cmd_check(&config_path, &log_handle),
        Commands::Compile { output } => cmd_compile(&config_path, &log_handle, output),
        Commands::EditKey { row, column, key } => {
            cmd_edit_key(&config_path, &log_handle, row, column, &key)
        }
        Commands::EditShortcut {
            row,
            column,
            slot,
            keys,
            hybrid,
            app,
        } => cmd_edit_shortcut(
            &config_path,
            &log_handle,
            row,
            column,
            slot,
            &keys,
            hybrid,
            app.as_deref(),
        ),
    }
}

fn load_config(config_path: &Path, log_handle: &LogHandle) -> miette::Result<Config> {
    let config = keyremap_config::parse_config(config_path)?;
    tracing::debug!("Loaded {} rules from {}", config.rules.len(), config_path.display());

    if std::env::var_os("RUST_LOG").is_none() {
        log_handle
            .reload(EnvFilter::new(config.global.log_level.as_filter()))
            .into_diagnostic()?;
    }

    Ok(config)
}

fn parse_selection(text: &str) -> miette::Result<Selection> {
    match text.trim().to_lowercase().as_str() {
        "_" | "unset" | "" => Ok(Selection::Unset),
        "none" => Ok(Selection::None),
        _ => parse_key(text)
            .map(Selection::Key)
            .ok_or_else(|| miette::miette!("Unknown key: {}", text.trim())),
    }
}

fn cmd_check(config_path: &Path, log_handle: &LogHandle) -> miette::Result<()> {
    println!("Checking rule set: {}", config_path.display());

    let config = load_config(config_path, log_handle)?;
    let rules = &config.rules;

    for (index, (row, error)) in rules.iter().zip(validate_rows(rules)).enumerate() {
        if error.is_err() {
            println!("  row {}: {} -> {}: {}", index, row.source, row.target, error);
        }
    }

    let result = check_if_remappings_are_valid(rules);
    if result.is_err() {
        return Err(miette::miette!(
            help = "Every rule needs a complete source and target, and no two rules for the same app may share a source",
            "{}",
            result
        ));
    }

    for key in get_orphaned_keys(rules) {
        println!("  warning: {} is remapped but no rule produces it", key);
    }

    println!("Rule set is valid!");
    println!("  Rules: {}", rules.len());
    Ok(())
}

/// Write runtime tables as pretty JSON to `output`, or stdout.
fn write_tables(tables: &RuntimeTables, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, tables)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            writeln!(writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, tables)
                .context("Failed to write runtime tables to stdout")?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn cmd_compile(
    config_path: &Path,
    log_handle: &LogHandle,
    output: Option<PathBuf>,
) -> miette::Result<()> {
    let config = load_config(config_path, log_handle)?;
    let mut sink = SnapshotSink::new();

    let report = match save_remappings(&config.rules, &mut sink) {
        Ok(report) => report,
        Err(SaveError::Rejected(kind)) => {
            return Err(miette::miette!(
                help = "Run `keyremap check` to see which rules are at fault",
                "{}",
                kind
            ))
        }
        Err(SaveError::Sink(never)) => match never {},
    };

    write_tables(&report.tables, output.as_deref()).map_err(|e| miette::miette!("{:#}", e))?;

    for key in &report.orphaned_keys {
        eprintln!("warning: {} is remapped but no rule produces it", key);
    }
    if let Some(path) = output {
        eprintln!("Generated runtime tables: {}", path.display());
    }

    Ok(())
}

fn cmd_edit_key(
    config_path: &Path,
    log_handle: &LogHandle,
    row: usize,
    column: Column,
    key: &str,
) -> miette::Result<()> {
    let mut config = load_config(config_path, log_handle)?;
    let selection = parse_selection(key)?;

    let result =
        validate_and_update_key_buffer_element(&mut config.rules, row, column, selection)
            .into_diagnostic()?;
    print_edit_result(&config, row, result)
}

#[allow(clippy::too_many_arguments)]
fn cmd_edit_shortcut(
    config_path: &Path,
    log_handle: &LogHandle,
    row: usize,
    column: Column,
    slot: usize,
    keys: &str,
    hybrid: bool,
    app: Option<&str>,
) -> miette::Result<()> {
    let mut config = load_config(config_path, log_handle)?;
    let selections = keys
        .split(',')
        .map(parse_selection)
        .collect::<miette::Result<Vec<_>>>()?;

    let target_app = match app {
        Some(app) => config.global.normalize_app(app),
        None => config.rules.row(row).into_diagnostic()?.target_app.clone(),
    };
    let edit = ShortcutEdit {
        row,
        column,
        slot,
        selections: &selections,
        target_app: &target_app,
        is_hybrid: hybrid,
        is_app_specific: !target_app.is_empty(),
    };

    let (result, action) = validate_shortcut_buffer_element(&config.rules, &edit).into_diagnostic()?;
    println!("Drop-down action: {}", action);

    if result.is_ok() {
        update_remap_buffer(&mut config.rules, row, column, &selections, hybrid).into_diagnostic()?;
    }
    print_edit_result(&config, row, result)
}

fn print_edit_result(config: &Config, row: usize, result: ErrorKind) -> miette::Result<()> {
    let current = config.rules.row(row).into_diagnostic()?;
    println!("Row {}: {} -> {}", row, current.source, current.target);
    if result.is_ok() {
        println!("Edit accepted");
        Ok(())
    } else {
        Err(miette::miette!("Edit rejected: {}", result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyremap_core::KeyCode;

    #[test]
    fn test_parse_selection_placeholders() {
        assert_eq!(parse_selection("_").unwrap(), Selection::Unset);
        assert_eq!(parse_selection("unset").unwrap(), Selection::Unset);
        assert_eq!(parse_selection(" None ").unwrap(), Selection::None);
    }

    #[test]
    fn test_parse_selection_keys() {
        assert_eq!(parse_selection("Ctrl").unwrap(), Selection::Key(KeyCode::CTRL));
        assert_eq!(parse_selection("c").unwrap(), Selection::Key(KeyCode::from_char('C')));
        assert!(parse_selection("NotAKey").is_err());
    }

    #[test]
    fn test_cli_parses_edit_shortcut() {
        let cli = Cli::try_parse_from([
            "keyremap", "edit-shortcut", "--row", "1", "--column", "source", "--slot", "2", "--keys",
            "Ctrl,_,C", "--app", "code.exe",
        ])
        .unwrap();
        match cli.command {
            Commands::EditShortcut { row, column, slot, keys, hybrid, app } => {
                assert_eq!(row, 1);
                assert_eq!(column, Column::Source);
                assert_eq!(slot, 2);
                assert_eq!(keys, "Ctrl,_,C");
                assert!(!hybrid);
                assert_eq!(app.as_deref(), Some("code.exe"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_write_tables_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");

        write_tables(&RuntimeTables::default(), Some(&path)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(json["single_key"].as_object().unwrap().is_empty());
    }
}
