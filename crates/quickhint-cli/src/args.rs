//! CLI argument parsing with clap derive macros.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Headless harness for the quickhint engine.
///
/// Loads a JSON page fixture, resolves the site configuration for its
/// URL, and drives the hint dispatcher with a scripted key sequence.
/// Output is structured JSON describing the overlays, the session, and
/// every synthetic click that was dispatched.
#[derive(Debug, Parser)]
#[command(name = "quickhint", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a key sequence against a page fixture
    #[command(after_help = "\
Examples:
  quickhint run --page page.json --keys 'Alt+F a'       # Activate, select label a
  quickhint run --page page.json --keys 'Alt+D a'       # Context-menu variant
  quickhint run --page page.json --keys 'Alt+F s d Esc' # Type then abort
  quickhint run --page page.json --overrides my.json    # With a persisted override store
  quickhint run --page page.json --keys Alt+F --preview # ASCII overlay preview

Key tokens are whitespace-separated: chords like Alt+F or Shift+Alt+D,
bare characters like a, and the named keys Esc and Backspace.")]
    Run(RunArgs),

    /// Scan a page fixture and list the visible candidates
    #[command(after_help = "\
Examples:
  quickhint scan --page page.json                # Curated scope
  quickhint scan --page page.json --scope all    # Exhaustive scope")]
    Scan(ScanArgs),

    /// Print the first N hint labels of the generation scheme
    Labels(LabelsArgs),
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Path to the JSON page fixture
    #[arg(long)]
    pub page: PathBuf,

    /// Whitespace-separated key sequence to feed the dispatcher
    #[arg(long, default_value = "Alt+F")]
    pub keys: String,

    /// Resolve configuration for this URL instead of the fixture's own
    #[arg(long)]
    pub url: Option<String>,

    /// Path to a JSON override store (hostname -> override)
    #[arg(long)]
    pub overrides: Option<PathBuf>,

    /// Also print an ASCII preview of the viewport with overlays
    #[arg(long)]
    pub preview: bool,
}

#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Path to the JSON page fixture
    #[arg(long)]
    pub page: PathBuf,

    /// Which selector list governs discovery
    #[arg(long, value_enum, default_value_t = ScopeArg::Curated)]
    pub scope: ScopeArg,

    /// Resolve configuration for this URL instead of the fixture's own
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Debug, Parser)]
pub struct LabelsArgs {
    /// How many labels to generate
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    Curated,
    All,
}
