//! quickhint harness entry point.

mod args;
mod keyseq;
mod report;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use quickhint_core::config::{self, OverrideStore, Scope, SiteOverride};
use quickhint_core::dispatch::InputDispatcher;
use quickhint_core::page::{PageFixture, StaticPage};
use quickhint_core::{label, scan};

use crate::args::{Cli, Commands, LabelsArgs, RunArgs, ScanArgs, ScopeArg};
use crate::report::{Candidate, RunReport, StepReport};

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Scan(args) => cmd_scan(args),
        Commands::Labels(args) => cmd_labels(args),
    }
}

/// A JSON-file-backed override store: `{"hostname": {"kind": ...}}`.
#[derive(Debug, Default)]
struct FileOverrides(HashMap<String, SiteOverride>);

impl FileOverrides {
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading override store {}", path.display()))?;
        let map = serde_json::from_str(&text)
            .with_context(|| format!("parsing override store {}", path.display()))?;
        Ok(Self(map))
    }
}

impl OverrideStore for FileOverrides {
    fn lookup(&self, hostname: &str) -> Option<SiteOverride> {
        self.0.get(hostname).cloned()
    }
}

fn load_page(path: &Path) -> Result<StaticPage> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading page fixture {}", path.display()))?;
    let fixture: PageFixture = serde_json::from_str(&text)
        .with_context(|| format!("parsing page fixture {}", path.display()))?;
    Ok(StaticPage::from_fixture(fixture))
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let mut page = load_page(&args.page)?;
    let store = FileOverrides::load(args.overrides.as_deref())?;

    // Resolution completes before the dispatcher exists, same ordering
    // the in-page embedding guarantees.
    let location = args.url.as_deref().or(page.url()).map(str::to_string);
    let config = config::resolve_config(location.as_deref(), &store);
    let mut dispatcher = InputDispatcher::new(config.clone());

    let tokens: Vec<&str> = args.keys.split_whitespace().collect();
    let events = keyseq::parse_sequence(&args.keys)?;
    let mut steps = Vec::with_capacity(events.len());
    for (token, event) in tokens.iter().zip(&events) {
        let disposition = dispatcher.on_key(&mut page, event);
        steps.push(StepReport::new(token, disposition));
    }

    let run_report = RunReport::collect(
        &config.name,
        config.enabled,
        steps,
        dispatcher.session(),
        &page,
    );
    println!("{}", serde_json::to_string_pretty(&run_report)?);

    if args.preview {
        println!("{}", report::preview(&page, 100, 30));
    }
    Ok(())
}

fn cmd_scan(args: ScanArgs) -> Result<()> {
    let page = load_page(&args.page)?;
    let location = args.url.as_deref().or(page.url()).map(str::to_string);
    let config = config::resolve_config(location.as_deref(), &FileOverrides::default());
    let scope = match args.scope {
        ScopeArg::Curated => Scope::Curated,
        ScopeArg::All => Scope::All,
    };

    let nodes = scan::scan(&page, &config, scope);
    let labels = label::generate(nodes.len());
    let candidates: Vec<Candidate> = nodes
        .iter()
        .enumerate()
        .map(|(i, &node)| Candidate {
            node,
            tag: page.get(node).map_or_else(String::new, |n| n.tag.clone()),
            rect: quickhint_core::surface::Layout::bounding_box(&page, node),
            label: labels.get(i).cloned(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&candidates)?);
    Ok(())
}

fn cmd_labels(args: LabelsArgs) -> Result<()> {
    for label in label::generate(args.count) {
        println!("{}", label);
    }
    Ok(())
}
