#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays scripted input against a Skirmish scenario.

mod save_slot;
mod script;
mod session;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use skirmish_system_bootstrap::{Bootstrap, Scenario};
use tracing_subscriber::EnvFilter;

use crate::{
    save_slot::SaveSnapshot,
    script::{parse_script, ScriptLine},
    session::Session,
};

/// Turn-based tactical skirmish driven by scripted pointer input.
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario file in TOML; the built-in scenario is used when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Script of input lines (`hover X Y`, `click X Y`, `end-turn`, `save`, `discard-save`)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Overrides the scenario seed used for damage rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Prints the save slot as a transfer string once the script finishes
    #[arg(long)]
    export_save: bool,

    /// Decodes a transfer string, prints its roster and exits
    #[arg(
        long,
        value_name = "STRING",
        conflicts_with_all = ["scenario", "script", "seed", "export_save"]
    )]
    inspect_save: Option<String>,
}

/// Entry point for the Skirmish command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if let Some(encoded) = args.inspect_save.as_deref() {
        let snapshot = SaveSnapshot::decode(encoded).context("failed to decode save string")?;
        print!("{snapshot}");
        return Ok(());
    }

    let mut scenario = match args.scenario.as_deref() {
        Some(path) => load_scenario(path)?,
        None => Scenario::default(),
    };
    if let Some(seed) = args.seed {
        scenario = scenario.with_seed(seed);
    }
    let script = match args.script.as_deref() {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };

    let bootstrap = Bootstrap;
    let mut session = Session::start(&bootstrap, &scenario);
    println!("{}", bootstrap.welcome_banner(session.world()));

    for line in script {
        let _ = session.submit(line);
    }

    print!("{}", SaveSnapshot::capture(session.world()));

    if args.export_save {
        let Some(saved) = session.save_slot().saved() else {
            bail!("no save to export; add a `save` line to the script");
        };
        println!("{}", saved.encode().context("failed to encode save")?);
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario at {}", path.display()))?;
    Scenario::from_toml_str(&contents)
        .with_context(|| format!("failed to load scenario {}", path.display()))
}

fn load_script(path: &Path) -> Result<Vec<ScriptLine>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read script at {}", path.display()))?;
    parse_script(&contents).with_context(|| format!("failed to parse script {}", path.display()))
}
