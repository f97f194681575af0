//! `scenario-check`: validate a scenario document or list references to an entity

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use scenario_engine::{load_document, EngineConfig, EngineContext, StaticMetadataSource};
use scenario_refs::RefKind;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Scenario document (.json, .yaml or .yml)")
}

fn cli() -> Command {
    Command::new("scenario-check")
        .version(scenario_engine::VERSION)
        .about("Check training scenario documents for invalid nodes and dangling references")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Engine configuration (TOML)"),
        )
        .arg(
            Arg::new("metadata")
                .long("metadata")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Metadata datasets (.json, .yaml or .yml)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate every node of a document")
                .arg(file_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the report as JSON"),
                ),
        )
        .subcommand(
            Command::new("refs")
                .about("List the nodes referencing a place of interest or team")
                .arg(file_arg())
                .arg(
                    Arg::new("place")
                        .long("place")
                        .help("Place of interest name"),
                )
                .arg(Arg::new("team").long("team").help("Team or team member name"))
                .group(
                    ArgGroup::new("entity")
                        .args(["place", "team"])
                        .required(true),
                ),
        )
}

fn init_tracing(filter: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open(args: &ArgMatches, config: EngineConfig) -> Result<EngineContext> {
    let path = args
        .get_one::<PathBuf>("file")
        .context("no scenario file given")?;
    let doc = load_document(path)
        .with_context(|| format!("failed to load scenario {}", path.display()))?;
    let source = match args.get_one::<PathBuf>("metadata") {
        Some(metadata) => StaticMetadataSource::load(metadata)
            .with_context(|| format!("failed to load metadata {}", metadata.display()))?,
        None => StaticMetadataSource::new(),
    };
    info!(file = %path.display(), "loaded scenario");
    Ok(EngineContext::with_config(doc, Arc::new(source), config))
}

async fn validate(args: &ArgMatches, config: EngineConfig) -> Result<bool> {
    let mut ctx = open(args, config)?;
    ctx.prefetch_metadata()
        .await
        .context("failed to resolve metadata")?;
    let report = ctx.validate_document();
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(report.is_valid())
}

fn refs(args: &ArgMatches, config: EngineConfig) -> Result<bool> {
    let mut ctx = open(args, config)?;
    let (kind, name) = match (args.get_one::<String>("place"), args.get_one::<String>("team")) {
        (Some(place), _) => (RefKind::PlaceOfInterest, place),
        (None, Some(team)) => (RefKind::Team, team),
        (None, None) => bail!("one of --place or --team is required"),
    };
    match kind {
        RefKind::PlaceOfInterest => ctx.rebuild_place_of_interest_references(),
        RefKind::Team => ctx.rebuild_team_references(),
    }
    let records = ctx.referencers_of(kind, name).unwrap_or_default();
    println!("References to {} '{name}': {}", kind.label(), records.len());
    for record in &records {
        println!("  - {} ({} field(s))", record.referrer, record.count);
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = cli().get_matches();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    init_tracing(&config.log_filter, matches.get_flag("log-json"));

    let passed = match matches.subcommand() {
        Some(("validate", args)) => validate(args, config).await?,
        Some(("refs", args)) => refs(args, config)?,
        _ => bail!("unknown command"),
    };
    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn refs_requires_an_entity() {
        let result = cli().try_get_matches_from(["scenario-check", "refs", "doc.json"]);
        assert!(result.is_err());
        let matches = cli()
            .try_get_matches_from(["scenario-check", "refs", "doc.json", "--team", "Alpha"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(args.get_one::<String>("team").map(String::as_str), Some("Alpha"));
    }
}
