use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use payload_core::{Normalizer, NormalizerConfig, Value};
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("payload")
        .version(payload_core::VERSION)
        .about("Normalize a value read from stdin into transport-ready base64")
        .arg(
            Arg::new("raw")
                .long("raw")
                .action(ArgAction::SetTrue)
                .help("Treat stdin as an opaque byte buffer"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Parse stdin as JSON and normalize the resulting value"),
        )
        .group(ArgGroup::new("input").args(["raw", "json"]).multiple(false))
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with normalizer settings"),
        )
        .arg(
            Arg::new("max-bytes")
                .long("max-bytes")
                .value_parser(value_parser!(usize))
                .help("Override the maximum buffer size"),
        )
        .arg(
            Arg::new("content-type")
                .long("content-type")
                .help("Emit an output envelope with this content type"),
        )
}

fn load_config(matches: &ArgMatches) -> Result<NormalizerConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => NormalizerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NormalizerConfig::default(),
    };
    if let Some(max) = matches.get_one::<usize>("max-bytes") {
        config = config.with_max_bytes(*max);
    }
    config.validate()?;
    Ok(config)
}

fn read_input(matches: &ArgMatches) -> Result<Value> {
    let mut data = Vec::new();
    std::io::stdin()
        .read_to_end(&mut data)
        .context("reading stdin")?;

    if matches.get_flag("raw") {
        return Ok(Value::from(data));
    }
    if matches.get_flag("json") {
        let json: serde_json::Value = serde_json::from_slice(&data).context("parsing JSON input")?;
        return Ok(Value::from(json));
    }
    let text = String::from_utf8(data).context("stdin is not valid UTF-8; use --raw")?;
    Ok(Value::from(text))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    let input = read_input(&matches)?;

    let result = Normalizer::new(config).convert_to_binary(input)?;
    if let Some(anomaly) = &result.error {
        tracing::warn!(error = %anomaly, "value normalized with anomaly");
    }

    let rendered = match matches.get_one::<String>("content-type") {
        Some(content_type) => serde_json::to_string(&result.into_envelope(content_type.as_str()))?,
        None => serde_json::to_string(&result)?,
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
