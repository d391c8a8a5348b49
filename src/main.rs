use std::io::Read;

use rf_geolocation::api::{formatter_for, EstimateFormatter};
use rf_geolocation::{EngineConfig, EstimateRequest, LocationEstimationService, OutputFormat};

struct CliArgs {
    request_path: Option<String>,
    config_path: Option<String>,
    format: OutputFormat,
    verbose: bool,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <request.json|-> [--config <file>] [--format text|json|csv] [--verbose]\n   \
         or: {program} --write-default-config <file>"
    )
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs {
        request_path: None,
        config_path: None,
        format: OutputFormat::Text,
        verbose: false,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = iter.next().ok_or("--config requires a file path")?;
                parsed.config_path = Some(value.clone());
            }
            "--format" | "-f" => {
                let value = iter.next().ok_or("--format requires a value")?;
                parsed.format = value.parse()?;
            }
            "--verbose" | "-v" => parsed.verbose = true,
            other if other.starts_with("--") => return Err(format!("unknown option: {other}")),
            other => {
                if parsed.request_path.replace(other.to_string()).is_some() {
                    return Err("only one request file may be given".to_string());
                }
            }
        }
    }

    Ok(parsed)
}

fn read_request(path: &str) -> Result<EstimateRequest, Box<dyn std::error::Error>> {
    let json = if path == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(EstimateRequest::from_json(&json)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("rf-geolocate", |s| s.as_str()).to_string();

    if args.len() == 3 && args[1] == "--write-default-config" {
        EngineConfig::default().save_to_file(&args[2])?;
        println!("Default configuration written to {}", args[2]);
        return Ok(());
    }

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{}", usage(&program));
            return Err("Invalid arguments".into());
        }
    };

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let request_path = match cli.request_path {
        Some(path) => path,
        None => {
            eprintln!("{}", usage(&program));
            return Err("Missing request file".into());
        }
    };

    let config = match &cli.config_path {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let service = LocationEstimationService::new(config)?;
    let request = read_request(&request_path)?;

    match service.estimate(&request) {
        Ok(estimate) => {
            let output = formatter_for(cli.format).format(&estimate)?;
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            log::error!("estimation failed: {}", e);
            Err(e.into())
        }
    }
}
