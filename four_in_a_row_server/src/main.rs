// CLI entry point for the four-in-a-row server.
//
// Hosts one game for two players and runs until a player sends a
// server-closed Exit or the process is killed. See `server.rs` for the
// threading model and `dispatch.rs` for the game rules on the wire.
//
// Usage:
//   server [OPTIONS]
//     --config <FILE>      JSON config file (flags given later override it)
//     --port <PORT>        Listen port (default: 46841)
//     --bind <ADDR>        Listen address (default: 127.0.0.1)
//     --columns <N>        Board columns (default: 7)
//     --rows <N>           Board rows (default: 6)
//     --verbose, -v        Debug-level logging

use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;

use four_in_a_row_server::{ServerConfig, start_server};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

struct CliArgs {
    config: ServerConfig,
    verbose: bool,
}

fn main() -> ExitCode {
    let CliArgs { config, verbose } = match parse_args(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {e}");
    }

    let (handle, addr) = match start_server(&config) {
        Ok(started) => started,
        Err(e) => {
            error!(error = %e, "failed to start server");
            return ExitCode::FAILURE;
        }
    };
    println!("Four-in-a-row server listening on {addr}");

    handle.wait();
    info!("server stopped");
    ExitCode::SUCCESS
}

/// Parse command-line arguments into a validated `ServerConfig`. `Ok(None)`
/// means help was requested. Plain argument matching, no CLI crate.
fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Option<CliArgs>, String> {
    let mut config = ServerConfig::default();
    let mut verbose = false;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config requires a file path")?;
                config = ServerConfig::load(Path::new(&path)).map_err(|e| e.to_string())?;
            }
            "--port" => config.port = parse_value(&arg, args.next())?,
            "--bind" => {
                config.bind_address = args.next().ok_or("--bind requires an address")?;
            }
            "--columns" => config.columns = parse_value(&arg, args.next())?,
            "--rows" => config.rows = parse_value(&arg, args.next())?,
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("Unknown argument: {other}")),
        }
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(Some(CliArgs { config, verbose }))
}

fn parse_value<T: FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("{flag} requires a valid number"))
}

fn print_usage() {
    println!("Usage: server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <FILE>      JSON config file (flags given later override it)");
    println!("  --port <PORT>        Listen port (default: 46841)");
    println!("  --bind <ADDR>        Listen address (default: 127.0.0.1)");
    println!("  --columns <N>        Board columns (default: 7)");
    println!("  --rows <N>           Board rows (default: 6)");
    println!("  --verbose, -v        Debug-level logging");
    println!("  --help, -h           Show this help");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn no_args_gives_defaults() {
        let parsed = parse_args(args(&[])).unwrap().unwrap();
        assert_eq!(parsed.config, ServerConfig::default());
        assert!(!parsed.verbose);
    }

    #[test]
    fn flags_override_defaults() {
        let CliArgs { config, verbose } = parse_args(args(&[
            "--port", "0", "--bind", "0.0.0.0", "--columns", "9", "--rows", "8", "-v",
        ]))
        .unwrap()
        .unwrap();
        assert!(verbose);
        assert_eq!(config.port, 0);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!((config.columns, config.rows), (9, 8));
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse_args(args(&["--port", "1", "-h"])).unwrap().is_none());
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(parse_args(args(&["--port"])).is_err());
        assert!(parse_args(args(&["--port", "seventy"])).is_err());
        assert!(parse_args(args(&["--rows", "0"])).is_err());
        assert!(parse_args(args(&["--frobnicate"])).is_err());
        assert!(parse_args(args(&["--config", "/no/such/config.json"])).is_err());
    }
}
