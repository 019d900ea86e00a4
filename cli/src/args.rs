//! Command-line flag parsing.

use std::time::Duration;

use codehash_rpc::policy::{RateLimiterConfig, RetryConfig};
use codehash_rpc::HttpClientConfig;

use crate::logging::LogConfig;

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Scan(CliArgs),
    Help,
    Version,
}

/// Parsed flags for a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub address: String,
    pub from_block: i64,
    pub to_block: i64,
    pub step: i64,
    pub rpc: String,
    pub only_changes: bool,
    pub json: bool,
    pub timeout_secs: u64,
    pub retries: u32,
    pub concurrency: usize,
    pub rps: f64,
    pub log_level: String,
    pub log_json: bool,
}

impl CliArgs {
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            retry: RetryConfig {
                max_retries: self.retries,
                ..RetryConfig::default()
            },
            rate_limiter: if self.rps > 0.0 {
                RateLimiterConfig::per_second(self.rps)
            } else {
                RateLimiterConfig::unlimited()
            },
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            json: self.log_json,
        }
    }
}

/// Parse `args` (without the program name).
///
/// `default_rpc` is the value of `RPC_URL`, read by the caller.
pub fn parse_args(args: &[String], default_rpc: Option<String>) -> Result<Command, String> {
    let mut address: Option<String> = None;
    let mut from_block: Option<i64> = None;
    let mut to_block: Option<i64> = None;
    let mut step: i64 = 500;
    let mut rpc: Option<String> = default_rpc.filter(|s| !s.is_empty());
    let mut only_changes = false;
    let mut json = false;
    let mut timeout_secs: u64 = 30;
    let mut retries: u32 = 3;
    let mut concurrency: usize = 1;
    let mut rps: f64 = 25.0;
    let mut log_level = "info".to_string();
    let mut log_json = false;

    let mut i = 0;
    while i < args.len() {
        let (flag, inline) = match args[i].split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f, Some(v.to_string())),
            _ => (args[i].as_str(), None),
        };

        match flag {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--only-changes" => only_changes = true,
            "--json" => json = true,
            "--log-json" => log_json = true,
            "--address" | "--from-block" | "--to-block" | "--step" | "--rpc" | "--timeout"
            | "--retries" | "--concurrency" | "--rps" | "--log-level" => {
                let value = match inline {
                    Some(v) => v,
                    None => {
                        i += 1;
                        args.get(i)
                            .cloned()
                            .ok_or_else(|| format!("{flag} requires a value"))?
                    }
                };
                match flag {
                    "--address" => address = Some(value),
                    "--from-block" => from_block = Some(number(flag, &value)?),
                    "--to-block" => to_block = Some(number(flag, &value)?),
                    "--step" => step = number(flag, &value)?,
                    "--rpc" => rpc = Some(value),
                    "--timeout" => timeout_secs = number(flag, &value)?,
                    "--retries" => retries = number(flag, &value)?,
                    "--concurrency" => concurrency = number(flag, &value)?,
                    "--rps" => rps = number(flag, &value)?,
                    _ => log_level = value,
                }
            }
            other => return Err(format!("Unknown flag: {other}")),
        }
        i += 1;
    }

    if timeout_secs == 0 {
        return Err("--timeout must be at least 1 second".into());
    }

    Ok(Command::Scan(CliArgs {
        address: address.ok_or("--address is required")?,
        from_block: from_block.ok_or("--from-block is required")?,
        to_block: to_block.ok_or("--to-block is required")?,
        step,
        rpc: rpc.ok_or("--rpc is required (or set RPC_URL)")?,
        only_changes,
        json,
        timeout_secs,
        retries,
        concurrency,
        rps,
        log_level,
        log_json,
    }))
}

fn number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{flag} expects a number, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    fn scan(s: &str) -> CliArgs {
        match parse_args(&argv(s), None).unwrap() {
            Command::Scan(a) => a,
            other => panic!("expected scan, got {other:?}"),
        }
    }

    const BASE: &str = "--address 0xde709f2102306220921060314715629080e2fb77 --from-block 100 --to-block 400 --rpc http://localhost:8545";

    #[test]
    fn defaults() {
        let a = scan(BASE);
        assert_eq!(a.from_block, 100);
        assert_eq!(a.to_block, 400);
        assert_eq!(a.step, 500);
        assert_eq!(a.timeout_secs, 30);
        assert_eq!(a.retries, 3);
        assert_eq!(a.concurrency, 1);
        assert!(!a.only_changes);
        assert!(!a.json);
        assert_eq!(a.log_level, "info");
    }

    #[test]
    fn all_flags() {
        let a = scan(&format!(
            "{BASE} --step 100 --only-changes --json --timeout 5 --retries 0 --concurrency 4 --rps 0 --log-level debug --log-json"
        ));
        assert_eq!(a.step, 100);
        assert!(a.only_changes && a.json && a.log_json);
        assert_eq!(a.timeout_secs, 5);
        assert_eq!(a.retries, 0);
        assert_eq!(a.concurrency, 4);
        assert_eq!(a.log_level, "debug");
        assert!(a.http_config().rate_limiter.is_unlimited());
        assert_eq!(a.http_config().retry.max_retries, 0);
        assert_eq!(a.http_config().request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn inline_values() {
        let a = scan(&format!("{BASE} --step=250"));
        assert_eq!(a.step, 250);
    }

    #[test]
    fn negative_values_parse_for_later_validation() {
        let a = scan(&format!("{BASE} --step -1"));
        assert_eq!(a.step, -1);
    }

    #[test]
    fn rpc_from_environment() {
        let args = argv("--address 0x00 --from-block 1 --to-block 2");
        match parse_args(&args, Some("https://rpc.example.org".into())).unwrap() {
            Command::Scan(a) => assert_eq!(a.rpc, "https://rpc.example.org"),
            other => panic!("unexpected {other:?}"),
        }
        let err = parse_args(&args, None).unwrap_err();
        assert!(err.contains("--rpc is required"));
        assert!(parse_args(&args, Some(String::new())).is_err());
    }

    #[test]
    fn flag_overrides_environment() {
        match parse_args(&argv(BASE), Some("https://env.example.org".into())).unwrap() {
            Command::Scan(a) => assert_eq!(a.rpc, "http://localhost:8545"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_required() {
        let err = parse_args(&argv("--from-block 1 --to-block 2 --rpc http://x"), None).unwrap_err();
        assert_eq!(err, "--address is required");
        let err = parse_args(&argv("--address 0x1 --to-block 2 --rpc http://x"), None).unwrap_err();
        assert_eq!(err, "--from-block is required");
    }

    #[test]
    fn bad_values() {
        let err = parse_args(&argv(&format!("{BASE} --step ten")), None).unwrap_err();
        assert!(err.contains("--step expects a number"));
        let err = parse_args(&argv(&format!("{BASE} --step")), None).unwrap_err();
        assert_eq!(err, "--step requires a value");
        let err = parse_args(&argv(&format!("{BASE} --bogus")), None).unwrap_err();
        assert_eq!(err, "Unknown flag: --bogus");
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = parse_args(&argv(&format!("{BASE} --timeout 0")), None).unwrap_err();
        assert_eq!(err, "--timeout must be at least 1 second");
        assert!(parse_args(&argv(&format!("{BASE} --timeout=1")), None).is_ok());
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse_args(&argv("--help"), None).unwrap(), Command::Help);
        assert_eq!(parse_args(&argv("-V"), None).unwrap(), Command::Version);
    }
}
