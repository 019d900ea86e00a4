//! codehash-timeline: track a contract's bytecode hash across a block range.
//!
//! Samples `eth_getCode` every `--step` blocks, fingerprints each result with
//! keccak256 and reports where the code changed. Exits 0 when the code was
//! stable, 2 when it changed, 1 on fatal errors.
//!
//! Usage:
//! ```bash
//! codehash-timeline --address 0xA0b8…eB48 --from-block 17000000 --to-block 18000000 \
//!     --step 10000 --rpc https://eth.llamarpc.com
//!
//! # CI: JSON on stdout, exit code 2 on change
//! RPC_URL=https://… codehash-timeline --address 0x… --from-block 0 --to-block 100000 --json
//! ```

mod args;
mod logging;
mod report;

use std::env;
use std::process;
use std::time::Instant;

use codehash_core::{Address, ScanBuilder, ScanError, Scanner};
use codehash_evm::EvmCodeClient;
use codehash_rpc::HttpRpcClient;

use crate::args::{parse_args, CliArgs, Command};
use crate::report::{Report, EXIT_FATAL};

#[tokio::main]
async fn main() {
    let argv: Vec<String> = env::args().skip(1).collect();
    let default_rpc = env::var("RPC_URL").ok();

    let cli = match parse_args(&argv, default_rpc) {
        Ok(Command::Scan(cli)) => cli,
        Ok(Command::Help) => {
            print_usage();
            return;
        }
        Ok(Command::Version) => {
            println!("codehash-timeline {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run with --help for usage.");
            process::exit(EXIT_FATAL);
        }
    };

    logging::init_tracing(&cli.log_config());

    match run(&cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(EXIT_FATAL);
        }
    }
}

fn print_usage() {
    println!("codehash-timeline {}", env!("CARGO_PKG_VERSION"));
    println!("Track a contract's bytecode hash over a block range to detect upgrades\n");
    println!("USAGE:");
    println!("    codehash-timeline --address <HEX> --from-block <N> --to-block <N> [FLAGS]\n");
    println!("FLAGS:");
    println!("    --address <HEX>       Contract address to track  [required]");
    println!("    --from-block <N>      First block, inclusive  [required]");
    println!("    --to-block <N>        Last block, inclusive (always sampled)  [required]");
    println!("    --step <N>            Block stride between samples  [default: 500]");
    println!("    --rpc <URL>           EVM JSON-RPC endpoint  [default: $RPC_URL]");
    println!("    --only-changes        Print one line per segment instead of every sample");
    println!("    --json                Print a JSON report instead of text");
    println!("    --timeout <SECS>      Per-request timeout  [default: 30]");
    println!("    --retries <N>         Retries per failed request  [default: 3]");
    println!("    --concurrency <N>     Lookups in flight  [default: 1]");
    println!("    --rps <N>             Max requests per second, 0 = unlimited  [default: 25]");
    println!("    --log-level <LEVEL>   trace|debug|info|warn|error  [default: info, or $RUST_LOG]");
    println!("    --log-json            Structured JSON logs on stderr");
    println!("    --version             Print version");
    println!("    --help                Print this help\n");
    println!("EXIT CODES:");
    println!("    0  scan completed, no code change");
    println!("    2  scan completed, code changed");
    println!("    1  invalid arguments or RPC unreachable");
}

async fn run(cli: &CliArgs) -> Result<i32, String> {
    let address = Address::parse(&cli.address).map_err(fatal)?;
    let config = ScanBuilder::new()
        .address(address)
        .from_block(cli.from_block)
        .to_block(cli.to_block)
        .step(cli.step)
        .concurrency(cli.concurrency)
        .build_config();

    let transport = HttpRpcClient::new(&cli.rpc, cli.http_config()).map_err(|e| e.to_string())?;
    // Range and config are validated here, before any request is sent.
    let scanner = Scanner::new(config, EvmCodeClient::new(transport)).map_err(fatal)?;

    let chain_id = scanner.fetcher().probe().await.map_err(fatal)?;
    tracing::info!(rpc = %cli.rpc, chain_id, address = %address, "Connected");

    let started = Instant::now();
    let result = scanner.run().await.map_err(fatal)?;
    let elapsed = started.elapsed();

    let sampler = scanner.sampler();
    let report = Report {
        rpc: &cli.rpc,
        chain_id,
        address,
        from_block: sampler.from_block(),
        to_block: sampler.to_block(),
        step: sampler.step(),
        result: &result,
        elapsed,
    };

    if cli.json {
        let json = report::render_json(&report).map_err(|e| format!("JSON serialization error: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", report::render_text(&report, cli.only_changes));
    }

    Ok(report::exit_code(&result))
}

fn fatal(e: ScanError) -> String {
    if e.is_usage_error() {
        format!("{e}\nRun with --help for usage.")
    } else {
        e.to_string()
    }
}
