//! mib-expose-passpersist: serve the demo module to snmpd.
//!
//! Configure snmpd with
//! `pass_persist .1.3.6.1.4.1.6603.1 /usr/local/bin/mib-expose-passpersist`.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use mib_expose::cli::args::CommonArgs;
use mib_expose::cli::demo::{self, DemoState};
use mib_expose::passpersist::Session;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// net-snmp pass_persist helper exposing a MIB tree.
#[derive(Debug, Parser)]
#[command(name = "mib-expose-passpersist", version, about)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Number of ports in the demo port table.
    #[arg(long, default_value_t = 8)]
    ports: u32,

    /// Print the demo module as SMIv2 text and exit.
    #[arg(long)]
    print_mib: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.common.init_tracing();

    let mut registry = args.common.registry();
    if let Err(e) = registry.attach_module(demo::module(Arc::new(DemoState::new(args.ports)))) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    if args.print_mib {
        return match demo::mib_generator().generate(&registry, demo::DEMO_ELEMENT.name) {
            Ok(text) => {
                print!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    match run(&registry).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(registry: &mib_expose::MibRegistry) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut session = Session::new(registry);

    while let Some(line) = lines.next_line().await? {
        if let Some(reply) = session.feed(&line) {
            stdout.write_all(reply.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    tracing::info!(target: "mib_expose::passpersist", "stdin closed, exiting");
    Ok(())
}
