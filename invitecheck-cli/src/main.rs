//! invitecheck -- 청첩장 백엔드 HTTP API 검증 도구
//!
//! # Usage
//!
//! ```text
//! invitecheck run [--suite <NAME>]... [--filter <TEXT>] [--base-url <URL>] [--no-cleanup]
//! invitecheck list [--suite <NAME>]
//! invitecheck config validate
//! invitecheck config show [--section <NAME>]
//! ```
//!
//! # Exit Codes
//!
//! | Code | Meaning                                    |
//! |------|--------------------------------------------|
//! | 0    | Success                                    |
//! | 1    | Scenario failures / command error          |
//! | 2    | Configuration error                        |
//! | 3    | Authentication failed / target unreachable |
//! | 10   | IO error                                   |

use clap::Parser;

use invitecheck_cli::cli::{Cli, Commands};
use invitecheck_cli::commands;
use invitecheck_cli::error::CliError;
use invitecheck_cli::logging::init_tracing;
use invitecheck_cli::output::OutputWriter;
use invitecheck_core::config::HarnessConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 설정이 깨져 있어도 로깅은 기본값으로 올리고, 에러는 명령이 보고합니다.
    let loaded = commands::load_config(cli.config.as_deref()).await;
    let general = loaded
        .as_ref()
        .map(|c| c.general.clone())
        .unwrap_or_else(|_| HarnessConfig::default().general);

    if let Err(e) = init_tracing(&general, cli.log_level.as_deref()) {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    let writer = OutputWriter::new(cli.output);
    let result = dispatch(cli, loaded, &writer).await;

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn dispatch(
    cli: Cli,
    loaded: Result<HarnessConfig, CliError>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, loaded?, writer).await,
        Commands::List(args) => commands::list::execute(args, writer),
        Commands::Config(args) => {
            commands::config::execute(args, cli.config.as_deref(), writer).await
        }
    }
}
