mod cli;
mod config_file;
mod downloader;
mod error;
mod logging;
mod manager;
mod models;
mod paths;
mod scrape;
mod source;
mod state;
mod verify;

use crate::cli::{Args, Command, ConfigCommand, TransferArgs};
use crate::error::LinkError;
use crate::manager::LinkManager;
use crate::scrape::PageFetcher;
use crate::verify::Verification;
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;

/// Exit status when files are still missing after a run.
const EXIT_INCOMPLETE: u8 = 2;

async fn run(args: Args) -> Result<ExitCode> {
    let verbose = !args.quiet;
    let fetcher = PageFetcher::new(args.proxy.as_deref())?;

    match args.command {
        Command::Links { url } => {
            let manager = LinkManager::new(&url, ".", verbose, &fetcher).await?;
            for link in manager.links() {
                println!("{}", link.raw);
            }
            let summary: Vec<String> = manager
                .extension_counts()
                .into_iter()
                .map(|(ext, n)| format!("{} {}", n, ext))
                .collect();
            info!("By extension: {}", summary.join(", "));
        }
        Command::Config(ConfigCommand::Generate {
            url,
            config,
            default_decision,
        }) => {
            let manager = LinkManager::new(&url, ".", verbose, &fetcher).await?;
            manager.generate_config(&config, default_decision)?;
        }
        Command::Config(ConfigCommand::Edit {
            config,
            criterion,
            value,
            download,
        }) => {
            let matched = config_file::edit(&config, &criterion, &value, download)?;
            println!("{} row(s) set to {}", matched, download);
        }
        Command::Get(transfer) => {
            let TransferArgs {
                url,
                output,
                config,
                wget,
            } = transfer;
            let manager = LinkManager::new(&url, &output, verbose, &fetcher).await?;
            let result = manager.get(&wget, config.as_deref()).await?;
            return Ok(report(&manager, &result));
        }
        Command::Verify(transfer) => {
            let manager = LinkManager::new(&transfer.url, &transfer.output, verbose, &fetcher).await?;
            let result = manager.verify(transfer.config.as_deref())?;
            return Ok(report(&manager, &result));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn report(manager: &LinkManager, result: &Verification) -> ExitCode {
    println!("{}", result.summary(&manager.source().listing_url));
    if result.is_complete() {
        ExitCode::SUCCESS
    } else {
        info!("Save directory: {}", manager.save_dir().display());
        ExitCode::from(EXIT_INCOMPLETE)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_logging(args.quiet);

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("archive-dl error: {:#}", err);
            let code = err
                .downcast_ref::<LinkError>()
                .map(LinkError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}
