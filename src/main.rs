mod app;
mod cli;
mod error;
mod output;

use crate::app::App;
use crate::cli::{CacheCommand, Cli, Command, FetchArgs, FoldersArgs, QueryArgs};
use clap::Parser;
use gallery_catalog::ListingSource;
use gallery_catalog::catalog::error::ErrorKind as CatalogErrorKind;
use gallery_catalog::retrieve::error::ErrorKind as RetrieveErrorKind;
use gallery_config::Config;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

/// Print the command output; an unwritable stdout fails the command.
fn emit(written: io::Result<()>, code: ExitCode) -> ExitCode {
    match written {
        Ok(()) => code,
        Err(e) => {
            tracing::error!(error = ?e, "Could not write output");
            ExitCode::FAILURE
        },
    }
}

async fn folders(app: &App, args: FoldersArgs) -> ExitCode {
    let catalog = match app.catalog().await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!(error = ?e, "Could not set up the catalog");
            return ExitCode::FAILURE;
        },
    };
    let depth = args.query.depth.unwrap_or(app.config().crawl.max_depth);
    let result = if args.refresh {
        catalog.refresh_folders(&args.query.base, depth).await
    } else {
        catalog.list_folders(&args.query.base, depth).await
    };
    let (folders, code) = match result {
        Ok(listing) => {
            if listing.source == ListingSource::Degraded {
                tracing::warn!("Some folders could not be listed; the catalog is incomplete");
            }
            tracing::info!(source = ?listing.source, folders = listing.folders.len(), "Listed folders");
            (listing.folders, ExitCode::SUCCESS)
        },
        Err(e) => {
            tracing::error!(error = ?e, "Could not list folders");
            let code = match &*e {
                CatalogErrorKind::Connectivity => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            };
            (Vec::new(), code)
        },
    };
    emit(output::write_folders(&mut io::stdout().lock(), &folders, args.json), code)
}

async fn fetch(app: &App, args: FetchArgs) -> ExitCode {
    let retriever = match app.retriever() {
        Ok(retriever) => retriever,
        Err(e) => {
            tracing::error!(error = ?e, "Could not set up image retrieval");
            return ExitCode::FAILURE;
        },
    };
    let (images, code) = match retriever.fetch_folder_images(&args.folder).await {
        Ok(retrieval) => {
            if !retrieval.skipped.is_empty() {
                tracing::warn!(skipped = ?retrieval.skipped, "Some images could not be staged");
            }
            tracing::info!(
                images = retrieval.images.len(),
                staging = %retriever.staging().dir().display(),
                "Staged images"
            );
            (retrieval.images, ExitCode::SUCCESS)
        },
        Err(e) => {
            tracing::error!(error = ?e, folder = %args.folder, "Could not fetch images");
            let code = match &*e {
                RetrieveErrorKind::Connectivity => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            };
            (Vec::new(), code)
        },
    };
    emit(output::write_images(&mut io::stdout().lock(), &images, args.json), code)
}

async fn cache(app: &App, command: CacheCommand) -> ExitCode {
    let catalog = match app.catalog().await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!(error = ?e, "Could not set up the catalog");
            return ExitCode::FAILURE;
        },
    };
    match command {
        CacheCommand::Clear => match catalog.clear().await {
            Ok(removed) => {
                tracing::info!(removed, "Cleared stored snapshots");
                ExitCode::SUCCESS
            },
            Err(e) => {
                tracing::error!(error = ?e, "Could not clear stored snapshots");
                ExitCode::FAILURE
            },
        },
        CacheCommand::Invalidate(QueryArgs { base, depth }) => {
            let depth = depth.unwrap_or(app.config().crawl.max_depth);
            match catalog.invalidate(&base, depth).await {
                Ok(true) => {
                    tracing::info!(base = %base, depth, "Removed stored snapshot");
                    ExitCode::SUCCESS
                },
                Ok(false) => {
                    tracing::info!(base = %base, depth, "No snapshot stored for this query");
                    ExitCode::SUCCESS
                },
                Err(e) => {
                    tracing::error!(error = ?e, "Could not remove stored snapshot");
                    ExitCode::FAILURE
                },
            }
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = ?e, "Could not load configuration");
            return ExitCode::FAILURE;
        },
    };
    let app = App::new(config);

    match cli.command {
        Command::Folders(args) => folders(&app, args).await,
        Command::Fetch(args) => fetch(&app, args).await,
        Command::Cache(command) => cache(&app, command).await,
    }
}
