//! Wiki CLI: runs the web server and offers direct access to the page store.
//!
//! `wiki serve` starts the HTTP server. The `page` subcommands read and write
//! revisions without a server; their output is JSON by default, with an
//! optional `--pretty` flag for human readability.

use clap::{Parser, Subcommand};
use std::io::{self, Read as _};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wiki::config::ServerConfig;
use wiki::db::{Store, WikiError};
use wiki::models::VersionSelector;
use wiki::output::{self, History, OutputMode, Saved};
use wiki::state::AppState;
use wiki::{render, repo, resolver, router, validation};

/// A minimal personal wiki with versioned pages.
#[derive(Parser)]
#[command(name = "wiki", version, about)]
struct Cli {
    /// Output in human-readable format instead of JSON.
    #[arg(long, global = true)]
    pretty: bool,

    /// SQLite database file (default: $WIKI_DB or ./wiki.db).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server.
    Serve {
        /// Bind address (default: $HOST or 0.0.0.0).
        #[arg(long)]
        host: Option<String>,
        /// Bind port (default: $PORT or 9999).
        #[arg(long)]
        port: Option<u16>,
        /// Directory served under /static (default: $WIKI_STATIC_DIR or ./static).
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Read and write pages directly.
    Page {
        #[command(subcommand)]
        action: PageAction,
    },
}

#[derive(Subcommand)]
enum PageAction {
    /// Save a new revision of a page.
    Save {
        /// Page name (letters and digits).
        name: String,
        /// Page content (markdown).
        #[arg(long)]
        body: Option<String>,
        /// Read body from stdin.
        #[arg(long)]
        stdin: bool,
    },
    /// Show the current or a specific revision of a page, rendered.
    Show {
        /// Page name.
        name: String,
        /// Revision id to show instead of the current one.
        #[arg(long)]
        rev: Option<String>,
    },
    /// List every revision id of a page.
    History {
        /// Page name.
        name: String,
    },
    /// Render markdown to HTML without touching the store.
    Render {
        /// Markdown source.
        #[arg(long)]
        body: Option<String>,
        /// Read source from stdin.
        #[arg(long)]
        stdin: bool,
    },
}

/// Read body content from --body flag or --stdin.
///
/// Stdin is taken as raw bytes; page content need not be UTF-8.
fn read_body(body: &Option<String>, stdin: bool) -> Result<Vec<u8>, WikiError> {
    if stdin {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf).map_err(WikiError::Io)?;
        Ok(buf)
    } else if let Some(b) = body {
        Ok(b.clone().into_bytes())
    } else {
        Ok(Vec::new())
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wiki=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn serve(config: ServerConfig) -> Result<(), WikiError> {
    // Failing to open the store is the one fatal condition.
    let store = Store::open_at(&config.db_path)?;
    tracing::info!(path = %config.db_path.display(), "Page store opened");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let addr = config.bind_addr();
        let app = router::build_app_router(AppState::new(store, config));

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Starting server on {addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok::<(), WikiError>(())
    })
}

fn run() -> Result<(), WikiError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let mode = if cli.pretty {
        OutputMode::Pretty
    } else {
        OutputMode::Json
    };

    let mut config = ServerConfig::from_env()?;
    if let Some(ref db) = cli.db {
        config.db_path = db.clone();
    }

    match &cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            if let Some(h) = host {
                config.host = h.clone();
            }
            if let Some(p) = port {
                config.port = *p;
            }
            if let Some(d) = static_dir {
                config.static_dir = d.clone();
            }
            serve(config)?;
        }

        Commands::Page { action } => match action {
            PageAction::Save { name, body, stdin } => {
                validation::validate_page_name(name)?;
                let content = read_body(body, *stdin)?;
                let store = Store::open_at(&config.db_path)?;
                let id = store.with_conn(|conn| repo::save_page(conn, name, &content))?;
                let saved = Saved {
                    name: name.clone(),
                    id,
                };
                output::print(mode, &saved, || output::print_pretty_saved(&saved));
            }
            PageAction::Show { name, rev } => {
                validation::validate_page_name(name)?;
                let version = match rev {
                    Some(token) => Some(resolver::parse_version_token(token)?),
                    None => None,
                };
                let store = Store::open_at(&config.db_path)?;
                let view = store.with_conn(|conn| {
                    resolver::load_view(conn, name, VersionSelector::from_option(version))
                })?;
                output::print(mode, &view, || output::print_pretty_view(&view));
            }
            PageAction::History { name } => {
                validation::validate_page_name(name)?;
                let store = Store::open_at(&config.db_path)?;
                let versions = store.with_conn(|conn| repo::list_version_ids(conn, name))?;
                let history = History {
                    name: name.clone(),
                    versions,
                };
                output::print(mode, &history, || output::print_pretty_history(&history));
            }
            PageAction::Render { body, stdin } => {
                let source = read_body(body, *stdin)?;
                let rendered = render::render(&source);
                output::print(mode, &rendered, || output::print_pretty_rendered(&rendered));
            }
        },
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        let error_json = serde_json::json!({
            "error": e.to_string()
        });
        eprintln!("{}", error_json);
        process::exit(1);
    }
}
