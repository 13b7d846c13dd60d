use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsdeck::config::Config;
use newsdeck::fetcher::FeedClient;
use newsdeck::input::{parse_command, Command, HELP};
use newsdeck::scheduler::RefreshScheduler;
use newsdeck::session::Session;
use newsdeck::store::SqliteStore;
use newsdeck::theme::system_prefers_dark;
use newsdeck::view;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsdeck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config_path =
        std::env::var("NEWSDECK_CONFIG").unwrap_or_else(|_| "newsdeck.toml".to_string());
    let mut config = Config::load_or_default(&config_path)?;
    if let Ok(url) = std::env::var("NEWSDECK_DATABASE_URL") {
        config.storage.url = url;
    }
    info!("Using feed at {}", config.api_base_url);

    // Open storage, falling back to memory so the session still works
    let store = match SqliteStore::open(&config.storage.url).await {
        Ok(store) => store,
        Err(e) => {
            warn!("Storage unavailable ({}), settings will not persist", e);
            SqliteStore::in_memory().await?
        }
    };
    let store = Arc::new(store);

    let mut session = Session::new(
        store,
        &config.storage.namespace,
        config.debounce_delay(),
        system_prefers_dark(),
    )
    .await;

    // Start refreshing
    let client = Arc::new(FeedClient::new(&config.api_base_url, config.request_timeout())?);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let scheduler = RefreshScheduler::start(client, config.refresh_period(), event_tx);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print!("{}", view::render(&session));

    loop {
        let deadline = session.search_deadline();

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Command::Quit => break,
                    Command::Search(text) => {
                        session.on_search_input(text, Instant::now());
                    }
                    Command::ToggleFavorite(index) => {
                        if session.toggle_favorite(index).await.is_none() {
                            println!("There is no item {}.", index + 1);
                            continue;
                        }
                    }
                    Command::ToggleTheme => {
                        session.toggle_theme().await;
                    }
                    Command::Refresh => {
                        scheduler.refresh_now();
                        continue;
                    }
                    Command::Help => {
                        println!("{}", HELP);
                        continue;
                    }
                    Command::Unknown(command) => {
                        println!("Unknown command {:?}, type :help", command);
                        continue;
                    }
                }
            }
            Some(event) = event_rx.recv() => session.handle_event(event),
            _ = wait_for(deadline) => {
                if !session.poll_query(Instant::now()) {
                    continue;
                }
            }
        }

        print!("{}", view::render(&session));
    }

    session.shutdown();
    scheduler.shutdown().await;

    Ok(())
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
