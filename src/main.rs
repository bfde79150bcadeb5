use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossterm::event::{Event, KeyCode, KeyModifiers};
use tokio::sync::{mpsc, watch};

use ticker_chart::coinbase::ws::CoinbaseWsClient;
use ticker_chart::config::{parse_interval_ms, Config};
use ticker_chart::engine::MarketRegistry;
use ticker_chart::event::AppEvent;
use ticker_chart::input::{parse_main_command, UiCommand};
use ticker_chart::ui::{self, AppState};

fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("failed to install rustls crypto provider"))?;

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set TICKER_CHART_CONFIG or create config/default.toml");
            std::process::exit(1);
        }
    };

    // Init tracing (log to file so it doesn't interfere with TUI)
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("failed to create log file {}", config.logging.file))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    let symbols = config.feed.symbols();
    let bucket_ms = config
        .aggregation
        .bucket_width_ms()
        .context("validated aggregation.bucket_width became invalid at runtime")?;

    tracing::info!(
        ws_url = %config.feed.ws_url,
        products = ?symbols,
        capacity = config.aggregation.capacity,
        bucket_ms,
        indicator_window = config.aggregation.indicator_window,
        indicator_mode = ?config.aggregation.indicator_mode,
        "Starting ticker-chart"
    );

    let registry = Arc::new(MarketRegistry::from_config(&symbols, &config.aggregation)?);

    // Channels
    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(256);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Ingestion task
    let ws_client = CoinbaseWsClient::new(&config.feed.ws_url, &config.feed.channel, symbols.clone());
    let ws_registry = Arc::clone(&registry);
    let ws_app_tx = app_tx.clone();
    let ws_handle = tokio::spawn(async move {
        if let Err(e) = ws_client
            .connect_and_run(ws_registry, ws_app_tx.clone(), shutdown_rx)
            .await
        {
            tracing::warn!(error = %e, "WS worker failed");
            let _ = ws_app_tx
                .send(AppEvent::Error(format!("WS worker failed: {:#}", e)))
                .await;
        }
    });

    // Ctrl+C handler
    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    // TUI main loop
    let mut terminal = ratatui::init();
    let mut app_state = AppState::new(
        symbols.clone(),
        bucket_ms,
        &config.aggregation.bucket_width,
        config.ui.visible_candles,
    );
    app_state.push_log(format!("ticker-chart started | {}", symbols.join(", ")));
    let mut shutdown_watch = shutdown_tx.subscribe();

    let result: Result<()> = loop {
        if *shutdown_watch.borrow_and_update() {
            break Ok(());
        }

        while let Ok(event) = app_rx.try_recv() {
            app_state.apply(event);
        }

        if !app_state.paused {
            let core = app_state
                .selected_symbol()
                .and_then(|symbol| registry.get(symbol))
                .cloned();
            if let Some(core) = core {
                let snapshot = core.pull_snapshot_with(app_state.bucket_ms);
                app_state.set_snapshot(snapshot);
            }
        }

        if let Err(e) = terminal.draw(|frame| ui::render(frame, &app_state, now_ms())) {
            break Err(e.into());
        }

        // Handle input (non-blocking with timeout)
        let polled = crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms));
        match polled {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => break Err(e.into()),
        }
        let key = match crossterm::event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(e) => break Err(e.into()),
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            tracing::info!("Ctrl+C received");
            break Ok(());
        }
        match parse_main_command(&key.code) {
            Some(UiCommand::Quit) => {
                tracing::info!("User quit");
                break Ok(());
            }
            Some(UiCommand::Pause) => {
                app_state.paused = true;
                app_state.push_log("[WARN] Display paused".to_string());
            }
            Some(UiCommand::Resume) => {
                app_state.paused = false;
                app_state.push_log("Display resumed".to_string());
            }
            Some(UiCommand::NextSymbol) => app_state.select_next(),
            Some(UiCommand::PrevSymbol) => app_state.select_prev(),
            Some(UiCommand::SwitchBucket(label)) => match parse_interval_ms(label) {
                Ok(ms) => app_state.set_bucket(ms, label),
                Err(e) => app_state.push_log(format!("[ERR] {:#}", e)),
            },
            None => {}
        }
    };

    let _ = shutdown_tx.send(true);
    drop(app_rx);
    ratatui::restore();

    if tokio::time::timeout(Duration::from_secs(3), ws_handle)
        .await
        .is_err()
    {
        tracing::warn!("WS worker did not stop in time");
    }

    tracing::info!("Shutdown complete");
    result
}
