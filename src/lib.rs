pub mod cli;
pub mod client;
pub mod expand;
pub mod history;
pub mod markup;
pub mod models;
pub mod session;
pub mod theme;
pub mod view;
pub mod widget;

use cli::Args;
use client::{ new_client, ClientConfig };
use history::{ initialize_prefs_store, initialize_session_store };
use log::info;
use std::error::Error;
use theme::ThemeToggle;
use tokio::io::{ AsyncBufReadExt, BufReader };
use tokio_stream::wrappers::LinesStream;
use view::TerminalView;
use widget::ChatWidget;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Chat Configuration ---");
    info!("Endpoint URL: {}", args.endpoint_url);
    info!("Request Timeout: {:?}", args.request_timeout());
    info!("Session Store: {}", args.session_store);
    info!("History Key: {}", args.history_key);
    info!("Preferences Dir: {}", args.prefs_dir);
    info!("-------------------------");

    let client = new_client(&ClientConfig {
        endpoint_url: args.endpoint_url.clone(),
        timeout: args.request_timeout(),
    })?;
    let session_store = initialize_session_store(&args)?;
    let mut theme = ThemeToggle::load(initialize_prefs_store(&args)).await;

    let view = TerminalView::stdout(theme.current(), args.preview_len);
    let mut widget = ChatWidget::new(session_store, args.history_key.clone(), client, view);

    let lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    session::run_session(&mut widget, &mut theme, lines).await;

    Ok(())
}
