use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use log::{error, info};
use media_preview::component::media_library::MediaLibrary;
use media_preview::config::{AppConfig, Cli};
use media_preview::init;
use media_preview::server::{self, AppState};
use media_preview::signal::setup_shutdown_signal;
use media_preview::tools::launch_browser;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    init::init();

    let config = AppConfig::from_cli(Cli::parse())?;
    let library = MediaLibrary::from_files(&config.files)?;

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("無法監聽 {}", config.listen_addr))?;
    let addr = listener.local_addr().context("無法取得監聽位址")?;

    let url = format!("http://{addr}/#token={}", config.token);
    println!("Serving application on {}", style(&url).cyan().underlined());

    if config.auto_launch {
        launch_browser(&url);
    }

    let state = AppState::new(config, library, setup_shutdown_signal());
    if let Err(e) = server::serve(listener, state).await {
        error!("伺服器錯誤: {e:#}");
        eprintln!("{} {e:#}", style("錯誤:").red().bold());
        return Err(e);
    }

    println!("\n{}", style("伺服器已關閉").green().bold());
    info!("Program exited normally");
    Ok(())
}
