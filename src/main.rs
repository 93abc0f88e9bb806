use std::net::TcpListener;

use anyhow::Context;

use order_intake::app;
use order_intake::domain::UiFlag;
use order_intake::repo;
use order_intake::settings::Settings;
use order_intake::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber(telemetry::env_filter(), std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load().context("Failed to load settings")?;

    let store = repo::connect(&settings.database).await?;
    let ui_flag = UiFlag::new(settings.ui.enabled);

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    app::run(listener, store, ui_flag)?
        .await
        .context("Failed to run app")
}
