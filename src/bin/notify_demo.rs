//! Sends one test email through the configured SMTP transport.

use jobwatch::config::MonitorConfig;
use jobwatch::notify::{EmailSender, Notifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = MonitorConfig::from_env()?;
    let sender = EmailSender::new(&cfg.smtp)?;

    sender
        .notify(
            "jobwatch test",
            "If you can read this, SMTP delivery works.\n",
        )
        .await?;

    println!("notify-demo done");
    Ok(())
}
