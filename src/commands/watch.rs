use chrono::Local;
use clap::Args;

use fridge_core::{CollectionPath, FridgeSession, SessionContext};

use super::CommandError;

/// Watch the fridge and post expiry notices on every change
#[derive(Args)]
pub struct WatchCommand {}

impl WatchCommand {
    pub async fn run(&self, ctx: SessionContext) -> Result<(), CommandError> {
        let session = FridgeSession::open_detached(ctx).await;
        let monitor = session.monitor().clone();
        let subscription = session.sync().subscribe(CollectionPath::Fridge);

        println!("Watching the fridge. Press Ctrl-C to stop.");
        tokio::select! {
            posted = monitor.run(subscription, || Local::now().naive_local()) => {
                tracing::warn!("Fridge listener ended after {} notice(s)", posted);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping");
            }
        }

        session.close();
        Ok(())
    }
}
