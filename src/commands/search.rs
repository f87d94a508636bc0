use clap::Args;

use fridge_core::{FridgeSession, SearchOutcome, SessionContext};

use super::CommandError;

/// Look up foods in the food database
#[derive(Args)]
pub struct SearchCommand {
    /// Food name to look up
    query: String,
}

impl SearchCommand {
    pub async fn run(&self, ctx: SessionContext) -> Result<(), CommandError> {
        let session = FridgeSession::open_detached(ctx).await;
        let engine = session.search();
        engine.set_query(self.query.as_str());
        let snapshot = engine.settled().await;

        match snapshot.outcome {
            SearchOutcome::Failed(e) => {
                if e.is_network() {
                    eprintln!("Check food_api.base_url and the API credentials (fridge config).");
                }
                return Err(e.into());
            }
            SearchOutcome::Empty => println!("No foods found for '{}'.", self.query),
            _ => {
                let visible = snapshot.visible();
                if visible.is_empty() {
                    println!("No foods named like '{}'.", self.query);
                }
                for (i, food) in visible.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, food);
                }
            }
        }
        Ok(())
    }
}
