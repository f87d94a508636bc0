use clap::{Args, ValueEnum};

use fridge_core::{CollectionPath, FridgeSession, SessionContext};

use super::CommandError;

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum ListTarget {
    #[default]
    Fridge,
    Grocery,
}

impl From<ListTarget> for CollectionPath {
    fn from(target: ListTarget) -> Self {
        match target {
            ListTarget::Fridge => CollectionPath::Fridge,
            ListTarget::Grocery => CollectionPath::GroceryList,
        }
    }
}

/// Print the fridge or the grocery list
#[derive(Args)]
pub struct ListCommand {
    /// Collection to print
    #[arg(value_enum, default_value = "fridge")]
    target: ListTarget,
}

impl ListCommand {
    pub async fn run(&self, ctx: SessionContext) -> Result<(), CommandError> {
        let path = CollectionPath::from(self.target);
        let session = FridgeSession::open_detached(ctx).await;
        let items = session.sync().fetch(path).await?;

        println!("{}", path);
        println!("{}\n", "=".repeat(path.as_str().len()));
        if items.is_empty() {
            println!("(empty)");
        }
        for item in &items {
            println!("{}", item);
        }
        Ok(())
    }
}
