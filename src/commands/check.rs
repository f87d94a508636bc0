use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;

use fridge_core::{CollectionPath, FridgeSession, SessionContext};

use super::CommandError;

/// Check the fridge once and post a notice for each expiring item
#[derive(Args)]
pub struct CheckCommand {
    /// Reference time (RFC 3339 or YYYY-MM-DD); defaults to now
    #[arg(long)]
    at: Option<String>,
}

impl CheckCommand {
    pub async fn run(&self, ctx: SessionContext) -> Result<(), CommandError> {
        let reference = match &self.at {
            Some(s) => parse_reference(s)?,
            None => Local::now().naive_local(),
        };

        let session = FridgeSession::open_detached(ctx).await;
        let items = session.sync().fetch(CollectionPath::Fridge).await?;
        let posted = session.notify_expiring(reference);

        if posted.is_empty() {
            println!("Nothing expiring ({} item(s) checked).", items.len());
        } else {
            for notification in &posted {
                println!("{}", notification);
            }
        }
        Ok(())
    }
}

/// Parses an RFC 3339 instant (converted to local wall-clock time) or a
/// bare date (taken at local midnight).
pub fn parse_reference(s: &str) -> Result<NaiveDateTime, CommandError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| CommandError::InvalidTime(s.to_string()))
}
