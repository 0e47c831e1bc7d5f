use async_trait::async_trait;
use anyhow::Result;
use crate::db::models::{ActivityEntry, NewActivity};

/// Repository trait for the card activity log (audit trail)
///
/// The relational store behind it belongs to the board service; the
/// notification path only needs to append and read back.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Append an activity record
    async fn append(&self, activity: NewActivity) -> Result<ActivityEntry>;

    /// Most recent activity for one card, newest first
    async fn list_by_card(&self, card_id: &str, limit: usize) -> Result<Vec<ActivityEntry>>;

    /// Most recent activity for a whole board, newest first
    async fn list_by_board(&self, board_id: &str, limit: usize) -> Result<Vec<ActivityEntry>>;
}
