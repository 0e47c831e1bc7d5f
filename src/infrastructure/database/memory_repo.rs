use async_trait::async_trait;
use anyhow::Result;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

use crate::application::ports::repositories::ActivityRepository;
use crate::db::models::{ActivityEntry, NewActivity};

/// Entries kept per board by default
pub const DEFAULT_ACTIVITY_RETENTION: usize = 500;

#[derive(Default)]
struct ActivityLog {
    // Append counter; orders entries across boards
    next_seq: u64,
    boards: HashMap<String, VecDeque<(u64, ActivityEntry)>>,
}

/// In-memory implementation of ActivityRepository
///
/// Stands in for the board service's store when the notification service
/// runs on its own. Keeps the newest `retention` entries per board; older
/// ones are evicted. Contents are lost on restart.
pub struct InMemoryActivityRepository {
    log: RwLock<ActivityLog>,
    retention: usize,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_ACTIVITY_RETENTION)
    }

    pub fn with_retention(retention: usize) -> Self {
        Self {
            log: RwLock::new(ActivityLog::default()),
            retention: retention.max(1),
        }
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub async fn len(&self) -> usize {
        self.log.read().await.boards.values().map(VecDeque::len).sum()
    }

    async fn newest_where<F>(&self, limit: usize, keep: F) -> Vec<ActivityEntry>
    where
        F: Fn(&ActivityEntry) -> bool,
    {
        let log = self.log.read().await;
        let mut matches: Vec<&(u64, ActivityEntry)> = log
            .boards
            .values()
            .flat_map(|entries| entries.iter())
            .filter(|(_, entry)| keep(entry))
            .collect();
        matches.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        matches
            .into_iter()
            .take(limit)
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

impl Default for InMemoryActivityRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn append(&self, activity: NewActivity) -> Result<ActivityEntry> {
        let entry = ActivityEntry {
            id: uuid::Uuid::new_v4().to_string(),
            board_id: activity.board_id,
            card_id: activity.card_id,
            actor: activity.actor,
            action: activity.action,
            detail: activity.detail,
            created_at: Utc::now(),
        };

        let mut log = self.log.write().await;
        log.next_seq += 1;
        let seq = log.next_seq;
        let entries = log.boards.entry(entry.board_id.clone()).or_default();
        entries.push_back((seq, entry.clone()));
        while entries.len() > self.retention {
            entries.pop_front();
        }
        Ok(entry)
    }

    async fn list_by_card(&self, card_id: &str, limit: usize) -> Result<Vec<ActivityEntry>> {
        Ok(self.newest_where(limit, |e| e.card_id == card_id).await)
    }

    async fn list_by_board(&self, board_id: &str, limit: usize) -> Result<Vec<ActivityEntry>> {
        let log = self.log.read().await;
        Ok(log
            .boards
            .get(board_id)
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .take(limit)
                    .map(|(_, entry)| entry.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}
