use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What happened to a card, as recorded in the audit trail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Moved,
    Assigned,
    Unassigned,
    StatusChanged,
    Comment,
    DependencyAdded,
    DependencyRemoved,
    LabelAdded,
    LabelRemoved,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Created => "created",
            ActivityAction::Moved => "moved",
            ActivityAction::Assigned => "assigned",
            ActivityAction::Unassigned => "unassigned",
            ActivityAction::StatusChanged => "status_changed",
            ActivityAction::Comment => "comment",
            ActivityAction::DependencyAdded => "dependency_added",
            ActivityAction::DependencyRemoved => "dependency_removed",
            ActivityAction::LabelAdded => "label_added",
            ActivityAction::LabelRemoved => "label_removed",
        }
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(ActivityAction::Created),
            "moved" => Ok(ActivityAction::Moved),
            "assigned" => Ok(ActivityAction::Assigned),
            "unassigned" => Ok(ActivityAction::Unassigned),
            "status_changed" => Ok(ActivityAction::StatusChanged),
            "comment" => Ok(ActivityAction::Comment),
            "dependency_added" => Ok(ActivityAction::DependencyAdded),
            "dependency_removed" => Ok(ActivityAction::DependencyRemoved),
            "label_added" => Ok(ActivityAction::LabelAdded),
            "label_removed" => Ok(ActivityAction::LabelRemoved),
            _ => Err(format!("Invalid activity action: {}", s)),
        }
    }
}

/// A stored audit record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub id: String,
    pub board_id: String,
    pub card_id: String,
    pub actor: String,
    pub action: ActivityAction,
    pub detail: Value,
    pub created_at: DateTime<Utc>,
}

/// An audit record to append
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewActivity {
    pub board_id: String,
    pub card_id: String,
    pub actor: String,
    pub action: ActivityAction,
    pub detail: Value,
}

impl NewActivity {
    pub fn new(
        board_id: impl Into<String>,
        card_id: impl Into<String>,
        actor: impl Into<String>,
        action: ActivityAction,
        detail: Value,
    ) -> Self {
        Self {
            board_id: board_id.into(),
            card_id: card_id.into(),
            actor: actor.into(),
            action,
            detail,
        }
    }
}
