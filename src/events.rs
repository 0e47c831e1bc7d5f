use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Domain action names carried by board events.
///
/// The known vocabulary covers every mutation the board service emits.
/// `Other` keeps the set open so newer emitters do not need a bus release.
/// Build values from names with `EventType::from`; a known name always
/// resolves to its variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    BoardUpdated,
    ListCreated,
    ListUpdated,
    ListDeleted,
    CardCreated,
    CardUpdated,
    CardMoved,
    CardDeleted,
    LabelCreated,
    LabelUpdated,
    LabelDeleted,
    ActivityNew,
    Other(CustomEventType),
}

/// A name outside the known vocabulary.
///
/// Only `EventType::from` creates one, so it can never hold a known name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomEventType(String);

impl CustomEventType {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::BoardUpdated => "board.updated",
            EventType::ListCreated => "list.created",
            EventType::ListUpdated => "list.updated",
            EventType::ListDeleted => "list.deleted",
            EventType::CardCreated => "card.created",
            EventType::CardUpdated => "card.updated",
            EventType::CardMoved => "card.moved",
            EventType::CardDeleted => "card.deleted",
            EventType::LabelCreated => "label.created",
            EventType::LabelUpdated => "label.updated",
            EventType::LabelDeleted => "label.deleted",
            EventType::ActivityNew => "activity.new",
            EventType::Other(name) => name.as_str(),
        }
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        match name {
            "board.updated" => EventType::BoardUpdated,
            "list.created" => EventType::ListCreated,
            "list.updated" => EventType::ListUpdated,
            "list.deleted" => EventType::ListDeleted,
            "card.created" => EventType::CardCreated,
            "card.updated" => EventType::CardUpdated,
            "card.moved" => EventType::CardMoved,
            "card.deleted" => EventType::CardDeleted,
            "label.created" => EventType::LabelCreated,
            "label.updated" => EventType::LabelUpdated,
            "label.deleted" => EventType::LabelDeleted,
            "activity.new" => EventType::ActivityNew,
            other => EventType::Other(CustomEventType(other.to_string())),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(EventType::from(name.as_str()))
    }
}

/// A sequenced notification of one board mutation.
///
/// Events reach subscribers as `Arc<Event>` and are never mutated after
/// the sequencer stamps them.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub sequence: u64,
    pub topic: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub payload: Value,
}

impl Event {
    pub fn new(
        sequence: u64,
        topic: impl Into<String>,
        event_type: EventType,
        payload: Value,
    ) -> Self {
        Self {
            sequence,
            topic: topic.into(),
            event_type,
            payload,
        }
    }
}
