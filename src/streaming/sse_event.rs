use axum::response::sse::Event as SseEvent;

use crate::events::Event;

/// Map a bus event onto one event-stream message: `id`, `event`, `data`, in that order.
///
/// Compact JSON escapes control characters, so `data` stays on one line.
pub fn to_sse_event(event: &Event) -> Result<SseEvent, axum::Error> {
    // axum rejects line breaks in field values; custom type names may carry them
    let name: String = event
        .event_type
        .as_str()
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();

    SseEvent::default()
        .id(event.sequence.to_string())
        .event(name)
        .json_data(&event.payload)
}
