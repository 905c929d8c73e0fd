use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sync::SyncError;

/// Keystroke form of an edit: one key code typed at a caret offset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeystrokeEdit {
    pub caret_position: usize,
    pub key_pressed: u32,
}

/// Payload of `updateInput`, echoed unchanged in `update`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum EditPayload {
    Keystroke(KeystrokeEdit),
    FullText(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaretMessage {
    pub caret_position: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PongMessage {
    pub date: String,
}

/// Raw frame as it arrives on the socket: `{"event": ..., "data": ...}`.
#[derive(Deserialize, Debug)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceivedMessage {
    GetIp,
    UpdateInput(EditPayload),
    UpdateCaret(CaretMessage),
    Ping,
}

impl ReceivedMessage {
    /// Decode a text frame. Any failure is reported as a malformed payload for
    /// the named event so that only this frame gets dropped.
    pub fn parse(frame: &str) -> Result<Self, SyncError> {
        let envelope: Envelope = serde_json::from_str(frame)
            .map_err(|e| SyncError::malformed("<frame>", e.to_string()))?;

        match envelope.event.as_str() {
            "getIP" => Ok(ReceivedMessage::GetIp),
            "ping" => Ok(ReceivedMessage::Ping),
            "updateInput" => serde_json::from_value(envelope.data)
                .map(ReceivedMessage::UpdateInput)
                .map_err(|e| SyncError::malformed("updateInput", e.to_string())),
            "updateCaret" => serde_json::from_value(envelope.data)
                .map(ReceivedMessage::UpdateCaret)
                .map_err(|e| SyncError::malformed("updateCaret", e.to_string())),
            other => Err(SyncError::malformed(other, "unknown event")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum SendMessage {
    Sync(String),
    Update(EditPayload),
    Ip(String),
    Pong(PongMessage),
}
