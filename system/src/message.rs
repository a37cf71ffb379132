use crate::{ConnectionId, ProtocolError, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::convert::TryFrom;

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing field is `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Coordinates and brush of a stroke sample, exactly as the client sent them.
///
/// The fields are not validated; whatever JSON value arrives, `null` included, is
/// stored and relayed, and a missing field stays missing on the way out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub x: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub y: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub tool: Option<Value>,
}

impl StrokePoint {
    /// Reads the fields of an object payload. Any other payload has no fields.
    fn from_payload(data: Value) -> Self {
        if data.is_object() {
            serde_json::from_value(data).unwrap_or_default()
        } else {
            Self::default()
        }
    }
}

/// An entry of the canvas log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawEvent {
    Start {
        #[serde(flatten)]
        point: StrokePoint,
        timestamp: Timestamp,
        #[serde(rename = "userId")]
        user_id: ConnectionId,
    },
    Move {
        #[serde(flatten)]
        point: StrokePoint,
        timestamp: Timestamp,
        #[serde(rename = "userId")]
        user_id: ConnectionId,
    },
    End {
        timestamp: Timestamp,
        #[serde(rename = "userId")]
        user_id: ConnectionId,
    },
}

impl DrawEvent {
    pub fn user_id(&self) -> ConnectionId {
        match self {
            Self::Start { user_id, .. } | Self::Move { user_id, .. } | Self::End { user_id, .. } => {
                *user_id
            }
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Start { timestamp, .. }
            | Self::Move { timestamp, .. }
            | Self::End { timestamp, .. } => *timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetColorRequest {
    #[serde(default)]
    pub color: Option<Value>,
}

impl SetColorRequest {
    fn from_payload(data: Value) -> Self {
        match data {
            Value::Object(mut fields) => Self {
                color: fields.remove("color"),
            },
            _ => Self::default(),
        }
    }

    /// Requested color; anything but a JSON string reads as empty.
    pub fn requested(&self) -> &str {
        self.color.as_ref().and_then(Value::as_str).unwrap_or("")
    }
}

/// Messages a connection may send.
///
/// Decoding is lenient about `data`: events without a payload ignore whatever is sent,
/// and stroke events with a missing or non-object payload carry no fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    RequestColor,
    DrawingStart(StrokePoint),
    DrawingMove(StrokePoint),
    DrawingEnd,
    ClearCanvas,
    SetColor(SetColorRequest),
}

#[derive(Deserialize)]
struct RawClientMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl TryFrom<RawClientMessage> for ClientMessage {
    type Error = String;

    fn try_from(raw: RawClientMessage) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "requestColor" => Ok(Self::RequestColor),
            "drawingStart" => Ok(Self::DrawingStart(StrokePoint::from_payload(raw.data))),
            "drawingMove" => Ok(Self::DrawingMove(StrokePoint::from_payload(raw.data))),
            "drawingEnd" => Ok(Self::DrawingEnd),
            "clearCanvas" => Ok(Self::ClearCanvas),
            "setColor" => Ok(Self::SetColor(SetColorRequest::from_payload(raw.data))),
            other => Err(format!("unknown message type {:?}", other)),
        }
    }
}

impl<'de> Deserialize<'de> for ClientMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawClientMessage::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl ClientMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorNotice {
    pub color: String,
    #[serde(rename = "colorName")]
    pub color_name: String,
    #[serde(rename = "userId")]
    pub user_id: ConnectionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeNotice {
    #[serde(flatten)]
    pub point: StrokePoint,
    #[serde(rename = "userId")]
    pub user_id: ConnectionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndNotice {
    #[serde(rename = "userId")]
    pub user_id: ConnectionId,
}

/// Messages the server sends to connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    ColorAssigned(ColorNotice),
    OtherUserColor(ColorNotice),
    CanvasState(Vec<DrawEvent>),
    DrawingStart(StrokeNotice),
    DrawingMove(StrokeNotice),
    DrawingEnd(EndNotice),
    CanvasCleared,
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}
