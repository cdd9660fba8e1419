//! Detection message schema (prost) and JSON rendering
//!
//! Field names in the JSON rendering are camelCase and unset optional fields
//! are omitted, matching the canonical protobuf JSON mapping the original
//! pipeline viewers consume. Object ids are raw bytes on the wire and are
//! rendered base64, again per the protobuf JSON mapping.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use prost::Message;
use serde::{Serialize, Serializer};

use crate::error::Result;

/// Top-level message flowing through the pipeline
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaeMessage {
    /// Frame the detections belong to
    #[prost(message, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<VideoFrame>,

    /// Detections in this frame
    #[prost(message, repeated, tag = "2")]
    pub detections: Vec<Detection>,
}

/// Source frame metadata
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFrame {
    /// Identifier of the originating camera/source
    #[prost(string, tag = "1")]
    pub source_id: String,

    /// Capture timestamp, UTC milliseconds
    #[prost(uint64, tag = "2")]
    pub timestamp_utc_ms: u64,

    /// Frame dimensions
    #[prost(message, optional, tag = "3")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
}

/// Frame dimensions in pixels
#[derive(Clone, Copy, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[prost(uint32, tag = "1")]
    pub width: u32,

    #[prost(uint32, tag = "2")]
    pub height: u32,
}

/// A single detected object
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    /// Normalized bounding box (coordinates in [0, 1])
    #[prost(message, optional, tag = "1")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,

    /// Detector confidence in [0, 1]
    #[prost(float, tag = "2")]
    pub confidence: f32,

    /// Object class id
    #[prost(uint32, tag = "3")]
    pub class_id: u32,

    /// Tracker-assigned object id (opaque bytes)
    #[prost(bytes = "vec", tag = "4")]
    #[serde(serialize_with = "ser_base64")]
    pub object_id: Vec<u8>,
}

/// Normalized bounding box
#[derive(Clone, Copy, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    #[prost(float, tag = "1")]
    pub min_x: f32,

    #[prost(float, tag = "2")]
    pub min_y: f32,

    #[prost(float, tag = "3")]
    pub max_x: f32,

    #[prost(float, tag = "4")]
    pub max_y: f32,
}

impl SaeMessage {
    /// Render this message as the JSON text sent to viewers
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Decode a payload and render it as viewer-facing JSON
pub fn render(payload: &[u8]) -> Result<String> {
    let msg = SaeMessage::decode(payload)?;
    msg.to_json()
}

fn ser_base64<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn sample_message() -> SaeMessage {
        SaeMessage {
            frame: Some(VideoFrame {
                source_id: "cam1".to_string(),
                timestamp_utc_ms: 1_700_000_000_000,
                shape: Some(Shape {
                    width: 1920,
                    height: 1080,
                }),
            }),
            detections: vec![Detection {
                bounding_box: Some(BoundingBox {
                    min_x: 0.1,
                    min_y: 0.2,
                    max_x: 0.3,
                    max_y: 0.4,
                }),
                confidence: 0.95,
                class_id: 2,
                object_id: vec![0xde, 0xad, 0xbe, 0xef],
            }],
        }
    }

    #[test]
    fn test_decode_roundtrip() {
        let msg = sample_message();
        let encoded = msg.encode_to_vec();

        let decoded = SaeMessage::decode(encoded.as_slice()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = sample_message().to_json().unwrap();

        assert!(json.contains("\"sourceId\":\"cam1\""));
        assert!(json.contains("\"timestampUtcMs\":1700000000000"));
        assert!(json.contains("\"boundingBox\""));
        assert!(json.contains("\"minX\""));
        assert!(json.contains("\"classId\":2"));
    }

    #[test]
    fn test_json_renders_object_id_base64() {
        let json = sample_message().to_json().unwrap();

        // 0xdeadbeef in standard base64
        assert!(json.contains("\"objectId\":\"3q2+7w==\""));
    }

    #[test]
    fn test_json_omits_unset_frame() {
        let msg = SaeMessage {
            frame: None,
            detections: Vec::new(),
        };

        let json = msg.to_json().unwrap();
        assert!(!json.contains("frame"));
    }

    #[test]
    fn test_render_rejects_malformed_payload() {
        // Field 1, length-delimited, declared length far past the buffer end
        let malformed = [0x0A, 0xFF, 0x01, 0x02];

        let result = render(&malformed);
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_render_end_to_end() {
        let encoded = sample_message().encode_to_vec();

        let json = render(&encoded).unwrap();
        assert!(json.contains("\"confidence\":0.95"));
    }
}
