//! Payload schema and viewer-facing rendering
//!
//! The relay treats payloads as opaque bytes everywhere except immediately
//! before delivery: the broadcast server decodes each payload into an
//! [`SaeMessage`] and renders it as JSON, which is what viewers receive as a
//! text frame. The schema mirrors the detection message produced by the
//! upstream pipeline; the pipeline itself is an external collaborator.

pub mod sae;

pub use sae::{render, BoundingBox, Detection, SaeMessage, Shape, VideoFrame};
