//! Wire protocol: request/response envelopes and the session codec.
//!
//! The orchestrator speaks newline-delimited JSON envelopes over a single
//! TCP stream; each request yields exactly one response, in order.

pub mod envelope;
pub mod wire;

pub use envelope::{
    MessageKind, RequestEnvelope, RequestPayload, ResponseEnvelope, ResponsePayload,
};
pub use wire::{read_request, write_response};
