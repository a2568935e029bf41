//! Axum extractors for request handling
//!
//! Slack signs every request; these extractors verify the signature
//! before the body is deserialized.

mod slack;

pub use slack::{SignedBody, SlackForm, SlackJson, SIGNATURE_HEADER, TIMESTAMP_HEADER};
