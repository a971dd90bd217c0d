//! Judge internals.
//!
//! - prompt.rs: rubric and prompt builders only
//! - schema.rs: response schema, fence stripping, payload validation
//! - client.rs: the judge call and its parse boundary

pub(crate) mod client;
pub(crate) mod prompt;
pub(crate) mod schema;
