//! Pipeline tests against the in-memory store and offline doubles.

mod pipeline;
mod support;
