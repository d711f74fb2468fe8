//! Concrete [`TranslationProvider`](crate::provider::TranslationProvider) implementations.
//!
//! Each submodule speaks one vendor's API while conforming to the uniform
//! provider contract used by the tool handlers.

pub mod deepl;
