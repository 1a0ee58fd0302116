//! Core types for survey response export.
//!
//! Two families of types live here: the object graph supplied by the upstream
//! study service ([`definition`], [`response`]) and the descriptors extracted
//! from it ([`schema`]). This crate has no logic beyond construction and
//! classification; flattening lives in `survey-flatten`.

pub mod definition;
pub mod error;
pub mod response;
pub mod schema;

pub use error::{Error, Result};
