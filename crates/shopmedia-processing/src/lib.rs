//! Shopmedia Processing Library
//!
//! Upload validation, image metadata extraction and derived-variant
//! rendering. Storage backends call into this crate; it performs no I/O of
//! its own.

pub mod imaging;
pub mod validator;

pub use imaging::{decode_image, extract_metadata, render_variant};
pub use validator::{MediaValidator, ValidationError};
