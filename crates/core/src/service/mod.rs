//! Conversion service client.
//!
//! The actual transcoding happens on a remote endpoint; this module owns
//! the wire exchange with it: a one-shot capability query (`GET
//! /api/convert`) and a per-image multipart upload (`POST /api/convert`)
//! that returns the converted payload.

mod capabilities;
mod error;
mod http;
mod traits;
mod types;

pub use capabilities::{FormatCapabilities, PREFERRED_FORMAT};
pub use error::ConvertError;
pub use http::HttpConvertService;
pub use traits::ConvertService;
pub use types::{extension_for, output_name, ConversionSettings, ConvertedImage};
