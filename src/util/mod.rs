//! Text and URL helpers shared by the extractor and the terminal shell.
//!
//! - **Text**: control-character stripping for feed-supplied strings,
//!   whitespace collapsing, and width-aware truncation for table output
//! - **URL validation**: SSRF guard for user-supplied feed URLs

mod text;
mod url_validator;

pub use text::{collapse_whitespace, display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url, UrlValidationError};
