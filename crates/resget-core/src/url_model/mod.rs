//! URL modeling and local target derivation.
//!
//! Maps a URL plus an optional Content-Disposition filename to a path under
//! the output directory, sanitized for Linux filesystems.

mod content_disposition;
mod path;
mod sanitize;

pub use content_disposition::parse_content_disposition_filename;
pub use path::local_target;
pub use sanitize::sanitize_filename_for_linux;

/// Default filename when the URL path yields nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";
