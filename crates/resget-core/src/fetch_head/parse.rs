//! Parse HTTP response header lines into RemoteResource.

use super::RemoteResource;
use crate::url_model::parse_content_disposition_filename;

/// Parse collected header lines into RemoteResource.
pub(crate) fn parse_headers(lines: &[String]) -> RemoteResource {
    let mut remote = RemoteResource::default();

    for line in lines {
        let Some((name, value)) = line.trim().split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            remote.total_size = value.parse::<u64>().unwrap_or(0);
        } else if name.eq_ignore_ascii_case("accept-ranges") {
            remote.accepts_ranges = value == "bytes";
        } else if name.eq_ignore_ascii_case("content-disposition") {
            remote.suggested_filename = parse_content_disposition_filename(value);
        }
    }

    remote
}
