//! Storage-sharing link rewrite.
//!
//! The engine sometimes delivers a result as a "view" link on a file
//! sharing host. Those pages cannot be rendered as an image, so the file
//! id is extracted and turned into a direct-download link. Three link
//! shapes are recognised:
//!
//! | Shape                                | Example                                        |
//! |--------------------------------------|------------------------------------------------|
//! | `/file/d/<ID>/...`                   | `https://drive.google.com/file/d/ABC/view`     |
//! | `/open?id=<ID>`                      | `https://drive.google.com/open?id=ABC`         |
//! | `/uc?...id=<ID>...`                  | `https://drive.google.com/uc?export=view&id=ABC` |
//!
//! Anything else, including links on other hosts, is returned unchanged.

use std::sync::LazyLock;

use regex::Regex;

/// Sharing host rewritten when no explicit list is configured.
pub const DEFAULT_SHARE_HOST: &str = "drive.google.com";

/// Splits an absolute http(s) URL into host, path and query.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([^/?#:]+)(?::\d+)?(/[^?#]*)?(?:\?([^#]*))?").expect("valid regex")
});

/// `/file/d/<ID>` anywhere in the path.
static FILE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/file/d/([A-Za-z0-9_-]+)").expect("valid regex"));

/// `id=<ID>` as a query parameter.
static ID_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|&)id=([A-Za-z0-9_-]+)").expect("valid regex"));

/// Rewrites view links on a fixed set of sharing hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinkRewriter {
    hosts: Vec<String>,
}

impl ShareLinkRewriter {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Return the direct-download form of `url`, or `url` itself when it
    /// is not a recognised sharing link.
    pub fn rewrite(&self, url: &str) -> String {
        match self.extract_file_id(url) {
            Some((host, id)) => {
                let direct = format!("https://{host}/uc?export=download&id={id}");
                tracing::debug!(original = %url, rewritten = %direct, "Rewrote share link");
                direct
            }
            None => url.to_string(),
        }
    }

    /// Host and file id of a recognised sharing link.
    fn extract_file_id<'a>(&self, url: &'a str) -> Option<(String, &'a str)> {
        let caps = URL_RE.captures(url)?;
        let host = caps.get(1)?.as_str().to_ascii_lowercase();
        if !self.hosts.iter().any(|h| *h == host) {
            return None;
        }

        let path = caps.get(2).map_or("", |m| m.as_str());
        let query = caps.get(3).map_or("", |m| m.as_str());

        if let Some(id) = FILE_PATH_RE.captures(path).and_then(|c| c.get(1)) {
            return Some((host, id.as_str()));
        }

        let path = path.trim_end_matches('/');
        if path == "/open" || path == "/uc" {
            if let Some(id) = ID_PARAM_RE.captures(query).and_then(|c| c.get(1)) {
                return Some((host, id.as_str()));
            }
        }

        None
    }
}

impl Default for ShareLinkRewriter {
    fn default() -> Self {
        Self::new([DEFAULT_SHARE_HOST])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> ShareLinkRewriter {
        ShareLinkRewriter::new(["drive.example.com"])
    }

    #[test]
    fn file_view_link_becomes_direct_download() {
        assert_eq!(
            example().rewrite("https://drive.example.com/file/d/ABC123/view"),
            "https://drive.example.com/uc?export=download&id=ABC123"
        );
    }

    #[test]
    fn file_link_with_query_suffix() {
        assert_eq!(
            example().rewrite("https://drive.example.com/file/d/a-b_C9/view?usp=sharing"),
            "https://drive.example.com/uc?export=download&id=a-b_C9"
        );
    }

    #[test]
    fn open_link_becomes_direct_download() {
        assert_eq!(
            example().rewrite("https://drive.example.com/open?id=XYZ"),
            "https://drive.example.com/uc?export=download&id=XYZ"
        );
    }

    #[test]
    fn uc_view_link_becomes_direct_download() {
        assert_eq!(
            example().rewrite("https://drive.example.com/uc?export=view&id=XYZ"),
            "https://drive.example.com/uc?export=download&id=XYZ"
        );
    }

    #[test]
    fn id_param_must_match_whole_name() {
        // `fid=` is not `id=`.
        let url = "https://drive.example.com/open?fid=XYZ";
        assert_eq!(example().rewrite(url), url);
    }

    #[test]
    fn unknown_domain_passes_through() {
        let url = "https://cdn.other.com/file/d/ABC123/view";
        assert_eq!(example().rewrite(url), url);
    }

    #[test]
    fn unrecognised_shape_on_share_host_passes_through() {
        let url = "https://drive.example.com/drive/folders/ABC123";
        assert_eq!(example().rewrite(url), url);
    }

    #[test]
    fn host_match_is_case_insensitive() {
        assert_eq!(
            example().rewrite("https://Drive.Example.com/file/d/ID1/view"),
            "https://drive.example.com/uc?export=download&id=ID1"
        );
    }

    #[test]
    fn non_url_passes_through() {
        assert_eq!(example().rewrite("not a url"), "not a url");
    }

    #[test]
    fn default_targets_google_drive() {
        let rewriter = ShareLinkRewriter::default();
        assert_eq!(rewriter.hosts(), ["drive.google.com".to_string()]);
        assert_eq!(
            rewriter.rewrite("https://drive.google.com/file/d/Q/view"),
            "https://drive.google.com/uc?export=download&id=Q"
        );
    }
}
