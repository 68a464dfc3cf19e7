//! Data Source Module
//! Resolves where a dataset lives and reads it into memory in a single attempt.

use crate::data::DataError;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

const GITHUB_PREFIX: &str = "https://github.com/";
const GITHUB_RAW_PREFIX: &str = "https://raw.githubusercontent.com/";

/// Location of a CSV dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Remote(String),
    Local(PathBuf),
}

impl DataSource {
    /// Interpret a user supplied location.
    ///
    /// `http(s)://` locations are remote, anything else is a file path.
    /// GitHub blob page links are rewritten to their raw content URL so the
    /// links shown in the GitHub UI can be used directly.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Remote(Self::raw_github_url(location))
        } else {
            DataSource::Local(PathBuf::from(location))
        }
    }

    fn raw_github_url(url: &str) -> String {
        let Some(rest) = url.strip_prefix(GITHUB_PREFIX) else {
            return url.to_string();
        };
        match rest.split_once("/blob/") {
            Some((repo, path)) if repo.split('/').count() == 2 => {
                format!("{GITHUB_RAW_PREFIX}{repo}/{path}")
            }
            _ => url.to_string(),
        }
    }

    /// Read the whole resource. No retry is attempted.
    pub fn fetch(&self) -> Result<Vec<u8>, DataError> {
        let bytes = match self {
            DataSource::Remote(url) => {
                debug!(%url, "requesting dataset");
                let response = reqwest::blocking::get(url)
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| DataError::unavailable(self, e))?;
                response
                    .bytes()
                    .map_err(|e| DataError::unavailable(self, e))?
                    .to_vec()
            }
            DataSource::Local(path) => {
                std::fs::read(path).map_err(|e| DataError::unavailable(self, e))?
            }
        };

        info!(source = %self, bytes = bytes.len(), "fetched dataset");
        Ok(bytes)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote(url) => write!(f, "{url}"),
            DataSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn blob_links_are_rewritten_to_raw_content() {
        let source = DataSource::parse(
            "https://github.com/daenuprobst/covid19-cases-switzerland/blob/master/covid19_tests_switzerland_bag.csv",
        );
        assert_eq!(
            source,
            DataSource::Remote(
                "https://raw.githubusercontent.com/daenuprobst/covid19-cases-switzerland/master/covid19_tests_switzerland_bag.csv"
                    .to_string()
            )
        );
    }

    #[test]
    fn other_urls_are_kept() {
        let url = "https://example.org/data/blob/cases.csv";
        assert_eq!(DataSource::parse(url), DataSource::Remote(url.to_string()));
    }

    #[test]
    fn plain_paths_are_local() {
        assert_eq!(
            DataSource::parse("data/cases.csv"),
            DataSource::Local(PathBuf::from("data/cases.csv"))
        );
    }

    #[test]
    fn local_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Date,AG\n2020-03-01,1\n").unwrap();

        let source = DataSource::Local(file.path().to_path_buf());
        assert_eq!(source.fetch().unwrap(), b"Date,AG\n2020-03-01,1\n");
    }

    #[test]
    fn missing_file_is_unavailable() {
        let source = DataSource::parse("/definitely/not/here.csv");
        assert!(matches!(
            source.fetch(),
            Err(DataError::DataUnavailable { .. })
        ));
    }
}
