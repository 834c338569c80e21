//! Dataset and checksum manifests

use crate::dataset::Dataset;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

/// Fixed mapping of dataset to source URL, in load order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetManifest {
    entries: Vec<(Dataset, String)>,
}

impl DatasetManifest {
    /// Every dataset at `<base_url>/<name>.csv`
    pub fn from_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let entries = Dataset::ALL
            .into_iter()
            .map(|dataset| (dataset, format!("{}/{}", base_url, dataset.file_name())))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[(Dataset, String)] {
        &self.entries
    }

    pub fn url(&self, dataset: Dataset) -> Option<&str> {
        self.entries
            .iter()
            .find(|(d, _)| *d == dataset)
            .map(|(_, url)| url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Checksum manifest line {line} is malformed: '{content}'")]
    MalformedLine { line: usize, content: String },

    #[error("Checksum manifest has no entries")]
    Empty,
}

/// Expected MD5 digests keyed by file name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    digests: HashMap<String, String>,
}

impl ChecksumManifest {
    /// Parse a manifest body: one header line, then `filename,hex_digest` lines
    ///
    /// Digests are taken as published. A digest that is not a real MD5 never
    /// matches a local file, so only that file is downloaded again.
    pub fn parse(body: &str) -> Result<Self, ManifestError> {
        let mut digests = HashMap::new();

        for (index, raw_line) in body.lines().enumerate().skip(1) {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let [file, digest] = fields.as_slice() else {
                return Err(ManifestError::MalformedLine {
                    line: index + 1,
                    content: line.to_string(),
                });
            };

            if file.is_empty() || digest.is_empty() {
                warn!(line = index + 1, "Ignoring checksum manifest entry without a file name or digest");
                continue;
            }

            digests.insert(file.to_string(), digest.to_lowercase());
        }

        if digests.is_empty() {
            return Err(ManifestError::Empty);
        }

        Ok(Self { digests })
    }

    /// Expected digest for a file name, if listed
    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.digests.get(file_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_manifest_order() {
        let manifest = DatasetManifest::from_base_url("http://host/data/");
        let names: Vec<_> = manifest.entries().iter().map(|(d, _)| d.name()).collect();
        assert_eq!(names, ["constructors", "drivers", "races", "results"]);
        assert_eq!(manifest.url(Dataset::Drivers), Some("http://host/data/drivers.csv"));
    }

    #[test]
    fn test_parse_skips_header() {
        let body = "arquivo,hash\n\
                    drivers.csv,6CD3556DEB0DA54BCA060B4C39479839\n\
                    races.csv,d41d8cd98f00b204e9800998ecf8427e\n";
        let manifest = ChecksumManifest::parse(body).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("drivers.csv"), Some("6cd3556deb0da54bca060b4c39479839"));
        assert_eq!(manifest.get("arquivo"), None);
        assert_eq!(manifest.get("results.csv"), None);
    }

    #[test]
    fn test_parse_tolerates_crlf_and_blank_lines() {
        let body = "file,md5\r\n\r\nresults.csv,d41d8cd98f00b204e9800998ecf8427e\r\n";
        let manifest = ChecksumManifest::parse(body).unwrap();
        assert!(manifest.get("results.csv").is_some());
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let body = "file,md5\ndrivers.csv,abc,extra\n";
        assert_eq!(
            ChecksumManifest::parse(body),
            Err(ManifestError::MalformedLine {
                line: 2,
                content: "drivers.csv,abc,extra".to_string()
            })
        );
    }

    #[test]
    fn test_parse_keeps_digests_as_published() {
        let body = "file,md5\n\
                    drivers.csv,ABC123\n\
                    races.csv,d41d8cd98f00b204e9800998ecf8427e\n";
        let manifest = ChecksumManifest::parse(body).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("drivers.csv"), Some("abc123"));
    }

    #[test]
    fn test_parse_ignores_entries_without_digest() {
        let body = "file,md5\nconstructors.csv,\nresults.csv,d41d8cd98f00b204e9800998ecf8427e\n";
        let manifest = ChecksumManifest::parse(body).unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.get("constructors.csv"), None);

        assert_eq!(ChecksumManifest::parse("file,md5\n,\n"), Err(ManifestError::Empty));
    }

    #[test]
    fn test_parse_rejects_header_only() {
        assert_eq!(ChecksumManifest::parse("file,md5\n"), Err(ManifestError::Empty));
        assert_eq!(ChecksumManifest::parse(""), Err(ManifestError::Empty));
    }
}
