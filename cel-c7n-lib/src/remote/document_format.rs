use crate::Result;
use core::str::FromStr;
use ohno::IntoAppError;
use strum::{Display, EnumString};
use url::Url;

/// The physical layout of a remote document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DocumentFormat {
    /// A single JSON document
    Json,

    /// One string per line
    Txt,

    /// One JSON document per line
    #[strum(to_string = "ldjson", serialize = "ndjson", serialize = "jsonl")]
    Ldjson,

    /// Rows as lists of strings
    Csv,

    /// Rows as maps keyed by the header row
    Csv2dict,
}

impl DocumentFormat {
    /// Look up a format by name
    ///
    /// # Errors
    ///
    /// Returns an error naming the format when it is not one of the supported ones.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::from_str(name).into_app_err_with(|| format!("Unsupported format: '{name}'"))
    }

    /// Take the format from the suffix of a URL's path, as in `https://host/accounts.csv`
    ///
    /// # Errors
    ///
    /// Returns an error for a URL that cannot be parsed or whose suffix is not a supported format.
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).into_app_err_with(|| format!("invalid URL '{url}'"))?;
        let file_name = parsed.path().rsplit('/').next().unwrap_or_default();
        let suffix = file_name.rsplit_once('.').map_or("", |(_, suffix)| suffix);
        Self::from_name(suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(DocumentFormat::from_name("json").unwrap(), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_name("ndjson").unwrap(), DocumentFormat::Ldjson);
        assert_eq!(DocumentFormat::from_name("jsonl").unwrap(), DocumentFormat::Ldjson);
        assert_eq!(DocumentFormat::from_name("ldjson").unwrap(), DocumentFormat::Ldjson);
        assert_eq!(DocumentFormat::from_name("csv2dict").unwrap(), DocumentFormat::Csv2dict);
    }

    #[test]
    fn test_unsupported_name() {
        let err = DocumentFormat::from_name("xml").unwrap_err();
        assert!(err.to_string().contains("Unsupported format: 'xml'"));
        assert!(err.to_string().contains("Matching variant not found"));
    }

    #[test]
    fn test_from_url_suffix() {
        assert_eq!(DocumentFormat::from_url("https://example.com/data/accounts.json").unwrap(), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_url("s3://bucket/path/list.txt").unwrap(), DocumentFormat::Txt);
        assert_eq!(DocumentFormat::from_url("https://example.com/rows.csv?version=2").unwrap(), DocumentFormat::Csv);
    }

    #[test]
    fn test_from_url_without_suffix() {
        let err = DocumentFormat::from_url("https://example.com/data").unwrap_err();
        assert!(err.to_string().contains("Unsupported format"));
        let _ = DocumentFormat::from_url("https://example.com/data.yaml").unwrap_err();
    }

    #[test]
    fn test_invalid_url() {
        let err = DocumentFormat::from_url("not a url.json").unwrap_err();
        assert!(err.to_string().contains("invalid URL"));
    }
}
