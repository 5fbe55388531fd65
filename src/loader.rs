use crate::error::FetchError;
use crate::types::Row;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use ureq::Agent;

/// Supplies raw rows for a source identifier.
///
/// The coordinator never talks to the network itself; implementations own
/// their timeouts and report every failure as a [`FetchError`].
pub trait RowFetcher: Send + Sync {
    fn fetch_rows(&self, source: &str) -> Result<Vec<Row>, FetchError>;
}

impl<F> RowFetcher for F
where
    F: Fn(&str) -> Result<Vec<Row>, FetchError> + Send + Sync,
{
    fn fetch_rows(&self, source: &str) -> Result<Vec<Row>, FetchError> {
        self(source)
    }
}

/// Read CSV text into header-keyed rows.
///
/// Header names are kept byte-for-byte (leading spaces included). Short
/// records leave their trailing fields absent; extra cells are dropped.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<Row>, FetchError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

pub fn load_csv_file(path: &Path) -> Result<Vec<Row>, FetchError> {
    let file = File::open(path)?;
    parse_rows(file)
}

/// Spreadsheet id from a Google Sheets URL, either `/spreadsheets/d/<id>/...`
/// or `...?id=<id>&...`.
pub fn extract_sheet_id(url: &str) -> Option<&str> {
    let id = if let Some((_, rest)) = url.split_once("/spreadsheets/d/") {
        rest.split('/').next()?
    } else if let Some((_, rest)) = url.split_once("id=") {
        rest.split('&').next()?
    } else {
        return None;
    };
    let id = id.split(['?', '#']).next().unwrap_or(id);
    (!id.is_empty()).then_some(id)
}

/// CSV export link for a sheet URL; the tab comes from `gid=` in the URL,
/// falling back to `default_gid`.
pub fn csv_export_url(sheet_url: &str, default_gid: &str) -> Option<String> {
    let sheet_id = extract_sheet_id(sheet_url)?;
    let gid = sheet_url
        .split_once("gid=")
        .and_then(|(_, rest)| rest.split(['#', '&']).next())
        .filter(|gid| !gid.is_empty())
        .unwrap_or(default_gid);
    Some(format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
        sheet_id, gid
    ))
}

fn is_http(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetches `http(s)` sheet URLs through their CSV export and treats any
/// other identifier as a local CSV path.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    http: Agent,
    default_gid: String,
}

impl SourceFetcher {
    pub fn new(timeout: Duration, default_gid: impl Into<String>) -> Self {
        let http = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self {
            http,
            default_gid: default_gid.into(),
        }
    }

    fn fetch_sheet(&self, sheet_url: &str) -> Result<Vec<Row>, FetchError> {
        let csv_url = csv_export_url(sheet_url, &self.default_gid)
            .ok_or_else(|| FetchError::InvalidSource(sheet_url.to_string()))?;
        tracing::debug!(url = %csv_url, "fetching sheet csv export");
        let response = self.http.get(&csv_url).call().map_err(|err| match err {
            ureq::Error::Status(code, _) => FetchError::Status(code),
            ureq::Error::Transport(transport) => FetchError::Http(transport.to_string()),
        })?;
        parse_rows(response.into_reader())
    }
}

impl RowFetcher for SourceFetcher {
    fn fetch_rows(&self, source: &str) -> Result<Vec<Row>, FetchError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(FetchError::InvalidSource("empty source".to_string()));
        }
        let rows = if is_http(source) {
            self.fetch_sheet(source)?
        } else {
            load_csv_file(Path::new(source))?
        };
        if rows.is_empty() {
            return Err(FetchError::NoRows);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SHEET: &str =
        "https://docs.google.com/spreadsheets/d/1suvLm83Xlsx4k4h1KJq/edit#gid=475146199";

    #[test]
    fn parses_rows_with_literal_headers() {
        let data = "Client, reporting CM,Total connnected calls\nAcme,Sam,\"1,200\"\nGlobex\n";
        let rows = parse_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Client"], "Acme");
        assert_eq!(rows[0][" reporting CM"], "Sam");
        assert_eq!(rows[0]["Total connnected calls"], "1,200");
        assert_eq!(rows[1]["Client"], "Globex");
        assert!(!rows[1].contains_key(" reporting CM"));
    }

    #[test]
    fn extracts_sheet_ids() {
        assert_eq!(extract_sheet_id(SHEET), Some("1suvLm83Xlsx4k4h1KJq"));
        assert_eq!(
            extract_sheet_id("https://drive.google.com/open?id=abc123&usp=sharing"),
            Some("abc123")
        );
        assert_eq!(extract_sheet_id("https://example.com/data.csv"), None);
        assert_eq!(extract_sheet_id("https://docs.google.com/spreadsheets/d/"), None);
    }

    #[test]
    fn export_url_keeps_gid_or_uses_default() {
        assert_eq!(
            csv_export_url(SHEET, "0").as_deref(),
            Some("https://docs.google.com/spreadsheets/d/1suvLm83Xlsx4k4h1KJq/export?format=csv&gid=475146199")
        );
        assert_eq!(
            csv_export_url("https://docs.google.com/spreadsheets/d/xyz/edit", "7").as_deref(),
            Some("https://docs.google.com/spreadsheets/d/xyz/export?format=csv&gid=7")
        );
        assert_eq!(csv_export_url("not a sheet", "0"), None);
    }

    #[test]
    fn file_source_loads_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Campaign Status,Client").unwrap();
        writeln!(file, "Live,Acme").unwrap();
        let fetcher = SourceFetcher::new(Duration::from_secs(1), "0");
        let rows = fetcher.fetch_rows(file.path().to_str().unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Campaign Status"], "Live");
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Campaign Status,Client").unwrap();
        let fetcher = SourceFetcher::new(Duration::from_secs(1), "0");
        let err = fetcher.fetch_rows(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, FetchError::NoRows));
    }

    #[test]
    fn bad_sources_are_fetch_errors() {
        let fetcher = SourceFetcher::new(Duration::from_secs(1), "0");
        assert!(matches!(fetcher.fetch_rows("  "), Err(FetchError::InvalidSource(_))));
        assert!(matches!(
            fetcher.fetch_rows("https://example.com/not-a-sheet"),
            Err(FetchError::InvalidSource(_))
        ));
        assert!(matches!(
            fetcher.fetch_rows("/definitely/missing/campaigns.csv"),
            Err(FetchError::Io(_))
        ));
    }
}
