//! Delimited catalog loader tolerant of encoding and delimiter variation.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::Encoding;
use tracing::{debug, info, warn};

use crate::error::CatalogLoadError;
use crate::models::catalog::{Catalog, CatalogEntry};
use crate::models::config::CatalogConfig;

/// Characters inspected when guessing the delimiter.
const DELIMITER_SAMPLE: usize = 2048;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Loads a procedure catalog from a delimited text table.
pub struct CatalogLoader {
    config: CatalogConfig,
}

impl CatalogLoader {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// Read and parse the catalog file at `path`.
    pub fn load(&self, path: &Path) -> Result<Catalog, CatalogLoadError> {
        let bytes = std::fs::read(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(&bytes, &path.display().to_string())
    }

    /// Parse catalog bytes. `source_name` only appears in logs and errors.
    ///
    /// Encodings are tried in configured order; for each, the detected
    /// delimiter is tried first and the other one second. The first
    /// combination yielding at least one entry wins.
    pub fn parse(&self, bytes: &[u8], source_name: &str) -> Result<Catalog, CatalogLoadError> {
        let mut attempts = 0usize;
        let mut last_error = String::from("no encoding configured");

        for label in &self.config.encodings {
            attempts += 1;
            let text = match decode(bytes, label) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Catalog {} is not readable as {}: {}", source_name, label, e);
                    last_error = e;
                    continue;
                }
            };

            let detected = detect_delimiter(&text);
            let fallback = if detected == b';' { b',' } else { b';' };

            for (i, delimiter) in [detected, fallback].into_iter().enumerate() {
                if i > 0 {
                    attempts += 1;
                }
                match self.parse_rows(&text, delimiter) {
                    Ok(entries) => {
                        info!(
                            "Loaded {} procedures from {} ({}, delimiter {:?})",
                            entries.len(),
                            source_name,
                            label,
                            delimiter as char
                        );
                        return Ok(Catalog::new(entries));
                    }
                    Err(e) => {
                        debug!(
                            "Catalog {} as {} with delimiter {:?}: {}",
                            source_name, label, delimiter as char, e
                        );
                        last_error = e;
                    }
                }
            }
        }

        Err(CatalogLoadError::NoEntries {
            source_name: source_name.to_string(),
            attempts,
            last_error,
        })
    }

    fn parse_rows(&self, text: &str, delimiter: u8) -> Result<Vec<CatalogEntry>, String> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers().map_err(|e| e.to_string())?.clone();
        let code_col = find_column(&headers, &self.config.code_aliases)
            .ok_or_else(|| format!("no code column in header {:?}", headers))?;
        let desc_col = find_column(&headers, &self.config.description_aliases)
            .ok_or_else(|| format!("no description column in header {:?}", headers))?;

        let mut entries = Vec::new();
        let mut skipped = 0usize;

        for record in reader.records() {
            let record = record.map_err(|e| e.to_string())?;
            let code = record.get(code_col).map(str::trim).unwrap_or("");
            let description = record.get(desc_col).map(str::trim).unwrap_or("");

            if code.is_empty() || description.is_empty() {
                skipped += 1;
                continue;
            }
            entries.push(CatalogEntry::new(code, description));
        }

        if skipped > 0 {
            debug!("Skipped {} rows missing code or description", skipped);
        }
        if entries.is_empty() {
            return Err("no row has both code and description".to_string());
        }

        Ok(entries)
    }
}

/// Load a catalog file with the given settings.
pub fn load_catalog(path: &Path, config: &CatalogConfig) -> Result<Catalog, CatalogLoadError> {
    CatalogLoader::new(config.clone()).load(path)
}

/// Parse catalog bytes with the given settings.
pub fn parse_catalog(
    bytes: &[u8],
    config: &CatalogConfig,
    source_name: &str,
) -> Result<Catalog, CatalogLoadError> {
    CatalogLoader::new(config.clone()).parse(bytes, source_name)
}

/// Decode strictly with the encoding named by `label`.
fn decode(bytes: &[u8], label: &str) -> Result<String, String> {
    let label = label.trim().to_ascii_lowercase();

    if label == "utf-8-sig" || label == "utf8-sig" {
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        return std::str::from_utf8(body)
            .map(str::to_owned)
            .map_err(|e| format!("invalid UTF-8: {}", e));
    }

    let encoding = Encoding::for_label(label.as_bytes())
        .or_else(|| Encoding::for_label(label.replace(['-', '_'], "").as_bytes()))
        .ok_or_else(|| format!("unknown encoding {:?}", label))?;

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| format!("invalid {} input", encoding.name()))
}

/// `;` when it outnumbers `,` in the sample, `,` otherwise.
fn detect_delimiter(text: &str) -> u8 {
    let (semicolons, commas) = text
        .chars()
        .take(DELIMITER_SAMPLE)
        .fold((0usize, 0usize), |(s, c), ch| match ch {
            ';' => (s + 1, c),
            ',' => (s, c + 1),
            _ => (s, c),
        });

    if semicolons > commas { b';' } else { b',' }
}

fn find_column(headers: &csv::StringRecord, aliases: &[String]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.trim().trim_start_matches('\u{feff}').to_lowercase();
        aliases.iter().any(|alias| alias.trim().to_lowercase() == header)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(bytes: &[u8]) -> Result<Catalog, CatalogLoadError> {
        parse_catalog(bytes, &CatalogConfig::default(), "test.csv")
    }

    #[test]
    fn test_semicolon_portuguese_headers() {
        let csv = "CODIGO;DESCRICAO\n40302750;Hemograma completo\n40316521;PSA total\n";
        let catalog = parse(csv.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[0], CatalogEntry::new("40302750", "Hemograma completo"));
        assert_eq!(catalog.description("40316521"), Some("PSA total"));
    }

    #[test]
    fn test_comma_english_headers_with_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"Code,Description\n40301630,\"Glicose, dosagem\"\n");
        let catalog = parse(&bytes).unwrap();

        assert_eq!(catalog.description("40301630"), Some("Glicose, dosagem"));
    }

    #[test]
    fn test_latin1_fallback() {
        // "Cálcio" encoded as ISO-8859-1 is not valid UTF-8.
        let bytes = b"codigo;descri\xe7\xe3o\n40302040;C\xe1lcio\n";
        let catalog = parse(bytes).unwrap();

        assert_eq!(catalog.description("40302040"), Some("Cálcio"));
    }

    #[test]
    fn test_skips_rows_missing_fields() {
        let csv = "codigo;descricao\n;sem codigo\n40302750;\n40301630;Glicose\n";
        let catalog = parse(csv.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains_code("40301630"));
    }

    #[test]
    fn test_fallback_delimiter_when_sample_misleads() {
        // Commas inside descriptions outnumber the semicolon delimiters.
        let csv = "codigo;descricao\n40301630;Glicose, jejum, basal, pos-prandial\n";
        let catalog = parse(csv.as_bytes()).unwrap();

        assert_eq!(
            catalog.description("40301630"),
            Some("Glicose, jejum, basal, pos-prandial")
        );
    }

    #[test]
    fn test_missing_headers_fails_with_last_error() {
        let csv = "id;name\n1;foo\n";
        let err = parse(csv.as_bytes()).unwrap_err();

        match err {
            CatalogLoadError::NoEntries {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(attempts, 6);
                assert!(last_error.contains("no code column"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_file_fails() {
        assert!(matches!(parse(b""), Err(CatalogLoadError::NoEntries { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("procedimentos.csv");
        std::fs::write(&path, "CODIGO;DESCRICAO\n40302750;Hemograma\n").unwrap();

        let catalog = load_catalog(&path, &CatalogConfig::default()).unwrap();
        assert_eq!(catalog.len(), 1);

        let missing = load_catalog(&dir.path().join("nope.csv"), &CatalogConfig::default());
        assert!(matches!(missing, Err(CatalogLoadError::Io { .. })));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c,d"), b';');
        assert_eq!(detect_delimiter("a,b;c"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }
}
