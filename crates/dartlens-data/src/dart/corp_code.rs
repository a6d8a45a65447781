//! DART corp-code registry.
//!
//! DART identifies filers by an 8-digit corp code. The full registry is
//! published as a zip archive holding a single `CORPCODE.xml` document with
//! one `<list>` element per filer.

use super::client::DartClient;
use crate::error::{DataError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use tracing::info;

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpCode {
    /// 8-digit DART corp code
    pub corp_code: String,
    /// Registered company name
    pub corp_name: String,
    /// KRX stock code for listed companies
    pub stock_code: Option<String>,
    /// Last modification date (YYYYMMDD)
    pub modify_date: Option<String>,
}

impl CorpCode {
    /// Whether the company is listed on an exchange.
    pub fn is_listed(&self) -> bool {
        self.stock_code.is_some()
    }
}

#[derive(Debug, Default)]
struct EntryBuilder {
    corp_code: String,
    corp_name: String,
    stock_code: String,
    modify_date: String,
}

impl EntryBuilder {
    fn field(&mut self, name: &[u8]) -> Option<&mut String> {
        match name {
            b"corp_code" => Some(&mut self.corp_code),
            b"corp_name" => Some(&mut self.corp_name),
            b"stock_code" => Some(&mut self.stock_code),
            b"modify_date" => Some(&mut self.modify_date),
            _ => None,
        }
    }

    fn build(self) -> Option<CorpCode> {
        let non_blank = |s: String| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        Some(CorpCode {
            corp_code: non_blank(self.corp_code)?,
            corp_name: non_blank(self.corp_name)?,
            stock_code: non_blank(self.stock_code),
            modify_date: non_blank(self.modify_date),
        })
    }
}

/// The parsed corp-code registry.
#[derive(Debug, Clone, Default)]
pub struct CorpCodeRegistry {
    entries: Vec<CorpCode>,
}

impl CorpCodeRegistry {
    /// Build a registry from entries.
    pub const fn from_entries(entries: Vec<CorpCode>) -> Self {
        Self { entries }
    }

    /// Parse `CORPCODE.xml`.
    ///
    /// # Errors
    /// Returns `DataError::XmlParse` on malformed XML.
    pub fn parse_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut entries = Vec::new();
        let mut current: Option<EntryBuilder> = None;
        let mut field: Option<Vec<u8>> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => {
                    let name = e.name().as_ref().to_vec();
                    if name == b"list" {
                        current = Some(EntryBuilder::default());
                    } else {
                        field = Some(name);
                    }
                }
                Ok(Event::Text(t)) => {
                    if let (Some(entry), Some(name)) = (current.as_mut(), field.as_deref()) {
                        let text = t
                            .unescape()
                            .map_err(|e| DataError::XmlParse(format!("Bad text: {e}")))?;
                        if let Some(slot) = entry.field(name) {
                            slot.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    if e.name().as_ref() == b"list" {
                        if let Some(entry) = current.take().and_then(EntryBuilder::build) {
                            entries.push(entry);
                        }
                    } else {
                        field = None;
                    }
                }
                Ok(_) => {}
                Err(e) => return Err(DataError::XmlParse(format!("XML parse error: {e}"))),
            }
            buf.clear();
        }

        Ok(Self { entries })
    }

    /// Extract and parse the registry from the downloaded zip archive.
    ///
    /// # Errors
    /// Returns `DataError::Archive` if the archive is unreadable or holds no
    /// XML document.
    pub fn from_zip(bytes: &[u8]) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if !file.name().to_ascii_lowercase().ends_with(".xml") {
                continue;
            }
            let mut xml = String::new();
            file.read_to_string(&mut xml)?;
            return Self::parse_xml(&xml);
        }

        Err(DataError::Archive(
            "corp code archive holds no XML document".to_string(),
        ))
    }

    /// Look up a company by its exact registered name.
    ///
    /// When several filers share a name, a listed company is preferred.
    pub fn find_exact(&self, name: &str) -> Option<&CorpCode> {
        let name = name.trim();
        let mut matches = self.entries.iter().filter(|entry| entry.corp_name == name);
        let first = matches.next()?;
        if first.is_listed() {
            return Some(first);
        }
        matches.find(|entry| entry.is_listed()).or(Some(first))
    }

    /// Companies whose name contains `query`, listed companies first.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&CorpCode> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let mut found: Vec<&CorpCode> = self
            .entries
            .iter()
            .filter(|entry| entry.corp_name.contains(query))
            .collect();
        found.sort_by_key(|entry| (!entry.is_listed(), entry.corp_name.chars().count()));
        found.truncate(limit);
        found
    }

    /// All entries.
    pub fn entries(&self) -> &[CorpCode] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DartClient {
    /// Download and parse the full corp-code registry.
    ///
    /// # Errors
    /// Returns an error on network failure or a malformed archive.
    pub async fn fetch_corp_codes(&self) -> Result<CorpCodeRegistry> {
        let bytes = self.get_bytes("corpCode.xml").await?;
        let registry = CorpCodeRegistry::from_zip(&bytes)?;
        info!(entries = registry.len(), "loaded DART corp codes");
        Ok(registry)
    }

    /// Resolve a company name to its registry entry.
    ///
    /// # Errors
    /// Returns `DataError::CorpNotFound` if no filer has exactly that name.
    pub async fn corp_code_for(&self, company_name: &str) -> Result<CorpCode> {
        self.fetch_corp_codes()
            .await?
            .find_exact(company_name)
            .cloned()
            .ok_or_else(|| DataError::CorpNotFound(company_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<result>
    <list>
        <corp_code>00126380</corp_code>
        <corp_name>삼성전자</corp_name>
        <stock_code>005930</stock_code>
        <modify_date>20230110</modify_date>
    </list>
    <list>
        <corp_code>00999999</corp_code>
        <corp_name>삼성전자서비스</corp_name>
        <stock_code> </stock_code>
        <modify_date>20220301</modify_date>
    </list>
    <list>
        <corp_code>00888888</corp_code>
        <corp_name>에이&amp;비</corp_name>
        <stock_code></stock_code>
        <modify_date>20200101</modify_date>
    </list>
</result>"#;

    #[test]
    fn test_parse_xml() {
        let registry = CorpCodeRegistry::parse_xml(SAMPLE).unwrap();
        assert_eq!(registry.len(), 3);

        let samsung = &registry.entries()[0];
        assert_eq!(samsung.corp_code, "00126380");
        assert_eq!(samsung.stock_code.as_deref(), Some("005930"));
        assert!(samsung.is_listed());

        assert!(!registry.entries()[1].is_listed());
        assert_eq!(registry.entries()[2].corp_name, "에이&비");
    }

    #[test]
    fn test_find_exact() {
        let registry = CorpCodeRegistry::parse_xml(SAMPLE).unwrap();
        assert_eq!(
            registry.find_exact("삼성전자").map(|c| c.corp_code.as_str()),
            Some("00126380")
        );
        assert!(registry.find_exact("삼성").is_none());
    }

    #[test]
    fn test_find_exact_prefers_listed() {
        let entry = |code: &str, stock: Option<&str>| CorpCode {
            corp_code: code.to_string(),
            corp_name: "동명".to_string(),
            stock_code: stock.map(ToString::to_string),
            modify_date: None,
        };
        let registry = CorpCodeRegistry::from_entries(vec![
            entry("1", None),
            entry("2", Some("000020")),
        ]);
        assert_eq!(registry.find_exact("동명").unwrap().corp_code, "2");
    }

    #[test]
    fn test_search_lists_listed_first() {
        let registry = CorpCodeRegistry::parse_xml(SAMPLE).unwrap();
        let found = registry.search("삼성", 10);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].corp_name, "삼성전자");
        assert!(registry.search("  ", 10).is_empty());
    }

    #[test]
    fn test_from_zip() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("CORPCODE.xml", options).unwrap();
        writer.write_all(SAMPLE.as_bytes()).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let registry = CorpCodeRegistry::from_zip(&bytes).unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_from_zip_rejects_garbage() {
        assert!(matches!(
            CorpCodeRegistry::from_zip(b"not a zip"),
            Err(DataError::Archive(_))
        ));
    }
}
