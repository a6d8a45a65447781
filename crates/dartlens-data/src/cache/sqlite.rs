//! SQLite cache for statements and corp codes.

use crate::dart::{CorpCode, StatementResponse};
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use dartlens_ratios::StatementBasis;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// SQLite cache for DART responses.
///
/// Statement payloads are stored as JSON. A cached response with no rows
/// records that DART had nothing for that year and basis, so repeated runs
/// skip the request until the marker ages out (see
/// [`get_statement_fresh`](Self::get_statement_fresh)).
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Open or create a cache database.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS statements (
                corp_code TEXT NOT NULL,
                year INTEGER NOT NULL,
                basis TEXT NOT NULL,
                payload TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (corp_code, year, basis)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS corp_codes (
                corp_code TEXT PRIMARY KEY,
                corp_name TEXT NOT NULL,
                stock_code TEXT,
                modify_date TEXT,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_corp_codes_name ON corp_codes(corp_name)",
            [],
        )?;

        Ok(())
    }

    /// Get a cached statement response.
    ///
    /// Returns `None` when nothing is cached for the key. A cached response
    /// with an empty `list` means DART had no data.
    pub fn get_statement(
        &self,
        corp_code: &str,
        year: i32,
        basis: StatementBasis,
    ) -> Result<Option<StatementResponse>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM statements
                 WHERE corp_code = ?1 AND year = ?2 AND basis = ?3",
                params![corp_code, year, basis.code()],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|payload| serde_json::from_str(&payload).map_err(Into::into))
            .transpose()
    }

    /// Get a cached statement response, ignoring stale "no data" markers.
    ///
    /// An empty response cached more than `max_no_data_age_days` ago counts
    /// as a miss, since the filing may have been published since. Responses
    /// with rows are returned regardless of age.
    pub fn get_statement_fresh(
        &self,
        corp_code: &str,
        year: i32,
        basis: StatementBasis,
        max_no_data_age_days: i64,
    ) -> Result<Option<StatementResponse>> {
        let entry: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT payload, cached_at FROM statements
                 WHERE corp_code = ?1 AND year = ?2 AND basis = ?3",
                params![corp_code, year, basis.code()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((payload, cached_at)) = entry else {
            return Ok(None);
        };
        let response: StatementResponse = serde_json::from_str(&payload)?;
        if response.list.is_empty() {
            let cutoff = Utc::now() - Duration::days(max_no_data_age_days);
            let fresh = DateTime::parse_from_rfc3339(&cached_at)
                .is_ok_and(|cached_at| cached_at >= cutoff);
            if !fresh {
                return Ok(None);
            }
        }
        Ok(Some(response))
    }

    /// Store a statement response, or an empty one to record "no data".
    pub fn put_statement(
        &self,
        corp_code: &str,
        year: i32,
        basis: StatementBasis,
        response: &StatementResponse,
    ) -> Result<()> {
        let payload = serde_json::to_string(response)?;
        let cached_at = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT OR REPLACE INTO statements (corp_code, year, basis, payload, cached_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![corp_code, year, basis.code(), payload, cached_at],
        )?;

        Ok(())
    }

    /// Look up a corp code by exact company name, preferring listed entries.
    pub fn get_corp_code(&self, corp_name: &str) -> Result<Option<CorpCode>> {
        let result = self
            .conn
            .query_row(
                "SELECT corp_code, corp_name, stock_code, modify_date FROM corp_codes
                 WHERE corp_name = ?1
                 ORDER BY stock_code IS NULL, corp_code
                 LIMIT 1",
                params![corp_name],
                |row| {
                    Ok(CorpCode {
                        corp_code: row.get(0)?,
                        corp_name: row.get(1)?,
                        stock_code: row.get(2)?,
                        modify_date: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    /// Store registry entries in a batch.
    pub fn put_corp_codes(&self, entries: &[CorpCode]) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;

        for entry in entries {
            tx.execute(
                "INSERT OR REPLACE INTO corp_codes
                 (corp_code, corp_name, stock_code, modify_date, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.corp_code,
                    entry.corp_name,
                    entry.stock_code,
                    entry.modify_date,
                    updated_at
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Whether any registry entries are cached.
    pub fn has_corp_codes(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM corp_codes", [], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Clear all cached data.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM statements", [])?;
        self.conn.execute("DELETE FROM corp_codes", [])?;
        Ok(())
    }

    /// Clear cached statements for one company.
    pub fn clear_corp(&self, corp_code: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM statements WHERE corp_code = ?1",
            params![corp_code],
        )?;
        Ok(())
    }

    /// Get cache statistics.
    pub fn get_stats(&self) -> Result<CacheStats> {
        let statements: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM statements", [], |row| row.get(0))?;

        let companies: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT corp_code) FROM statements",
            [],
            |row| row.get(0),
        )?;

        let corp_codes: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM corp_codes", [], |row| row.get(0))?;

        Ok(CacheStats {
            statements: statements as usize,
            companies: companies as usize,
            corp_codes: corp_codes as usize,
        })
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Cached statement responses
    pub statements: usize,
    /// Companies with at least one cached statement
    pub companies: usize,
    /// Registry entries
    pub corp_codes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dart::StatementRow;

    fn row(account_nm: &str, amount: &str) -> StatementRow {
        StatementRow {
            sj_div: "BS".to_string(),
            sj_nm: "재무상태표".to_string(),
            account_id: None,
            account_nm: account_nm.to_string(),
            thstrm_amount: Some(amount.to_string()),
            frmtrm_amount: None,
            currency: Some("KRW".to_string()),
        }
    }

    fn corp(code: &str, name: &str, stock: Option<&str>) -> CorpCode {
        CorpCode {
            corp_code: code.to_string(),
            corp_name: name.to_string(),
            stock_code: stock.map(str::to_string),
            modify_date: Some("20240101".to_string()),
        }
    }

    #[test]
    fn test_cache_initialization() {
        assert!(SqliteCache::in_memory().is_ok());
    }

    #[test]
    fn test_statement_roundtrip_and_no_data_marker() {
        let cache = SqliteCache::in_memory().unwrap();
        let response = StatementResponse {
            list: vec![row("자산총계", "1,000"), row("부채총계", "400")],
        };

        assert!(
            cache
                .get_statement("00126380", 2023, StatementBasis::Consolidated)
                .unwrap()
                .is_none()
        );

        cache
            .put_statement("00126380", 2023, StatementBasis::Consolidated, &response)
            .unwrap();
        cache
            .put_statement(
                "00126380",
                2023,
                StatementBasis::Separate,
                &StatementResponse::default(),
            )
            .unwrap();

        let cached = cache
            .get_statement("00126380", 2023, StatementBasis::Consolidated)
            .unwrap()
            .unwrap();
        assert_eq!(cached, response);

        let empty = cache
            .get_statement("00126380", 2023, StatementBasis::Separate)
            .unwrap()
            .unwrap();
        assert!(empty.list.is_empty());

        assert!(
            cache
                .get_statement("00126380", 2022, StatementBasis::Consolidated)
                .unwrap()
                .is_none()
        );
    }

    fn backdate(cache: &SqliteCache, cached_at: &str) {
        cache
            .conn
            .execute("UPDATE statements SET cached_at = ?1", params![cached_at])
            .unwrap();
    }

    #[test]
    fn test_stale_no_data_marker_is_a_miss() {
        let cache = SqliteCache::in_memory().unwrap();
        let filed = StatementResponse {
            list: vec![row("자산총계", "1,000")],
        };
        cache
            .put_statement(
                "00126380",
                2025,
                StatementBasis::Consolidated,
                &StatementResponse::default(),
            )
            .unwrap();
        cache
            .put_statement("00126380", 2024, StatementBasis::Consolidated, &filed)
            .unwrap();

        let fresh = cache
            .get_statement_fresh("00126380", 2025, StatementBasis::Consolidated, 7)
            .unwrap();
        assert_eq!(fresh, Some(StatementResponse::default()));

        backdate(&cache, "2020-01-01T00:00:00+00:00");
        assert!(
            cache
                .get_statement_fresh("00126380", 2025, StatementBasis::Consolidated, 7)
                .unwrap()
                .is_none()
        );
        assert_eq!(
            cache
                .get_statement_fresh("00126380", 2024, StatementBasis::Consolidated, 7)
                .unwrap(),
            Some(filed)
        );
        assert!(
            cache
                .get_statement("00126380", 2025, StatementBasis::Consolidated)
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_unreadable_timestamp_is_stale() {
        let cache = SqliteCache::in_memory().unwrap();
        cache
            .put_statement(
                "A",
                2025,
                StatementBasis::Separate,
                &StatementResponse::default(),
            )
            .unwrap();
        backdate(&cache, "not a date");
        assert!(
            cache
                .get_statement_fresh("A", 2025, StatementBasis::Separate, 7)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_corp_code_prefers_listed() {
        let cache = SqliteCache::in_memory().unwrap();
        assert!(!cache.has_corp_codes().unwrap());

        cache
            .put_corp_codes(&[
                corp("00000001", "동명상사", None),
                corp("00000002", "동명상사", Some("012345")),
                corp("00126380", "삼성전자", Some("005930")),
            ])
            .unwrap();

        assert!(cache.has_corp_codes().unwrap());
        let found = cache.get_corp_code("동명상사").unwrap().unwrap();
        assert_eq!(found.corp_code, "00000002");
        assert!(cache.get_corp_code("없는회사").unwrap().is_none());
    }

    #[test]
    fn test_clear_and_stats() {
        let cache = SqliteCache::in_memory().unwrap();
        let response = StatementResponse {
            list: vec![row("자산총계", "1")],
        };
        cache
            .put_statement("A", 2022, StatementBasis::Consolidated, &response)
            .unwrap();
        cache
            .put_statement("A", 2023, StatementBasis::Consolidated, &response)
            .unwrap();
        cache
            .put_statement("B", 2023, StatementBasis::Separate, &response)
            .unwrap();
        cache.put_corp_codes(&[corp("A", "가", None)]).unwrap();

        let stats = cache.get_stats().unwrap();
        assert_eq!(stats.statements, 3);
        assert_eq!(stats.companies, 2);
        assert_eq!(stats.corp_codes, 1);

        cache.clear_corp("A").unwrap();
        let stats = cache.get_stats().unwrap();
        assert_eq!(stats.statements, 1);
        assert_eq!(stats.corp_codes, 1);

        cache.clear_all().unwrap();
        let stats = cache.get_stats().unwrap();
        assert_eq!(
            stats,
            CacheStats {
                statements: 0,
                companies: 0,
                corp_codes: 0
            }
        );
    }
}
