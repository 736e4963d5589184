//! Document Store Accessor.
//!
//! Opens the embedded relational content store read-only, selects MWB
//! week documents (class 106), the Watchtower TOC (class 68), and
//! Watchtower study articles (class 40).

use rusqlite::{Connection, OpenFlags};
use tempfile::NamedTempFile;

use crate::crypto::PublicationTag;
use crate::error::{CoreError, CoreResult};

const CLASS_MWB_WEEK: i32 = 106;
const CLASS_W_TOC: i32 = 68;
const CLASS_W_ARTICLE: i32 = 40;

pub struct DatabaseService {
    conn: Connection,
    // Held only to keep the backing file alive; deleted on drop
    // regardless of how this scope is exited.
    _temp_file: Option<NamedTempFile>,
}

impl DatabaseService {
    pub fn from_file(path: &std::path::Path) -> CoreResult<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?;
        Ok(Self {
            conn,
            _temp_file: None,
        })
    }

    /// SQLite cannot be opened directly from an in-memory buffer; spill
    /// to a scratch file whose deletion is guaranteed by `NamedTempFile`'s
    /// `Drop` impl on every exit path, including error returns.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        use std::io::Write;

        let mut temp_file =
            NamedTempFile::new().map_err(|e| CoreError::Io(format!("temp db file: {e}")))?;
        temp_file
            .write_all(bytes)
            .map_err(|e| CoreError::Io(format!("writing temp db file: {e}")))?;
        temp_file
            .flush()
            .map_err(|e| CoreError::Io(format!("flushing temp db file: {e}")))?;

        let conn = Connection::open_with_flags(temp_file.path(), OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?;

        Ok(Self {
            conn,
            _temp_file: Some(temp_file),
        })
    }

    /// `SELECT MepsLanguageIndex, Symbol, Year, IssueTagNumber FROM
    /// Publication LIMIT 1`.
    pub fn get_publication_tag(&self) -> CoreResult<PublicationTag> {
        let mut stmt = self
            .conn
            .prepare("SELECT MepsLanguageIndex, Symbol, Year, IssueTagNumber FROM Publication LIMIT 1")
            .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?;

        let mut rows = stmt
            .query([])
            .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?;

        let row = rows
            .next()
            .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?
            .ok_or_else(|| CoreError::InvalidDatabase("no Publication row found".to_string()))?;

        Ok(PublicationTag {
            meps_language_index: row
                .get(0)
                .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?,
            symbol: row
                .get(1)
                .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?,
            year: row
                .get(2)
                .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?,
            issue_tag_number: row
                .get::<_, i64>(3)
                .map(|v| v.to_string())
                .or_else(|_| row.get::<_, String>(3))
                .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?,
        })
    }

    /// `SELECT Content FROM Document WHERE Class = 106`, natural row
    /// order.
    pub fn get_mwb_week_contents(&self) -> CoreResult<Vec<Vec<u8>>> {
        self.select_content_by_class(CLASS_MWB_WEEK)
    }

    /// `SELECT Content FROM Document WHERE Class = 68`, at most one row
    /// used.
    pub fn get_w_toc_content(&self) -> CoreResult<Option<Vec<u8>>> {
        Ok(self.select_content_by_class(CLASS_W_TOC)?.into_iter().next())
    }

    /// `SELECT MepsDocumentId, Content FROM Document WHERE Class = 40`.
    pub fn get_w_articles(&self) -> CoreResult<Vec<(i64, Vec<u8>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT MepsDocumentId, Content FROM Document WHERE Class = ?")
            .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?;

        let rows = stmt
            .query_map([CLASS_W_ARTICLE], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| CoreError::InvalidDatabase(e.to_string()))?);
        }
        Ok(out)
    }

    fn select_content_by_class(&self, class_id: i32) -> CoreResult<Vec<Vec<u8>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT Content FROM Document WHERE Class = ? ORDER BY rowid")
            .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?;

        let rows = stmt
            .query_map([class_id], |row| row.get(0))
            .map_err(|e| CoreError::InvalidDatabase(e.to_string()))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| CoreError::InvalidDatabase(e.to_string()))?);
        }
        Ok(out)
    }
}
