//! Weekly meeting schedule extraction for JW.org Meeting Workbook
//! (`mwb`) and Watchtower Study edition (`w`) publications, from either
//! a JWPUB (encrypted, SQLite-backed) or EPUB (plain ZIP-of-HTML)
//! container.
//!
//! The entry point is [`Parser`]: constructed once from a
//! [`ParserConfig`] and reused across calls — configuration is frozen
//! at construction, so it is safe for concurrent use across
//! independent calls.

pub mod archive;
pub mod config;
pub mod crypto;
pub mod db;
pub mod discovery;
pub mod epub;
pub mod error;
pub mod filename;
pub mod html;
pub mod lang;
pub mod models;

use std::io::Read;

use crate::archive::RawArchive;
use crate::config::ParserConfig;
use crate::crypto::CryptoService;
use crate::db::DatabaseService;
use crate::error::{CoreError, CoreResult};
use crate::models::{Container, IssueKey, ParsedIssue, PublicationType};

/// Inner archive member name containing the per-document archive
/// inside a JWPUB file.
const JWPUB_CONTENTS_MEMBER: &str = "contents";

/// Result Assembler / top-level orchestration.
///
/// `Parser` holds only its frozen `ParserConfig`; it carries no mutable
/// state, so concurrent calls to `parse` across threads are safe.
pub struct Parser {
    config: ParserConfig,
    crypto: CryptoService,
}

impl Parser {
    pub fn new(config: ParserConfig) -> CoreResult<Self> {
        Ok(Self {
            config,
            crypto: CryptoService::new()?,
        })
    }

    /// Parse a publication file given its filename (used only for
    /// classification) and full byte contents.
    pub fn parse(&self, filename: &str, bytes: &[u8]) -> CoreResult<ParsedIssue> {
        let issue = filename::classify(filename)?;
        self.parse_with_issue(issue, bytes)
    }

    /// Parse already-classified bytes. Exposed separately so callers
    /// that have already resolved the `IssueKey` some other way (for
    /// example a caller that fetched a specific issue by metadata) need
    /// not round-trip through a filename.
    pub fn parse_with_issue(&self, issue: IssueKey, bytes: &[u8]) -> CoreResult<ParsedIssue> {
        let limits = self.config.archive_limits();
        let archive = archive::read_archive(bytes, &limits)?;

        match issue.container {
            Container::Jwpub => self.parse_jwpub(issue, &archive),
            Container::Epub => self.parse_epub(issue, &archive),
        }
    }

    fn parse_jwpub(&self, issue: IssueKey, archive: &RawArchive) -> CoreResult<ParsedIssue> {
        let contents_bytes = archive.get(JWPUB_CONTENTS_MEMBER).ok_or_else(|| {
            CoreError::InvalidArchive(format!(
                "no '{JWPUB_CONTENTS_MEMBER}' member in jwpub archive"
            ))
        })?;

        let inner_limits = self.config.archive_limits();
        let inner = archive::read_archive(contents_bytes, &inner_limits)?;

        let db_name = inner
            .names()
            .find(|name| name.ends_with(".db"))
            .ok_or_else(|| CoreError::InvalidDatabase("no .db member in contents archive".into()))?
            .to_string();
        let db_bytes = inner
            .get(&db_name)
            .expect("db_name came from inner.names()");

        let db = DatabaseService::from_bytes(db_bytes)?;
        let tag = db.get_publication_tag()?;
        let keys = self.crypto.derive_from_publication(&tag);

        let mut result = ParsedIssue::new(issue.clone());

        match issue.publication_type {
            PublicationType::Mwb => {
                let contents = db.get_mwb_week_contents()?;
                let mut weeks = Vec::new();
                for blob in contents {
                    if blob.is_empty() {
                        continue;
                    }
                    match self.crypto.decrypt_and_inflate(&blob, &keys) {
                        Ok(html) => weeks.push(html::mwb::extract(
                            &html,
                            &issue.language,
                            issue.year,
                            &self.config,
                        )),
                        Err(e) => {
                            log::warn!("skipping unreadable mwb week document: {e}");
                        }
                    }
                }
                if weeks.is_empty() {
                    log::warn!("no mwb week documents extracted from an otherwise valid archive");
                }
                result.mwb_schedules = Some(weeks);
            }
            PublicationType::W => {
                let toc_blob = db
                    .get_w_toc_content()?
                    .ok_or_else(|| CoreError::MalformedContent("no watchtower TOC row found".into()))?;
                let toc_html = self.crypto.decrypt_and_inflate(&toc_blob, &keys)?;

                let articles = db.get_w_articles()?;
                let crypto = &self.crypto;
                let resolve = move |doc_id: &str, _href: &str| -> Option<String> {
                    let doc_id: i64 = doc_id.parse().ok()?;
                    let (_, blob) = articles.iter().find(|(id, _)| *id == doc_id)?;
                    if blob.is_empty() {
                        return None;
                    }
                    crypto.decrypt_and_inflate(blob, &keys).ok()
                };

                let studies =
                    html::watchtower::extract_studies(&toc_html, &issue.language, &self.config, resolve);
                if studies.is_empty() {
                    log::warn!("no watchtower studies extracted from an otherwise valid archive");
                }
                result.w_schedules = Some(studies);
            }
        }

        Ok(result)
    }

    fn parse_epub(&self, issue: IssueKey, archive: &RawArchive) -> CoreResult<ParsedIssue> {
        let mut result = ParsedIssue::new(issue.clone());

        match issue.publication_type {
            PublicationType::Mwb => {
                let docs = epub::mwb_week_documents(archive)?;
                if docs.is_empty() {
                    return Err(CoreError::MalformedContent(
                        "no valid mwb week documents found in epub".into(),
                    ));
                }
                let weeks = docs
                    .iter()
                    .map(|html| html::mwb::extract(html, &issue.language, issue.year, &self.config))
                    .collect();
                result.mwb_schedules = Some(weeks);
            }
            PublicationType::W => {
                let toc_html = epub::w_toc_document(archive)?.ok_or_else(|| {
                    CoreError::MalformedContent("no valid watchtower TOC found in epub".into())
                })?;
                let resolve = move |_doc_id: &str, href: &str| -> Option<String> {
                    epub::resolve_article_by_href(archive, href).map(|s| s.to_string())
                };
                let studies =
                    html::watchtower::extract_studies(&toc_html, &issue.language, &self.config, resolve);
                if studies.is_empty() {
                    log::warn!("no watchtower studies extracted from an otherwise valid archive");
                }
                result.w_schedules = Some(studies);
            }
        }

        Ok(result)
    }
}

/// Reads an entire file into memory and parses it, classifying by its
/// own filename. Thin convenience wrapper for callers (the CLI) that
/// already have a path on disk; the core itself only ever works with
/// fully-buffered byte arrays.
pub fn parse_file<P: AsRef<std::path::Path>>(path: P, config: ParserConfig) -> CoreResult<ParsedIssue> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CoreError::InvalidFilename(path.display().to_string()))?
        .to_string();

    let mut file = std::fs::File::open(path).map_err(CoreError::from)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(CoreError::from)?;

    let parser = Parser::new(config)?;
    parser.parse(&filename, &bytes)
}
