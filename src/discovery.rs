//! Fetcher collaborator, out of scope for the core and kept here only
//! as a thin adapter. Resolves and downloads a
//! publication file for a given `{mwb, w} x lang x issue` by querying
//! the public JW.org media API, then handing bytes to
//! `jw_parser::Parser` exactly like any other input.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::copy;
use std::path::Path;

use crate::models::{Container, IssueKey, PublicationType};

const JW_CDN_API: &str = "https://b.jw-cdn.org/apis/pub-media/GETPUBMEDIALINKS?";

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub files: std::collections::HashMap<String, LanguageFiles>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct LanguageFiles {
    pub jwpub: Option<Vec<PublicationFile>>,
    pub epub: Option<Vec<PublicationFile>>,
}

#[derive(Debug, Deserialize)]
pub struct PublicationFile {
    pub file: FileInfo,
}

#[derive(Debug, Deserialize)]
pub struct FileInfo {
    pub url: String,
}

pub struct DiscoveryService;

impl DiscoveryService {
    /// Discovers and returns the URL for a specific publication, issue,
    /// and container format (`"JWPUB"` or `"EPUB"`, matching the API's
    /// `fileformat` parameter).
    pub fn find_url(pub_name: &str, lang: &str, issue: &str, fileformat: &str) -> Result<String> {
        let url = format!(
            "{}langwritten={}&pub={}&issue={}&output=json&fileformat={}",
            JW_CDN_API, lang, pub_name, issue, fileformat
        );

        let response: ApiResponse = reqwest::blocking::get(url)?.json()?;

        let lang_files = response
            .files
            .get(lang)
            .ok_or_else(|| anyhow!("No files found for language {}", lang))?;

        let file_url = match fileformat.to_ascii_uppercase().as_str() {
            "EPUB" => lang_files.epub.as_ref(),
            _ => lang_files.jwpub.as_ref(),
        }
        .ok_or_else(|| anyhow!("No {} files found", fileformat))?
        .first()
        .ok_or_else(|| anyhow!("Empty {} list", fileformat))?
        .file
        .url
        .clone();

        Ok(file_url)
    }

    /// Resolves the download URL for an already-classified `IssueKey`
    ///: `pub_name`/`fileformat` derive from the issue itself
    /// instead of being threaded separately by the caller.
    pub fn find_url_for_issue(issue: &IssueKey) -> Result<String> {
        let pub_name = match issue.publication_type {
            PublicationType::Mwb => "mwb",
            PublicationType::W => "w",
        };
        let fileformat = match issue.container {
            Container::Jwpub => "JWPUB",
            Container::Epub => "EPUB",
        };
        let issue_tag = format!("{:04}{:02}", issue.year, issue.month);
        Self::find_url(pub_name, &issue.language, &issue_tag, fileformat)
    }

    /// Downloads a file from a URL to a local path
    pub fn download_file(url: &str, dest_path: &Path) -> Result<()> {
        let mut response = reqwest::blocking::get(url)?;
        let mut file = File::create(dest_path)?;
        copy(&mut response, &mut file)?;
        Ok(())
    }
}
