//! Filename Classifier.
//!
//! Parses a publication basename into an `IssueKey`. Case-insensitive on
//! the publication tag, extension, and language letters; the language is
//! kept in whatever case the filename used.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CoreError, CoreResult};
use crate::models::{Container, IssueKey, PublicationType};

static MWB_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^mwb_([A-Z]{1,3})_(20[2-9]\d)(0[1-9]|1[0-2])\.(jwpub|epub)$").unwrap()
});

static W_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^w_([A-Z]{1,3})_(20[2-9]\d)(0[1-9]|1[0-2])\.(jwpub|epub)$").unwrap()
});

/// Reduce a path-like string to its trailing basename, splitting on
/// whichever of `/` or `\` appears later in the string.
fn basename(path: &str) -> &str {
    let slash = path.rfind('/');
    let backslash = path.rfind('\\');
    match (slash, backslash) {
        (Some(s), Some(b)) => &path[s.max(b) + 1..],
        (Some(s), None) => &path[s + 1..],
        (None, Some(b)) => &path[b + 1..],
        (None, None) => path,
    }
}

/// Classify a path-like filename into its `IssueKey`, or a
/// `CoreError::InvalidFilename` / `CoreError::UnsupportedIssue`.
pub fn classify(path: &str) -> CoreResult<IssueKey> {
    let name = basename(path);

    let (publication_type, caps) = if let Some(caps) = MWB_PATTERN.captures(name) {
        (PublicationType::Mwb, caps)
    } else if let Some(caps) = W_PATTERN.captures(name) {
        (PublicationType::W, caps)
    } else {
        return Err(CoreError::InvalidFilename(name.to_string()));
    };

    let language = caps[1].to_string();
    let year: u16 = caps[2].parse().expect("regex guarantees 4 ascii digits");
    let month: u8 = caps[3].parse().expect("regex guarantees 2 ascii digits");
    let container = if caps[4].eq_ignore_ascii_case("jwpub") {
        Container::Jwpub
    } else {
        Container::Epub
    };

    let issue = IssueKey {
        publication_type,
        language,
        year,
        month,
        container,
    };

    if !issue.is_supported() {
        return Err(CoreError::UnsupportedIssue(format!(
            "{} {}-{:02} is below the minimum supported issue",
            match publication_type {
                PublicationType::Mwb => "mwb",
                PublicationType::W => "w",
            },
            year,
            month
        )));
    }

    Ok(issue)
}
