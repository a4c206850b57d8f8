//! Attachment classification and link construction.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::{
    corpus::Record,
    error::{Error, Result},
};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm"];

/// Hosts on which attachments are always served relative to the page.
const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Characters escaped when turning an attachment path into a URL.
///
/// Mirrors the browser's `encodeURI`: reserved URI characters and the
/// unreserved set pass through, everything else is percent-encoded.
const URI_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Lowercased text after the last `.` of `name`, or `""` without one.
pub fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// How an attachment is presented by a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    pub fn of(name: &str) -> Self {
        let ext = extension_of(name);
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else {
            Self::Other
        }
    }

    /// Whether the attachment belongs in the media gallery.
    pub fn is_gallery(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

/// Relative path of an attachment next to its exported note page.
///
/// The export stores attachments of `note.html` under `note files/`.
///
/// ```
/// use notelens::attachment::attachment_path;
///
/// assert_eq!(
///     attachment_path("내 노트/여행.html", "사진.jpg"),
///     "내 노트/여행 files/사진.jpg"
/// );
/// ```
pub fn attachment_path(title: &str, file: &str) -> String {
    let base = title.strip_suffix(".html").unwrap_or(title);
    if base.ends_with(" files") {
        format!("{base}/{file}")
    } else {
        format!("{base} files/{file}")
    }
}

/// Folders whose attachments are served from `domain`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FolderDomainRule {
    pub domain: String,
    pub folders: Vec<String>,
}

/// Builds attachment URLs, prefixing a domain when the page is viewed on
/// a host that serves the note's folder from elsewhere.
///
/// Rules are keyed by the host name the archive is viewed on; hosts
/// without rules always get relative links.
#[derive(Debug, Clone, Default)]
pub struct AttachmentLinker {
    hosts: HashMap<String, Vec<(String, HashSet<String>)>>,
}

impl AttachmentLinker {
    pub fn new(
        hosts: impl IntoIterator<
            Item = (impl Into<String>, impl IntoIterator<Item = FolderDomainRule>),
        >,
    ) -> Self {
        let hosts = hosts
            .into_iter()
            .map(|(host, rules)| {
                let rules = rules
                    .into_iter()
                    .map(|rule| {
                        let folders =
                            rule.folders.iter().map(|f| folder_key(f)).collect();
                        (rule.domain, folders)
                    })
                    .collect();
                (host.into(), rules)
            })
            .collect();
        Self { hosts }
    }

    /// Load rules from a JSON object mapping host names to arrays of
    /// `{ "domain", "folders" }` objects.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let hosts: HashMap<String, Vec<FolderDomainRule>> =
            serde_json::from_str(&json).map_err(|e| {
                Error::Config(format!(
                    "invalid attachment host rules in {}: {e}",
                    path.display()
                ))
            })?;
        debug!(path = %path.display(), hosts = hosts.len(), "loaded host rules");
        Ok(Self::new(hosts))
    }

    /// Domain prefix for `folder` when viewed from `host`.
    ///
    /// Empty for an empty or local host, a host without rules, and
    /// folders no rule of the host lists.
    pub fn domain_for(&self, folder: &str, host: &str) -> &str {
        if host.is_empty() || LOCAL_HOSTS.contains(&host) {
            return "";
        }
        let Some(rules) = self.hosts.get(host) else {
            return "";
        };
        let key = folder_key(folder);
        rules
            .iter()
            .find(|(_, folders)| folders.contains(&key))
            .map_or("", |(domain, _)| domain.as_str())
    }

    /// URI-encoded link to `file` of `record`.
    pub fn url(&self, record: &Record, file: &str, host: &str) -> String {
        let relative = attachment_path(record.title(), file);
        let full = format!("{}{relative}", self.domain_for(record.folder(), host));
        utf8_percent_encode(&full, URI_ESCAPE).to_string()
    }
}

/// Folder names are compared in NFC with surrounding whitespace removed.
fn folder_key(folder: &str) -> String {
    folder.trim().nfc().collect()
}
