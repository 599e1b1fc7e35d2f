use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::html::strip_tags;
use crate::data::{Attachment, AttachmentKind, ContentId};
use crate::types::RawMedia;

static FILE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href="([^"]+\.(pdf|doc|docx|ppt|pptx|xls|xlsx|zip|rar|txt))""#).expect("valid regex")
});

const UNKNOWN_SIZE: &str = "Unknown";
const UNTITLED: &str = "Untitled";

pub fn attachment_kind(mime: &str) -> AttachmentKind {
    let m = mime.to_ascii_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| m.contains(w));
    if m.is_empty() {
        AttachmentKind::File
    } else if has(&["pdf"]) {
        AttachmentKind::Pdf
    } else if has(&["image"]) {
        AttachmentKind::Image
    } else if has(&["video"]) {
        AttachmentKind::Video
    } else if has(&["audio"]) {
        AttachmentKind::Audio
    } else if has(&["sheet", "excel"]) {
        AttachmentKind::Spreadsheet
    } else if has(&["presentation", "powerpoint"]) {
        AttachmentKind::Presentation
    } else if has(&["zip", "rar", "compressed"]) {
        AttachmentKind::Archive
    } else if has(&["word", "document"]) {
        AttachmentKind::Document
    } else if has(&["text"]) {
        AttachmentKind::Text
    } else {
        AttachmentKind::File
    }
}

fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "zip" => "application/zip",
        "rar" => "application/vnd.rar",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// `1536` -> `"1.5 KB"`; zero means the CMS did not report a size.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return UNKNOWN_SIZE.to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", (value * 100.0).round() / 100.0);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

fn from_media(media: &RawMedia) -> Option<Attachment> {
    let url = media.source_url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
    let mime = media.mime_type.clone().unwrap_or_default();
    let title = strip_tags(&media.title.rendered).trim().to_string();
    let caption = strip_tags(&media.caption.rendered).trim().to_string();
    let description = if caption.is_empty() { strip_tags(&media.description.rendered).trim().to_string() } else { caption };
    Some(Attachment {
        id: media.id.clone(),
        title: if title.is_empty() { UNTITLED.to_string() } else { title },
        description,
        url: url.to_string(),
        kind: attachment_kind(&mime),
        size: format_file_size(media.size_bytes()),
        mime_type: mime,
    })
}

/// Embedded media first, then document links found in the content that were
/// not already captured.
pub fn extract_attachments(embedded: &[RawMedia], html: &str) -> Vec<Attachment> {
    let mut out: Vec<Attachment> = embedded.iter().filter_map(from_media).collect();
    let mut seen: HashSet<String> = out.iter().map(|a| a.url.clone()).collect();

    for cap in FILE_LINK_RE.captures_iter(html) {
        let url = cap[1].to_string();
        if !seen.insert(url.clone()) {
            continue;
        }
        let ext = cap[2].to_ascii_lowercase();
        let mime = mime_for_extension(&ext);
        let title = url.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(UNTITLED).to_string();
        out.push(Attachment {
            id: ContentId::Text(url.clone()),
            title,
            description: format!("{} file", ext.to_ascii_uppercase()),
            url,
            kind: attachment_kind(mime),
            size: UNKNOWN_SIZE.to_string(),
            mime_type: mime.to_string(),
        });
    }
    out
}
