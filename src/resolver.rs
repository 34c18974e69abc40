// src/resolver.rs
//! URL-to-reference resolution.
//!
//! Maps a browser page URL onto a typed [`DocumentRef`]. Resolution is a
//! pure function: no I/O, no side effects, and an unsupported URL yields
//! `None` rather than an error — a miss is a classification result, not
//! a failure.

use crate::types::{DocumentRef, Provider};
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref GOOGLE_SHEET_ID: Regex = Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)")
        .expect("google sheet id pattern must compile");
    static ref GOOGLE_GID: Regex =
        Regex::new(r"#gid=([0-9]+)").expect("google gid pattern must compile");
    static ref FEISHU_DOCX: Regex =
        Regex::new(r"/docx/([a-zA-Z0-9_-]+)").expect("feishu docx pattern must compile");
    static ref FEISHU_SHEET: Regex =
        Regex::new(r"/sheets/([a-zA-Z0-9_-]+)").expect("feishu sheet pattern must compile");
    static ref DINGTALK_NODE: Regex =
        Regex::new(r"/i/nodes/([a-zA-Z0-9_-]+)").expect("dingtalk node pattern must compile");
    static ref DINGTALK_DENTRY: Regex =
        Regex::new(r"[?&]dentryUuid=([a-zA-Z0-9_-]+)").expect("dingtalk dentry pattern must compile");
}

/// Resolves a page URL to a typed document reference.
///
/// Providers are tried in a fixed priority order: Google Sheets, then
/// Feishu (a `/sheets/` segment classifies as a spreadsheet and wins over
/// `/docx/`), then DingTalk node/preview. Returns `None` when no pattern
/// matches.
pub fn resolve(url: &str) -> Option<DocumentRef> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    if host.ends_with("docs.google.com") {
        return resolve_google(url);
    }
    if host.ends_with("feishu.cn") {
        return resolve_feishu(url);
    }
    if host.ends_with("dingtalk.com") {
        return resolve_dingtalk(url);
    }
    None
}

fn resolve_google(url: &str) -> Option<DocumentRef> {
    let id = first_capture(&GOOGLE_SHEET_ID, url)?;
    // The gid fragment selects a tab within the spreadsheet; tab 0 is the
    // provider default when the fragment is absent.
    let gid = first_capture(&GOOGLE_GID, url).unwrap_or_else(|| "0".to_string());
    DocumentRef::new(Provider::Google, id, Some(gid), url).ok()
}

fn resolve_feishu(url: &str) -> Option<DocumentRef> {
    if let Some(id) = first_capture(&FEISHU_SHEET, url) {
        return DocumentRef::new(Provider::FeishuSheet, id, None, url).ok();
    }
    let id = first_capture(&FEISHU_DOCX, url)?;
    DocumentRef::new(Provider::FeishuDocx, id, None, url).ok()
}

fn resolve_dingtalk(url: &str) -> Option<DocumentRef> {
    if let Some(id) = first_capture(&DINGTALK_NODE, url) {
        return DocumentRef::new(Provider::DingTalkNode, id, None, url).ok();
    }
    let id = first_capture(&DINGTALK_DENTRY, url)?;
    DocumentRef::new(Provider::DingTalkPreview, id, None, url).ok()
}

fn first_capture(pattern: &Regex, input: &str) -> Option<String> {
    pattern
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
