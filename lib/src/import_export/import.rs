use crate::error::{MarktreeError, Result};
use crate::models::bookmark::{from_epoch, BookmarkNode};
use crate::utils;
use chrono::{DateTime, Utc};
use log::debug;
use regex::Regex;
use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;
use tl::{HTMLTag, NodeHandle, Parser};

fn stray_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</?p>|<hr\s*/?>").expect("static regex"))
}

fn item_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(/?)(dt|dd)>").expect("static regex"))
}

/// Repair the markup browsers emit so that `tl` builds the right tree
///
/// Netscape exports never close `<DT>`/`<DD>` and sprinkle `<p>` after every
/// list tag. Unclosed items would swallow their following siblings, so each
/// line gets closing tags for the items it opens. Paragraph tags and `<HR>`
/// separators are dropped.
pub fn repair_markup(html: &str) -> String {
    let mut repaired = String::with_capacity(html.len() + html.len() / 8);

    for line in html.lines() {
        let line = stray_tag().replace_all(line, "");
        repaired.push_str(&line);

        let mut open: Vec<&str> = Vec::new();
        for caps in item_tag().captures_iter(&line) {
            let name = caps.get(2).map_or("", |m| m.as_str());
            if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
                if let Some(pos) = open.iter().rposition(|o| o.eq_ignore_ascii_case(name)) {
                    open.remove(pos);
                }
            } else {
                open.push(name);
            }
        }
        for name in open.iter().rev() {
            repaired.push_str("</");
            repaired.push_str(name);
            repaired.push('>');
        }

        repaired.push('\n');
    }

    repaired
}

/// Read, repair and parse a bookmarks export into a folder tree
///
/// The root folder is named after the file without its extension.
pub fn load_document(path: &Path) -> Result<BookmarkNode> {
    let html = std::fs::read_to_string(path).map_err(|source| MarktreeError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    let repaired = repair_markup(&html);
    parse_document(&repaired, &utils::output_name_for(path))
}

/// Parse already repaired markup
pub fn parse_document(html: &str, root_name: &str) -> Result<BookmarkNode> {
    let dom = tl::parse(html, tl::ParserOptions::default())?;
    let parser = dom.parser();

    let root_list = find_tag(dom.children(), parser, "dl")
        .ok_or_else(|| MarktreeError::Parse("no <DL> bookmark list found".to_string()))?;

    // Some exporters date the whole collection on the <H1> header
    let (created, modified) = match find_tag(dom.children(), parser, "h1") {
        Some(header) => (
            optional_epoch(header, "H1", "ADD_DATE", "add_date")?,
            optional_epoch(header, "H1", "LAST_MODIFIED", "last_modified")?,
        ),
        None => (None, None),
    };

    let children = parse_list(root_list, parser)?;
    debug!(
        "Parsed bookmark document '{}' with {} top-level entries",
        root_name,
        children.len()
    );

    Ok(BookmarkNode::folder(
        root_name,
        created.unwrap_or_else(Utc::now),
        modified,
        children,
    ))
}

fn parse_list<'buf>(list: &HTMLTag<'buf>, parser: &Parser<'buf>) -> Result<Vec<BookmarkNode>> {
    let children = list.children();
    let handles = children.top().as_slice();
    let mut nodes = Vec::new();
    let mut i = 0;

    while i < handles.len() {
        let Some(item) = tag_at(handles[i], parser) else {
            i += 1;
            continue;
        };
        i += 1;

        if !is_named(item, "dt") {
            continue;
        }

        if let Some(header) = child_tag(item, parser, "h3") {
            // Folder contents follow the header as a sibling list, possibly
            // after a <DD> description
            let mut contents = match child_tag(item, parser, "dl") {
                Some(inner) => Some(parse_list(inner, parser)?),
                None => None,
            };
            while contents.is_none() && i < handles.len() {
                match tag_at(handles[i], parser) {
                    None => i += 1,
                    Some(next) if is_named(next, "dd") => i += 1,
                    Some(next) if is_named(next, "dl") => {
                        contents = Some(parse_list(next, parser)?);
                        i += 1;
                    }
                    Some(_) => break,
                }
            }
            nodes.push(parse_folder(header, parser, contents.unwrap_or_default())?);
        } else if let Some(anchor) = child_tag(item, parser, "a") {
            nodes.push(parse_link(anchor, parser)?);
        }
    }

    Ok(nodes)
}

fn parse_folder<'buf>(
    header: &HTMLTag<'buf>,
    parser: &Parser<'buf>,
    children: Vec<BookmarkNode>,
) -> Result<BookmarkNode> {
    let name = decoded_text(header, parser);
    let created_at = optional_epoch(header, "H3", "ADD_DATE", "add_date")?
        .ok_or_else(|| MarktreeError::malformed("H3", "ADD_DATE", format!("missing on folder '{}'", name)))?;
    let modified_at = optional_epoch(header, "H3", "LAST_MODIFIED", "last_modified")?;

    Ok(BookmarkNode::folder(name, created_at, modified_at, children))
}

fn parse_link<'buf>(anchor: &HTMLTag<'buf>, parser: &Parser<'buf>) -> Result<BookmarkNode> {
    let label = decoded_text(anchor, parser);
    let url = attribute(anchor, "HREF", "href")
        .ok_or_else(|| MarktreeError::malformed("A", "HREF", format!("missing on link '{}'", label)))?;
    let added_at = optional_epoch(anchor, "A", "ADD_DATE", "add_date")?
        .ok_or_else(|| MarktreeError::malformed("A", "ADD_DATE", format!("missing on link '{}'", url)))?;

    Ok(BookmarkNode::link(label, url, added_at))
}

/// Inner text with HTML entities decoded and surrounding whitespace removed
fn decoded_text<'buf>(tag: &HTMLTag<'buf>, parser: &Parser<'buf>) -> String {
    let raw = tag.inner_text(parser);
    html_escape::decode_html_entities(raw.as_ref()).trim().to_string()
}

fn attribute(tag: &HTMLTag<'_>, upper: &'static str, lower: &'static str) -> Option<String> {
    let attributes = tag.attributes();
    attributes
        .get(upper)
        .or_else(|| attributes.get(lower))
        .map(|value| {
            value
                .map(|v| v.as_utf8_str().into_owned())
                .unwrap_or_default()
        })
}

/// Epoch-seconds attribute; absent yields `None`, non-numeric is an error
fn optional_epoch(
    tag: &HTMLTag<'_>,
    tag_name: &str,
    upper: &'static str,
    lower: &'static str,
) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = attribute(tag, upper, lower) else {
        return Ok(None);
    };

    match value.trim().parse::<i64>().ok().and_then(from_epoch) {
        Some(at) => Ok(Some(at)),
        None => Err(MarktreeError::malformed(tag_name, upper, value)),
    }
}

fn is_named(tag: &HTMLTag<'_>, name: &str) -> bool {
    let tag_name: Cow<'_, str> = tag.name().as_utf8_str();
    tag_name.eq_ignore_ascii_case(name)
}

fn tag_at<'p, 'buf>(handle: NodeHandle, parser: &'p Parser<'buf>) -> Option<&'p HTMLTag<'buf>> {
    handle.get(parser).and_then(|node| node.as_tag())
}

fn child_tag<'p, 'buf>(
    tag: &HTMLTag<'buf>,
    parser: &'p Parser<'buf>,
    name: &str,
) -> Option<&'p HTMLTag<'buf>> {
    let children = tag.children();
    let found = children
        .top()
        .as_slice()
        .iter()
        .filter_map(|handle| tag_at(*handle, parser))
        .find(|child| is_named(child, name));
    found
}

/// First tag with the given name, depth first in document order
fn find_tag<'p, 'buf>(
    handles: &[NodeHandle],
    parser: &'p Parser<'buf>,
    name: &str,
) -> Option<&'p HTMLTag<'buf>> {
    for handle in handles {
        if let Some(tag) = tag_at(*handle, parser) {
            if is_named(tag, name) {
                return Some(tag);
            }
            let children = tag.children();
            if let Some(found) = find_tag(children.top().as_slice(), parser, name) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CHROME_EXPORT: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- This is an automatically generated file.
     It will be read and overwritten.
     DO NOT EDIT! -->
<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
<DL><p>
    <DT><H3 ADD_DATE="1234567890" LAST_MODIFIED="1234567891" PERSONAL_TOOLBAR_FOLDER="true">Bookmarks bar</H3>
    <DL><p>
        <DT><A HREF="https://github.com" ADD_DATE="1234567890" ICON="data:image/png;base64,iVBOR">GitHub</A>
        <DT><H3 ADD_DATE="1000000000" LAST_MODIFIED="0">Cat&amp;Dog</H3>
        <DL><p>
            <DT><A HREF="https://example.com/?a=1&amp;b=2" ADD_DATE="1300000000">Tom &amp; Jerry</A>
        </DL><p>
    </DL><p>
    <DT><A HREF="https://rust-lang.org" ADD_DATE="1500000000">Rust</A>
</DL><p>
"#;

    fn create_temp_html(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".html").unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn parse(html: &str) -> Result<BookmarkNode> {
        parse_document(&repair_markup(html), "bookmarks")
    }

    #[rstest]
    #[case("<DL><p>", "<DL>")]
    #[case("</DL><p>", "</DL>")]
    #[case("<DT><A HREF=\"x\">X</A>", "<DT><A HREF=\"x\">X</A></DT>")]
    #[case("<dt><a href=\"x\">x</a>", "<dt><a href=\"x\">x</a></dt>")]
    #[case("<DT><A HREF=\"x\">X</A></DT>", "<DT><A HREF=\"x\">X</A></DT>")]
    #[case("<DD>Description", "<DD>Description</DD>")]
    #[case("<P>text</P>", "text")]
    #[case("    <HR>    <DT><H3 ADD_DATE=\"1\">X</H3>", "        <DT><H3 ADD_DATE=\"1\">X</H3></DT>")]
    #[case("plain text", "plain text")]
    fn test_repair_markup(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(repair_markup(input), format!("{}\n", expected));
    }

    #[test]
    fn test_parse_chrome_export() {
        let root = parse(CHROME_EXPORT).unwrap();

        let BookmarkNode::Folder { name, children, .. } = &root else {
            panic!("root must be a folder");
        };
        assert_eq!(name, "bookmarks");
        assert_eq!(children.len(), 2);
        assert_eq!(root.folder_count(), 2);
        assert_eq!(root.link_count(), 3);

        let BookmarkNode::Folder {
            name,
            created_at,
            modified_at,
            children: bar,
        } = &children[0]
        else {
            panic!("first entry must be a folder");
        };
        assert_eq!(name, "Bookmarks bar");
        assert_eq!(created_at.timestamp(), 1234567890);
        assert_eq!(modified_at.timestamp(), 1234567891);
        assert_eq!(bar.len(), 2);

        match &children[1] {
            BookmarkNode::Link { label, url, added_at } => {
                assert_eq!(label, "Rust");
                assert_eq!(url, "https://rust-lang.org");
                assert_eq!(added_at.timestamp(), 1500000000);
            }
            other => panic!("expected link, got {:?}", other),
        }
    }

    #[test]
    fn test_decodes_names_and_labels_but_not_urls() {
        let root = parse(CHROME_EXPORT).unwrap();
        let bar = &root.children()[0];
        let pets = &bar.children()[1];

        let BookmarkNode::Folder {
            name, modified_at, created_at, ..
        } = pets
        else {
            panic!("expected folder");
        };
        assert_eq!(name, "Cat&Dog");
        assert_eq!(created_at.timestamp(), 1_000_000_000);
        assert_eq!(modified_at, created_at, "LAST_MODIFIED=0 falls back to ADD_DATE");

        match &pets.children()[0] {
            BookmarkNode::Link { label, url, .. } => {
                assert_eq!(label, "Tom & Jerry");
                assert_eq!(url, "https://example.com/?a=1&amp;b=2");
            }
            other => panic!("expected link, got {:?}", other),
        }
    }

    #[test]
    fn test_preserves_document_order() {
        let html = r#"<DL><p>
    <DT><A HREF="https://c.example" ADD_DATE="3">C</A>
    <DT><H3 ADD_DATE="1">Middle</H3>
    <DL><p>
    </DL><p>
    <DT><A HREF="https://a.example" ADD_DATE="1">A</A>
</DL><p>"#;
        let root = parse(html).unwrap();
        let kinds: Vec<String> = root
            .children()
            .iter()
            .map(|c| match c {
                BookmarkNode::Folder { name, .. } => format!("folder:{}", name),
                BookmarkNode::Link { label, .. } => format!("link:{}", label),
            })
            .collect();
        assert_eq!(kinds, vec!["link:C", "folder:Middle", "link:A"]);
    }

    #[test]
    fn test_folder_with_description_and_lowercase_markup() {
        let html = r#"<dl><p>
    <dt><h3 add_date="100">Notes</h3>
    <dd>Things I keep
    <dl><p>
        <dt><a href="https://notes.example" add_date="200">Notes app</a>
        <dd>Synced across devices
    </dl><p>
</dl><p>"#;
        let root = parse(html).unwrap();
        assert_eq!(root.folder_count(), 1);
        let notes = &root.children()[0];
        assert_eq!(notes.children().len(), 1);
        assert_eq!(root.link_count(), 1);
    }

    #[test]
    fn test_folder_without_list_is_empty() {
        let html = r#"<DL><p>
    <DT><H3 ADD_DATE="100">Lonely</H3>
    <DT><A HREF="https://x.example" ADD_DATE="100">X</A>
</DL><p>"#;
        let root = parse(html).unwrap();
        assert_eq!(root.children().len(), 2);
        assert!(root.children()[0].children().is_empty());
    }

    #[test]
    fn test_header_dates_used_for_root() {
        let html = r#"<H1 ADD_DATE="1600000000" LAST_MODIFIED="1600000100">Bookmarks Menu</H1>
<DL><p>
</DL><p>"#;
        match parse(html).unwrap() {
            BookmarkNode::Folder {
                created_at,
                modified_at,
                children,
                ..
            } => {
                assert_eq!(created_at.timestamp(), 1600000000);
                assert_eq!(modified_at.timestamp(), 1600000100);
                assert!(children.is_empty());
            }
            other => panic!("expected folder, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_root_list() {
        let result = parse("<TITLE>Bookmarks</TITLE>\n<H1>Bookmarks</H1>\n");
        assert!(matches!(result, Err(MarktreeError::Parse(_))));
    }

    #[rstest]
    #[case(r#"<DT><H3>No date</H3>"#, "ADD_DATE")]
    #[case(r#"<DT><H3 ADD_DATE="soon">Bad date</H3>"#, "ADD_DATE")]
    #[case(r#"<DT><H3 ADD_DATE="1" LAST_MODIFIED="later">Bad modified</H3>"#, "LAST_MODIFIED")]
    #[case(r#"<DT><A ADD_DATE="1">No href</A>"#, "HREF")]
    #[case(r#"<DT><A HREF="https://x.example">No date</A>"#, "ADD_DATE")]
    fn test_malformed_attributes(#[case] fragment: &str, #[case] expected: &str) {
        let html = format!("<DL><p>\n    {}\n</DL><p>", fragment);
        match parse(&html) {
            Err(MarktreeError::MalformedAttribute { attribute, .. }) => {
                assert_eq!(attribute, expected)
            }
            other => panic!("expected malformed attribute, got {:?}", other),
        }
    }

    #[test]
    fn test_load_document_names_root_after_file() {
        let file = create_temp_html(CHROME_EXPORT);
        let root = load_document(file.path()).unwrap();
        let expected = file.path().file_stem().unwrap().to_string_lossy().to_string();
        match root {
            BookmarkNode::Folder { name, .. } => assert_eq!(name, expected),
            other => panic!("expected folder, got {:?}", other),
        }
    }

    #[test]
    fn test_load_document_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_document(&dir.path().join("missing.html"));
        assert!(matches!(result, Err(MarktreeError::SourceRead { .. })));
    }
}
