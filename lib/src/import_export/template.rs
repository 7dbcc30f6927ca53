use crate::error::{MarktreeError, Result};
use chrono::{DateTime, Local, Utc};

/// Format of the add-date slot
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Label,
    Url,
    Date,
}

/// A validated three-slot record template
///
/// Slots are written `{0}`/`{label}`, `{1}`/`{url}` and `{2}`/`{date}`.
/// `{{` and `}}` stand for literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTemplate {
    segments: Vec<Segment>,
}

impl RecordTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut slot = String::new();
                    let mut closed = false;
                    for n in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        slot.push(n);
                    }
                    if !closed {
                        return Err(MarktreeError::Template(format!(
                            "unterminated slot '{{{}' in {:?}",
                            slot, template
                        )));
                    }
                    let segment = match slot.trim() {
                        "0" | "label" => Segment::Label,
                        "1" | "url" => Segment::Url,
                        "2" | "date" => Segment::Date,
                        other => {
                            return Err(MarktreeError::Template(format!(
                                "unknown slot '{{{}}}' in {:?}",
                                other, template
                            )))
                        }
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(MarktreeError::Template(format!(
                        "unmatched '}}' in {:?}",
                        template
                    )))
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Render one record line, without line terminator
    pub fn render(&self, label: &str, url: &str, added_at: &DateTime<Utc>) -> String {
        let date = format_add_date(added_at);
        let mut line = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Label => line.push_str(label),
                Segment::Url => line.push_str(url),
                Segment::Date => line.push_str(&date),
            }
        }
        line
    }
}

/// Human readable add date in local time
pub fn format_add_date(added_at: &DateTime<Utc>) -> String {
    added_at.with_timezone(&Local).format(DATE_FORMAT).to_string()
}
