//! Minimal gettext PO support.
//!
//! Enough to upload a source export and read back the vendor's translated
//! file: contexts, ids, singular strings, comments, and multi-line
//! continuation. Plural forms keep only `msgstr[0]`.

use std::fmt::Write as _;

use locsync_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// One translatable message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoEntry {
    pub msgctxt: Option<String>,
    pub msgid: String,
    pub msgstr: String,
}

impl PoEntry {
    /// An untranslated entry.
    #[must_use]
    pub fn source(msgctxt: Option<&str>, msgid: &str) -> Self {
        Self {
            msgctxt: msgctxt.map(str::to_string),
            msgid: msgid.to_string(),
            msgstr: String::new(),
        }
    }
}

const HEADER: &str = "MIME-Version: 1.0\nContent-Type: text/plain; charset=UTF-8\nContent-Transfer-Encoding: 8bit\n";

/// Render entries as a UTF-8 PO file with a standard header.
#[must_use]
pub fn render(entries: &[PoEntry]) -> String {
    let mut out = String::new();
    write_field(&mut out, "msgid", "");
    write_field(&mut out, "msgstr", HEADER);

    for entry in entries {
        out.push('\n');
        if let Some(ctxt) = &entry.msgctxt {
            write_field(&mut out, "msgctxt", ctxt);
        }
        write_field(&mut out, "msgid", &entry.msgid);
        write_field(&mut out, "msgstr", &entry.msgstr);
    }
    out
}

fn write_field(out: &mut String, keyword: &str, value: &str) {
    let multiline = value.trim_end_matches('\n').contains('\n')
        || (value.ends_with('\n') && value.len() > 1);
    if multiline {
        let _ = writeln!(out, "{keyword} \"\"");
        for line in value.split_inclusive('\n') {
            let _ = writeln!(out, "\"{}\"", escape(line));
        }
    } else {
        let _ = writeln!(out, "{keyword} \"{}\"", escape(value));
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[derive(Clone, Copy)]
enum Field {
    Context,
    Id,
    Str,
    Skipped,
}

#[derive(Default)]
struct Pending {
    msgctxt: Option<String>,
    msgid: Option<String>,
    msgstr: Option<String>,
}

impl Pending {
    fn has_message(&self) -> bool {
        self.msgid.is_some() && self.msgstr.is_some()
    }

    fn field(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Context => self.msgctxt.as_mut(),
            Field::Id => self.msgid.as_mut(),
            Field::Str => self.msgstr.as_mut(),
            Field::Skipped => None,
        }
    }
}

/// Parse a PO file. The header entry (empty `msgid`) is dropped.
pub fn parse(input: &str) -> AppResult<Vec<PoEntry>> {
    let mut entries = Vec::new();
    let mut pending = Pending::default();
    let mut field = Field::Skipped;

    let mut flush = |pending: &mut Pending| {
        let done = std::mem::take(pending);
        if let (Some(msgid), Some(msgstr)) = (done.msgid, done.msgstr)
            && !msgid.is_empty()
        {
            entries.push(PoEntry {
                msgctxt: done.msgctxt,
                msgid,
                msgstr,
            });
        }
    };

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.is_empty() {
            flush(&mut pending);
            field = Field::Skipped;
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) if !line.starts_with('"') => (keyword, rest.trim_start()),
            _ => ("", line),
        };

        match keyword {
            "msgctxt" => {
                if pending.has_message() {
                    flush(&mut pending);
                }
                pending.msgctxt = Some(unquote(rest, line_no)?);
                field = Field::Context;
            }
            "msgid" => {
                if pending.has_message() {
                    flush(&mut pending);
                }
                pending.msgid = Some(unquote(rest, line_no)?);
                field = Field::Id;
            }
            "msgstr" | "msgstr[0]" => {
                pending.msgstr = Some(unquote(rest, line_no)?);
                field = Field::Str;
            }
            "msgid_plural" => {
                unquote(rest, line_no)?;
                field = Field::Skipped;
            }
            k if k.starts_with("msgstr[") => {
                unquote(rest, line_no)?;
                field = Field::Skipped;
            }
            "" => {
                let text = unquote(rest, line_no)?;
                let in_message = pending.msgid.is_some();
                match pending.field(field) {
                    Some(target) => target.push_str(&text),
                    None if matches!(field, Field::Skipped) && in_message => {}
                    None => {
                        return Err(invalid(line_no, "continuation line without a keyword"));
                    }
                }
            }
            other => return Err(invalid(line_no, &format!("unknown keyword {other:?}"))),
        }
    }
    flush(&mut pending);

    Ok(entries)
}

fn unquote(value: &str, line_no: usize) -> AppResult<String> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .filter(|_| value.len() >= 2)
        .ok_or_else(|| invalid(line_no, "expected a quoted string"))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                return Err(invalid(line_no, &format!("unknown escape \\{other}")));
            }
            None => return Err(invalid(line_no, "dangling backslash")),
        }
    }
    Ok(out)
}

fn invalid(line_no: usize, message: &str) -> AppError {
    AppError::Validation(format!("Invalid PO file at line {line_no}: {message}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let rendered = render(&[
            PoEntry::source(Some("title"), "Hello \"world\""),
            PoEntry::source(None, "Line one\nLine two"),
        ]);

        assert!(rendered.starts_with("msgid \"\"\nmsgstr \"\"\n\"MIME-Version: 1.0\\n\"\n"));
        assert!(rendered.contains("msgctxt \"title\"\nmsgid \"Hello \\\"world\\\"\"\nmsgstr \"\"\n"));
        assert!(rendered.contains("msgid \"\"\n\"Line one\\n\"\n\"Line two\"\n"));
    }

    #[test]
    fn test_parse_translated_file() {
        let input = r#"# Translated by the vendor
msgid ""
msgstr ""
"Language: fr-FR\n"
"Content-Type: text/plain; charset=UTF-8\n"

#: body
msgctxt "title"
msgid "Hello"
msgstr "Bonjour"

msgid ""
"Two\n"
"lines"
msgstr ""
"Deux\n"
"lignes"
msgid "Tab\tand \\ slash"
msgstr "Tab\tet \\ barre"
"#;
        let entries = parse(input).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].msgctxt.as_deref(), Some("title"));
        assert_eq!(entries[0].msgid, "Hello");
        assert_eq!(entries[0].msgstr, "Bonjour");
        assert_eq!(entries[1].msgctxt, None);
        assert_eq!(entries[1].msgid, "Two\nlines");
        assert_eq!(entries[1].msgstr, "Deux\nlignes");
        assert_eq!(entries[2].msgid, "Tab\tand \\ slash");
        assert_eq!(entries[2].msgstr, "Tab\tet \\ barre");
    }

    #[test]
    fn test_parse_plural_keeps_first_form() {
        let input = "msgid \"apple\"\nmsgid_plural \"apples\"\nmsgstr[0] \"pomme\"\nmsgstr[1] \"pommes\"\n";
        let entries = parse(input).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].msgstr, "pomme");
    }

    #[test]
    fn test_parse_rendered_export() {
        let source = vec![
            PoEntry::source(Some("a"), "First"),
            PoEntry::source(None, "Second\nparagraph\n"),
        ];
        assert_eq!(parse(&render(&source)).unwrap(), source);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("msgid Hello\n"), Err(AppError::Validation(_))));
        assert!(matches!(parse("msgid \"bad \\q\"\n"), Err(AppError::Validation(_))));
        assert!(matches!(parse("\"orphan\"\n"), Err(AppError::Validation(_))));
        assert!(matches!(parse("msgfoo \"x\"\n"), Err(AppError::Validation(_))));
    }
}
