use crate::lens::directives::list_style;
use crate::lens::errors::LensError;
use crate::lens::LensOptions;
use crate::tree::store::{Layout, Node, NodeKind, Tree, BLANK_LABEL};
use crate::tree::{NodeRef, COMMENT_LABEL, HOST_LABEL, MATCH_LABEL};

#[derive(Debug, PartialEq)]
enum ParsedLine<'a> {
    Blank,
    Comment {
        indent: &'a str,
        text: &'a str,
    },
    Keyword {
        indent: &'a str,
        keyword: &'a str,
        separator: &'a str,
        value: &'a str,
        trailing: &'a str,
    },
}

pub(crate) fn parse(text: &str, options: LensOptions) -> Result<Tree, LensError> {
    let mut tree = Tree::empty(options);
    let root = tree.root();
    let mut block = root;

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let line_number = idx + 1;
        let (content, eol) = split_eol(line);
        let mut layout = Layout {
            raw: Some(content.to_string()),
            eol: eol.to_string(),
            ..Layout::default()
        };

        match parse_line(content, line_number)? {
            ParsedLine::Blank => {
                let _ = tree.push_node(block, Node::new(NodeKind::Blank, BLANK_LABEL, None, layout));
            }
            ParsedLine::Comment { indent, text } => {
                layout.indent = indent.to_string();
                let _ = tree.push_node(
                    block,
                    Node::new(NodeKind::Comment, COMMENT_LABEL, Some(text.to_string()), layout),
                );
            }
            ParsedLine::Keyword {
                indent,
                keyword,
                separator,
                value,
                trailing,
            } => {
                layout.indent = indent.to_string();
                layout.keyword = keyword.to_string();
                layout.separator = separator.to_string();
                layout.trailing = trailing.to_string();

                if keyword.eq_ignore_ascii_case(HOST_LABEL) {
                    if value.is_empty() {
                        return Err(LensError::MissingHostPattern { line: line_number });
                    }
                    block = tree.push_node(
                        root,
                        Node::new(NodeKind::Host, HOST_LABEL, Some(value.to_string()), layout),
                    );
                } else if keyword.eq_ignore_ascii_case(MATCH_LABEL) {
                    if value.is_empty() {
                        return Err(LensError::MalformedLine {
                            line: line_number,
                            message: "Match without criteria".to_string(),
                        });
                    }
                    block = tree.push_node(
                        root,
                        Node::new(NodeKind::Match, MATCH_LABEL, Some(value.to_string()), layout),
                    );
                } else {
                    push_entry(&mut tree, block, keyword, value, layout);
                }
            }
        }
    }

    Ok(tree)
}

fn push_entry(tree: &mut Tree, block: NodeRef, keyword: &str, value: &str, layout: Layout) {
    match list_style(keyword) {
        Some(style) => {
            let entry = tree.push_node(block, Node::new(NodeKind::Entry, keyword, None, layout));
            for (idx, item) in style.split(value).into_iter().enumerate() {
                let _ = tree.push_node(
                    entry,
                    Node::new(
                        NodeKind::Item,
                        (idx + 1).to_string(),
                        Some(item),
                        Layout::default(),
                    ),
                );
            }
        }
        None => {
            let value = (!value.is_empty()).then(|| value.to_string());
            let _ = tree.push_node(block, Node::new(NodeKind::Entry, keyword, value, layout));
        }
    }
}

/// Directive names are non-empty runs of ASCII letters and digits.
pub fn is_keyword(label: &str) -> bool {
    !label.is_empty() && label.chars().all(|ch| ch.is_ascii_alphanumeric())
}

/// True when `text`, written after a keyword and separator, parses back as
/// exactly `text`: a single line with no leading separator, no trailing blanks,
/// no trailing comment and balanced quotes.
pub fn is_plain_value(text: &str) -> bool {
    if text.contains(['\r', '\n']) || separator_len(text) != 0 {
        return false;
    }
    matches!(split_trailing(text, 0), Ok((value, "")) if value == text)
}

fn split_eol(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

fn parse_line(content: &str, line_number: usize) -> Result<ParsedLine<'_>, LensError> {
    let trimmed = content.trim_start_matches([' ', '\t']);
    let indent = &content[..content.len() - trimmed.len()];

    if trimmed.trim().is_empty() {
        return Ok(ParsedLine::Blank);
    }

    if let Some(text) = trimmed.strip_prefix('#') {
        return Ok(ParsedLine::Comment {
            indent,
            text: text.trim(),
        });
    }

    let keyword_end = trimmed
        .find([' ', '\t', '='])
        .unwrap_or(trimmed.len());
    let keyword = &trimmed[..keyword_end];
    if !is_keyword(keyword) {
        return Err(LensError::MalformedLine {
            line: line_number,
            message: format!("invalid keyword '{keyword}'"),
        });
    }

    let after = &trimmed[keyword_end..];
    let separator_end = separator_len(after);
    let separator = &after[..separator_end];
    let (value, trailing) = split_trailing(&after[separator_end..], line_number)?;

    Ok(ParsedLine::Keyword {
        indent,
        keyword,
        separator,
        value,
        trailing,
    })
}

/// Whitespace, at most one `=`, whitespace.
fn separator_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() && (bytes[idx] == b' ' || bytes[idx] == b'\t') {
        idx += 1;
    }
    if idx < bytes.len() && bytes[idx] == b'=' {
        idx += 1;
        while idx < bytes.len() && (bytes[idx] == b' ' || bytes[idx] == b'\t') {
            idx += 1;
        }
    }
    idx
}

/// Splits the value from trailing whitespace and an optional trailing comment.
/// A `#` starts a comment only outside quotes and after whitespace.
fn split_trailing(rest: &str, line_number: usize) -> Result<(&str, &str), LensError> {
    let mut quote: Option<char> = None;
    let mut escape = false;
    let mut prev_blank = true;
    let mut comment_pos = None;

    for (idx, ch) in rest.char_indices() {
        if escape {
            escape = false;
            prev_blank = false;
            continue;
        }
        match (ch, quote) {
            ('\\', _) => escape = true,
            ('"' | '\'', None) => quote = Some(ch),
            (q, Some(open)) if q == open => quote = None,
            ('#', None) if prev_blank => {
                comment_pos = Some(idx);
                break;
            }
            _ => {}
        }
        prev_blank = quote.is_none() && (ch == ' ' || ch == '\t');
    }

    if quote.is_some() {
        return Err(LensError::UnterminatedQuote { line: line_number });
    }

    let value = rest[..comment_pos.unwrap_or(rest.len())].trim_end_matches([' ', '\t']);
    Ok((value, &rest[value.len()..]))
}
