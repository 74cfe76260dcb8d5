//! Tokenizer for Mustache templates.
//!
//! The lexer yields tokens lazily so the parser can pull them one at a time
//! while it builds nested sections. It owns the active delimiters, which
//! `{{=<% %>=}}` tags swap out mid-stream, and applies the standalone-line
//! rules: a section, inverted, end, partial, comment or set-delimiter tag
//! that is alone on its line takes the whole line with it, including the
//! line break.

use facet_reflect::Span;

use crate::error::{MustacheError, MustacheErrorKind, Result};
use crate::tracing_macros::trace;

/// Open delimiter every template (and every partial) starts with.
pub(crate) const DEFAULT_OPEN: &str = "{{";
/// Close delimiter every template (and every partial) starts with.
pub(crate) const DEFAULT_CLOSE: &str = "}}";

/// What a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Literal text between tags
    Text,
    /// `{{name}}`
    Escaped,
    /// `{{{name}}}` or `{{&name}}`
    Unescaped,
    /// `{{#name}}`
    Section,
    /// `{{^name}}`
    Inverted,
    /// `{{/name}}`
    End,
    /// `{{>name}}`, with the whitespace that preceded it when standalone
    Partial { indent: Span },
}

/// A token pointing into the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// The text run, or the tag's name.
    pub span: Span,
    /// The whole tag including delimiters. Equal to `span` for text.
    pub tag: Span,
}

/// A tag after scanning, before standalone handling.
enum Tag {
    Comment,
    SetDelimiters { open: String, close: String },
    Token { kind: TokenKind, name: Span },
}

impl Tag {
    fn may_stand_alone(&self) -> bool {
        match self {
            Tag::Comment | Tag::SetDelimiters { .. } => true,
            Tag::Token { kind, .. } => !matches!(kind, TokenKind::Escaped | TokenKind::Unescaped),
        }
    }
}

/// Returns the slice of `source` covered by `span`.
#[inline]
pub(crate) fn span_text(source: &str, span: Span) -> &str {
    &source[span.offset as usize..span.end()]
}

/// Lazy tokenizer over a template.
pub(crate) struct Lexer<'src> {
    source: &'src str,
    pos: usize,
    open: String,
    close: String,
    /// Tag token produced together with the text before it
    pending: Option<Token>,
    done: bool,
}

impl<'src> Lexer<'src> {
    /// Create a lexer starting with the default `{{ }}` delimiters.
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            open: DEFAULT_OPEN.to_string(),
            close: DEFAULT_CLOSE.to_string(),
            pending: None,
            done: false,
        }
    }

    /// Scan up to and including the next tag.
    ///
    /// Returns `None` when the step produced nothing to emit (a comment or
    /// set-delimiter tag with no text before it).
    fn advance(&mut self) -> Result<Option<Token>> {
        let source = self.source;
        let start = self.pos;

        let Some(offset) = source[start..].find(self.open.as_str()) else {
            self.pos = source.len();
            self.done = true;
            return Ok(text_token(start, source.len()));
        };

        let tag_start = start + offset;
        let (tag, scanned_end) = self.scan_tag(tag_start)?;
        let tag_span = Span::new(tag_start, scanned_end - tag_start);

        let mut text_end = tag_start;
        let mut tag_end = scanned_end;
        let mut indent = Span::new(tag_start, 0);
        if tag.may_stand_alone()
            && let Some((line_start, line_end)) =
                standalone_line(source, start, tag_start, scanned_end)
        {
            trace!(
                tag = %tag_span,
                line_start,
                line_end,
                "standalone tag, trimming line"
            );
            indent = Span::new(line_start, tag_start - line_start);
            text_end = line_start;
            tag_end = line_end;
        }
        self.pos = tag_end;

        let token = match tag {
            Tag::Comment => None,
            Tag::SetDelimiters { open, close } => {
                trace!(%open, %close, "switching delimiters");
                self.open = open;
                self.close = close;
                None
            }
            Tag::Token {
                kind: TokenKind::Partial { .. },
                name,
            } => Some(Token {
                kind: TokenKind::Partial { indent },
                span: name,
                tag: tag_span,
            }),
            Tag::Token { kind, name } => Some(Token {
                kind,
                span: name,
                tag: tag_span,
            }),
        };

        match text_token(start, text_end) {
            Some(text) => {
                self.pending = token;
                Ok(Some(text))
            }
            None => Ok(token),
        }
    }

    /// Scan the tag whose open delimiter starts at `start`.
    ///
    /// Returns the tag and the offset just past its close delimiter.
    fn scan_tag(&self, start: usize) -> Result<(Tag, usize)> {
        let source = self.source;
        let mut cursor = start + self.open.len();

        let triple = source[cursor..].starts_with('{');
        if triple {
            cursor += 1;
        }
        cursor = skip_whitespace(source, cursor);

        let sigil = if triple {
            None
        } else {
            source[cursor..].chars().next()
        };
        let kind = match sigil {
            Some('!') => return self.scan_comment(start, cursor + 1),
            Some('=') => return self.scan_set_delimiters(start, cursor + 1),
            Some('&') => TokenKind::Unescaped,
            Some('#') => TokenKind::Section,
            Some('^') => TokenKind::Inverted,
            Some('/') => TokenKind::End,
            Some('>') => TokenKind::Partial {
                indent: Span::default(),
            },
            _ if triple => TokenKind::Unescaped,
            _ => TokenKind::Escaped,
        };
        if !matches!(kind, TokenKind::Escaped) && !triple {
            cursor = skip_whitespace(source, cursor + 1);
        }

        let terminator = if triple { "}" } else { self.close.as_str() };
        let name_start = cursor;
        let name_end = source[cursor..]
            .char_indices()
            .find(|&(i, c)| c.is_whitespace() || source[cursor + i..].starts_with(terminator))
            .map_or(source.len(), |(i, _)| cursor + i);

        if name_end == source.len() {
            return Err(self.unclosed(start, name_end));
        }
        if name_end == name_start {
            return Err(MustacheError::new(
                MustacheErrorKind::EmptyTag,
                Span::new(start, name_end + terminator.len() - start),
            ));
        }

        cursor = skip_whitespace(source, name_end);
        if triple {
            if !source[cursor..].starts_with('}') {
                return Err(self.unclosed(start, cursor));
            }
            cursor += 1;
        }
        if !source[cursor..].starts_with(self.close.as_str()) {
            return Err(self.unclosed(start, cursor));
        }

        let name = Span::new(name_start, name_end - name_start);
        Ok((Tag::Token { kind, name }, cursor + self.close.len()))
    }

    fn scan_comment(&self, start: usize, from: usize) -> Result<(Tag, usize)> {
        match self.source[from..].find(self.close.as_str()) {
            Some(i) => Ok((Tag::Comment, from + i + self.close.len())),
            None => Err(self.unclosed(start, self.source.len())),
        }
    }

    fn scan_set_delimiters(&self, start: usize, from: usize) -> Result<(Tag, usize)> {
        let terminator = format!("={}", self.close);
        let Some(i) = self.source[from..].find(terminator.as_str()) else {
            return Err(self.unclosed(start, self.source.len()));
        };
        let end = from + i + terminator.len();

        let content = &self.source[from..from + i];
        let mut parts = content.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(open), Some(close), None) if !open.contains('=') && !close.contains('=') => {
                Ok((
                    Tag::SetDelimiters {
                        open: open.to_string(),
                        close: close.to_string(),
                    },
                    end,
                ))
            }
            _ => Err(MustacheError::new(
                MustacheErrorKind::InvalidDelimiters {
                    content: content.to_string(),
                },
                Span::new(start, end - start),
            )),
        }
    }

    fn unclosed(&self, start: usize, at: usize) -> MustacheError {
        MustacheError::new(
            MustacheErrorKind::UnclosedTag {
                close: self.close.clone(),
            },
            Span::new(start, at - start),
        )
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.take() {
            return Some(Ok(token));
        }
        while !self.done {
            match self.advance() {
                Ok(Some(token)) => return Some(Ok(token)),
                Ok(None) => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

fn text_token(start: usize, end: usize) -> Option<Token> {
    (end > start).then(|| {
        let span = Span::new(start, end - start);
        Token {
            kind: TokenKind::Text,
            span,
            tag: span,
        }
    })
}

fn skip_whitespace(source: &str, pos: usize) -> usize {
    let rest = &source[pos..];
    pos + rest.len() - rest.trim_start().len()
}

#[inline]
fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// If the tag at `tag_start..tag_end` is the only thing on its line, returns
/// the offset where the line starts and the offset just past its line break.
///
/// `text_start` is where the current text run began; a previous tag on the
/// same line ends there, which makes this one inline.
fn standalone_line(
    source: &str,
    text_start: usize,
    tag_start: usize,
    tag_end: usize,
) -> Option<(usize, usize)> {
    let bytes = source.as_bytes();

    let mut line_start = tag_start;
    while line_start > text_start && is_blank(bytes[line_start - 1]) {
        line_start -= 1;
    }
    if line_start > 0 && bytes[line_start - 1] != b'\n' {
        return None;
    }

    let mut line_end = tag_end;
    while line_end < bytes.len() && is_blank(bytes[line_end]) {
        line_end += 1;
    }
    let rest = &source[line_end..];
    if rest.is_empty() {
        Some((line_start, line_end))
    } else if rest.starts_with("\r\n") {
        Some((line_start, line_end + 2))
    } else if rest.starts_with('\n') {
        Some((line_start, line_end + 1))
    } else {
        None
    }
}
