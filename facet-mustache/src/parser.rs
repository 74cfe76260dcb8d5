//! Recursive-descent parser building the node tree from the token stream.

use facet_reflect::Span;

use crate::error::{MustacheError, MustacheErrorKind, Result};
use crate::lexer::{Lexer, TokenKind, span_text};

/// How deeply sections may nest inside one template.
pub const MAX_SECTION_DEPTH: usize = 256;

/// A dotted name such as `a.b.c`, or `.` for the current context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Path {
    segments: Vec<String>,
}

impl Path {
    pub(crate) fn parse(name: &str) -> Self {
        let segments = if name == "." {
            vec![".".to_string()]
        } else {
            name.split('.').map(str::to_string).collect()
        };
        Path { segments }
    }

    /// The first segment, resolved against the whole context stack.
    pub(crate) fn head(&self) -> &str {
        self.segments.first().map_or(".", String::as_str)
    }

    /// The remaining segments, each resolved against the previous result.
    pub(crate) fn tail(&self) -> &[String] {
        self.segments.get(1..).unwrap_or_default()
    }
}

/// One node of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    /// Text copied to the output verbatim.
    Literal(Span),
    /// `{{name}}` (escaped) or `{{{name}}}` / `{{&name}}` (not escaped).
    Variable { path: Path, escape: bool },
    /// `{{#name}}...{{/name}}`
    Section { path: Path, children: Vec<Node> },
    /// `{{^name}}...{{/name}}`
    Inverted { path: Path, children: Vec<Node> },
    /// `{{>name}}`, with the indentation to apply when it stood alone.
    Partial {
        name: String,
        indent: Option<String>,
    },
}

/// Parse a whole template. Every section must be closed.
pub(crate) fn parse(source: &str) -> Result<Vec<Node>> {
    let mut lexer = Lexer::new(source);
    parse_nodes(source, &mut lexer, None, 0).map_err(|err| err.with_source(source))
}

/// Parse nodes until the end tag for `open` (or the end of input when there
/// is no open section). `depth` counts the sections already open.
fn parse_nodes(
    source: &str,
    lexer: &mut Lexer<'_>,
    open: Option<(&str, Span)>,
    depth: usize,
) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();

    while let Some(token) = lexer.next() {
        let token = token?;
        let name = span_text(source, token.span);
        match token.kind {
            TokenKind::Text => nodes.push(Node::Literal(token.span)),
            TokenKind::Escaped | TokenKind::Unescaped => nodes.push(Node::Variable {
                path: Path::parse(name),
                escape: token.kind == TokenKind::Escaped,
            }),
            TokenKind::Section | TokenKind::Inverted if depth >= MAX_SECTION_DEPTH => {
                return Err(MustacheError::new(
                    MustacheErrorKind::NestingLimitExceeded {
                        name: name.to_string(),
                        limit: MAX_SECTION_DEPTH,
                    },
                    token.tag,
                ));
            }
            TokenKind::Section => {
                let children = parse_nodes(source, lexer, Some((name, token.tag)), depth + 1)?;
                nodes.push(Node::Section {
                    path: Path::parse(name),
                    children,
                });
            }
            TokenKind::Inverted => {
                let children = parse_nodes(source, lexer, Some((name, token.tag)), depth + 1)?;
                nodes.push(Node::Inverted {
                    path: Path::parse(name),
                    children,
                });
            }
            TokenKind::Partial { indent } => nodes.push(Node::Partial {
                name: name.to_string(),
                indent: (indent.len > 0).then(|| span_text(source, indent).to_string()),
            }),
            TokenKind::End => {
                return match open {
                    Some((expected, _)) if expected == name => Ok(nodes),
                    Some((expected, _)) => Err(MustacheError::new(
                        MustacheErrorKind::MismatchedEndTag {
                            expected: expected.to_string(),
                            got: name.to_string(),
                        },
                        token.tag,
                    )),
                    None => Err(MustacheError::new(
                        MustacheErrorKind::UnexpectedEndTag {
                            got: name.to_string(),
                        },
                        token.tag,
                    )),
                };
            }
        }
    }

    match open {
        Some((name, span)) => Err(MustacheError::new(
            MustacheErrorKind::UnclosedSection {
                name: name.to_string(),
            },
            span,
        )),
        None => Ok(nodes),
    }
}
