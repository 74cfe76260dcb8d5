//! Error types for template compilation and rendering.

use core::fmt::{self, Display};

use facet_reflect::{ReflectError, Span};

/// Error returned when a template fails to compile or render.
#[derive(Debug)]
pub struct MustacheError {
    /// The specific kind of error
    pub kind: MustacheErrorKind,
    /// Span of the offending tag, if the error points into a template
    pub span: Option<Span>,
    /// The template text the span points into (for diagnostics)
    pub source_code: Option<String>,
}

impl Display for MustacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for MustacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            MustacheErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl MustacheError {
    /// Create a new error pointing at `span`
    pub const fn new(kind: MustacheErrorKind, span: Span) -> Self {
        MustacheError {
            kind,
            span: Some(span),
            source_code: None,
        }
    }

    /// Create an error without span information
    pub const fn without_span(kind: MustacheErrorKind) -> Self {
        MustacheError {
            kind,
            span: None,
            source_code: None,
        }
    }

    /// Attach the template text for rich diagnostics.
    ///
    /// Errors raised inside a partial already carry the partial's text, so
    /// this keeps whatever source is attached first.
    pub fn with_source(mut self, source: &str) -> Self {
        if self.source_code.is_none() && self.span.is_some() {
            self.source_code = Some(source.to_string());
        }
        self
    }

    /// Returns a reference to the error kind.
    pub fn kind(&self) -> &MustacheErrorKind {
        &self.kind
    }

    pub(crate) fn reflect(err: impl Display) -> Self {
        MustacheError::without_span(MustacheErrorKind::Reflect(err.to_string()))
    }
}

/// Specific error kinds
#[derive(Debug)]
#[non_exhaustive]
pub enum MustacheErrorKind {
    /// Input ended, or something other than the close delimiter followed the
    /// tag name.
    UnclosedTag {
        /// The close delimiter that was expected
        close: String,
    },
    /// A tag with no name, such as `{{}}`.
    EmptyTag,
    /// A set-delimiter tag that doesn't contain exactly two delimiters.
    InvalidDelimiters {
        /// The text between the `=` signs
        content: String,
    },
    /// An end tag with no open section.
    UnexpectedEndTag {
        /// The name on the end tag
        got: String,
    },
    /// An end tag whose name doesn't match the innermost open section.
    MismatchedEndTag {
        /// Name of the innermost open section
        expected: String,
        /// The name on the end tag
        got: String,
    },
    /// The template ended while a section was still open.
    UnclosedSection {
        /// Name of the open section
        name: String,
    },
    /// Sections nested deeper than [`MAX_SECTION_DEPTH`](crate::MAX_SECTION_DEPTH).
    NestingLimitExceeded {
        /// The section that would have exceeded the limit
        name: String,
        /// The nesting limit
        limit: usize,
    },
    /// Partials nested deeper than [`RenderOptions::max_partial_depth`](crate::RenderOptions::max_partial_depth).
    RecursionLimitExceeded {
        /// The partial that would have exceeded the limit
        partial: String,
        /// The configured limit
        limit: usize,
    },
    /// Reflection failed while reading the data.
    Reflect(String),
    /// The output sink refused a write.
    Write,
    /// I/O error from a writer passed to `render_to_writer`.
    Io(std::io::Error),
}

impl Display for MustacheErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MustacheErrorKind::UnclosedTag { close } => {
                write!(f, "unclosed tag, expected `{close}`")
            }
            MustacheErrorKind::EmptyTag => write!(f, "tag has no name"),
            MustacheErrorKind::InvalidDelimiters { content } => {
                write!(f, "invalid set-delimiter tag `={content}=`")
            }
            MustacheErrorKind::UnexpectedEndTag { got } => {
                write!(f, "unmatched end tag: got `{got}`, expected nothing")
            }
            MustacheErrorKind::MismatchedEndTag { expected, got } => {
                write!(f, "unmatched end tag: got `{got}`, expected `{expected}`")
            }
            MustacheErrorKind::UnclosedSection { name } => {
                write!(
                    f,
                    "unclosed section: got end of template, expected `{name}`"
                )
            }
            MustacheErrorKind::NestingLimitExceeded { name, limit } => {
                write!(f, "section `{name}` nests deeper than {limit} levels")
            }
            MustacheErrorKind::RecursionLimitExceeded { partial, limit } => {
                write!(
                    f,
                    "partial `{partial}` exceeds the nesting limit of {limit}"
                )
            }
            MustacheErrorKind::Reflect(msg) => write!(f, "reflection error: {msg}"),
            MustacheErrorKind::Write => write!(f, "failed to write output"),
            MustacheErrorKind::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl MustacheErrorKind {
    /// Get an error code for this kind of error.
    pub const fn code(&self) -> &'static str {
        match self {
            MustacheErrorKind::UnclosedTag { .. } => "mustache::unclosed_tag",
            MustacheErrorKind::EmptyTag => "mustache::empty_tag",
            MustacheErrorKind::InvalidDelimiters { .. } => "mustache::invalid_delimiters",
            MustacheErrorKind::UnexpectedEndTag { .. } => "mustache::unexpected_end_tag",
            MustacheErrorKind::MismatchedEndTag { .. } => "mustache::mismatched_end_tag",
            MustacheErrorKind::UnclosedSection { .. } => "mustache::unclosed_section",
            MustacheErrorKind::NestingLimitExceeded { .. } => "mustache::nesting_limit_exceeded",
            MustacheErrorKind::RecursionLimitExceeded { .. } => {
                "mustache::recursion_limit_exceeded"
            }
            MustacheErrorKind::Reflect(_) => "mustache::reflect",
            MustacheErrorKind::Write => "mustache::write",
            MustacheErrorKind::Io(_) => "mustache::io",
        }
    }

    /// Get a label describing where/what the error points to.
    pub fn label(&self) -> String {
        match self {
            MustacheErrorKind::UnclosedTag { close } => format!("expected `{close}` here"),
            MustacheErrorKind::EmptyTag => "empty tag".into(),
            MustacheErrorKind::InvalidDelimiters { .. } => "expected two delimiters".into(),
            MustacheErrorKind::UnexpectedEndTag { .. } => "no section to close".into(),
            MustacheErrorKind::MismatchedEndTag { expected, .. } => {
                format!("expected `{expected}`")
            }
            MustacheErrorKind::UnclosedSection { .. } => "section opened here".into(),
            MustacheErrorKind::NestingLimitExceeded { .. } => "too deeply nested".into(),
            MustacheErrorKind::RecursionLimitExceeded { .. } => "partial included here".into(),
            MustacheErrorKind::Reflect(_) => "reflection error".into(),
            MustacheErrorKind::Write => "write error".into(),
            MustacheErrorKind::Io(_) => "I/O error".into(),
        }
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            MustacheErrorKind::InvalidDelimiters { .. } => {
                Some("set-delimiter tags look like `{{=<% %>=}}`")
            }
            MustacheErrorKind::MismatchedEndTag { .. } => {
                Some("sections must be closed in the reverse order they were opened")
            }
            MustacheErrorKind::UnclosedSection { .. } => {
                Some("add an end tag before the end of the template")
            }
            MustacheErrorKind::NestingLimitExceeded { .. } => {
                Some("split the template into partials to reduce nesting")
            }
            MustacheErrorKind::RecursionLimitExceeded { .. } => Some(
                "check the partials for unbounded recursion, or raise `RenderOptions::max_partial_depth`",
            ),
            _ => None,
        }
    }
}

impl From<ReflectError> for MustacheError {
    fn from(err: ReflectError) -> Self {
        MustacheError::reflect(err)
    }
}

impl From<fmt::Error> for MustacheError {
    fn from(_: fmt::Error) -> Self {
        MustacheError::without_span(MustacheErrorKind::Write)
    }
}

impl From<std::io::Error> for MustacheError {
    fn from(err: std::io::Error) -> Self {
        MustacheError::without_span(MustacheErrorKind::Io(err))
    }
}

impl miette::Diagnostic for MustacheError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_code
            .as_ref()
            .map(|s| s as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(core::iter::once(miette::LabeledSpan::at(
            span.offset as usize..span.end(),
            self.kind.label(),
        ))))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.kind
            .help()
            .map(|help| Box::new(help) as Box<dyn Display + 'a>)
    }
}

/// Result type for template compilation and rendering
pub type Result<T> = core::result::Result<T, MustacheError>;
