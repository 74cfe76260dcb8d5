//! Walks a parsed template against a context stack.

use core::fmt::{self, Write};
use std::io;

use crate::context::Context;
use crate::error::{MustacheError, MustacheErrorKind, Result};
use crate::escape::{Escaper, escape_html};
use crate::lexer::span_text;
use crate::parser::{Node, parse};
use crate::partials::{Partials, indent_lines};
use crate::tracing_macros::{debug, trace, trace_span};
use crate::value::Value;

/// Default for [`RenderOptions::max_partial_depth`].
pub const DEFAULT_MAX_PARTIAL_DEPTH: usize = 256;

/// Options for rendering templates.
///
/// ```
/// use std::collections::HashMap;
/// use facet_mustache::{NoPartials, RenderOptions, Template, no_escape};
///
/// let template = Template::compile("{{x}}").unwrap();
/// let data = HashMap::from([("x", "a<b")]);
///
/// let options = RenderOptions::new().escaper(no_escape);
/// let out = template.render_with_options(&NoPartials, &options, &data).unwrap();
/// assert_eq!(out, "a<b");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Applied to the output of `{{name}}` tags
    pub escaper: Escaper,
    /// How deeply partials may include other partials, or `None` for no limit
    pub max_partial_depth: Option<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escaper: escape_html,
            max_partial_depth: Some(DEFAULT_MAX_PARTIAL_DEPTH),
        }
    }
}

impl RenderOptions {
    /// Create new render options with default settings (HTML escaping,
    /// partials nested at most [`DEFAULT_MAX_PARTIAL_DEPTH`] deep).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the escaper used by `{{name}}` tags.
    pub const fn escaper(mut self, escaper: Escaper) -> Self {
        self.escaper = escaper;
        self
    }

    /// Limit how deeply partials may include other partials.
    ///
    /// Exceeding the limit fails the render with
    /// [`MustacheErrorKind::RecursionLimitExceeded`].
    pub const fn max_partial_depth(mut self, depth: usize) -> Self {
        self.max_partial_depth = Some(depth);
        self
    }

    /// Let partials recurse for as long as the data drives them.
    ///
    /// A partial that includes itself unconditionally will then exhaust the
    /// stack.
    pub const fn unbounded_partials(mut self) -> Self {
        self.max_partial_depth = None;
        self
    }
}

/// Renders nodes to a sink. One per render call.
pub(crate) struct Renderer<'a> {
    pub(crate) partials: &'a dyn Partials,
    pub(crate) options: &'a RenderOptions,
}

impl Renderer<'_> {
    /// Render `nodes`, whose spans point into `source`.
    ///
    /// `depth` counts the partials currently being expanded.
    pub(crate) fn render<'mem, 'facet>(
        &self,
        nodes: &[Node],
        source: &str,
        context: &mut Context<'mem, 'facet>,
        depth: usize,
        out: &mut dyn Write,
    ) -> Result<()> {
        for node in nodes {
            match node {
                Node::Literal(span) => out.write_str(span_text(source, *span))?,
                Node::Variable { path, escape } => {
                    if let Some(value) = context.resolve(path)? {
                        let escaper = escape.then_some(self.options.escaper);
                        value.render_self(escaper, out)?;
                    }
                }
                Node::Section { path, children } => {
                    let Some(value) = context.resolve(path)? else {
                        continue;
                    };
                    if value.is_iterable() {
                        trace!(section = path.head(), "iterating section");
                        for item in value.iter() {
                            self.render_scoped(children, source, context, item, depth, out)?;
                        }
                    } else if value.is_truthy() {
                        self.render_scoped(children, source, context, value, depth, out)?;
                    }
                }
                Node::Inverted { path, children } => {
                    let show = match context.resolve(path)? {
                        Some(value) => !value.is_truthy(),
                        None => true,
                    };
                    if show {
                        self.render(children, source, context, depth, out)?;
                    }
                }
                Node::Partial { name, indent } => {
                    self.render_partial(name, indent.as_deref(), context, depth, out)?;
                }
            }
        }
        Ok(())
    }

    /// Render `nodes` with `value` pushed on the context stack.
    fn render_scoped<'mem, 'facet>(
        &self,
        nodes: &[Node],
        source: &str,
        context: &mut Context<'mem, 'facet>,
        value: Value<'mem, 'facet>,
        depth: usize,
        out: &mut dyn Write,
    ) -> Result<()> {
        context.push(value);
        let result = self.render(nodes, source, context, depth, out);
        context.pop();
        result
    }

    fn render_partial<'mem, 'facet>(
        &self,
        name: &str,
        indent: Option<&str>,
        context: &mut Context<'mem, 'facet>,
        depth: usize,
        out: &mut dyn Write,
    ) -> Result<()> {
        let Some(text) = self.partials.get(name) else {
            debug!(partial = name, "partial not found, rendering nothing");
            return Ok(());
        };
        if let Some(limit) = self.options.max_partial_depth
            && depth >= limit
        {
            return Err(MustacheError::without_span(
                MustacheErrorKind::RecursionLimitExceeded {
                    partial: name.to_string(),
                    limit,
                },
            ));
        }
        trace_span!("partial", name, depth);

        let source = indent_lines(text, indent.unwrap_or_default());
        let nodes = parse(&source)?;
        self.render(&nodes, &source, context, depth + 1, out)
    }
}

/// Adapts an `io::Write` to `fmt::Write`, keeping the first I/O error.
pub(crate) struct IoWriter<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> IoWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    /// Swap a bare write failure for the I/O error behind it, then flush.
    pub(crate) fn finish(mut self, result: Result<()>) -> Result<()> {
        match result {
            Err(err) if matches!(err.kind, MustacheErrorKind::Write) => {
                Err(self.error.take().map_or(err, MustacheError::from))
            }
            Err(err) => Err(err),
            Ok(()) => Ok(self.inner.flush()?),
        }
    }
}

impl<W: io::Write> Write for IoWriter<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}
