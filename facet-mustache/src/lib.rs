#![warn(missing_docs)]
#![deny(unsafe_code)]
#![doc = include_str!("../README.md")]

mod context;
mod error;
mod escape;
mod lexer;
mod parser;
mod partials;
mod render;
mod tracing_macros;
mod value;

use std::borrow::Cow;
use std::io;

use facet::Facet;

pub use error::{MustacheError, MustacheErrorKind, Result};
pub use escape::{Escaper, escape_html, no_escape};
pub use parser::MAX_SECTION_DEPTH;
pub use partials::{NoPartials, Partials};
pub use render::{DEFAULT_MAX_PARTIAL_DEPTH, RenderOptions};
pub use value::{Elements, RawHtml, Value};

use context::Context;
use parser::Node;
use render::{IoWriter, Renderer};
use tracing_macros::trace;

/// A parsed template, ready to render any number of times.
///
/// Compiling checks the whole template up front, so a render never writes
/// output for a template that turns out to be malformed. Templates are
/// `Send + Sync`; one compiled template can serve many threads at once.
///
/// ```
/// use facet::Facet;
/// use facet_mustache::Template;
///
/// #[derive(Facet)]
/// struct Person {
///     name: String,
/// }
///
/// let template = Template::compile("Hello, {{name}}!").unwrap();
/// let ada = Person { name: "Ada".into() };
/// assert_eq!(template.render(&ada).unwrap(), "Hello, Ada!");
/// ```
#[derive(Debug, Clone)]
pub struct Template<'src> {
    source: Cow<'src, str>,
    nodes: Vec<Node>,
}

impl<'src> Template<'src> {
    /// Parse a template.
    pub fn compile(source: impl Into<Cow<'src, str>>) -> Result<Self> {
        let source = source.into();
        let nodes = parser::parse(&source)?;
        trace!(nodes = nodes.len(), "compiled template");
        Ok(Template { source, nodes })
    }

    /// Detach the template from the text it was compiled from.
    pub fn into_owned(self) -> Template<'static> {
        Template {
            source: Cow::Owned(self.source.into_owned()),
            nodes: self.nodes,
        }
    }

    /// The template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render against `data` with no partials.
    pub fn render<'facet, T: Facet<'facet> + ?Sized>(&self, data: &T) -> Result<String> {
        self.render_with_options(&NoPartials, &RenderOptions::default(), data)
    }

    /// Render against `data`, resolving `{{>name}}` tags from `partials`.
    pub fn render_with_partials<'facet, T: Facet<'facet> + ?Sized>(
        &self,
        partials: &dyn Partials,
        data: &T,
    ) -> Result<String> {
        self.render_with_options(partials, &RenderOptions::default(), data)
    }

    /// Render against `data` with custom options.
    pub fn render_with_options<'facet, T: Facet<'facet> + ?Sized>(
        &self,
        partials: &dyn Partials,
        options: &RenderOptions,
        data: &T,
    ) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        self.render_value_to(partials, options, Value::new(data), &mut out)?;
        Ok(out)
    }

    /// Render against `data`, writing into `out` as rendering proceeds.
    pub fn render_to<'facet, T: Facet<'facet> + ?Sized>(
        &self,
        partials: &dyn Partials,
        data: &T,
        out: &mut dyn core::fmt::Write,
    ) -> Result<()> {
        self.render_value_to(partials, &RenderOptions::default(), Value::new(data), out)
    }

    /// Render against `data`, streaming into an `io::Write`.
    ///
    /// The writer is flushed when rendering succeeds.
    pub fn render_to_writer<'facet, T: Facet<'facet> + ?Sized, W: io::Write>(
        &self,
        partials: &dyn Partials,
        data: &T,
        writer: W,
    ) -> Result<()> {
        let mut writer = IoWriter::new(writer);
        let result =
            self.render_value_to(partials, &RenderOptions::default(), Value::new(data), &mut writer);
        writer.finish(result)
    }

    /// Render against a [`Value`], writing into `out`.
    ///
    /// Every other render method goes through this one.
    pub fn render_value_to(
        &self,
        partials: &dyn Partials,
        options: &RenderOptions,
        value: Value<'_, '_>,
        out: &mut dyn core::fmt::Write,
    ) -> Result<()> {
        let renderer = Renderer { partials, options };
        let mut context = Context::new(value);
        renderer
            .render(&self.nodes, &self.source, &mut context, 0, out)
            .map_err(|err| err.with_source(&self.source))
    }
}

/// Render `template` against `data`.
///
/// ```
/// use facet::Facet;
///
/// #[derive(Facet)]
/// struct Person {
///     name: String,
/// }
///
/// #[derive(Facet)]
/// struct Greeting {
///     people: Vec<Person>,
/// }
///
/// let data = Greeting {
///     people: vec![Person { name: "Joe".into() }, Person { name: "Jill".into() }],
/// };
/// let out = facet_mustache::render("Hello{{#people}}, {{name}}{{/people}}", &data).unwrap();
/// assert_eq!(out, "Hello, Joe, Jill");
/// ```
pub fn render<'facet, T: Facet<'facet> + ?Sized>(template: &str, data: &T) -> Result<String> {
    Template::compile(template)?.render(data)
}

/// Render `template` against `data`, resolving `{{>name}}` tags from
/// `partials`.
pub fn render_with_partials<'facet, T: Facet<'facet> + ?Sized>(
    template: &str,
    partials: &dyn Partials,
    data: &T,
) -> Result<String> {
    Template::compile(template)?.render_with_partials(partials, data)
}

/// Render `template` against `data`, writing into `out`.
///
/// The template is parsed completely before anything is written.
pub fn render_to<'facet, T: Facet<'facet> + ?Sized>(
    template: &str,
    partials: &dyn Partials,
    data: &T,
    out: &mut dyn core::fmt::Write,
) -> Result<()> {
    Template::compile(template)?.render_to(partials, data, out)
}

/// Render `template` against `data`, streaming into an `io::Write`.
pub fn render_to_writer<'facet, T: Facet<'facet> + ?Sized, W: io::Write>(
    template: &str,
    partials: &dyn Partials,
    data: &T,
    writer: W,
) -> Result<()> {
    Template::compile(template)?.render_to_writer(partials, data, writer)
}

/// Render `template` against a pre-built [`Value`].
pub fn render_value(template: &str, partials: &dyn Partials, value: Value<'_, '_>) -> Result<String> {
    let template = Template::compile(template)?;
    let mut out = String::with_capacity(template.source.len());
    template.render_value_to(partials, &RenderOptions::default(), value, &mut out)?;
    Ok(out)
}
