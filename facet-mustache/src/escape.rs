//! Escaping applied to `{{name}}` interpolations.

use core::fmt::{self, Write};

/// Transforms interpolated text before it reaches the output.
///
/// The escaper receives each chunk of text produced by a value and writes the
/// escaped form to `out`. It may be called several times for one value.
pub type Escaper = fn(text: &str, out: &mut dyn Write) -> fmt::Result;

/// Escapes `&`, `<`, `>`, `"` and `'` as HTML entities.
///
/// This is the default [`Escaper`].
pub fn escape_html(text: &str, out: &mut dyn Write) -> fmt::Result {
    let mut last = 0;
    for (i, b) in text.bytes().enumerate() {
        let entity = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#39;",
            _ => continue,
        };
        out.write_str(&text[last..i])?;
        out.write_str(entity)?;
        last = i + 1;
    }
    out.write_str(&text[last..])
}

/// Writes text unchanged. Use this for templates that don't produce HTML.
pub fn no_escape(text: &str, out: &mut dyn Write) -> fmt::Result {
    out.write_str(text)
}

/// Wraps a `fmt::Write` and runs everything written through an [`Escaper`].
pub(crate) struct EscapingWriter<'a> {
    inner: &'a mut dyn Write,
    escaper: Escaper,
}

impl<'a> EscapingWriter<'a> {
    pub(crate) fn new(inner: &'a mut dyn Write, escaper: Escaper) -> Self {
        Self { inner, escaper }
    }
}

impl Write for EscapingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        (self.escaper)(s, self.inner)
    }
}
