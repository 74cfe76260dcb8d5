//! The stack of values names are resolved against.

use crate::error::Result;
use crate::parser::Path;
use crate::value::Value;

/// Values in scope, innermost last.
pub(crate) struct Context<'mem, 'facet> {
    frames: Vec<Value<'mem, 'facet>>,
}

impl<'mem, 'facet> Context<'mem, 'facet> {
    pub(crate) fn new(root: Value<'mem, 'facet>) -> Self {
        Context { frames: vec![root] }
    }

    pub(crate) fn push(&mut self, value: Value<'mem, 'facet>) {
        self.frames.push(value);
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    /// Resolve a dotted path.
    ///
    /// The first segment is looked up in each frame from the innermost out,
    /// stopping at the first frame that has the member (even if its value is
    /// falsy). Later segments are looked up only in the value found for the
    /// segment before them.
    pub(crate) fn resolve(&self, path: &Path) -> Result<Option<Value<'mem, 'facet>>> {
        let mut current = None;
        for frame in self.frames.iter().rev() {
            if let Some(found) = frame.lookup(path.head())? {
                current = Some(found);
                break;
            }
        }

        for segment in path.tail() {
            let Some(value) = current else {
                return Ok(None);
            };
            current = value.lookup(segment)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet::Facet;

    #[derive(Facet)]
    struct Inner {
        name: &'static str,
    }

    #[derive(Facet)]
    struct Outer {
        name: &'static str,
        inner: Inner,
        flag: bool,
    }

    fn resolved(context: &Context<'_, '_>, path: &str) -> Option<String> {
        context.resolve(&Path::parse(path)).unwrap().map(|value| {
            let mut out = String::new();
            value.render_self(None, &mut out).unwrap();
            out
        })
    }

    #[test]
    fn innermost_frame_wins() {
        let outer = Outer {
            name: "outer",
            inner: Inner { name: "inner" },
            flag: false,
        };
        let mut context = Context::new(Value::new(&outer));
        assert_eq!(resolved(&context, "name").as_deref(), Some("outer"));

        context.push(Value::new(&outer.inner));
        assert_eq!(resolved(&context, "name").as_deref(), Some("inner"));
        assert_eq!(resolved(&context, "flag").as_deref(), Some("false"));

        context.pop();
        assert_eq!(resolved(&context, "name").as_deref(), Some("outer"));
    }

    #[test]
    fn dotted_paths_walk_from_the_first_match() {
        let outer = Outer {
            name: "outer",
            inner: Inner { name: "inner" },
            flag: true,
        };
        let context = Context::new(Value::new(&outer));
        assert_eq!(resolved(&context, "inner.name").as_deref(), Some("inner"));
        assert_eq!(resolved(&context, "inner.flag"), None);
        assert_eq!(resolved(&context, "missing.name"), None);
    }

    #[test]
    fn later_segments_do_not_search_outer_frames() {
        let outer = Outer {
            name: "outer",
            inner: Inner { name: "inner" },
            flag: true,
        };
        let mut context = Context::new(Value::new(&outer));
        context.push(Value::new(&outer.inner));
        // `inner` is only found on the outer frame; `inner.flag` must not
        // fall back to `flag` on that frame.
        assert_eq!(resolved(&context, "inner.flag"), None);
    }
}
