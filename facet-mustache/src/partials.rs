//! Sources of partial templates.

use std::borrow::{Borrow, Cow};
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// Looks up partial templates by name.
///
/// A partial's text is compiled each time it is included, with the default
/// `{{ }}` delimiters. Names that aren't found render as nothing.
///
/// ```
/// use std::collections::HashMap;
/// use facet_mustache::render_with_partials;
///
/// let mut partials = HashMap::new();
/// partials.insert("user", "<b>{{.}}</b>");
///
/// let names = vec!["Joe", "Jill"];
/// let html = render_with_partials("{{#.}}{{>user}}{{/.}}", &partials, &names).unwrap();
/// assert_eq!(html, "<b>Joe</b><b>Jill</b>");
/// ```
pub trait Partials {
    /// Return the template text for `name`, if there is one.
    fn get(&self, name: &str) -> Option<&str>;
}

/// A partial table with no entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPartials;

impl Partials for NoPartials {
    fn get(&self, _name: &str) -> Option<&str> {
        None
    }
}

impl<K, V, S> Partials for HashMap<K, V, S>
where
    K: Borrow<str> + Eq + Hash,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn get(&self, name: &str) -> Option<&str> {
        HashMap::get(self, name).map(AsRef::as_ref)
    }
}

impl<K, V> Partials for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn get(&self, name: &str) -> Option<&str> {
        BTreeMap::get(self, name).map(AsRef::as_ref)
    }
}

impl<K, V> Partials for [(K, V)]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn get(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value.as_ref())
    }
}

impl<K, V, const N: usize> Partials for [(K, V); N]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn get(&self, name: &str) -> Option<&str> {
        Partials::get(self.as_slice(), name)
    }
}

impl<P: Partials + ?Sized> Partials for &P {
    fn get(&self, name: &str) -> Option<&str> {
        Partials::get(*self, name)
    }
}

/// Prefix every line of `text` with `indent`.
///
/// A line break at the very end of `text` does not start a new line, so the
/// output never ends with a dangling indent.
pub(crate) fn indent_lines<'a>(text: &'a str, indent: &str) -> Cow<'a, str> {
    if indent.is_empty() || text.is_empty() {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + indent.len() * (text.matches('\n').count() + 1));
    for line in text.split_inclusive('\n') {
        out.push_str(indent);
        out.push_str(line);
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_map_lookup() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), "A".to_string());
        assert_eq!(Partials::get(&map, "a"), Some("A"));
        assert_eq!(Partials::get(&map, "b"), None);
    }

    #[test]
    fn btree_map_lookup() {
        let map = BTreeMap::from([("a", "A")]);
        assert_eq!(Partials::get(&map, "a"), Some("A"));
    }

    #[test]
    fn pair_array_lookup() {
        let pairs = [("a", "A"), ("b", "B")];
        assert_eq!(Partials::get(&pairs, "b"), Some("B"));
        assert_eq!(Partials::get(&pairs, "c"), None);
    }

    #[test]
    fn no_partials_is_empty() {
        assert_eq!(NoPartials.get("anything"), None);
    }

    #[test]
    fn indents_each_line() {
        assert_eq!(indent_lines("a\nb", "  "), "  a\n  b");
    }

    #[test]
    fn trailing_newline_is_not_indented() {
        assert_eq!(indent_lines("a\nb\n", "> "), "> a\n> b\n");
    }

    #[test]
    fn blank_lines_are_indented() {
        assert_eq!(indent_lines("a\n\nb", "\t"), "\ta\n\t\n\tb");
    }

    #[test]
    fn empty_indent_borrows() {
        assert!(matches!(indent_lines("a\nb", ""), Cow::Borrowed(_)));
    }
}
