//! Reflection-backed view of the data a template is rendered against.
//!
//! A [`Value`] wraps a [`Peek`] together with a [`Kind`], the classification
//! that decides truthiness, iteration, member lookup and how the value prints.
//! The kind depends only on the value's [`Shape`], so it is computed once when
//! the `Value` is created and reused for every question asked of it.

use core::fmt::{self, Write};

use facet::Facet;
use facet_core::{Def, DynValueKind, PointerType, ScalarType, Shape, Type, UserType};
use facet_reflect::{Peek, PeekDynamicValueArrayIter, PeekListLikeIter};

use crate::error::{MustacheError, Result};
use crate::escape::{Escaper, EscapingWriter};

/// Text that is already escaped, written verbatim even by `{{name}}`.
///
/// ```
/// use facet::Facet;
/// use facet_mustache::{RawHtml, render};
///
/// #[derive(Facet)]
/// struct Page {
///     body: RawHtml,
/// }
///
/// let page = Page { body: RawHtml::new("<b>bold</b>") };
/// assert_eq!(render("{{body}}", &page).unwrap(), "<b>bold</b>");
/// ```
#[derive(Facet, Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct RawHtml(pub String);

impl RawHtml {
    /// Create a new `RawHtml` from already-escaped markup.
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// Get the markup as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RawHtml {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RawHtml {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// How a shape behaves in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    /// `()` and `None`: falsy, prints nothing
    Null,
    Bool,
    /// `f32` / `f64`: falsy when NaN
    Float,
    /// Strings, chars, integers and other scalars
    Text,
    /// `Vec`, arrays and slices
    List,
    /// String-keyed maps
    Map,
    /// Structs and enums
    Record,
    /// [`RawHtml`]
    Raw,
    /// Dynamic values, classified again on every access
    Dynamic,
    Opaque,
}

impl Kind {
    /// Classify a shape that has already been unwrapped by [`Value::from_peek`].
    fn of(shape: &'static Shape) -> Kind {
        if shape.is_type::<RawHtml>() {
            return Kind::Raw;
        }
        if let Some(scalar) = ScalarType::try_from_shape(shape) {
            return match scalar {
                ScalarType::Unit => Kind::Null,
                ScalarType::Bool => Kind::Bool,
                ScalarType::F32 | ScalarType::F64 => Kind::Float,
                _ => Kind::Text,
            };
        }
        match shape.def {
            Def::List(_) | Def::Array(_) | Def::Slice(_) => Kind::List,
            Def::Map(_) => Kind::Map,
            Def::DynamicValue(_) => Kind::Dynamic,
            Def::Scalar => Kind::Text,
            _ => match shape.ty {
                Type::User(UserType::Struct(_) | UserType::Enum(_)) => Kind::Record,
                Type::Pointer(PointerType::Reference(vpt))
                    if matches!(vpt.target.def, Def::Slice(_)) =>
                {
                    Kind::List
                }
                _ => Kind::Opaque,
            },
        }
    }
}

/// A piece of data a template can look into.
///
/// Build one with [`Value::new`] from anything that implements [`Facet`].
/// Section and partial rendering push `Value`s onto the context stack; they
/// are cheap to copy.
#[derive(Clone, Copy)]
pub struct Value<'mem, 'facet> {
    peek: Peek<'mem, 'facet>,
    kind: Kind,
}

impl<'mem, 'facet> Value<'mem, 'facet> {
    /// Wrap a reference to any reflectable value.
    pub fn new<T: Facet<'facet> + ?Sized>(data: &'mem T) -> Self {
        Self::from_peek(Peek::new(data))
    }

    /// Wrap a value that has already been peeked.
    ///
    /// `Option`s and smart pointers are looked through: `Some(x)` and
    /// `Box<x>` behave like `x`, and `None` behaves like a missing value
    /// that is present (falsy, prints nothing).
    pub fn from_peek(peek: Peek<'mem, 'facet>) -> Self {
        let mut peek = peek;
        loop {
            let shape = peek.shape();
            if shape.is_type::<RawHtml>() || ScalarType::try_from_shape(shape).is_some() {
                break;
            }
            let inner = match shape.def {
                Def::Option(_) => match peek.into_option() {
                    Ok(option) => match option.value() {
                        Some(inner) => Some(inner),
                        None => {
                            return Value {
                                peek,
                                kind: Kind::Null,
                            };
                        }
                    },
                    Err(_) => None,
                },
                Def::Pointer(_) => peek.into_pointer().ok().and_then(|p| p.borrow_inner()),
                _ => None,
            };
            match inner {
                Some(inner) => peek = inner,
                None => break,
            }
        }
        Value {
            kind: Kind::of(peek.shape()),
            peek,
        }
    }

    /// The underlying reflection handle.
    pub fn peek(&self) -> Peek<'mem, 'facet> {
        self.peek
    }

    /// Whether a section over this value renders.
    ///
    /// `false`, `()`, `None`, NaN, empty lists and empty maps are falsy.
    /// Everything else is truthy, including empty strings and zero.
    pub fn is_truthy(&self) -> bool {
        match self.kind {
            Kind::Null => false,
            Kind::Bool => matches!(self.peek.get::<bool>(), Ok(true)),
            Kind::Float => {
                if let Ok(f) = self.peek.get::<f64>() {
                    !f.is_nan()
                } else if let Ok(f) = self.peek.get::<f32>() {
                    !f.is_nan()
                } else {
                    true
                }
            }
            Kind::List => self
                .peek
                .into_list_like()
                .is_ok_and(|list| !list.is_empty()),
            Kind::Map => self.peek.into_map().is_ok_and(|map| !map.is_empty()),
            Kind::Dynamic => match self.peek.into_dynamic_value() {
                Ok(dynamic) => match dynamic.kind() {
                    DynValueKind::Null => false,
                    DynValueKind::Bool => dynamic.as_bool() == Some(true),
                    DynValueKind::Number => dynamic.as_f64().is_none_or(|f| !f.is_nan()),
                    DynValueKind::Array => dynamic.array_len().is_some_and(|len| len > 0),
                    DynValueKind::Object => dynamic.object_len().is_some_and(|len| len > 0),
                    _ => true,
                },
                Err(_) => false,
            },
            Kind::Text | Kind::Record | Kind::Raw | Kind::Opaque => true,
        }
    }

    /// Whether a section iterates this value instead of pushing it once.
    ///
    /// Strings and maps are never iterated.
    pub fn is_iterable(&self) -> bool {
        match self.kind {
            Kind::List => true,
            Kind::Dynamic => self
                .peek
                .into_dynamic_value()
                .is_ok_and(|dynamic| matches!(dynamic.kind(), DynValueKind::Array)),
            _ => false,
        }
    }

    /// The elements of a list, each classified by its own shape.
    ///
    /// Yields nothing for values that aren't iterable.
    pub fn iter(&self) -> Elements<'mem, 'facet> {
        let inner = match self.kind {
            Kind::List => match self.peek.into_list_like() {
                Ok(list) => ElementsInner::List(list.iter()),
                Err(_) => ElementsInner::Empty,
            },
            Kind::Dynamic => match self
                .peek
                .into_dynamic_value()
                .ok()
                .and_then(|dynamic| dynamic.array_iter())
            {
                Some(iter) => ElementsInner::Dynamic(iter),
                None => ElementsInner::Empty,
            },
            _ => ElementsInner::Empty,
        };
        Elements { inner }
    }

    /// Look up a member by name.
    ///
    /// `.` is the value itself. Maps are indexed by key, structs by field
    /// name (tuple fields are `0`, `1`, ...), enums by the fields of the
    /// active variant. Returns `Ok(None)` when there is no such member.
    pub fn lookup(&self, name: &str) -> Result<Option<Value<'mem, 'facet>>> {
        if name == "." {
            return Ok(Some(*self));
        }
        let found = match self.kind {
            Kind::Map => {
                let map = self.peek.into_map()?;
                if map.def().k().is_type::<String>() {
                    let key = name.to_string();
                    map.get_peek(Peek::new(&key))?
                } else {
                    map.iter()
                        .find(|(key, _)| key.as_str() == Some(name))
                        .map(|(_, value)| value)
                }
            }
            Kind::Record => match self.peek.shape().ty {
                Type::User(UserType::Struct(_)) => {
                    self.peek.into_struct()?.field_by_name(name).ok()
                }
                Type::User(UserType::Enum(_)) => self
                    .peek
                    .into_enum()?
                    .field_by_name(name)
                    .map_err(MustacheError::reflect)?,
                _ => None,
            },
            Kind::Dynamic => self.peek.into_dynamic_value()?.object_get(name),
            _ => None,
        };
        Ok(found.map(Value::from_peek))
    }

    /// Write this value's text to `out`.
    ///
    /// With an escaper, text goes through it, except for [`RawHtml`] which
    /// is always written verbatim.
    pub fn render_self(&self, escape: Option<Escaper>, out: &mut dyn Write) -> Result<()> {
        match (self.kind, escape) {
            (Kind::Raw, _) | (_, None) => self.write_text(out),
            (_, Some(escaper)) => self.write_text(&mut EscapingWriter::new(out, escaper)),
        }
    }

    fn write_text(&self, out: &mut dyn Write) -> Result<()> {
        match self.kind {
            Kind::Null => {}
            Kind::Bool => out.write_str(if self.is_truthy() { "true" } else { "false" })?,
            Kind::Raw => {
                if let Ok(raw) = self.peek.get::<RawHtml>() {
                    out.write_str(&raw.0)?;
                }
            }
            Kind::Text | Kind::Float => match self.peek.as_str() {
                Some(s) => out.write_str(s)?,
                None => write!(out, "{}", self.peek)?,
            },
            Kind::Dynamic => self.write_dynamic(out)?,
            Kind::Record => {
                if !self.write_display(out)? {
                    self.write_unit_variant(out)?;
                }
            }
            Kind::List | Kind::Map | Kind::Opaque => {
                self.write_display(out)?;
            }
        }
        Ok(())
    }

    /// Writes the value with its `Display` impl, if it has one.
    fn write_display(&self, out: &mut dyn Write) -> Result<bool> {
        if self.peek.shape().vtable.has_display() {
            write!(out, "{}", self.peek)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Unit enum variants print their name.
    fn write_unit_variant(&self, out: &mut dyn Write) -> Result<()> {
        if let Type::User(UserType::Enum(_)) = self.peek.shape().ty {
            let variant = self
                .peek
                .into_enum()?
                .active_variant()
                .map_err(MustacheError::reflect)?;
            if variant.data.fields.is_empty() {
                out.write_str(variant.name)?;
            }
        }
        Ok(())
    }

    fn write_dynamic(&self, out: &mut dyn Write) -> fmt::Result {
        let Ok(dynamic) = self.peek.into_dynamic_value() else {
            return Ok(());
        };
        match dynamic.kind() {
            DynValueKind::Null | DynValueKind::Array | DynValueKind::Object => Ok(()),
            DynValueKind::Bool => out.write_str(if dynamic.as_bool() == Some(true) {
                "true"
            } else {
                "false"
            }),
            DynValueKind::Number => {
                if let Some(n) = dynamic.as_i64() {
                    write!(out, "{n}")
                } else if let Some(n) = dynamic.as_u64() {
                    write!(out, "{n}")
                } else if let Some(n) = dynamic.as_f64() {
                    write!(out, "{n}")
                } else {
                    Ok(())
                }
            }
            DynValueKind::String => out.write_str(dynamic.as_str().unwrap_or_default()),
            _ => {
                if self.peek.shape().vtable.has_display() {
                    write!(out, "{}", self.peek)
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl fmt::Debug for Value<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("shape", &format_args!("{}", self.peek.shape()))
            .field("kind", &self.kind)
            .finish()
    }
}

/// Iterator over the elements of a list [`Value`].
pub struct Elements<'mem, 'facet> {
    inner: ElementsInner<'mem, 'facet>,
}

enum ElementsInner<'mem, 'facet> {
    List(PeekListLikeIter<'mem, 'facet>),
    Dynamic(PeekDynamicValueArrayIter<'mem, 'facet>),
    Empty,
}

impl<'mem, 'facet> Iterator for Elements<'mem, 'facet> {
    type Item = Value<'mem, 'facet>;

    fn next(&mut self) -> Option<Self::Item> {
        let peek = match &mut self.inner {
            ElementsInner::List(iter) => iter.next(),
            ElementsInner::Dynamic(iter) => iter.next(),
            ElementsInner::Empty => None,
        };
        peek.map(Value::from_peek)
    }
}
