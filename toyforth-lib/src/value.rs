//! Deals with run-time data representation
//!
//! Every value is a reference counted object. Sharing a value (putting it into a list,
//! `dup`-ing it on the stack, ...) clones the handle, releasing it drops the handle, and
//! the object goes away together with the last handle. Lists release their elements when
//! they die, so a whole tree is freed once nobody refers to its root anymore.
//!
//! Strings and symbols don't own their characters, they point into the source they were
//! parsed from and keep that alive instead.

use crate::buffer::{Buffer, LIST_INIT_CAP};
use std::cell::RefCell;
use std::fmt::{self, Debug, Display};
use std::io::{self, Write};
use std::rc::{Rc, Weak};
use strum_macros::IntoStaticStr;

/// the program text, shared by everything that was parsed from it
pub type Source = Rc<str>;

/// a byte range in the source, used for error messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

/// a slice of a [Source]
#[derive(Clone)]
pub struct Text {
    src: Source,
    span: Span,
}

impl Text {
    /// panics if `span` is not a valid range of `src`
    pub fn new(src: Source, span: Span) -> Self {
        assert!(
            src.get(span.start..span.end).is_some(),
            "{span:?} is not a valid range of the source"
        );
        Text { src, span }
    }

    pub fn as_str(&self) -> &str {
        &self.src[self.span.start..self.span.end]
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text {
            span: Span::new(0, s.len()),
            src: s.into(),
        }
    }
}

impl Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(self.as_str(), f)
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// the variants a value can have. The names are what shows up in type errors
#[derive(Debug, PartialEq, IntoStaticStr)]
pub enum Kind {
    #[strum(serialize = "integer")]
    Int(i64),
    #[strum(serialize = "boolean")]
    Bool(bool),
    #[strum(serialize = "string")]
    Str(Text),
    #[strum(serialize = "symbol")]
    Symbol(Text),
    #[strum(serialize = "list")]
    List(List),
}

#[derive(Debug)]
pub struct Object {
    pub kind: Kind,
    pub span: Span,
}

/// A handle to a reference counted [Object]. Cloning it is what the interpreter calls
/// "taking a reference", dropping it releases one.
#[derive(Clone)]
pub struct Value(Rc<Object>);

/// a handle that doesn't keep the value alive
#[derive(Clone)]
pub struct WeakValue(Weak<Object>);

/// An ordered sequence of values. Lists are mutated in place (the stack is one), which
/// is why the storage sits in a RefCell. A borrow never outlives a single method call.
pub struct List(RefCell<Buffer<Value>>);

impl Value {
    pub fn new(kind: Kind, span: Span) -> Self {
        Value(Rc::new(Object { kind, span }))
    }

    pub fn int(i: i64, span: Span) -> Self {
        Self::new(Kind::Int(i), span)
    }

    pub fn boolean(b: bool, span: Span) -> Self {
        Self::new(Kind::Bool(b), span)
    }

    pub fn string(text: Text, span: Span) -> Self {
        Self::new(Kind::Str(text), span)
    }

    pub fn symbol(text: Text, span: Span) -> Self {
        Self::new(Kind::Symbol(text), span)
    }

    /// creates an empty list. No storage is allocated until the first push
    pub fn list(span: Span) -> Self {
        Self::new(Kind::List(List::default()), span)
    }

    pub fn kind(&self) -> &Kind {
        &self.0.kind
    }

    pub fn span(&self) -> Span {
        self.0.span
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().into()
    }

    /// number of live handles to this value
    pub fn refcount(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// true if both handles refer to the same object
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakValue {
        WeakValue(Rc::downgrade(&self.0))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.kind() {
            Kind::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind() {
            Kind::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self.kind() {
            Kind::Symbol(t) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self.kind() {
            Kind::List(l) => Some(l),
            _ => None,
        }
    }

    /// Renders the value the way the `print` operator shows it: one item per line,
    /// nested list items indented by two more spaces than their brackets.
    pub fn write_indented(&self, out: &mut dyn Write, indent: usize) -> io::Result<()> {
        write!(out, "{:indent$}", "")?;
        match self.kind() {
            Kind::Int(i) => writeln!(out, "{i}"),
            Kind::Bool(b) => writeln!(out, "{}", *b as i64),
            Kind::Str(t) | Kind::Symbol(t) => writeln!(out, "{}", t.as_str()),
            Kind::List(l) => {
                writeln!(out, "[")?;
                for elem in l.0.borrow().iter() {
                    elem.write_indented(out, indent + 2)?;
                }
                writeln!(out, "{:indent$}]", "")
            }
        }
    }
}

impl WeakValue {
    pub fn upgrade(&self) -> Option<Value> {
        self.0.upgrade().map(Value)
    }
}

impl Default for List {
    fn default() -> Self {
        List(RefCell::new(Buffer::with_init_cap(LIST_INIT_CAP)))
    }
}

impl List {
    /// appends `val`, the list takes over the handle
    pub fn push(&self, val: Value) {
        self.0.borrow_mut().push(val);
    }

    /// returns a new handle to the element at `idx`
    pub fn get(&self, idx: usize) -> Option<Value> {
        self.0.borrow().get(idx).cloned()
    }

    /// removes the last element and hands its handle to the caller
    pub fn pop(&self) -> Option<Value> {
        self.0.borrow_mut().pop()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// new handles to all elements, bottom first
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().to_vec()
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::int(i, Span::default())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::boolean(b, Span::default())
    }
}

impl From<Vec<Value>> for Value {
    fn from(elems: Vec<Value>) -> Self {
        let res = Value::list(Span::default());
        if let Kind::List(l) = res.kind() {
            for e in elems {
                l.push(e);
            }
        }
        res
    }
}

impl PartialEq for Value {
    /// structural, spans are ignored
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.kind() == other.kind()
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        *self.0.borrow().as_slice() == *other.0.borrow().as_slice()
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(self.kind(), f)
    }
}

impl Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.borrow().iter()).finish()
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Kind::Int(i) => write!(f, "{i}"),
            Kind::Bool(b) => write!(f, "{b}"),
            Kind::Str(t) | Kind::Symbol(t) => write!(f, "{}", t.as_str()),
            Kind::List(l) => write!(f, "{l}"),
        }
    }
}

impl Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, elem) in self.0.borrow().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{elem}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(v: &Value) -> String {
        let mut out = vec![];
        v.write_indented(&mut out, 0).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn new_values_have_a_single_reference() {
        let v = Value::from(3);
        assert_eq!(v.refcount(), 1);
        assert_eq!(v.type_name(), "integer");
    }

    #[test]
    fn list_membership_counts_as_a_reference() {
        let list = Value::list(Span::default());
        let l = list.as_list().unwrap();
        let v = Value::from(7);
        l.push(v.clone());
        assert_eq!(v.refcount(), 2);

        let got = l.get(0).unwrap();
        assert!(got.ptr_eq(&v));
        assert_eq!(v.refcount(), 3);
        drop(got);

        let popped = l.pop().unwrap();
        assert_eq!(v.refcount(), 2);
        drop(popped);
        assert_eq!(v.refcount(), 1);
        assert!(l.is_empty());
    }

    #[test]
    fn dropping_a_list_releases_its_elements() {
        let inner = Value::from(vec![Value::from(1), Value::from(2)]);
        let weak_inner = inner.downgrade();
        let outer = Value::from(vec![inner, Value::from(true)]);
        assert_eq!(weak_inner.upgrade().unwrap().refcount(), 2);
        drop(outer);
        assert!(weak_inner.upgrade().is_none());
    }

    #[test]
    fn text_points_into_the_source() {
        let src: Source = "1 foo 2".into();
        let t = Text::new(src.clone(), Span::new(2, 5));
        assert_eq!(t.as_str(), "foo");
        assert_eq!(Rc::strong_count(&src), 2);
        let sym = Value::symbol(t, Span::new(2, 5));
        assert_eq!(sym.as_symbol(), Some("foo"));
        drop(sym);
        assert_eq!(Rc::strong_count(&src), 1);
    }

    #[test]
    fn print_scalars() {
        assert_eq!(render(&Value::from(-12)), "-12\n");
        assert_eq!(render(&Value::from(true)), "1\n");
        assert_eq!(render(&Value::from(false)), "0\n");
        let s = Value::string(Text::from("hello"), Span::default());
        assert_eq!(render(&s), "hello\n");
    }

    #[test]
    fn print_nested_lists() {
        let v = Value::from(vec![
            Value::from(1),
            Value::from(vec![Value::from(2), Value::from(3)]),
            Value::from(4),
        ]);
        assert_eq!(render(&v), "[\n  1\n  [\n    2\n    3\n  ]\n  4\n]\n");
        assert_eq!(v.to_string(), "[1 [2 3] 4]");
    }

    #[test]
    fn equality_is_structural() {
        let a = Value::int(5, Span::new(0, 1));
        let b = Value::int(5, Span::new(10, 11));
        assert_eq!(a, b);
        assert_ne!(Value::from(1), Value::from(true));
        assert_eq!(
            Value::from(vec![Value::from(1)]),
            Value::from(vec![Value::from(1)])
        );
    }
}
