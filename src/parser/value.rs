//! Typed accessor view over parsed PDF values.
//!
//! A [`Value`] couples a parsed [`Object`] with the reader it came from,
//! resolving indirect references transparently while remembering which
//! object the value was resolved from (its [`Value::ptr`]).

use crate::object::Object;
use crate::parser::PdfReader;
use crate::types::ObjectId;

/// The kind of a (resolved) PDF value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Null or missing value.
    Null,
    /// Boolean.
    Boolean,
    /// Integer number.
    Integer,
    /// Real number.
    Real,
    /// Literal or hex string.
    String,
    /// Name.
    Name,
    /// Array.
    Array,
    /// Dictionary.
    Dict,
    /// Stream.
    Stream,
}

/// A resolved PDF value with typed accessors.
///
/// Accessors are total: asking for the wrong type yields a zero value or a
/// null [`Value`], never a panic. This mirrors how the signing code probes
/// loosely-structured documents.
#[derive(Clone)]
pub struct Value<'r> {
    reader: &'r PdfReader,
    origin: ObjectId,
    obj: Object,
}

impl<'r> Value<'r> {
    /// Wraps an object, resolving reference chains. `origin` is the id of
    /// the object the value was found in; following a reference moves the
    /// origin to the referenced id.
    pub(crate) fn new(reader: &'r PdfReader, origin: ObjectId, obj: Object) -> Self {
        let mut origin = origin;
        let mut obj = obj;
        // Depth-capped to tolerate reference cycles in malformed files.
        for _ in 0..32 {
            match obj {
                Object::Reference(id) => {
                    origin = id;
                    obj = reader.resolve(id).unwrap_or(Object::Null);
                }
                _ => break,
            }
        }
        Self {
            reader,
            origin,
            obj,
        }
    }

    fn null(&self) -> Value<'r> {
        Value {
            reader: self.reader,
            origin: self.origin,
            obj: Object::Null,
        }
    }

    /// Looks up a dictionary entry (also works on stream dictionaries).
    pub fn key(&self, name: &str) -> Value<'r> {
        let dict = match &self.obj {
            Object::Dictionary(d) => d,
            Object::Stream(s) => &s.dictionary,
            _ => return self.null(),
        };
        match dict.get(name) {
            Some(obj) => Value::new(self.reader, self.origin, obj.clone()),
            None => self.null(),
        }
    }

    /// Returns the dictionary keys in document order.
    pub fn keys(&self) -> Vec<String> {
        let dict = match &self.obj {
            Object::Dictionary(d) => d,
            Object::Stream(s) => &s.dictionary,
            _ => return Vec::new(),
        };
        dict.keys().cloned().collect()
    }

    /// Indexes into an array.
    pub fn index(&self, i: usize) -> Value<'r> {
        match &self.obj {
            Object::Array(arr) => match arr.get(i) {
                Some(obj) => Value::new(self.reader, self.origin, obj.clone()),
                None => self.null(),
            },
            _ => self.null(),
        }
    }

    /// Array length, 0 for non-arrays.
    pub fn len(&self) -> usize {
        match &self.obj {
            Object::Array(arr) => arr.len(),
            _ => 0,
        }
    }

    /// Returns true for empty arrays and non-arrays.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The kind of the resolved value.
    pub fn kind(&self) -> ValueKind {
        match &self.obj {
            Object::Null => ValueKind::Null,
            Object::Boolean(_) => ValueKind::Boolean,
            Object::Integer(_) => ValueKind::Integer,
            Object::Real(_) => ValueKind::Real,
            Object::String(_) => ValueKind::String,
            Object::Name(_) => ValueKind::Name,
            Object::Array(_) => ValueKind::Array,
            Object::Dictionary(_) => ValueKind::Dict,
            Object::Stream(_) => ValueKind::Stream,
            Object::Reference(_) => ValueKind::Null, // unreachable after new()
        }
    }

    /// Name without the leading slash, empty for non-names.
    pub fn name(&self) -> &str {
        match &self.obj {
            Object::Name(n) => n.as_str(),
            _ => "",
        }
    }

    /// Integer value, 0 for non-integers.
    pub fn int64(&self) -> i64 {
        self.obj.as_integer().unwrap_or(0)
    }

    /// Real value (integers promote), 0.0 otherwise.
    pub fn float64(&self) -> f64 {
        self.obj.as_real().unwrap_or(0.0)
    }

    /// Boolean value, false otherwise.
    pub fn boolean(&self) -> bool {
        matches!(self.obj, Object::Boolean(true))
    }

    /// Raw (decoded) string bytes, empty for non-strings.
    pub fn raw_string(&self) -> Vec<u8> {
        match &self.obj {
            Object::String(s) => s.as_bytes().to_vec(),
            _ => Vec::new(),
        }
    }

    /// The id of the object this value was resolved from. For values that
    /// were reached through an indirect reference this is the referenced
    /// object; for direct values it is the containing object.
    pub fn ptr(&self) -> ObjectId {
        self.origin
    }

    /// Returns true for null or missing values.
    pub fn is_null(&self) -> bool {
        self.obj.is_null()
    }

    /// The underlying parsed object.
    pub fn object(&self) -> &Object {
        &self.obj
    }
}

impl std::fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("origin", &self.origin)
            .field("obj", &self.obj)
            .finish()
    }
}
