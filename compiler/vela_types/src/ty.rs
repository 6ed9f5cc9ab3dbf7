//! The [`Type`] union and its composite payloads.

use std::fmt;
use std::sync::Arc;

use crate::TypeFlags;

/// A Vela type.
///
/// Composite payloads sit behind `Arc` so types clone cheaply; equality
/// and hashing are structural throughout.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Boolean,
    Integer,
    Long,
    Double,
    String,
    Char,
    DateTime,
    TimeSpan,
    Version,
    Guid,
    Name,
    Enum(Arc<EnumType>),
    Set(Arc<Type>),
    List(Arc<Type>),
    /// Never nests: see [`Type::optional`].
    Optional(Arc<Type>),
    Tuple(Arc<TupleType>),
    Function(Arc<FunctionType>),
    /// Generic parameter of a built-in signature.
    Param(u8),
    /// No value. `Set<Void>`/`List<Void>` type the empty selectors and
    /// `Optional<Void>` types `null`.
    Void,
}

impl Type {
    /// The scalar named `name`, if it is one of the built-in type names.
    pub fn scalar(name: &str) -> Option<Type> {
        Some(match name {
            "Boolean" => Type::Boolean,
            "Integer" => Type::Integer,
            "Long" => Type::Long,
            "Double" => Type::Double,
            "String" => Type::String,
            "Char" => Type::Char,
            "DateTime" => Type::DateTime,
            "TimeSpan" => Type::TimeSpan,
            "Version" => Type::Version,
            "Guid" => Type::Guid,
            "Name" => Type::Name,
            "Void" => Type::Void,
            _ => return None,
        })
    }

    /// Every name accepted by [`Type::scalar`].
    pub const SCALAR_NAMES: [&'static str; 12] = [
        "Boolean", "Integer", "Long", "Double", "String", "Char", "DateTime", "TimeSpan",
        "Version", "Guid", "Name", "Void",
    ];

    pub fn set(element: Type) -> Type {
        Type::Set(Arc::new(element))
    }

    pub fn list(element: Type) -> Type {
        Type::List(Arc::new(element))
    }

    /// `T?`. Optional of an optional collapses to a single level.
    pub fn optional(inner: Type) -> Type {
        match inner {
            Type::Optional(_) => inner,
            other => Type::Optional(Arc::new(other)),
        }
    }

    /// Type of the `null` literal.
    pub fn null() -> Type {
        Type::optional(Type::Void)
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Type {
        Type::Function(Arc::new(FunctionType { params, ret }))
    }

    /// Element type of a `Set` or `List`.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Set(e) | Type::List(e) => Some(e),
            _ => None,
        }
    }

    /// The same kind of collection as `self`, holding `element`.
    pub fn with_element(&self, element: Type) -> Option<Type> {
        match self {
            Type::Set(_) => Some(Type::set(element)),
            Type::List(_) => Some(Type::list(element)),
            _ => None,
        }
    }

    /// Inner type of an optional, or `self`.
    pub fn strip_optional(&self) -> &Type {
        match self {
            Type::Optional(inner) => inner,
            other => other,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Type::Optional(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List(_))
    }

    pub fn as_tuple(&self) -> Option<&Arc<TupleType>> {
        match self {
            Type::Tuple(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Arc<FunctionType>> {
        match self {
            Type::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Whether a generic parameter occurs anywhere inside.
    pub fn has_params(&self) -> bool {
        match self {
            Type::Param(_) => true,
            Type::Set(e) | Type::List(e) | Type::Optional(e) => e.has_params(),
            Type::Function(f) => f.ret.has_params() || f.params.iter().any(Type::has_params),
            Type::Tuple(t) => t.attrs.iter().any(|a| a.ty.has_params()),
            _ => false,
        }
    }

    /// Capabilities of this type; drives operator legality.
    pub fn flags(&self) -> TypeFlags {
        let ordered = TypeFlags::EQUATABLE | TypeFlags::ORDERED;
        match self {
            Type::Integer | Type::Long => {
                ordered | TypeFlags::NUMERIC | TypeFlags::INTEGRAL | TypeFlags::SCALAR
            }
            Type::Double => ordered | TypeFlags::NUMERIC | TypeFlags::SCALAR,
            Type::Boolean
            | Type::String
            | Type::Char
            | Type::Name
            | Type::Version
            | Type::Enum(_) => ordered | TypeFlags::SCALAR,
            Type::DateTime | Type::TimeSpan => ordered | TypeFlags::SCALAR | TypeFlags::TEMPORAL,
            Type::Guid => TypeFlags::EQUATABLE | TypeFlags::SCALAR,
            Type::Set(_) | Type::List(_) => TypeFlags::EQUATABLE | TypeFlags::COLLECTION,
            Type::Optional(_) => TypeFlags::EQUATABLE | TypeFlags::OPTIONAL,
            Type::Tuple(_) => TypeFlags::EQUATABLE | TypeFlags::TUPLE,
            Type::Function(_) => TypeFlags::FUNCTION,
            Type::Param(_) | Type::Void => TypeFlags::empty(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Boolean => f.write_str("Boolean"),
            Type::Integer => f.write_str("Integer"),
            Type::Long => f.write_str("Long"),
            Type::Double => f.write_str("Double"),
            Type::String => f.write_str("String"),
            Type::Char => f.write_str("Char"),
            Type::DateTime => f.write_str("DateTime"),
            Type::TimeSpan => f.write_str("TimeSpan"),
            Type::Version => f.write_str("Version"),
            Type::Guid => f.write_str("Guid"),
            Type::Name => f.write_str("Name"),
            Type::Enum(e) => f.write_str(&e.name),
            Type::Set(e) => write!(f, "{{{e}}}"),
            Type::List(e) => write!(f, "[{e}]"),
            Type::Optional(e) => write!(f, "{e}?"),
            Type::Tuple(t) => t.fmt(f),
            Type::Function(func) => func.fmt(f),
            Type::Param(i) => write!(f, "T{i}"),
            Type::Void => f.write_str("Void"),
        }
    }
}

/// A named enumeration; values are addressed by ordinal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumType {
    /// Fully qualified, e.g. `Shop\Color`.
    pub name: Arc<str>,
    pub values: Vec<Arc<str>>,
}

impl EnumType {
    pub fn ordinal(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v.as_ref() == value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: Arc<str>,
    pub ty: Type,
}

/// Attribute subset identifying a tuple. Names are kept sorted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    pub attrs: Vec<Arc<str>>,
}

impl Key {
    pub fn new(mut attrs: Vec<Arc<str>>) -> Self {
        attrs.sort();
        attrs.dedup();
        Key { attrs }
    }
}

/// Named foreign-key reference from `source` attributes to attributes of
/// the `target` variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub name: Arc<str>,
    pub source: Vec<Arc<str>>,
    pub target: Arc<str>,
    pub target_attrs: Vec<Arc<str>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TupleError {
    DuplicateAttribute(Arc<str>),
    UnknownKeyAttribute(Arc<str>),
}

impl fmt::Display for TupleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleError::DuplicateAttribute(name) => {
                write!(f, "attribute `{name}` is declared more than once")
            }
            TupleError::UnknownKeyAttribute(name) => {
                write!(f, "`{name}` is not an attribute of this tuple")
            }
        }
    }
}

/// Tuple type: attributes, keys and references.
///
/// Attributes are stored sorted by name, so two tuple types written with
/// the same attributes in a different order are the same type, and a row
/// of this type stores its fields in this order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct TupleType {
    attrs: Vec<Attribute>,
    keys: Vec<Key>,
    refs: Vec<Reference>,
}

impl TupleType {
    pub fn new(
        mut attrs: Vec<Attribute>,
        mut keys: Vec<Key>,
        mut refs: Vec<Reference>,
    ) -> Result<Self, TupleError> {
        attrs.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(pair) = attrs.windows(2).find(|w| w[0].name == w[1].name) {
            return Err(TupleError::DuplicateAttribute(pair[0].name.clone()));
        }
        let known = |name: &Arc<str>| attrs.iter().any(|a| &a.name == name);
        for name in keys.iter().flat_map(|k| &k.attrs).chain(refs.iter().flat_map(|r| &r.source)) {
            if !known(name) {
                return Err(TupleError::UnknownKeyAttribute(name.clone()));
            }
        }
        keys.retain(|k| !k.attrs.is_empty());
        keys.sort();
        keys.dedup();
        refs.sort();
        Ok(TupleType { attrs, keys, refs })
    }

    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn refs(&self) -> &[Reference] {
        &self.refs
    }

    /// Position of attribute `name` in field order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attrs
            .binary_search_by(|a| a.name.as_ref().cmp(name))
            .ok()
    }

    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.index_of(name).map(|i| &self.attrs[i])
    }

    /// Field positions of the primary (first) key.
    pub fn primary_key(&self) -> Option<Vec<usize>> {
        let key = self.keys.first()?;
        key.attrs.iter().map(|name| self.index_of(name)).collect()
    }

    /// Same attribute names and types, ignoring keys and references.
    pub fn same_heading(&self, other: &TupleType) -> bool {
        self.attrs == other.attrs
    }
}

impl fmt::Display for TupleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attrs.is_empty() && self.keys.is_empty() {
            return f.write_str("{:}");
        }
        f.write_str("{")?;
        for (i, attr) in self.attrs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", attr.name, attr.ty)?;
        }
        for key in &self.keys {
            write!(f, " key{{{}}}", key.attrs.join(" "))?;
        }
        for r in &self.refs {
            write!(
                f,
                " ref {}{{{}}} {}{{{}}}",
                r.name,
                r.source.join(" "),
                r.target,
                r.target_attrs.join(" ")
            )?;
        }
        f.write_str("}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub ret: Type,
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}
