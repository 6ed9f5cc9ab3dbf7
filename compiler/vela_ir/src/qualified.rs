//! Qualified identifiers such as `Acme\Payroll\Employees`.

use std::fmt;

use smallvec::SmallVec;

use crate::{Name, StringInterner};

/// An ordered list of name components plus a rooted flag.
///
/// A rooted name (written with a leading `\`) is looked up from the global
/// namespace only and must match a symbol exactly. Equality is
/// component-wise and includes the rooted flag.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct QualifiedName {
    components: SmallVec<[Name; 2]>,
    rooted: bool,
}

impl QualifiedName {
    pub fn new(components: impl IntoIterator<Item = Name>, rooted: bool) -> Self {
        QualifiedName {
            components: components.into_iter().collect(),
            rooted,
        }
    }

    /// Single-component, unrooted name.
    pub fn simple(name: Name) -> Self {
        let mut components = SmallVec::new();
        components.push(name);
        QualifiedName {
            components,
            rooted: false,
        }
    }

    pub fn components(&self) -> &[Name] {
        &self.components
    }

    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    /// The last component, or [`Name::EMPTY`] for an empty name.
    pub fn last(&self) -> Name {
        self.components.last().copied().unwrap_or(Name::EMPTY)
    }

    /// `Some(name)` when this is a plain unrooted identifier.
    pub fn as_simple(&self) -> Option<Name> {
        match self.components.as_slice() {
            [only] if !self.rooted => Some(*only),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Concatenate `self` and `member`, keeping `self`'s rooted flag.
    #[must_use]
    pub fn join(&self, member: &QualifiedName) -> QualifiedName {
        let mut components = self.components.clone();
        components.extend(member.components.iter().copied());
        QualifiedName {
            components,
            rooted: self.rooted,
        }
    }

    /// Append one component.
    #[must_use]
    pub fn child(&self, name: Name) -> QualifiedName {
        let mut components = self.components.clone();
        components.push(name);
        QualifiedName {
            components,
            rooted: self.rooted,
        }
    }

    /// Same components, unrooted.
    #[must_use]
    pub fn unrooted(&self) -> QualifiedName {
        QualifiedName {
            components: self.components.clone(),
            rooted: false,
        }
    }

    /// True when `suffix`'s components are the trailing components of
    /// `self`. The rooted flag of either side is ignored.
    pub fn ends_with(&self, suffix: &QualifiedName) -> bool {
        self.components.ends_with(&suffix.components)
    }

    /// True when `prefix`'s components are the leading components of `self`.
    pub fn starts_with(&self, prefix: &QualifiedName) -> bool {
        self.components.starts_with(&prefix.components)
    }

    /// Render with `\` separators.
    pub fn display(&self, interner: &StringInterner) -> String {
        let mut out = String::new();
        if self.rooted {
            out.push('\\');
        }
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                out.push('\\');
            }
            out.push_str(&interner.lookup(*component));
        }
        out
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rooted {
            write!(f, "\\")?;
        }
        f.debug_list().entries(self.components.iter()).finish()
    }
}
