use std::fmt;

use ahash::AHashMap;

use crate::types::kind::{KindTag, TreeClass};

/// Runtime type descriptor of a wrapper object.
///
/// Tree wrapper types carry the class their formatting hooks are chosen by;
/// the name is what scripts see as the object's type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperType {
    /// Type of location wrappers.
    Location,
    /// Type of tree wrappers bound to a registered kind.
    Tree {
        kind: KindTag,
        name: &'static str,
        class: TreeClass,
    },
    /// Generic fallback for tree nodes whose code has no registered kind.
    ///
    /// Only produced under [`UnregisteredPolicy::Fallback`].
    GenericTree,
    /// Type of the string objects produced by attribute accessors.
    Str,
}

impl WrapperType {
    /// Returns the default wrapper type for a kind.
    #[must_use]
    pub fn for_kind(kind: KindTag) -> Self {
        Self::Tree {
            kind,
            name: kind.name(),
            class: kind.class(),
        }
    }

    /// Returns the type name scripts see.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Location => "Location",
            Self::Tree { name, .. } => name,
            Self::GenericTree => "Tree",
            Self::Str => "str",
        }
    }

    /// Returns the tree class, `None` for non-tree types and the fallback.
    #[must_use]
    pub fn class(self) -> Option<TreeClass> {
        match self {
            Self::Tree { class, .. } => Some(class),
            _ => None,
        }
    }

    /// Returns the kind this type was registered for.
    #[must_use]
    pub fn kind(self) -> Option<KindTag> {
        match self {
            Self::Tree { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// True for any type that wraps a native tree node.
    #[must_use]
    pub fn is_tree(self) -> bool {
        matches!(self, Self::Tree { .. } | Self::GenericTree)
    }
}

impl fmt::Display for WrapperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the node factory does with a raw code that maps to no kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnregisteredPolicy {
    /// Report [`WrapError::UnregisteredKindTag`](crate::WrapError::UnregisteredKindTag)
    /// and allocate nothing.
    #[default]
    Fatal,
    /// Wrap the node as [`WrapperType::GenericTree`].
    Fallback,
}

/// The kind→type table consulted by the node factory.
///
/// Every [`KindTag`] resolves: entries default to [`WrapperType::for_kind`],
/// and overrides can only rename a kind's type, never remove it or move it
/// to another class. The table is read-only once a session owns it.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    renamed: AHashMap<KindTag, &'static str>,
    policy: UnregisteredPolicy,
}

impl TypeTable {
    /// The table with every kind mapped to its default type.
    #[must_use]
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Replaces the type name registered for `kind`.
    #[must_use]
    pub fn with_name(mut self, kind: KindTag, name: &'static str) -> Self {
        self.renamed.insert(kind, name);
        self
    }

    /// Sets the policy for raw codes that map to no kind.
    #[must_use]
    pub fn with_policy(mut self, policy: UnregisteredPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> UnregisteredPolicy {
        self.policy
    }

    /// Resolves a kind to its wrapper type.
    #[must_use]
    pub fn resolve(&self, kind: KindTag) -> WrapperType {
        match self.renamed.get(&kind) {
            Some(&name) => WrapperType::Tree {
                kind,
                name,
                class: kind.class(),
            },
            None => WrapperType::for_kind(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn builtin_table_resolves_every_kind() {
        let table = TypeTable::builtin();
        for kind in KindTag::iter() {
            let ty = table.resolve(kind);
            assert_eq!(ty.kind(), Some(kind));
            assert_eq!(ty.class(), Some(kind.class()));
            assert_eq!(ty.name(), kind.name());
        }
    }

    #[test]
    fn renaming_keeps_the_class() {
        let table = TypeTable::builtin().with_name(KindTag::VarDecl, "gcc.VarDecl");
        let ty = table.resolve(KindTag::VarDecl);
        assert_eq!(ty.name(), "gcc.VarDecl");
        assert_eq!(ty.class(), Some(TreeClass::Declaration));
        assert_eq!(table.resolve(KindTag::ParmDecl).name(), "ParmDecl");
    }

    #[test]
    fn default_policy_is_fatal() {
        assert_eq!(TypeTable::builtin().policy(), UnregisteredPolicy::Fatal);
    }
}
