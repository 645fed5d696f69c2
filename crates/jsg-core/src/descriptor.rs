//! Canonical, fully resolved type identities.

use std::fmt;
use std::sync::Arc;

/// Erased name used for array types; the single type argument is the
/// component type.
pub const ARRAY_TYPE_NAME: &str = "[]";

/// A fully resolved type: an erased type name plus its ordered, resolved type
/// arguments.
///
/// Two descriptors are equal iff they name the same erased type with equal
/// arguments in the same order, so `List<String>` and `List<Integer>` are
/// distinct while two separately resolved `List<String>` are the same.
/// Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeDescriptor(Arc<Inner>);

#[derive(PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Inner {
    erased: String,
    args: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    #[must_use]
    pub fn new(erased: impl Into<String>, args: Vec<Self>) -> Self {
        Self(Arc::new(Inner {
            erased: erased.into(),
            args,
        }))
    }

    /// Non-generic type.
    #[must_use]
    pub fn simple(erased: impl Into<String>) -> Self {
        Self::new(erased, Vec::new())
    }

    #[must_use]
    pub fn array_of(component: Self) -> Self {
        Self::new(ARRAY_TYPE_NAME, vec![component])
    }

    /// Fully qualified erased name, e.g. `std.Map`.
    #[must_use]
    pub fn erased_name(&self) -> &str {
        &self.0.erased
    }

    /// Erased name without its package, e.g. `Map`.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        let erased = self.erased_name();
        erased.rsplit_once('.').map_or(erased, |(_, simple)| simple)
    }

    #[must_use]
    pub fn type_arguments(&self) -> &[Self] {
        &self.0.args
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.0.erased == ARRAY_TYPE_NAME
    }

    /// Component type when this is an array.
    #[must_use]
    pub fn component_type(&self) -> Option<&Self> {
        if self.is_array() {
            self.0.args.first()
        } else {
            None
        }
    }

    /// Whether this is `erased` regardless of its type arguments.
    #[must_use]
    pub fn is_erased(&self, erased: &str) -> bool {
        self.0.erased == erased
    }

    /// Short human readable form, e.g. `Map<String, BigDecimal>` or `Foo[]`.
    #[must_use]
    pub fn simple_description(&self) -> String {
        self.describe(Self::simple_name)
    }

    /// Qualified form, e.g. `std.Map<std.String, std.BigDecimal>`.
    #[must_use]
    pub fn full_description(&self) -> String {
        self.describe(Self::erased_name)
    }

    fn describe(&self, name: fn(&Self) -> &str) -> String {
        if let Some(component) = self.component_type() {
            return format!("{}[]", component.describe(name));
        }
        let mut out = name(self).to_string();
        if !self.0.args.is_empty() {
            let args: Vec<String> = self.0.args.iter().map(|a| a.describe(name)).collect();
            out.push('<');
            out.push_str(&args.join(", "));
            out.push('>');
        }
        out
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_description())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self.full_description())
    }
}
