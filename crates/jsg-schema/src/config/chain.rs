//! Priority-ordered attribute resolvers.

use std::fmt;
use std::sync::Arc;

type Resolver<S, R> = Arc<dyn Fn(&S) -> Option<R> + Send + Sync>;

/// Ordered list of resolvers for one attribute kind; the first `Some` wins.
///
/// Resolvers registered later are consulted before earlier ones, so a
/// registration made after a module was applied overrides that module.
pub struct ResolverChain<S, R> {
    resolvers: Vec<Resolver<S, R>>,
}

impl<S, R> ResolverChain<S, R> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Register a resolver ahead of all existing ones.
    pub fn register<F>(&mut self, resolver: F)
    where
        F: Fn(&S) -> Option<R> + Send + Sync + 'static,
    {
        self.resolvers.insert(0, Arc::new(resolver));
    }

    #[must_use]
    pub fn resolve(&self, scope: &S) -> Option<R> {
        self.resolvers.iter().find_map(|resolver| resolver(scope))
    }

    /// Append all resolvers of `lower` beneath the ones already present.
    pub(crate) fn append(&mut self, lower: &Self) {
        self.resolvers.extend(lower.resolvers.iter().cloned());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl<S> ResolverChain<S, ()> {
    /// Register a predicate; a match counts as a non-absent answer.
    pub fn register_check<F>(&mut self, check: F)
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.register(move |scope| check(scope).then_some(()));
    }

    /// Whether any registered predicate matches.
    #[must_use]
    pub fn matches(&self, scope: &S) -> bool {
        self.resolve(scope).is_some()
    }
}

impl<S, R> Clone for ResolverChain<S, R> {
    fn clone(&self) -> Self {
        Self {
            resolvers: self.resolvers.clone(),
        }
    }
}

impl<S, R> Default for ResolverChain<S, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, R> fmt::Debug for ResolverChain<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverChain")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_registration_wins() {
        let mut chain: ResolverChain<u32, &'static str> = ResolverChain::new();
        chain.register(|_| Some("first"));
        chain.register(|n| (*n > 10).then_some("second"));
        assert_eq!(chain.resolve(&42), Some("second"));
        assert_eq!(chain.resolve(&1), Some("first"));
    }

    #[test]
    fn appended_resolvers_rank_lowest() {
        let mut user: ResolverChain<u32, u32> = ResolverChain::new();
        user.register(|n| (*n == 0).then_some(100));
        let mut base: ResolverChain<u32, u32> = ResolverChain::new();
        base.register(|n| Some(*n));

        user.append(&base);
        assert_eq!(user.len(), 2);
        assert_eq!(user.resolve(&0), Some(100));
        assert_eq!(user.resolve(&7), Some(7));
    }

    #[test]
    fn checks_behave_as_any_match() {
        let mut chain: ResolverChain<&str, ()> = ResolverChain::new();
        assert!(!chain.matches(&"x"));
        chain.register_check(|s| s.starts_with('a'));
        chain.register_check(|s| s.ends_with('z'));
        assert!(chain.matches(&"abc"));
        assert!(chain.matches(&"xyz"));
        assert!(!chain.matches(&"mmm"));
    }
}
