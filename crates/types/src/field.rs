//! Literal-or-producer configuration fields.
//!
//! Every request field a caller declares (url, params, body, headers) can be
//! given either as a concrete value or as a zero-argument producer that is
//! evaluated each time the field is resolved. Producers let callers read
//! state that changes between triggers without rebuilding the session.

use std::{fmt, sync::Arc};

/// A configuration value that is either known up front or produced on demand.
///
/// Resolution never memoizes: a [`FieldValue::Producer`] runs on every call to
/// [`FieldValue::resolve`].
///
/// # Example
/// ```rust
/// use refetch_types::FieldValue;
///
/// let literal = FieldValue::literal("https://example.com".to_string());
/// assert_eq!(literal.resolve(), "https://example.com");
///
/// let produced = FieldValue::producer(|| "https://example.com/live".to_string());
/// assert_eq!(produced.resolve(), "https://example.com/live");
/// ```
pub enum FieldValue<T> {
    /// A concrete value, cloned on resolution.
    Literal(T),
    /// A producer evaluated fresh on each resolution.
    Producer(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T> FieldValue<T> {
    /// Wrap a concrete value.
    pub fn literal(value: T) -> Self {
        Self::Literal(value)
    }

    /// Wrap a zero-argument producer.
    pub fn producer<F>(producer: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::Producer(Arc::new(producer))
    }

    /// Returns `true` when the value is computed lazily.
    pub fn is_producer(&self) -> bool {
        matches!(self, Self::Producer(_))
    }
}

impl<T: Clone> FieldValue<T> {
    /// Resolve the field into its concrete value.
    pub fn resolve(&self) -> T {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Producer(producer) => producer(),
        }
    }
}

/// Resolve an optional field, treating an absent declaration as `None`.
pub fn resolve_field<T: Clone>(field: Option<&FieldValue<T>>) -> Option<T> {
    field.map(FieldValue::resolve)
}

impl<T: Clone> Clone for FieldValue<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(value) => Self::Literal(value.clone()),
            Self::Producer(producer) => Self::Producer(Arc::clone(producer)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for FieldValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl<T> From<T> for FieldValue<T> {
    fn from(value: T) -> Self {
        Self::Literal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn producer_is_evaluated_on_every_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let field = FieldValue::producer(move || counter.fetch_add(1, Ordering::SeqCst) + 1);

        assert_eq!(field.resolve(), 1);
        assert_eq!(field.resolve(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn absent_field_resolves_to_none() {
        assert_eq!(resolve_field::<String>(None), None);
        let field = FieldValue::literal(7_u8);
        assert_eq!(resolve_field(Some(&field)), Some(7));
    }

    #[test]
    fn cloned_producer_shares_the_closure() {
        let field = FieldValue::producer(|| vec![1, 2]);
        let copy = field.clone();
        assert!(copy.is_producer());
        assert_eq!(copy.resolve(), vec![1, 2]);
        assert_eq!(format!("{field:?}"), "Producer(..)");
    }
}
