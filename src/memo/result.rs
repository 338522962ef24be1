//! Memoized Call Result Module
//!
//! The value returned by a memoized call: either a cached payload that replays
//! synchronously, or the request primitive's own result.

use serde_json::Value;

use crate::memo::ResponseStatus;

// == Memoized Call ==
/// Outcome of [`MemoizedRequest::call`](crate::memo::MemoizedRequest::call).
#[derive(Debug)]
pub enum MemoizedCall<N> {
    /// Served from the cache; no request was sent
    CacheHit(CachedResult),
    /// Handed to the request primitive, whose native result is returned as is
    Delegated(N),
}

impl<N> MemoizedCall<N> {
    pub fn is_cache_hit(&self) -> bool {
        matches!(self, MemoizedCall::CacheHit(_))
    }

    pub fn cached(&self) -> Option<&CachedResult> {
        match self {
            MemoizedCall::CacheHit(result) => Some(result),
            MemoizedCall::Delegated(_) => None,
        }
    }

    pub fn into_delegated(self) -> Option<N> {
        match self {
            MemoizedCall::CacheHit(_) => None,
            MemoizedCall::Delegated(native) => Some(native),
        }
    }
}

// == Cached Result ==
/// A cache hit that replays its value to any callback registered on it.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResult {
    value: Value,
    context: Option<Value>,
}

impl CachedResult {
    pub fn new(value: Value, context: Option<Value>) -> Self {
        Self { value, context }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The request's context, carried over from its configuration.
    pub fn context(&self) -> Option<&Value> {
        self.context.as_ref()
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Replays the cached value to `callback` right away.
    pub fn done<F: FnOnce(&Value)>(&self, callback: F) -> &Self {
        callback(&self.value);
        self
    }

    /// Replays the cached value to each callback, in order.
    pub fn done_all<I, F>(&self, callbacks: I) -> &Self
    where
        I: IntoIterator<Item = F>,
        F: FnOnce(&Value),
    {
        for callback in callbacks {
            callback(&self.value);
        }
        self
    }

    /// Same as [`done`](Self::done): a hit always completes.
    pub fn always<F: FnOnce(&Value)>(&self, callback: F) -> &Self {
        self.done(callback)
    }

    pub fn always_all<I, F>(&self, callbacks: I) -> &Self
    where
        I: IntoIterator<Item = F>,
        F: FnOnce(&Value),
    {
        self.done_all(callbacks)
    }

    pub fn then<F: FnOnce(&Value)>(&self, callback: F) -> &Self {
        self.done(callback)
    }

    /// Never invokes `callback`; a cache hit cannot fail.
    pub fn fail<F: FnOnce(&ResponseStatus)>(&self, _callback: F) -> &Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn test_done_replays_value() {
        let result = CachedResult::new(json!({"a": 1}), None);
        let seen = RefCell::new(Vec::new());

        result
            .done(|v| seen.borrow_mut().push(v.clone()))
            .then(|v| seen.borrow_mut().push(v.clone()));

        assert_eq!(*seen.borrow(), vec![json!({"a": 1}), json!({"a": 1})]);
    }

    #[test]
    fn test_done_all_runs_in_order() {
        let result = CachedResult::new(json!(7), None);
        let order = RefCell::new(Vec::new());

        let callbacks: Vec<Box<dyn FnOnce(&Value) + '_>> = vec![
            Box::new(|_| order.borrow_mut().push("first")),
            Box::new(|_| order.borrow_mut().push("second")),
            Box::new(|_| order.borrow_mut().push("third")),
        ];
        result.always_all(callbacks);

        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_fail_is_never_called() {
        let result = CachedResult::new(json!(1), None);
        result.fail(|_| panic!("a cache hit cannot fail"));
    }

    #[test]
    fn test_memoized_call_accessors() {
        let hit: MemoizedCall<()> = MemoizedCall::CacheHit(CachedResult::new(
            json!("x"),
            Some(json!({"page": 1})),
        ));
        assert!(hit.is_cache_hit());
        assert_eq!(hit.cached().unwrap().context(), Some(&json!({"page": 1})));
        assert!(hit.into_delegated().is_none());

        let delegated: MemoizedCall<u8> = MemoizedCall::Delegated(3);
        assert!(!delegated.is_cache_hit());
        assert_eq!(delegated.into_delegated(), Some(3));
    }
}
