//! Services and their method tables
//!
//! A `Service` pairs one shared instance with the methods callable on it.
//! Services are assembled with a `ServiceBuilder`, either by hand or through
//! the `RpcService` capability trait (which `#[rpc_service]` implements).
//!
//! # Examples
//!
//! ```rust
//! use rpclite_server::{RpcService, ServiceBuilder};
//!
//! struct Calc;
//!
//! impl Calc {
//!     fn add(&self, a: i64, b: i64) -> i64 { a + b }
//!     fn reset(&self) {}
//! }
//!
//! impl RpcService for Calc {
//!     fn methods(builder: ServiceBuilder<Self>) -> ServiceBuilder<Self> {
//!         builder.method("Add", Calc::add).method("Reset", Calc::reset)
//!     }
//! }
//!
//! let service = Calc::methods(ServiceBuilder::new(Calc)).build("Calc").unwrap();
//! assert_eq!(service.method_names(), vec!["Add", "Reset"]);
//! assert_eq!(service.method("Reset").unwrap().return_arity(), 0);
//! ```

use crate::method::{Method, Operation, Param};
use rpclite_core::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type that can enumerate its own RPC operations
///
/// Implement this by hand or derive it with `#[rpc_service]` on the type's
/// `impl` block.
pub trait RpcService: Sized + Send + Sync + 'static {
    /// Add every callable operation to `builder`
    fn methods(builder: ServiceBuilder<Self>) -> ServiceBuilder<Self>;
}

/// A registered service instance and its method table
pub struct Service {
    name: String,
    instance: Arc<dyn Any + Send + Sync>,
    methods: HashMap<String, Method>,
}

impl Service {
    /// Name the service is registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a method by name
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Check if a method is declared
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// All method names, sorted
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invoke `method` on this service's instance
    pub fn invoke(&self, method: &str, params: Vec<Param>) -> Result<Value> {
        let target = self
            .methods
            .get(method)
            .ok_or_else(|| Error::Internal(format!("Method {} is not declared.", method)))?;
        target.invoke(self.instance.as_ref(), params)
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.name)
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Builder for a service's method table
///
/// Mistakes in the table (a duplicate name, a method returning more than one
/// value) are collected and reported by `build`, so registration fails with
/// a diagnostic rather than a panic.
pub struct ServiceBuilder<S> {
    instance: Arc<S>,
    methods: HashMap<String, Method>,
    errors: Vec<String>,
}

impl<S: Send + Sync + 'static> ServiceBuilder<S> {
    /// Start a service around an owned instance
    pub fn new(instance: S) -> Self {
        Self::shared(Arc::new(instance))
    }

    /// Start a service around an instance that is also used elsewhere
    pub fn shared(instance: Arc<S>) -> Self {
        Self {
            instance,
            methods: HashMap::new(),
            errors: Vec::new(),
        }
    }

    /// Add an operation
    ///
    /// Operations returning `()` have a return arity of 0 and answer with
    /// `"result": null`.
    pub fn method<Args, F>(self, name: impl Into<String>, op: F) -> Self
    where
        F: Operation<S, Args>,
        F::Output: Serialize + 'static,
    {
        let arity = unit_arity::<F::Output>();
        self.insert(Method::new::<S, Args, F>(name, arity, op))
    }

    /// Add an operation returning `Result<R, E>`
    ///
    /// An `Err` becomes an internal error response carrying `E`'s message.
    pub fn fallible<Args, F, R, E>(self, name: impl Into<String>, op: F) -> Self
    where
        F: Operation<S, Args, Output = std::result::Result<R, E>>,
        R: Serialize + 'static,
        E: fmt::Display,
    {
        let arity = unit_arity::<R>();
        self.insert(Method::fallible::<S, Args, F, R, E>(name, arity, op))
    }

    /// Add an operation whose return arity was counted elsewhere
    ///
    /// Used by `#[rpc_service]`, which sees tuple return types that the
    /// typed entry points cannot tell apart from single values.
    #[doc(hidden)]
    pub fn method_with_arity<Args, F>(self, name: impl Into<String>, arity: usize, op: F) -> Self
    where
        F: Operation<S, Args>,
        F::Output: Serialize,
    {
        self.insert(Method::new::<S, Args, F>(name, arity, op))
    }

    /// Fallible counterpart of `method_with_arity`
    #[doc(hidden)]
    pub fn fallible_with_arity<Args, F, R, E>(
        self,
        name: impl Into<String>,
        arity: usize,
        op: F,
    ) -> Self
    where
        F: Operation<S, Args, Output = std::result::Result<R, E>>,
        R: Serialize,
        E: fmt::Display,
    {
        self.insert(Method::fallible::<S, Args, F, R, E>(name, arity, op))
    }

    fn insert(mut self, method: Method) -> Self {
        let name = method.name().to_string();
        if method.return_arity() > 1 {
            self.errors.push(format!(
                "The return value count of method {} should be 0 or 1",
                name
            ));
        } else if self.methods.contains_key(&name) {
            self.errors
                .push(format!("Method {} is declared more than once", name));
        } else {
            self.methods.insert(name, method);
        }
        self
    }

    /// Number of methods added so far
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// True when no method has been added
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Finish the service under `name`
    pub fn build(self, name: impl Into<String>) -> Result<Service> {
        let name = name.into();
        if !self.errors.is_empty() {
            return Err(Error::Registration(format!(
                "Service {}: {}",
                name,
                self.errors.join("; ")
            )));
        }

        Ok(Service {
            name,
            instance: self.instance,
            methods: self.methods,
        })
    }
}

fn unit_arity<R: 'static>() -> usize {
    if TypeId::of::<R>() == TypeId::of::<()>() {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        hits: AtomicUsize,
    }

    impl Counter {
        fn hit(&self) {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }

        fn count(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }

        fn pair(&self) -> (usize, usize) {
            (1, 2)
        }
    }

    impl RpcService for Counter {
        fn methods(builder: ServiceBuilder<Self>) -> ServiceBuilder<Self> {
            builder.method("Hit", Counter::hit).method("Count", Counter::count)
        }
    }

    #[test]
    fn test_capability_trait_builds_table() {
        let service = Counter::methods(ServiceBuilder::new(Counter::default()))
            .build("Counter")
            .unwrap();

        assert_eq!(service.name(), "Counter");
        assert_eq!(service.method_names(), vec!["Count", "Hit"]);
        assert_eq!(service.method("Hit").unwrap().return_arity(), 0);
        assert_eq!(service.method("Count").unwrap().return_arity(), 1);
    }

    #[test]
    fn test_invoke_shares_instance() {
        let counter = Arc::new(Counter::default());
        let service = Counter::methods(ServiceBuilder::shared(Arc::clone(&counter)))
            .build("Counter")
            .unwrap();

        service.invoke("Hit", vec![]).unwrap();
        service.invoke("Hit", vec![]).unwrap();

        assert_eq!(counter.count(), 2);
        assert_eq!(service.invoke("Count", vec![]).unwrap(), json!(2));
    }

    #[test]
    fn test_duplicate_method_is_registration_error() {
        let result = ServiceBuilder::new(Counter::default())
            .method("Hit", Counter::hit)
            .method("Hit", Counter::count)
            .build("Counter");

        match result {
            Err(Error::Registration(msg)) => assert!(msg.contains("Hit")),
            other => panic!("Expected Registration error, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_return_values_rejected() {
        let result = ServiceBuilder::new(Counter::default())
            .method_with_arity("Pair", 2, Counter::pair)
            .build("Counter");

        match result {
            Err(Error::Registration(msg)) => {
                assert!(msg.contains("The return value count of method Pair should be 0 or 1"))
            }
            other => panic!("Expected Registration error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_method_invoke_is_internal() {
        let service = ServiceBuilder::new(Counter::default()).build("Empty").unwrap();
        assert!(service.method_names().is_empty());
        assert!(matches!(service.invoke("Hit", vec![]), Err(Error::Internal(_))));
    }
}
