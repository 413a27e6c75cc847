//! Typed, callable method descriptors
//!
//! A `Method` is the registry's view of one operation on a service: its name,
//! the ordered types of its parameters (the receiver is not counted), how
//! many values it returns, and a type-erased invoker.
//!
//! # Type Erasure
//!
//! Parameters are decoded before the target operation runs, so the decoder
//! needs each parameter's type without knowing the operation itself. Every
//! declared parameter carries a `ParamType`, a type name plus a decoder
//! function that turns raw JSON into a boxed value of exactly that type. The
//! invoker later unboxes the values in declaration order.
//!
//! # Operations
//!
//! Any `Fn(&S, A1, .., An) -> R` with `n <= 8`, deserializable arguments and a
//! serializable result is an `Operation<S, (A1, .., An)>`. This covers
//! ordinary methods (`Calc::add`) as well as closures:
//!
//! ```rust
//! use rpclite_server::{Method, Param};
//! use serde_json::json;
//!
//! struct Calc;
//! impl Calc {
//!     fn add(&self, a: i64, b: i64) -> i64 { a + b }
//! }
//!
//! let method = Method::new::<Calc, _, _>("Add", 1, Calc::add);
//! assert_eq!(method.param_types().len(), 2);
//!
//! let params: Vec<Param> = method
//!     .param_types()
//!     .iter()
//!     .zip([json!(2), json!(3)])
//!     .map(|(ty, value)| ty.decode(value).unwrap())
//!     .collect();
//! assert_eq!(method.invoke(&Calc, params).unwrap(), json!(5));
//! ```

use rpclite_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::{type_name, Any};
use std::fmt;

/// A decoded parameter value, boxed as its declared type
pub type Param = Box<dyn Any + Send>;

type Invoker = Box<dyn Fn(&(dyn Any + Send + Sync), Vec<Param>) -> Result<Value> + Send + Sync>;

/// Declared type of one method parameter
#[derive(Clone, Copy)]
pub struct ParamType {
    name: &'static str,
    decode: fn(Value) -> serde_json::Result<Param>,
}

impl ParamType {
    /// Describe parameter type `T`
    pub fn of<T: DeserializeOwned + Send + 'static>() -> Self {
        Self {
            name: type_name::<T>(),
            decode: decode_as::<T>,
        }
    }

    /// Rust type name, used in diagnostics
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Decode a raw JSON value into this type
    ///
    /// Decoding never coerces: a value that does not fit the type is an error.
    pub fn decode(&self, value: Value) -> serde_json::Result<Param> {
        (self.decode)(value)
    }
}

impl fmt::Debug for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn decode_as<T: DeserializeOwned + Send + 'static>(value: Value) -> serde_json::Result<Param> {
    serde_json::from_value::<T>(value).map(|v| Box::new(v) as Param)
}

/// Something a service exposes as an RPC operation
///
/// Implemented for plain functions and closures taking the service by
/// reference followed by up to eight deserializable arguments. `Args` is the
/// tuple of argument types and only exists to keep the impls apart.
pub trait Operation<S, Args>: Send + Sync + 'static {
    /// Return type of the operation
    type Output;

    /// Declared parameter types, in order
    fn param_types() -> Vec<ParamType>;

    /// Unbox `params` and call the operation
    fn call(&self, receiver: &S, params: Vec<Param>) -> Result<Self::Output>;
}

fn take<T: 'static>(params: &mut impl Iterator<Item = Param>) -> Result<T> {
    let param = params
        .next()
        .ok_or_else(|| Error::Internal("Missing bound parameter.".to_string()))?;
    param
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| Error::Internal(format!("Bound parameter is not a {}.", type_name::<T>())))
}

macro_rules! impl_operation {
    ($($arg:ident),*) => {
        impl<S, F, R, $($arg,)*> Operation<S, ($($arg,)*)> for F
        where
            F: Fn(&S, $($arg),*) -> R + Send + Sync + 'static,
            $($arg: DeserializeOwned + Send + 'static,)*
        {
            type Output = R;

            fn param_types() -> Vec<ParamType> {
                vec![$(ParamType::of::<$arg>()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn call(&self, receiver: &S, params: Vec<Param>) -> Result<R> {
                let mut params = params.into_iter();
                $(let $arg = take::<$arg>(&mut params)?;)*
                Ok(self(receiver, $($arg),*))
            }
        }
    };
}

impl_operation!();
impl_operation!(A1);
impl_operation!(A1, A2);
impl_operation!(A1, A2, A3);
impl_operation!(A1, A2, A3, A4);
impl_operation!(A1, A2, A3, A4, A5);
impl_operation!(A1, A2, A3, A4, A5, A6);
impl_operation!(A1, A2, A3, A4, A5, A6, A7);
impl_operation!(A1, A2, A3, A4, A5, A6, A7, A8);

/// One callable operation of a service
///
/// Immutable once built. The receiver is passed at invocation time as
/// `&dyn Any`, and must be the service type the method was built for.
pub struct Method {
    name: String,
    param_types: Vec<ParamType>,
    return_arity: usize,
    invoke: Invoker,
}

impl Method {
    /// Build a method from an infallible operation
    ///
    /// `return_arity` is recorded as given; use 0 for operations returning
    /// `()` and 1 otherwise.
    pub fn new<S, Args, F>(name: impl Into<String>, return_arity: usize, op: F) -> Self
    where
        S: Send + Sync + 'static,
        F: Operation<S, Args>,
        F::Output: Serialize,
    {
        Self::build::<S, _>(name.into(), F::param_types(), return_arity, move |receiver, params| {
            let output = op.call(receiver, params)?;
            Ok(serde_json::to_value(output)?)
        })
    }

    /// Build a method from an operation returning `Result<R, E>`
    ///
    /// An `Err` is reported as an internal failure carrying `E`'s message.
    pub fn fallible<S, Args, F, R, E>(name: impl Into<String>, return_arity: usize, op: F) -> Self
    where
        S: Send + Sync + 'static,
        F: Operation<S, Args, Output = std::result::Result<R, E>>,
        R: Serialize,
        E: fmt::Display,
    {
        Self::build::<S, _>(name.into(), F::param_types(), return_arity, move |receiver, params| {
            let output = op
                .call(receiver, params)?
                .map_err(|e| Error::Internal(e.to_string()))?;
            Ok(serde_json::to_value(output)?)
        })
    }

    fn build<S, C>(name: String, param_types: Vec<ParamType>, return_arity: usize, call: C) -> Self
    where
        S: Send + Sync + 'static,
        C: Fn(&S, Vec<Param>) -> Result<Value> + Send + Sync + 'static,
    {
        let invoke: Invoker = Box::new(move |receiver: &(dyn Any + Send + Sync), params: Vec<Param>| {
            let receiver = receiver.downcast_ref::<S>().ok_or_else(|| {
                Error::Internal(format!("Receiver is not a {}.", type_name::<S>()))
            })?;
            call(receiver, params)
        });

        Self {
            name,
            param_types,
            return_arity,
            invoke,
        }
    }

    /// Method name as callers see it
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter types, receiver excluded
    pub fn param_types(&self) -> &[ParamType] {
        &self.param_types
    }

    /// Number of declared return values
    pub fn return_arity(&self) -> usize {
        self.return_arity
    }

    /// Call the operation on `receiver` with decoded parameters
    ///
    /// Unit results come back as `Value::Null`.
    pub fn invoke(&self, receiver: &(dyn Any + Send + Sync), params: Vec<Param>) -> Result<Value> {
        if params.len() != self.param_types.len() {
            return Err(Error::Internal(format!(
                "Method {} expects {} bound parameter(s), got {}.",
                self.name,
                self.param_types.len(),
                params.len()
            )));
        }
        (self.invoke)(receiver, params)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("param_types", &self.param_types)
            .field("return_arity", &self.return_arity)
            .finish()
    }
}
