//! Procedural macros for rpclite
//!
//! # Available Macros
//!
//! ## `#[rpc_service]` - Service Method Table
//!
//! Placed on an `impl` block, it implements `rpclite_server::RpcService` for
//! the type, registering every `pub fn` that takes `&self`. Parameters must be
//! `Deserialize`, return values `Serialize`.
//!
//! - A method returning `()` answers with `"result": null`
//! - A method returning `Result<T, E>` reports `Err` as an internal error
//! - A method returning a tuple of two or more values is rejected when the
//!   service is registered
//!
//! Helper attributes on methods:
//!
//! - `#[rpc(name = "MyTest")]`: register under a different name
//! - `#[rpc(skip)]`: leave the method out
//!
//! # Examples
//!
//! ```ignore
//! use rpclite_macros::rpc_service;
//!
//! struct TestService;
//!
//! #[rpc_service]
//! impl TestService {
//!     #[rpc(name = "MyTest")]
//!     pub fn my_test(&self, a: String, b: i64) -> String {
//!         format!("{}{}", a, b)
//!     }
//! }
//!
//! let mut router = rpclite_server::Router::new();
//! router.register("ITest", TestService)?;
//! ```

mod service;

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemImpl};

/// Implement `RpcService` from an `impl` block
///
/// Methods are registered under their own name unless renamed with
/// `#[rpc(name = "..")]`. Associated functions without `&self`, private
/// methods, `&mut self` methods and `async fn`s are left out.
///
/// The generated code refers to `::rpclite_server`, which must be a
/// dependency of the calling crate.
#[proc_macro_attribute]
pub fn rpc_service(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as ItemImpl);
    match service::rpc_service_impl(item) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
