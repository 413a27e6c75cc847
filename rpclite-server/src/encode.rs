//! Response encoding
//!
//! - no responses: empty text (the transport sends no body)
//! - one response: a single JSON object
//! - several: a JSON array, in input order

use rpclite_core::{codec, Response, Result};

/// Encode the responses of one dispatch call
pub fn encode_responses(responses: &[Response]) -> Result<String> {
    match responses {
        [] => Ok(String::new()),
        [single] => codec::encode(single),
        many => codec::encode(&many),
    }
}
