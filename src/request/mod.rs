//! Request shaping subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → call.rs (endpoint, query, headers, payload, cancellation)
//!     → query.rs (form-urlencoded query string, once per call)
//!     → headers.rs (validated HeaderMap + x-request-id, once per call)
//!     → body.rs (payload encoded once, attached to every attempt):
//!         - JSON value
//!         - form.rs (FormEncode projection → urlencoded body)
//!         - multipart.rs (fresh multipart form for every attempt)
//! ```
//!
//! # Design Decisions
//! - All validation happens before the first host is contacted
//! - Query keys and header names are unique (`BTreeMap`), later values win
//! - Form payloads come from an explicit projection, not runtime reflection

pub mod body;
pub mod call;
pub mod form;
pub mod headers;
pub mod multipart;
pub mod query;

pub use body::EncodedBody;
pub use call::{CallDescriptor, Payload};
pub use form::{FormEncode, FormFields};
pub use headers::X_REQUEST_ID;
pub use multipart::{MultipartBody, MultipartPart};
pub use query::encode_query;
