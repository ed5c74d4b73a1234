//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! CallDescriptor
//!     → dispatcher.rs (prepare: headers, query, request id)
//!     → HostPool::shuffled() (fresh order per call)
//!     → for each host in order:
//!         transport.rs client → send
//!             ├─ transport error, hosts left → warn, next host
//!             ├─ transport error, last host  → Transport { attempt == of }
//!             └─ any reply                   → stop iterating
//!     → response.rs (2xx check, empty check, JSON decode)
//!       or stream.rs (live body for the streaming operations)
//!     → CallOutcome
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: at most one request in flight per call
//! - GET operations share one pooled client; POST operations build a
//!   dedicated client per call
//! - Certificate validation is only relaxed when configured, and only on
//!   the dedicated POST client
//! - Cancellation is checked before the first attempt and raced against
//!   every await point afterwards

pub mod dispatcher;
pub mod outcome;
pub mod response;
pub mod stream;
pub mod transport;

pub use dispatcher::{Dispatcher, Operation};
pub use outcome::CallOutcome;
pub use stream::BodyStream;
pub use transport::TransportSettings;
