//! Host pool subsystem.
//!
//! # Data Flow
//! ```text
//! configured host strings
//!     → host.rs (parse, require absolute http/https base URL)
//!     → host_pool.rs (non-empty pool, order randomized once at construction)
//!     → per call: pool.shuffled()
//!     → order.rs (independent uniform permutation: leading hosts + final host)
//!     → dispatcher tries hosts strictly one at a time
//! ```
//!
//! # Design Decisions
//! - The pool is immutable once built; there is no health tracking or weighting
//! - Every call shuffles its own copy, so concurrent calls never share ordering state
//! - Non-emptiness is carried by the types (`head` + `tail`, `leading` + `last`)

pub mod host;
pub mod order;
pub mod host_pool;

pub use host::Host;
pub use order::HostOrder;
pub use host_pool::HostPool;
