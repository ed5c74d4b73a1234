//! Multi-host HTTP dispatch library

pub mod config;
pub mod dispatch;
pub mod error;
pub mod observability;
pub mod pool;
pub mod problem;
pub mod request;

pub use config::DispatchConfig;
pub use dispatch::{BodyStream, CallOutcome, Dispatcher, TransportSettings};
pub use error::{DispatchError, DispatchResult};
pub use pool::{Host, HostPool};
pub use problem::Problem;
pub use request::{CallDescriptor, FormEncode, FormFields, MultipartBody};
