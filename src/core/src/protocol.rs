//! Wire-level data shapes shared by every layer.
//!
//! - `types`: sensor samples, session metadata and the ACK/NACK response envelope.

pub mod types;

pub use types::{
    ResponseStatus, ResponseType, SampleField, SensorSample, ServiceResponse, SessionMetadata,
};
