pub mod analytics;
pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod events;
pub mod protocol;
pub mod session_management;
pub mod storage;
pub mod validation;
pub mod web_interface;

pub use controller::Controller;
pub use error_handling::types::SessionError;
pub use protocol::{ResponseStatus, ResponseType, SensorSample, ServiceResponse, SessionMetadata};
pub use session_management::{SessionManager, SessionStatus};
