pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Application, ApplicationError, ApplicationStatus, AppliedRole};
pub use services::workflow::ApplicationService;
