pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AvailabilityError, AvailabilitySlot, CreateAvailabilityRequest};
pub use services::slots::AvailabilityService;
