pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Booking, BookingError, BookingStatus, CreateBookingRequest};
pub use services::ledger::BookingService;
