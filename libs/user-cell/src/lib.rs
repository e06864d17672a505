pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{DirectoryError, PublicProfessional, User};
pub use services::directory::UserDirectoryService;
