pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Article, ArticleStatus, Category, ContentError};
pub use services::articles::ArticleService;
pub use services::categories::CategoryService;
