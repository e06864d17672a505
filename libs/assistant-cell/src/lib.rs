pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AssistantError, ChatRequest, ChatResponse, ChatTurn};
pub use services::chat::AssistantService;
