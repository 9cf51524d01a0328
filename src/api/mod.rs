mod handlers;
mod routes;
mod state;

pub use handlers::{ChatRequest, ChatResponse, INVALID_REQUEST_REPLY, PROVIDER_FAILURE_REPLY};
pub use routes::create_router;
pub use state::AppState;
