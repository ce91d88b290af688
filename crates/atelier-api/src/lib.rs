pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use extract::JsonBody;
pub use router::build_router;
pub use state::AppState;
