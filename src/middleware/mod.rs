pub mod guard;
pub mod response;

pub use guard::route_guard;
pub use response::{ApiResponse, ApiResult};
