pub mod identity;
pub mod middleware;
pub mod session;

pub use identity::CurrentUser;
pub use middleware::SessionLayer;
pub use session::{Claims, SessionManager};
