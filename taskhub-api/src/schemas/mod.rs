/// Request and response schemas
///
/// Wire types only; conversions into the shared crate's repository and
/// manager inputs live next to each type.
pub mod auth;
pub mod tasks;
pub mod users;

pub use auth::{BearerResponse, LoginForm};
pub use tasks::{TaskCreate, TaskRead, TaskUpdate};
pub use users::{UserCreate, UserRead, UserUpdate};
