/// Service layer between routes and repositories
///
/// User operations live in `taskhub_shared::auth::manager`; this crate
/// only adds the task manager.
pub mod tasks;

pub use tasks::TaskManager;
