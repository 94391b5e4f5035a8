pub mod auth;

pub mod users;

pub mod tasks;

pub mod submissions;

pub mod centers;

pub mod groups;

pub mod analytics;

pub use analytics::configure_analytics_routes;
pub use auth::configure_auth_routes;
pub use centers::configure_centers_routes;
pub use groups::configure_groups_routes;
pub use submissions::configure_submissions_routes;
pub use tasks::configure_tasks_routes;
pub use users::configure_user_routes;
