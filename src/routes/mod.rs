mod auth;
mod health_check;
mod resources;

pub use auth::login;
pub use auth::logout;
pub use auth::refresh;
pub use auth::register;
pub use health_check::health_check;
pub use resources::resource_routes;
