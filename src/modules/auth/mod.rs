pub mod controller;
pub mod crud;
pub mod extract;
pub mod interface;
pub mod memory;
pub mod model;
pub mod routes;
pub mod schema;

pub use routes::auth_routes;
