pub mod artifacts;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod tickets;

pub use routes::create_router;
