pub mod billing;
pub mod emails;
pub mod error;
pub mod handlers;
pub mod leads;
pub mod routes;
pub mod server;
pub mod state;

pub use error::*;
pub use handlers::*;
pub use routes::*;
pub use server::*;
pub use state::*;
