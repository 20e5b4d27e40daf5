//! # Tillage HTTP Ingress
//!
//! Maps HTTP verbs onto the plot engine:
//!
//! | Method | Path                               | Engine call                  |
//! |--------|------------------------------------|------------------------------|
//! | GET    | `/players`                         | `players`                    |
//! | POST   | `/players`                         | `register`                   |
//! | GET    | `/players/{player}/plots/{plot}`   | `resolve_and_maybe_persist`  |
//! | PUT    | `/players/{player}/plots/{plot}`   | `plant`                      |
//! | GET    | `/health`                          | none                         |

pub mod error;
pub mod ingress;
pub mod response;
pub mod routes;
pub mod wire;

pub use error::{ApiError, HttpError};
pub use ingress::serve;
pub use routes::App;
