// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Sits above services; the boundary between a UI host and the scanner
// - Wires collaborators into services (AppState)
// - Translates errors into UI responses

pub mod error_handling;
pub mod state;

pub use error_handling::{ErrorResponse, ErrorType, ToErrorResponse};
pub use state::{AppState, Collaborators};
