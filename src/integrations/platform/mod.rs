pub mod detect;

pub use detect::{EnvironmentProbe, Platform};
