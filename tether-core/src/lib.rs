mod error;
pub mod model;

pub use error::InjectError;
pub use model::*;
