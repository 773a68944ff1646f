pub mod menu;
pub mod models;
pub mod normalize;

pub use models::*;
pub use normalize::{contains_any, normalize};
