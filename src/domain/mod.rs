pub mod model;
pub mod state;

pub use model::Model;
pub use state::{ArrayMutation, FeedState};
