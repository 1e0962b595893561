pub mod reducers;
pub mod xiv_state;

pub use reducers::register_state_reducers;
pub use xiv_state::{StateSnapshot, XivState};
