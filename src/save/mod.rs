pub mod manager;
pub mod store;

pub use manager::{load_game, new_game, save_game};
pub use store::{PrefStore, PrefValue};
