pub mod analysis;
pub mod bidding;
pub mod game;
pub mod model;
pub mod rules;
pub mod state;
