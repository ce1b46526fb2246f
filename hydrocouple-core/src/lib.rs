pub mod component;
pub mod config;
pub mod data;
pub mod model;
pub mod space;
pub mod state;
pub mod time;
pub mod units;

pub mod errors;
