pub mod export;
pub mod setup;
pub mod ui;
