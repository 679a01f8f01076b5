pub mod backend;
pub mod board;
pub mod board_config;
pub mod errors;
pub mod logging;
