pub mod client;
pub mod dispatch;
pub mod dto;
pub mod state;
pub mod validate;
