// RESP protocol front end

pub mod handler;
pub mod server;
pub mod utils;

pub use server::RespServer;
