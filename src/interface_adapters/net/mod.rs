// Network adapter for live session sockets.

pub mod client;

pub use client::ws_handler;
