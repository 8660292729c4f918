// Interface adapters: wire protocol, HTTP/WebSocket handling and storage.

pub mod handlers;
pub mod http;
pub mod input;
pub mod net;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod store;
