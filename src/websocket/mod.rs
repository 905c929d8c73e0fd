pub mod handler;
pub mod msg_get_ip_handler;
pub mod msg_ping_handler;
pub mod msg_update_caret_handler;
pub mod msg_update_input_handler;

pub use handler::websocket_handler;
