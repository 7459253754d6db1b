// Server library: wire protocol, request dispatch, WebSocket transport and
// the background sweeper.

pub mod handler;
pub mod protocol;
pub mod sweeper;
pub mod ws_server;
