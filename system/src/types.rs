pub type ConnectionId = u32;

/// Milliseconds since the UNIX epoch, stamped by the server when a message is received.
pub type Timestamp = u64;
