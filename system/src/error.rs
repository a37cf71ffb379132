use std::fmt;

/// A manual color that failed validation. Never reported to the requesting connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRejected {
    pub requested: String,
}

impl fmt::Display for ColorRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejected manual color {:?}", self.requested)
    }
}

impl std::error::Error for ColorRejected {}

#[derive(Debug)]
pub enum ProtocolError {
    /// Inbound frame is not a known client message.
    Decode(serde_json::Error),
    Encode(serde_json::Error),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Decode(e) => write!(f, "cannot decode client message: {}", e),
            ProtocolError::Encode(e) => write!(f, "cannot encode server message: {}", e),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Decode(e) | ProtocolError::Encode(e) => Some(e),
        }
    }
}
