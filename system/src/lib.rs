mod canvas_log;
pub mod color_assigner;
mod error;
mod message;
mod palette;
mod participant;
mod router;
mod session;
mod types;

pub extern crate serde;
pub extern crate serde_json;

pub use canvas_log::*;
pub use error::*;
pub use message::*;
pub use palette::*;
pub use participant::*;
pub use router::*;
pub use session::*;
pub use types::*;
