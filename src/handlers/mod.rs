pub mod health;
pub mod paid;
pub mod verify;

pub use health::*;
pub use paid::*;
pub use verify::*;
