pub mod payment;
pub mod response;
pub mod verdict;

pub use payment::*;
pub use response::*;
pub use verdict::*;
