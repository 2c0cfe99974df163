pub mod x402;

pub use x402::{x402_middleware_layer, X402Middleware};
