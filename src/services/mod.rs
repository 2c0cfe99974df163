pub mod amount;
pub mod clock;
pub mod network;
pub mod rpc;
pub mod verifier;

pub use amount::{to_base_units, AmountError};
pub use clock::{Clock, TokioClock};
pub use network::{NetworkEntry, NetworkResolver, NetworkTable, PaymentDefaults};
pub use rpc::{HttpRpcClient, RpcError, RpcTransport};
pub use verifier::{PaymentVerifier, PollingPolicy};
