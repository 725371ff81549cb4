//! Remote gateway: the transport contract to the backend and its HTTP
//! implementation. A thin crossing of the process boundary; everything
//! that interprets responses lives in core_feed.

pub mod errors;
pub mod http;
pub mod transport;

pub use errors::{GatewayError, GatewayResult};
pub use http::HttpGateway;
pub use transport::FeedTransport;
