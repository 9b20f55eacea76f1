//! Rate limiting middleware using token bucket algorithm.

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::net::IpAddr;
use std::sync::Arc;
use tower_governor::{
    GovernorError, GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Per-client key: the socket peer, or forwarding headers behind a proxy.
#[derive(Debug, Clone, Copy)]
pub enum ClientIpKeyExtractor {
    /// Socket peer address; requires `ConnectInfo<SocketAddr>`.
    Peer,
    /// `X-Forwarded-For` / `X-Real-IP` / `Forwarded`, then the peer address.
    Forwarded,
}

impl ClientIpKeyExtractor {
    pub fn new(behind_proxy: bool) -> Self {
        if behind_proxy {
            Self::Forwarded
        } else {
            Self::Peer
        }
    }
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        match self {
            Self::Peer => PeerIpKeyExtractor.extract(req),
            Self::Forwarded => SmartIpKeyExtractor.extract(req),
        }
    }
}

type ClientIpGovernorLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// `replenish_secs` is the time it takes to earn back one request.
fn build(behind_proxy: bool, replenish_secs: u64, burst_size: u32) -> ClientIpGovernorLayer {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor::new(behind_proxy))
            .per_second(replenish_secs)
            .burst_size(burst_size)
            .finish()
            .expect("rate limit period and burst are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Creates a rate limiter for catalog pages.
///
/// # Limits
///
/// - **Rate**: one request every 2 seconds once the burst is spent
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn layer(behind_proxy: bool) -> ClientIpGovernorLayer {
    build(behind_proxy, 2, 100)
}

/// Creates a stricter rate limiter for the login and logout routes.
///
/// # Limits
///
/// - **Rate**: one request per second once the burst is spent
/// - **Burst**: 10 requests
pub fn secure_layer(behind_proxy: bool) -> ClientIpGovernorLayer {
    build(behind_proxy, 1, 10)
}
