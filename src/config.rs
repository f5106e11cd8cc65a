use std::time::Duration;

/// Standard DNS port.
pub const DNS_PORT: u16 = 53;
/// Queries allowed per resolution level before giving up.
pub const MAX_HOPS: usize = 30;
/// How deeply nameserver lookups may nest inside each other.
pub const MAX_DEPTH: usize = 8;
/// Receive buffer for a single reply datagram.
pub const RECV_BUFFER: usize = 1024;

/// Limits and checks applied by the resolution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Maximum queries sent while resolving one name at one level.
    pub max_hops: usize,
    /// Maximum nesting of nameserver sub-resolutions.
    pub max_depth: usize,
    /// Reject replies whose id differs from the query id.
    pub strict_ids: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_hops:   MAX_HOPS,
            max_depth:  MAX_DEPTH,
            strict_ids: false,
        }
    }
}

/// Settings of the UDP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Destination port on every nameserver.
    pub port: u16,
    /// Largest reply accepted; longer datagrams are cut to this size.
    pub recv_buffer: usize,
    /// Give up waiting for a reply after this long. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port:        DNS_PORT,
            recv_buffer: RECV_BUFFER,
            timeout:     None,
        }
    }
}
