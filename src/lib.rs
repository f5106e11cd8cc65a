//! A minimal iterative DNS client.
//!
//! The crate encodes queries and decodes replies in the RFC 1035 wire
//! format ([`message`], [`buffer`]) and walks referral chains from a
//! starting nameserver until an address record turns up ([`resolver`]).

pub mod buffer;
pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod resolver;
pub mod transport;
pub mod types;

pub use config::{ResolverConfig, TransportConfig};
pub use error::{BufferError, DnsError};
pub use resolver::{IdSource, RandomIds, Resolver, SequentialIds, Step};
pub use transport::{Transport, UdpTransport};
pub use types::{Message, Question, RData, Record, Type};
