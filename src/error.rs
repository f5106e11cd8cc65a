use std::net::Ipv4Addr;

use thiserror::Error;

/// Errors raised while reading or writing the DNS wire format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Reached end of buffer before a declared field was complete.
    #[error("unexpected end of buffer at offset {0}")]
    EndOfBuffer(usize),
    /// A label exceeds 63 bytes.
    #[error("label `{0}` is longer than 63 bytes")]
    LabelTooLong(String),
    /// An interior label is empty (e.g. `a..b`).
    #[error("empty label in `{0}`")]
    EmptyLabel(String),
    /// The encoded name exceeds 255 bytes.
    #[error("name `{0}` is longer than 255 bytes on the wire")]
    NameTooLong(String),
    /// Domain names are ASCII only.
    #[error("name `{0}` contains non-ASCII characters")]
    NonAsciiName(String),
    /// Label bytes are not valid UTF-8.
    #[error("label at offset {0} is not valid UTF-8")]
    InvalidLabel(usize),
    /// A compression pointer targets an offset outside the message.
    #[error("compression pointer to offset {0} is outside the message")]
    InvalidPointer(usize),
    /// Too many compression pointers were chained together.
    #[error("compression pointer chain exceeds {0} jumps")]
    PointerLoop(usize),
    /// An A record whose rdata is not exactly 4 bytes.
    #[error("address record carries {0} bytes of data, expected 4")]
    InvalidAddressLength(u16),
    /// A name inside rdata runs past the declared rdlength.
    #[error("record data overruns its declared length of {0} bytes")]
    RDataOverrun(u16),
}

/// Errors surfaced by a resolution.
#[derive(Debug, Error)]
pub enum DnsError {
    /// The query could not be built or the reply could not be parsed.
    #[error("wire format error: {0}")]
    Buffer(#[from] BufferError),
    /// The transport failed to deliver the query or receive a reply.
    #[error("transport error talking to {server}: {source}")]
    Transport {
        server: Ipv4Addr,
        #[source]
        source: std::io::Error,
    },
    /// The reply carries neither an answer, glue nor a referral.
    #[error("resolution of `{name}` failed: {server} gave no answer, glue or referral")]
    Unresolvable { name: String, server: Ipv4Addr },
    /// A nameserver was referred to twice for the same name.
    #[error("referral loop resolving `{name}`: {server} was already queried")]
    ReferralLoop { name: String, server: Ipv4Addr },
    /// The per-level query budget ran out.
    #[error("resolution of `{name}` gave up after {hops} queries")]
    TooManyHops { name: String, hops: usize },
    /// Nameserver sub-resolutions nested too deeply.
    #[error("resolution of `{name}` nested deeper than {depth} levels")]
    TooDeep { name: String, depth: usize },
    /// Strict id checking is on and the reply id differs.
    #[error("reply id 0x{received:04X} does not match query id 0x{expected:04X}")]
    IdMismatch { expected: u16, received: u16 },
}
