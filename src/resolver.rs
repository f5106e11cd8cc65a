use crate::{
    config::ResolverConfig,
    error::DnsError,
    transport::Transport,
    types::{Message, Record, Type},
};
use async_recursion::async_recursion;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU16, Ordering};
use tracing::{debug, info, trace};

/// Hands out transaction identifiers for outgoing queries.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> u16;
}

/// Uniformly random identifiers from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self) -> u16 {
        rand::random::<u16>()
    }
}

/// Identifiers counting up from a fixed start, wrapping at `u16::MAX`.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU16,
}

impl SequentialIds {
    pub fn starting_at(first: u16) -> Self {
        Self { next: AtomicU16::new(first) }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> u16 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// What a reply tells the resolver to do next.
///
/// [`Step::of`] checks the outcomes in a fixed order: an answer wins over
/// glue, and glue wins over a bare referral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The answer section holds an address for the queried name.
    Answer(Ipv4Addr),
    /// The additional section holds the address of a nameserver to ask next.
    Glue(Ipv4Addr),
    /// The authority section names a nameserver whose address is unknown.
    Referral(String),
    /// Nothing in the reply lets the resolution continue.
    Dead,
}

impl Step {
    pub fn of(response: &Message) -> Step {
        if let Some(ip) = first_address(&response.answers) {
            Step::Answer(ip)
        } else if let Some(ip) = first_address(&response.additionals) {
            Step::Glue(ip)
        } else if let Some(ns) = first_nameserver(&response.authorities) {
            Step::Referral(ns.to_owned())
        } else {
            Step::Dead
        }
    }
}

fn first_address(records: &[Record]) -> Option<Ipv4Addr> {
    records
        .iter()
        .filter(|r| Type::from_u16(r.rtype) == Some(Type::A))
        .find_map(|r| r.rdata.as_a())
}

fn first_nameserver(records: &[Record]) -> Option<&str> {
    records
        .iter()
        .filter(|r| Type::from_u16(r.rtype) == Some(Type::NS))
        .find_map(|r| r.rdata.as_ns())
}

/// Iterative resolver walking referrals from a starting nameserver.
///
/// Every query goes out only after the previous reply has been handled;
/// nothing is cached between or within resolutions.
#[derive(Debug)]
pub struct Resolver<T, I = RandomIds> {
    transport: T,
    ids:       I,
    config:    ResolverConfig,
}

impl<T: Transport> Resolver<T, RandomIds> {
    /// Creates a resolver with random query ids and default limits.
    pub fn new(transport: T) -> Self {
        Self::with_ids(transport, RandomIds, ResolverConfig::default())
    }
}

impl<T: Transport, I: IdSource> Resolver<T, I> {
    pub fn with_ids(transport: T, ids: I, config: ResolverConfig) -> Self {
        Self { transport, ids, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves `name` starting at `nameserver`, returning the first
    /// address found in an answer section.
    ///
    /// # Errors
    /// Any failure along the chain aborts the whole resolution: transport
    /// and wire errors are passed through, a reply without answer, glue or
    /// referral yields [`DnsError::Unresolvable`], and the configured limits
    /// yield [`DnsError::ReferralLoop`], [`DnsError::TooManyHops`] or
    /// [`DnsError::TooDeep`].
    pub async fn resolve(
        &self,
        name:       &str,
        nameserver: Ipv4Addr,
        qtype:      u16,
    ) -> Result<Ipv4Addr, DnsError> {
        self.resolve_at(name, nameserver, qtype, 0).await
    }

    #[async_recursion]
    async fn resolve_at(
        &self,
        name:       &str,
        nameserver: Ipv4Addr,
        qtype:      u16,
        depth:      usize,
    ) -> Result<Ipv4Addr, DnsError> {
        if depth > self.config.max_depth {
            return Err(DnsError::TooDeep {
                name:  name.to_string(),
                depth: self.config.max_depth,
            });
        }

        let mut server  = nameserver;
        let mut visited = HashSet::new();

        for _ in 0..self.config.max_hops {
            // Same name, same server: the reply would send us round again
            if !visited.insert(server) {
                return Err(DnsError::ReferralLoop { name: name.to_string(), server });
            }

            let response = self.query(name, server, qtype).await?;

            match Step::of(&response) {
                Step::Answer(ip) => {
                    info!(domain = name, %ip, "answer found");
                    return Ok(ip);
                }
                Step::Glue(ip) => {
                    debug!(domain = name, next = %ip, "following glue");
                    server = ip;
                }
                Step::Referral(ns) => {
                    // Look the nameserver up from where we are now, then go on
                    // with the name we were after
                    debug!(domain = name, nameserver = %ns, depth, "resolving nameserver without glue");
                    server = self.resolve_at(&ns, server, Type::A as u16, depth + 1).await?;
                }
                Step::Dead => {
                    return Err(DnsError::Unresolvable { name: name.to_string(), server });
                }
            }
        }

        Err(DnsError::TooManyHops {
            name: name.to_string(),
            hops: self.config.max_hops,
        })
    }

    /// Sends a single query and decodes the reply.
    pub async fn query(
        &self,
        name:   &str,
        server: Ipv4Addr,
        qtype:  u16,
    ) -> Result<Message, DnsError> {
        let id  = self.ids.next_id();
        let req = Message::query(name, qtype, id)?.encode()?;

        info!(%server, domain = name, qtype, "DNS server to query");
        let raw      = self.transport.exchange(server, &req).await?;
        let response = Message::decode(&raw)?;

        if response.header.id != id {
            if self.config.strict_ids {
                return Err(DnsError::IdMismatch { expected: id, received: response.header.id });
            }
            debug!(expected = id, received = response.header.id, "reply id differs from query id");
        }

        report(&response);
        Ok(response)
    }
}

/// Logs an overview of a reply and the records that drive the next step.
fn report(response: &Message) {
    info!(
        answers     = response.answers.len(),
        authorities = response.authorities.len(),
        additionals = response.additionals.len(),
        "reply received"
    );
    for answer in &response.answers {
        debug!(owner = %answer.name, data = %answer.rdata, "answer");
    }
    for authority in &response.authorities {
        debug!(owner = %authority.name, data = %authority.rdata, "authority");
    }
    for additional in &response.additionals {
        debug!(owner = %additional.name, data = %additional.rdata, "additional");
    }
    trace!("\n{}", response);
}
