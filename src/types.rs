use core::fmt;
use std::net::Ipv4Addr;

/// The Internet class, the only class this client queries.
pub const CLASS_IN: u16 = 1;

/// DNS message header.
///
/// Contains fields identifying the message and counts of question,
/// answer, authority, and additional records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Message identifier.
    pub id: u16,
    /// DNS header flags.
    pub flags: Flags,
    /// Number of entries in the question section.
    pub qd_count: u16,
    /// Number of resource records in the answer section.
    pub an_count: u16,
    /// Number of name server resource records in the authority section.
    pub ns_count: u16,
    /// Number of resource records in the additional section.
    pub ar_count: u16,
}

/// Bitfield flags in a DNS header.
///
/// The sub-fields cover all 16 bits, so decoding then encoding a flags
/// word gives back the same word. The zero value is what queries send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Query/Response flag.
    pub qr: bool,
    /// Operation code.
    pub opcode: u8,
    /// Authoritative Answer flag.
    pub aa: bool,
    /// Truncation flag.
    pub tc: bool,
    /// Recursion Desired flag.
    pub rd: bool,
    /// Recursion Available flag.
    pub ra: bool,
    /// Reserved for future use.
    pub z: u8,
    /// Response code.
    pub rcode: u8,
}

/// A DNS question entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Domain name being queried.
    pub qname: String,
    /// Query type (A, NS, or anything else passed through).
    pub qtype: u16,
    /// Query class (IN).
    pub qclass: u16,
}

/// Record types the resolver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Type {
    A  = 1,
    NS = 2,
}

impl Type {
    pub fn from_u16(value: u16) -> Option<Type> {
        match value {
            1 => Some(Type::A),
            2 => Some(Type::NS),
            _ => None,
        }
    }
}

/// Resource data variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    /// IPv4 address of an `A` record.
    A(Ipv4Addr),
    /// Host name of an `NS` record, already decompressed.
    NS(String),
    /// Raw bytes of any other record type.
    Other(Vec<u8>),
}

impl RData {
    /// Returns the contained IPv4 address if the record is an `A` record.
    ///
    /// # Examples
    ///
    /// ```
    /// use dns_iterative::types::RData;
    /// use std::net::Ipv4Addr;
    ///
    /// let rdata = RData::A(Ipv4Addr::new(192, 5, 6, 30));
    /// assert_eq!(rdata.as_a(), Some(Ipv4Addr::new(192, 5, 6, 30)));
    /// ```
    pub fn as_a(&self) -> Option<Ipv4Addr> {
        if let RData::A(ip) = self {
            Some(*ip)
        } else {
            None
        }
    }

    /// Returns the contained domain name if the record is an `NS` (name server) record.
    ///
    /// # Examples
    ///
    /// ```
    /// use dns_iterative::types::RData;
    ///
    /// let rdata = RData::NS("a.gtld-servers.net".into());
    /// assert_eq!(rdata.as_ns(), Some("a.gtld-servers.net"));
    /// ```
    pub fn as_ns(&self) -> Option<&str> {
        if let RData::NS(name) = self {
            Some(name)
        } else {
            None
        }
    }
}

/// A resource record.
///
/// Used for the answer, authority, and additional sections alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Domain name this record pertains to.
    pub name: String,
    /// Type of the record.
    pub rtype: u16,
    /// Class of the record.
    pub rclass: u16,
    /// Time to live (in seconds).
    pub ttl: u32,
    /// Length of the resource data as declared on the wire.
    pub length: u16,
    /// Resource data payload.
    pub rdata: RData,
}

/// A parsed DNS message.
///
/// Contains the header, question, answer, authority, and additional sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// DNS message header.
    pub header: Header,
    /// Vector of question records.
    pub questions: Vec<Question>,
    /// Vector of answer records.
    pub answers: Vec<Record>,
    /// Vector of authority records.
    pub authorities: Vec<Record>,
    /// Vector of additional records.
    pub additionals: Vec<Record>,
}

/// A read-only view over a DNS message with an explicit read offset.
///
/// Compression pointers are resolved against `data`, so the whole message
/// must be held here, not just the part still to be read.
#[derive(Debug, Clone, Copy)]
pub struct DnsReadBuffer<'a> {
    /// Underlying data slice to read from.
    pub data: &'a [u8],
    /// Current read offset index into `data`.
    pub index: usize,
}

/// A write-only buffer for constructing DNS messages.
#[derive(Debug, Default)]
pub struct DnsWriteBuffer {
    /// Internal data buffer.
    pub data: Vec<u8>,
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    {:<7}= {}", "qr",     self.qr)?;
        writeln!(f, "    {:<7}= {}", "opcode", self.opcode)?;
        writeln!(f, "    {:<7}= {}", "aa",     self.aa)?;
        writeln!(f, "    {:<7}= {}", "tc",     self.tc)?;
        writeln!(f, "    {:<7}= {}", "rd",     self.rd)?;
        writeln!(f, "    {:<7}= {}", "ra",     self.ra)?;
        writeln!(f, "    {:<7}= {}", "z",      self.z)?;
        writeln!(f, "    {:<7}= {}", "rcode",  self.rcode)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Header:")?;
        writeln!(f, "  {:<9}= 0x{:04X} ({})", "id", self.id, self.id)?;
        writeln!(f, "  flags")?;
        write!(f, "{}", self.flags)?;
        writeln!(f, "  {:<9}= {}", "qd_count", self.qd_count)?;
        writeln!(f, "  {:<9}= {}", "an_count", self.an_count)?;
        writeln!(f, "  {:<9}= {}", "ns_count", self.ns_count)?;
        writeln!(f, "  {:<9}= {}", "ar_count", self.ar_count)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  - {:<7}= {}", "qname",  self.qname)?;
        writeln!(f, "    {:<7}= {}", "qtype",  self.qtype)?;
        writeln!(f, "    {:<7}= {}", "qclass", self.qclass)
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(ip)    => write!(f, "{}", ip),
            RData::NS(name) => write!(f, "{}", name),
            RData::Other(bytes) if bytes.is_empty() => write!(f, "<empty>"),
            RData::Other(bytes) => {
                for (i, byte) in bytes.iter().enumerate() {
                    if i > 0 && i % 16 == 0 {
                        writeln!(f)?;
                        write!(f, "              ")?; // Align continuation lines
                    }
                    write!(f, "{:02X} ", byte)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  - {:<7}= {}", "name",     self.name)?;
        writeln!(f, "    {:<7}= {}", "type",     self.rtype)?;
        writeln!(f, "    {:<7}= {}", "class",    self.rclass)?;
        writeln!(f, "    {:<7}= {}", "ttl",      self.ttl)?;
        writeln!(f, "    {:<7}= {}", "rdlength", self.length)?;
        writeln!(f, "    {:<7}= {}", "rdata",    self.rdata)
    }
}

fn fmt_section(f: &mut fmt::Formatter<'_>, title: &str, records: &[Record]) -> fmt::Result {
    writeln!(f, "{}:", title)?;
    if records.is_empty() {
        return writeln!(f, "  <none>");
    }
    for r in records {
        write!(f, "{}", r)?;
    }
    Ok(())
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        writeln!(f, "Questions:")?;
        if self.questions.is_empty() {
            writeln!(f, "  <none>")?;
        } else {
            for q in &self.questions {
                write!(f, "{}", q)?;
            }
        }
        fmt_section(f, "Answers",     &self.answers)?;
        fmt_section(f, "Authorities", &self.authorities)?;
        fmt_section(f, "Additionals", &self.additionals)
    }
}
