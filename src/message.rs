use crate::{
    buffer::split_labels,
    error::BufferError,
    types::{
        CLASS_IN,
        DnsReadBuffer,
        DnsWriteBuffer,
        Flags,
        Header,
        Message,
        Question,
        RData,
        Record,
        Type,
    },
};
use std::net::Ipv4Addr;

impl Flags {
    /// Encodes DNS flags into a 16-bit integer.
    pub fn to_u16(&self) -> u16 {
        ((self.qr as u16) << 15)
            | (((self.opcode & 0x0F) as u16) << 11)
            | ((self.aa as u16) << 10)
            | ((self.tc as u16) << 9)
            | ((self.rd as u16) << 8)
            | ((self.ra as u16) << 7)
            | (((self.z & 0x07) as u16) << 4)
            | ((self.rcode & 0x0F) as u16)
    }

    /// Decodes a 16-bit integer into DNS flags.
    pub fn from_u16(raw: u16) -> Flags {
        Flags {
            qr:     (raw & 0x8000) != 0,
            opcode: ((raw & 0x7800) >> 11) as u8,
            aa:     (raw & 0x0400) != 0,
            tc:     (raw & 0x0200) != 0,
            rd:     (raw & 0x0100) != 0,
            ra:     (raw & 0x0080) != 0,
            z:      ((raw & 0x0070) >> 4) as u8,
            rcode:  (raw & 0x000F) as u8,
        }
    }
}

impl Message {
    /// Decodes a resource data section based on type and length.
    fn decode_rdata(
        buf:    &mut DnsReadBuffer,
        rtype:  u16,
        length: u16)
    -> Result<RData, BufferError> {
        match Type::from_u16(rtype) {
            Some(Type::A) => {
                if length != 4 {
                    return Err(BufferError::InvalidAddressLength(length));
                }
                let raw = buf.read_n_bytes(4)?;
                Ok(RData::A(Ipv4Addr::new(
                    raw[0],
                    raw[1],
                    raw[2],
                    raw[3])))
            }
            Some(Type::NS) => {
                let end  = buf.get_index() + length as usize;
                let name = buf.read_str()?;
                if buf.get_index() > end {
                    return Err(BufferError::RDataOverrun(length));
                }
                // Skip whatever follows the name inside the rdata so the
                // next record starts where the length says it does
                buf.set_index(end)?;
                Ok(RData::NS(name))
            }
            None => {
                let raw = buf.read_n_bytes(length as usize)?;
                Ok(RData::Other(raw.to_vec()))
            }
        }
    }

    /// Decodes a list of question entries from the buffer.
    fn decode_questions(
        buf:   &mut DnsReadBuffer,
        count: u16)
    -> Result<Vec<Question>, BufferError> {
        let mut questions = Vec::with_capacity((count as usize).min(64));
        for _ in 0..count {
            let qname  = buf.read_str()?;
            let qtype  = buf.read_u16()?;
            let qclass = buf.read_u16()?;
            questions.push(Question { qname, qtype, qclass });
        }
        Ok(questions)
    }

    /// Decodes a list of answer, authority or additional records.
    fn decode_records(
        buf:   &mut DnsReadBuffer,
        count: u16)
    -> Result<Vec<Record>, BufferError> {
        // Cap the reservation: the count is untrusted until the records parse
        let mut records = Vec::with_capacity((count as usize).min(64));
        for _ in 0..count {
            let name   = buf.read_str()?;
            let rtype  = buf.read_u16()?;
            let rclass = buf.read_u16()?;
            let ttl    = buf.read_u32()?;
            let length = buf.read_u16()?;
            let rdata  = Self::decode_rdata(buf, rtype, length)?;

            records.push(Record {
                name, rtype, rclass, ttl, length, rdata,
            });
        }
        Ok(records)
    }

    /// Encodes a list of answer, authority, or additional records.
    fn encode_records(
        buffer:  &mut DnsWriteBuffer,
        records: &[Record],
    ) -> Result<(), BufferError> {
        for r in records {
            buffer.write_str(&r.name)?;
            buffer.write_u16(r.rtype);
            buffer.write_u16(r.rclass);
            buffer.write_u32(r.ttl);

            let raw = Self::encode_rdata(&r.rdata)?;
            buffer.write_u16(raw.len() as u16);
            buffer.write_bytes(&raw);
        }
        Ok(())
    }

    /// Encodes a single RData into bytes for writing.
    fn encode_rdata(rdata: &RData) -> Result<Vec<u8>, BufferError> {
        let mut buf = DnsWriteBuffer::new();

        match rdata {
            RData::A(ipv4)   => buf.write_bytes(&ipv4.octets()),
            RData::NS(name)  => buf.write_str(name)?,
            RData::Other(data) => buf.write_bytes(data),
        }

        Ok(buf.into_inner())
    }

    /// Decodes a full DNS message from raw bytes.
    ///
    /// Reads exactly as many questions and records as the header announces.
    /// A header that overstates its counts fails with
    /// [`BufferError::EndOfBuffer`] rather than returning a partial message.
    pub fn decode(data: &[u8]) -> Result<Message, BufferError> {
        Self::decode_from(&mut DnsReadBuffer::new(data))
    }

    /// Decodes a full DNS message starting at the buffer's current index.
    pub fn decode_from(buf: &mut DnsReadBuffer) -> Result<Message, BufferError> {
        let id        = buf.read_u16()?;
        let flags_raw = buf.read_u16()?;
        let qd_count  = buf.read_u16()?;
        let an_count  = buf.read_u16()?;
        let ns_count  = buf.read_u16()?;
        let ar_count  = buf.read_u16()?;

        let flags       = Flags::from_u16(flags_raw);
        let questions   = Self::decode_questions(buf, qd_count)?;
        let answers     = Self::decode_records(buf, an_count)?;
        let authorities = Self::decode_records(buf, ns_count)?;
        let additionals = Self::decode_records(buf, ar_count)?;

        Ok(Message {
            header: Header {
                id,
                flags,
                qd_count,
                an_count,
                ns_count,
                ar_count,
            },
            questions,
            answers,
            authorities,
            additionals,
        })
    }

    /// Encodes this message into bytes suitable for transmission.
    ///
    /// The header counts are taken from the section lengths, so the encoded
    /// counts always match the entries that follow.
    pub fn encode(&self) -> Result<Vec<u8>, BufferError> {
        let mut buffer = DnsWriteBuffer::new();

        buffer.write_u16(self.header.id);
        buffer.write_u16(self.header.flags.to_u16());
        buffer.write_u16(self.questions.len() as u16);
        buffer.write_u16(self.answers.len() as u16);
        buffer.write_u16(self.authorities.len() as u16);
        buffer.write_u16(self.additionals.len() as u16);

        for q in &self.questions {
            buffer.write_str(&q.qname)?;
            buffer.write_u16(q.qtype);
            buffer.write_u16(q.qclass);
        }

        Self::encode_records(&mut buffer, &self.answers)?;
        Self::encode_records(&mut buffer, &self.authorities)?;
        Self::encode_records(&mut buffer, &self.additionals)?;

        Ok(buffer.into_inner())
    }

    /// Creates a query for `domain` with the given record type and id.
    ///
    /// Flags are all zero (no recursion desired) and the question is the
    /// only entry. The name is validated here so a bad name is rejected
    /// before anything is encoded.
    pub fn query(domain: &str, qtype: u16, id: u16) -> Result<Self, BufferError> {
        split_labels(domain)?;

        let mut message = Message {
            header: Header { id, ..Header::default() },
            ..Message::default()
        };
        message.add_question(Question::new(domain.to_string(), qtype, CLASS_IN));
        Ok(message)
    }

    /// Creates a response skeleton answering `query`.
    ///
    /// Copies the id and questions and sets the QR flag.
    pub fn reply_to(query: &Message) -> Self {
        let mut message = Message {
            header: Header {
                id: query.header.id,
                flags: Flags { qr: true, ..Flags::default() },
                ..Header::default()
            },
            ..Message::default()
        };
        for q in &query.questions {
            message.add_question(q.clone());
        }
        message
    }

    /// Add a question to the DNS message, updating the header count.
    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
        self.header.qd_count = self.questions.len() as u16;
    }

    /// Add an answer record, updating the header count.
    pub fn add_answer(&mut self, answer: Record) {
        self.answers.push(answer);
        self.header.an_count = self.answers.len() as u16;
    }

    /// Add an authority record, updating the header count.
    pub fn add_authority(&mut self, authority: Record) {
        self.authorities.push(authority);
        self.header.ns_count = self.authorities.len() as u16;
    }

    /// Add an additional record, updating the header count.
    pub fn add_additional(&mut self, additional: Record) {
        self.additionals.push(additional);
        self.header.ar_count = self.additionals.len() as u16;
    }
}

/// Encodes a query for `domain` in one step.
///
/// # Examples
///
/// ```
/// use dns_iterative::message::encode_query;
///
/// let bytes = encode_query("example.com", 1, 0x1234).unwrap();
/// assert_eq!(&bytes[..4], &[0x12, 0x34, 0x00, 0x00]);
/// assert_eq!(bytes.len(), 12 + 13 + 4);
/// ```
pub fn encode_query(domain: &str, qtype: u16, id: u16) -> Result<Vec<u8>, BufferError> {
    Message::query(domain, qtype, id)?.encode()
}

impl Question {
    /// Creates a new question with the given name, type, and class.
    pub fn new(qname: String, qtype: u16, qclass: u16) -> Self {
        Question { qname, qtype, qclass }
    }
}

impl Record {
    /// Creates a new IN record from rdata.
    ///
    /// `Other` data has no type of its own; use [`Record::with_type`] for it.
    pub fn new(name: impl Into<String>, rdata: RData) -> Self {
        let rtype = match &rdata {
            RData::A(_)     => Type::A  as u16,
            RData::NS(_)    => Type::NS as u16,
            RData::Other(_) => 0,
        };
        Self::with_type(name, rtype, rdata)
    }

    /// Creates a new IN record with an explicit type.
    pub fn with_type(name: impl Into<String>, rtype: u16, rdata: RData) -> Self {
        let length = match &rdata {
            RData::A(_)        => 4,
            RData::NS(name)    => split_labels(name)
                .map(|labels| labels.iter().map(|l| l.len() as u16 + 1).sum::<u16>() + 1)
                .unwrap_or(0),
            RData::Other(data) => data.len() as u16,
        };

        Record {
            name:   name.into(),
            rtype,
            rclass: CLASS_IN,
            ttl:    300,
            length,
            rdata,
        }
    }
}
