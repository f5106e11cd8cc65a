#![allow(dead_code)]

use async_trait::async_trait;
use dns_iterative::{DnsError, Message, RData, Record, Transport};
use std::collections::HashMap;
use std::io;
use std::net::Ipv4Addr;
use std::sync::Mutex;

pub const ROOT: Ipv4Addr = Ipv4Addr::new(198, 41, 0, 4);
pub const GTLD: Ipv4Addr = Ipv4Addr::new(192, 5, 6, 30);

pub fn a(name: &str, ip: Ipv4Addr) -> Record {
    Record::new(name, RData::A(ip))
}

pub fn ns(zone: &str, host: &str) -> Record {
    Record::new(zone, RData::NS(host.to_string()))
}

pub fn soa(zone: &str) -> Record {
    Record::with_type(zone, 6, RData::Other(vec![0; 22]))
}

/// What a scripted nameserver sends back.
pub enum Reply {
    Sections {
        answers:     Vec<Record>,
        authorities: Vec<Record>,
        additionals: Vec<Record>,
    },
    Raw(Vec<u8>),
}

/// In-memory nameservers keyed by address and queried name.
#[derive(Default)]
pub struct ScriptedTransport {
    replies:  HashMap<(Ipv4Addr, String), Reply>,
    calls:    Mutex<Vec<(Ipv4Addr, String)>>,
    skew_ids: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies carry an id one higher than the query's.
    pub fn skew_ids(mut self) -> Self {
        self.skew_ids = true;
        self
    }

    pub fn answer(self, server: Ipv4Addr, name: &str, ip: Ipv4Addr) -> Self {
        self.reply(server, name, vec![a(name, ip)], vec![], vec![])
    }

    pub fn reply(
        mut self,
        server:      Ipv4Addr,
        name:        &str,
        answers:     Vec<Record>,
        authorities: Vec<Record>,
        additionals: Vec<Record>,
    ) -> Self {
        self.replies.insert(
            (server, name.to_string()),
            Reply::Sections { answers, authorities, additionals },
        );
        self
    }

    pub fn raw(mut self, server: Ipv4Addr, name: &str, bytes: Vec<u8>) -> Self {
        self.replies.insert((server, name.to_string()), Reply::Raw(bytes));
        self
    }

    pub fn calls(&self) -> Vec<(Ipv4Addr, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn exchange(&self, server: Ipv4Addr, query: &[u8]) -> Result<Vec<u8>, DnsError> {
        let query = Message::decode(query)?;
        let qname = query.questions[0].qname.clone();
        self.calls.lock().unwrap().push((server, qname.clone()));

        match self.replies.get(&(server, qname)) {
            Some(Reply::Raw(bytes)) => Ok(bytes.clone()),
            Some(Reply::Sections { answers, authorities, additionals }) => {
                let mut reply = Message::reply_to(&query);
                if self.skew_ids {
                    reply.header.id = reply.header.id.wrapping_add(1);
                }
                answers.iter().cloned().for_each(|r| reply.add_answer(r));
                authorities.iter().cloned().for_each(|r| reply.add_authority(r));
                additionals.iter().cloned().for_each(|r| reply.add_additional(r));
                Ok(reply.encode()?)
            }
            None => Err(DnsError::Transport {
                server,
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "no such nameserver"),
            }),
        }
    }
}
