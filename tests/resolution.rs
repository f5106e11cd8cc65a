mod helpers;

use dns_iterative::{
    BufferError, DnsError, Record, Resolver, ResolverConfig, SequentialIds, Type,
};
use helpers::{a, ns, soa, ScriptedTransport, GTLD, ROOT};
use rstest::rstest;
use std::net::Ipv4Addr;

const EXAMPLE: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

fn resolver(transport: ScriptedTransport) -> Resolver<ScriptedTransport, SequentialIds> {
    resolver_with(transport, ResolverConfig::default())
}

fn resolver_with(
    transport: ScriptedTransport,
    config:    ResolverConfig,
) -> Resolver<ScriptedTransport, SequentialIds> {
    Resolver::with_ids(transport, SequentialIds::starting_at(0x1000), config)
}

fn call(server: Ipv4Addr, name: &str) -> (Ipv4Addr, String) {
    (server, name.to_string())
}

#[tokio::test]
async fn answer_ends_resolution_at_once() {
    let r = resolver(ScriptedTransport::new().answer(ROOT, "example.com", EXAMPLE));

    let ip = r.resolve("example.com", ROOT, Type::A as u16).await.unwrap();

    assert_eq!(ip.to_string(), "93.184.216.34");
    assert_eq!(r.transport().calls(), vec![call(ROOT, "example.com")]);
}

#[tokio::test]
async fn glue_is_preferred_over_nameserver_lookup() {
    let transport = ScriptedTransport::new()
        .reply(
            ROOT,
            "example.com",
            vec![],
            vec![ns("com", "a.gtld-servers.net")],
            vec![a("a.gtld-servers.net", GTLD)],
        )
        .answer(GTLD, "example.com", EXAMPLE);
    let r = resolver(transport);

    let ip = r.resolve("example.com", ROOT, Type::A as u16).await.unwrap();

    assert_eq!(ip, EXAMPLE);
    assert_eq!(
        r.transport().calls(),
        vec![call(ROOT, "example.com"), call(GTLD, "example.com")]
    );
}

#[tokio::test]
async fn missing_glue_resolves_nameserver_from_same_server() {
    let transport = ScriptedTransport::new()
        .reply(ROOT, "example.com", vec![], vec![ns("com", "a.gtld-servers.net")], vec![])
        .answer(ROOT, "a.gtld-servers.net", GTLD)
        .answer(GTLD, "example.com", EXAMPLE);
    let r = resolver(transport);

    let ip = r.resolve("example.com", ROOT, Type::A as u16).await.unwrap();

    assert_eq!(ip, EXAMPLE);
    assert_eq!(
        r.transport().calls(),
        vec![
            call(ROOT, "example.com"),
            call(ROOT, "a.gtld-servers.net"),
            call(GTLD, "example.com"),
        ]
    );
}

#[tokio::test]
async fn nested_lookup_starts_from_current_server_not_root() {
    let ns1 = Ipv4Addr::new(10, 1, 1, 1);
    let transport = ScriptedTransport::new()
        .reply(
            ROOT,
            "example.com",
            vec![],
            vec![ns("com", "a.gtld-servers.net")],
            vec![a("a.gtld-servers.net", GTLD)],
        )
        .reply(GTLD, "example.com", vec![], vec![ns("example.com", "ns1.example.net")], vec![])
        .answer(GTLD, "ns1.example.net", ns1)
        .answer(ns1, "example.com", EXAMPLE);
    let r = resolver(transport);

    let ip = r.resolve("example.com", ROOT, Type::A as u16).await.unwrap();

    assert_eq!(ip, EXAMPLE);
    assert_eq!(
        r.transport().calls(),
        vec![
            call(ROOT, "example.com"),
            call(GTLD, "example.com"),
            call(GTLD, "ns1.example.net"),
            call(ns1, "example.com"),
        ]
    );
}

#[rstest]
#[case::empty_reply(vec![])]
#[case::soa_only(vec![soa("example.com")])]
#[tokio::test]
async fn reply_without_a_way_forward_is_unresolvable(#[case] authorities: Vec<Record>) {
    let r = resolver(ScriptedTransport::new().reply(ROOT, "example.com", vec![], authorities, vec![]));

    let err = r.resolve("example.com", ROOT, Type::A as u16).await.unwrap_err();

    match err {
        DnsError::Unresolvable { name, server } => {
            assert_eq!(name, "example.com");
            assert_eq!(server, ROOT);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(r.transport().calls().len(), 1);
}

#[tokio::test]
async fn failed_nameserver_lookup_aborts_outer_resolution() {
    let transport = ScriptedTransport::new()
        .reply(ROOT, "example.com", vec![], vec![ns("com", "a.gtld-servers.net")], vec![])
        .reply(ROOT, "a.gtld-servers.net", vec![], vec![], vec![]);
    let r = resolver(transport);

    let err = r.resolve("example.com", ROOT, Type::A as u16).await.unwrap_err();

    assert!(matches!(err, DnsError::Unresolvable { ref name, .. } if name == "a.gtld-servers.net"));
}

#[tokio::test]
async fn glue_cycle_is_a_referral_loop() {
    let other = Ipv4Addr::new(10, 0, 0, 1);
    let transport = ScriptedTransport::new()
        .reply(ROOT, "example.com", vec![], vec![], vec![a("x.example", other)])
        .reply(other, "example.com", vec![], vec![], vec![a("root.example", ROOT)]);
    let r = resolver(transport);

    let err = r.resolve("example.com", ROOT, Type::A as u16).await.unwrap_err();

    match err {
        DnsError::ReferralLoop { name, server } => {
            assert_eq!(name, "example.com");
            assert_eq!(server, ROOT);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(r.transport().calls().len(), 2);
}

#[tokio::test]
async fn hop_budget_is_enforced() {
    let hop = |n: u8| Ipv4Addr::new(10, 0, 0, n);
    let transport = ScriptedTransport::new()
        .reply(ROOT, "example.com", vec![], vec![], vec![a("n1", hop(1))])
        .reply(hop(1), "example.com", vec![], vec![], vec![a("n2", hop(2))])
        .reply(hop(2), "example.com", vec![], vec![], vec![a("n3", hop(3))])
        .answer(hop(3), "example.com", EXAMPLE);
    let config = ResolverConfig { max_hops: 3, ..ResolverConfig::default() };
    let r = resolver_with(transport, config);

    let err = r.resolve("example.com", ROOT, Type::A as u16).await.unwrap_err();

    assert!(matches!(err, DnsError::TooManyHops { hops: 3, .. }));
    assert_eq!(r.transport().calls().len(), 3);
}

#[tokio::test]
async fn nameserver_lookups_cannot_nest_forever() {
    let mut transport = ScriptedTransport::new()
        .reply(ROOT, "example.com", vec![], vec![ns("com", "ns0.test")], vec![]);
    for i in 0..10 {
        let zone = format!("ns{}.test", i);
        let next = format!("ns{}.test", i + 1);
        transport = transport.reply(ROOT, &zone, vec![], vec![ns("test", &next)], vec![]);
    }
    let config = ResolverConfig { max_depth: 3, ..ResolverConfig::default() };
    let r = resolver_with(transport, config);

    let err = r.resolve("example.com", ROOT, Type::A as u16).await.unwrap_err();

    assert!(matches!(err, DnsError::TooDeep { depth: 3, .. }));
    // example.com plus ns0..ns2; ns3 is refused before it is sent
    assert_eq!(r.transport().calls().len(), 4);
}

#[tokio::test]
async fn reply_ids_are_ignored_by_default() {
    let r = resolver(ScriptedTransport::new().skew_ids().answer(ROOT, "example.com", EXAMPLE));

    assert_eq!(r.resolve("example.com", ROOT, Type::A as u16).await.unwrap(), EXAMPLE);
}

#[tokio::test]
async fn strict_ids_reject_mismatched_reply() {
    let transport = ScriptedTransport::new().skew_ids().answer(ROOT, "example.com", EXAMPLE);
    let config = ResolverConfig { strict_ids: true, ..ResolverConfig::default() };
    let r = resolver_with(transport, config);

    let err = r.resolve("example.com", ROOT, Type::A as u16).await.unwrap_err();

    assert!(matches!(err, DnsError::IdMismatch { expected: 0x1000, received: 0x1001 }));
}

#[tokio::test]
async fn strict_ids_accept_matching_reply() {
    let transport = ScriptedTransport::new().answer(ROOT, "example.com", EXAMPLE);
    let config = ResolverConfig { strict_ids: true, ..ResolverConfig::default() };
    let r = resolver_with(transport, config);

    assert_eq!(r.resolve("example.com", ROOT, Type::A as u16).await.unwrap(), EXAMPLE);
}

#[tokio::test]
async fn truncated_reply_aborts() {
    let mut bytes = vec![0x10, 0x00, 0x84, 0x00, 0, 0, 0, 1, 0, 0, 0, 0];
    // answer record cut off inside its type field
    bytes.extend_from_slice(b"\x07example\x03com\x00\x00");
    let r = resolver(ScriptedTransport::new().raw(ROOT, "example.com", bytes));

    let err = r.resolve("example.com", ROOT, Type::A as u16).await.unwrap_err();

    assert!(matches!(err, DnsError::Buffer(BufferError::EndOfBuffer(_))));
}

#[tokio::test]
async fn transport_failure_aborts() {
    let r = resolver(ScriptedTransport::new());

    let err = r.resolve("example.com", ROOT, Type::A as u16).await.unwrap_err();

    assert!(matches!(err, DnsError::Transport { server, .. } if server == ROOT));
}

#[tokio::test]
async fn invalid_name_is_rejected_before_sending() {
    let r = resolver(ScriptedTransport::new());
    let name = format!("{}.com", "a".repeat(64));

    let err = r.resolve(&name, ROOT, Type::A as u16).await.unwrap_err();

    assert!(matches!(err, DnsError::Buffer(BufferError::LabelTooLong(_))));
    assert!(r.transport().calls().is_empty());
}

#[tokio::test]
async fn compressed_referral_from_the_wire() {
    // Header: id, flags, 1 question, 0 answers, 1 authority, 1 additional
    let mut bytes = vec![0x00, 0x00, 0x80, 0x00, 0, 1, 0, 0, 0, 1, 0, 1];

    let com = bytes.len() + 4 + 8;
    bytes.extend_from_slice(b"\x03www\x07example\x03com\x00");
    bytes.extend_from_slice(&[0, 1, 0, 1]);

    // com NS a.gtld-servers.net, owner compressed to the question's "com"
    bytes.extend_from_slice(&[0xC0, com as u8, 0, 2, 0, 1, 0, 2, 0xA3, 0x00]);
    let host = b"\x01a\x0cgtld-servers\x03net\x00";
    bytes.extend_from_slice(&[0, host.len() as u8]);
    let host_at = bytes.len();
    bytes.extend_from_slice(host);

    // glue owner compressed to the NS rdata
    bytes.extend_from_slice(&[0xC0, host_at as u8, 0, 1, 0, 1, 0, 2, 0xA3, 0x00, 0, 4]);
    bytes.extend_from_slice(&GTLD.octets());

    let transport = ScriptedTransport::new()
        .raw(ROOT, "www.example.com", bytes)
        .answer(GTLD, "www.example.com", EXAMPLE);
    let r = resolver(transport);

    let reply = r.query("www.example.com", ROOT, Type::A as u16).await.unwrap();
    assert_eq!(reply.authorities[0].name, "com");
    assert_eq!(reply.authorities[0].rdata.as_ns(), Some("a.gtld-servers.net"));
    assert_eq!(reply.additionals[0].name, "a.gtld-servers.net");

    let ip = r.resolve("www.example.com", ROOT, Type::A as u16).await.unwrap();
    assert_eq!(ip, EXAMPLE);
}
