use clap::Parser;
use dns_iterative::{
    config::{ResolverConfig, TransportConfig, DNS_PORT, MAX_DEPTH, MAX_HOPS, RECV_BUFFER},
    logging::init_logging,
    RandomIds, Resolver, Type, UdpTransport,
};
use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "mydns")]
#[command(version)]
#[command(about = "Resolve a domain name by walking referrals from a starting nameserver")]
struct Cli {
    /// Domain name to resolve
    domain_name: String,

    /// Address of the first nameserver to ask, usually a root server
    root_dns_ip: Ipv4Addr,

    /// Destination port on every nameserver
    #[arg(long, default_value_t = DNS_PORT)]
    port: u16,

    /// Queries allowed per resolution level
    #[arg(long, default_value_t = MAX_HOPS)]
    max_hops: usize,

    /// Nesting allowed for nameserver lookups
    #[arg(long, default_value_t = MAX_DEPTH)]
    max_depth: usize,

    /// Reject replies whose id does not match the query
    #[arg(long)]
    strict_ids: bool,

    /// Give up on a nameserver after this many milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Largest reply accepted, in bytes
    #[arg(long, default_value_t = RECV_BUFFER)]
    recv_buffer: usize,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides it
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    /*
     * Build the transport and the resolver from the command line, then
     * walk the referral chain from the given server
     */

    let transport = UdpTransport::new(TransportConfig {
        port:        cli.port,
        recv_buffer: cli.recv_buffer,
        timeout:     cli.timeout_ms.map(Duration::from_millis),
    });
    let config = ResolverConfig {
        max_hops:   cli.max_hops,
        max_depth:  cli.max_depth,
        strict_ids: cli.strict_ids,
    };
    let resolver = Resolver::with_ids(transport, RandomIds, config);

    match resolver.resolve(&cli.domain_name, cli.root_dns_ip, Type::A as u16).await {
        Ok(ip) => {
            println!("{}", ip);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("mydns: {}", e);
            ExitCode::FAILURE
        }
    }
}
