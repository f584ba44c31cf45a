use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vswitch_cli::{arp_request_frame, describe, parse_frame, Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.codec_config();
    debug!(options = %config.options, max_vlan_depth = config.max_vlan_depth, "codec config");

    match &cli.command {
        Commands::Decode { frame } => {
            let bytes = parse_frame(frame)?;
            info!(len = bytes.len(), "decoding frame");
            println!("{}", describe(&bytes, &config)?);
        }
        Commands::ArpRequest {
            sender_mac,
            sender_ip,
            target_ip,
        } => {
            let frame = arp_request_frame(*sender_mac, *sender_ip, *target_ip)?;
            info!(%sender_ip, %target_ip, "built ARP request");
            println!("{}", hex::encode(&frame));
        }
    }

    Ok(())
}
