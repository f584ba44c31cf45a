//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::net::Ipv4Addr;
use vswitch_core::{CodecConfig, OptionsPolicy};
use vswitch_packet::MacAddress;

#[derive(Parser, Debug)]
#[command(name = "vswitch-dissect")]
#[command(version, about = "Decode and build virtual switch frames", long_about = None)]
pub struct Cli {
    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Fail on IPv4 and TCP headers that carry options instead of skipping them
    #[arg(long, global = true)]
    pub reject_options: bool,

    /// Maximum number of stacked 802.1Q tags accepted while decoding
    #[arg(long, value_name = "N", default_value_t = CodecConfig::DEFAULT_MAX_VLAN_DEPTH, global = true)]
    pub max_vlan_depth: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a hex-encoded Ethernet frame and print every layer
    Decode {
        /// Frame bytes as hex; whitespace and ':' separators are ignored
        #[arg(value_name = "HEX")]
        frame: String,
    },

    /// Print a broadcast ARP request frame as hex
    ArpRequest {
        /// Sender hardware address
        #[arg(long, value_name = "MAC", default_value_t = MacAddress::DEFAULT)]
        sender_mac: MacAddress,

        /// Sender protocol address
        #[arg(long, value_name = "IP")]
        sender_ip: Ipv4Addr,

        /// Address being resolved
        #[arg(long, value_name = "IP")]
        target_ip: Ipv4Addr,
    },
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Codec settings selected by the global flags
    pub fn codec_config(&self) -> CodecConfig {
        let options = if self.reject_options {
            OptionsPolicy::Reject
        } else {
            OptionsPolicy::Ignore
        };
        CodecConfig::new()
            .with_options_policy(options)
            .with_max_vlan_depth(self.max_vlan_depth)
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
