use clap::Parser;
use framescope::config::OutputFormat;
use std::path::PathBuf;

/// framescope: decode Ethernet, IPv4 and TCP headers from live traffic
#[derive(Parser, Debug)]
#[command(name = "framescope", version, about)]
pub struct Cli {
    /// TOML config file; flags given here override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Network interface to capture on (e.g., "eth0").
    /// If not specified, the default interface is used.
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Read frames from a pcap savefile instead of a live interface
    #[arg(short, long, conflicts_with = "interface")]
    pub read: Option<PathBuf>,

    /// Maximum number of frames to capture (0 = unlimited)
    #[arg(short = 'c', long)]
    pub count: Option<u64>,

    /// Snapshot length (max bytes per frame to capture)
    #[arg(short, long)]
    pub snaplen: Option<i32>,

    /// Read timeout in milliseconds for the capture handle
    #[arg(short = 't', long)]
    pub timeout_ms: Option<i32>,

    /// Capture in promiscuous mode
    #[arg(long, conflicts_with = "no_promiscuous")]
    pub promiscuous: bool,

    /// Do not put the interface in promiscuous mode
    #[arg(long)]
    pub no_promiscuous: bool,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Append a hex dump of each frame to detail reports
    #[arg(long)]
    pub hex_dump: bool,

    /// Only print diagnostics and the final summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// List available network interfaces and exit
    #[arg(short, long)]
    pub list_interfaces: bool,
}
