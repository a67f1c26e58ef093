use clap::Parser;

use crate::network::types::SortMetric;

#[derive(Parser, Debug)]
#[command(
    name = "flowtop",
    version,
    about = "Live per-flow network traffic monitor with a top-10 terminal display"
)]
pub struct Cli {
    /// Network interface to capture on (interactive selection when omitted)
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Metric used to rank the displayed flows
    #[arg(short, long, value_enum, default_value_t = SortMetric::Bytes)]
    pub sort: SortMetric,

    /// Open the interface in promiscuous mode
    #[arg(long)]
    pub promiscuous: bool,
}
