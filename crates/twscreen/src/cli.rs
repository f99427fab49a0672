use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing.
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild the security code → name mapping from the TWSE ISIN
    /// directory pages.
    Mapping,

    /// Screen for securities at or above an RS rank threshold and join
    /// them against the mapping.
    Screen {
        /// Lookback window in weeks; prompted for when omitted.
        #[arg(short, long)]
        weeks: Option<u32>,

        /// Minimum RS rank; prompted for when omitted.
        #[arg(short, long)]
        min_rank: Option<i32>,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}
