mod cli;
mod screen;

// remote imports
use clap::Parser;
use cli::{Cli, TraceLevel};
use tracing::{subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;
use twscreen_spider as spider;

////////////////////////////////////////////////////////////////////////////

// set up the trace subscriber
fn preprocess(trace_level: Level) {
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber).expect("Set subscriber");
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env overrides for the output file paths
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // set the trace level
    if let Some(trace_level) = cli.trace {
        preprocess(match trace_level {
            TraceLevel::DEBUG => Level::DEBUG,
            TraceLevel::ERROR => Level::ERROR,
            TraceLevel::INFO => Level::INFO,
            TraceLevel::TRACE => Level::TRACE,
            TraceLevel::WARN => Level::WARN,
        });
    }
    trace!("command line input recorded: {cli:?}");

    // read cli inputs
    use cli::Commands::*;
    match cli.command {
        // `twscreen mapping`: rebuild the code → name lookup table
        Mapping => {
            let mapping = spider::mapping::scrape().await?;
            let path = spider::paths::mapping_file();
            mapping.save(&path).await?;
            println!("generated {path} with {} entries", mapping.len());
        }

        // `twscreen screen`: RS rank filter against the lookup table
        Screen { weeks, min_rank } => screen::run(weeks, min_rank).await?,
    }

    Ok(())
}
