use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HTTP API until SIGINT or SIGTERM
    Serve {
        #[arg(long, help = "Port to listen on, overrides PORT")]
        port: Option<u16>,
    },
    /// Replace a single day, yesterday by default
    Run {
        #[arg(long, help = "Date as YYYY-MM-DD or an RFC 3339 timestamp")]
        date: Option<String>,

        #[arg(
            long,
            help = "If specified, writes the JSON result to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Replace every day of an inclusive range
    Batch {
        #[arg(long, help = "First day of the range, YYYY-MM-DD")]
        start_date: String,

        #[arg(long, help = "Last day of the range, defaults to the first")]
        end_date: Option<String>,

        #[arg(
            long,
            help = "If specified, writes the JSON result to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Replace one explicitly named day
    Reprocess {
        #[arg(long, help = "Day to rebuild, YYYY-MM-DD")]
        date: String,

        #[arg(
            long,
            help = "If specified, writes the JSON result to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Print the DDL for the destination table
    Ddl,
}
