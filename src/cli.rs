use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "coursegrab", about = "Automated course registration for the VNU portal")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Keep running registration rounds until every desired course is secured
    Run {
        /// Delay between rounds in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Course codes (comma-separated), overriding the config file
        #[arg(long)]
        courses: Option<String>,
    },
    /// One read-only pass: report where each desired course stands
    Probe,
}
