use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Import delimited files into a table. Every file but the last is sent
    /// as a continued request against the same job.
    Import {
        #[arg(long, help = "Postgres connection string (falls back to CUBELOAD_DATABASE_URL)")]
        conn_str: Option<String>,

        #[arg(long, help = "Subscription id; names the target table")]
        subscription: String,

        #[arg(long = "file", required = true, num_args = 1.., help = "Input files, in order")]
        files: Vec<PathBuf>,

        #[command(flatten)]
        hints: HintArgs,

        #[command(flatten)]
        parse: ParseArgs,

        #[arg(
            long,
            help = "If specified, writes the import summary to this file instead of stdout"
        )]
        output: Option<PathBuf>,
    },
    /// Resolve a file's columns and preview its first row without touching a database
    Inspect {
        #[arg(long, help = "Input file")]
        file: PathBuf,

        #[command(flatten)]
        hints: HintArgs,

        #[command(flatten)]
        parse: ParseArgs,
    },
    /// Test a Postgres connection string
    TestConn {
        /// Connection string
        #[arg(long)]
        conn_str: String,
    },
}

/// Column metadata supplied by the caller, aligned to header order.
#[derive(Args, Debug, Default)]
pub struct HintArgs {
    #[arg(long, help = "Comma-separated column labels")]
    pub names: Option<String>,

    #[arg(long, help = "Comma-separated column types")]
    pub types: Option<String>,

    #[arg(long, help = "Comma-separated column descriptions")]
    pub descriptions: Option<String>,

    #[arg(
        long,
        help = "URL query string carrying names/types/descriptions; explicit flags win"
    )]
    pub query: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ParseArgs {
    #[arg(long, help = "Field delimiter(s); each character separates cells")]
    pub delimiter: Option<String>,

    #[arg(long, help = "Quote character")]
    pub quote: Option<char>,

    #[arg(long, help = "Load CUBELOAD_* settings from this .env file")]
    pub env_file: Option<PathBuf>,
}
