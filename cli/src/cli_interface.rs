use clap::{Args, Parser};
use ribsink::AddressFamily;

#[allow(clippy::upper_case_acronyms)]
#[derive(Parser, Debug)]
#[clap(name = "ribsink", about, version)]
pub struct CLI {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// The address family of the records: `evpn` or `l3vpn`.
    #[clap(long, short)]
    pub family: AddressFamily,

    /// optional - A JSON file holding an array of records, default reads stdin.
    #[clap(long, short)]
    pub input: Option<String>,

    /// optional - Splits the batch into statements of about this many rows, overriding
    /// `batch.max_rows` from ribsink.yaml.
    #[clap(long)]
    pub max_rows: Option<usize>,

    /// optional - The path holding ribsink.yaml and .env, default will be where the command is run.
    #[clap(long, short)]
    pub path: Option<String>,
}

#[derive(Parser, Debug)]
#[clap(about = "Bulk upsert statements for EVPN and L3VPN RIB records", long_about = None)]
pub enum Commands {
    /// Prints the fixed statement text for an address family.
    ///
    /// The VALUES list is shown as `<values>`.
    ///
    /// Example:
    /// `ribsink template --family evpn`
    #[clap(name = "template")]
    Template {
        #[clap(long, short)]
        family: AddressFamily,

        /// optional - The path holding ribsink.yaml, default will be where the command is run.
        #[clap(long, short)]
        path: Option<String>,
    },

    /// Encodes a batch of records and prints the resulting statements.
    ///
    /// Nothing is written to the database.
    ///
    /// Example:
    /// `ribsink render --family l3vpn --input routes.json`
    #[clap(name = "render")]
    Render {
        #[clap(flatten)]
        batch: BatchArgs,

        /// optional - Writes the statements to this file instead of stdout.
        #[clap(long, short)]
        output: Option<String>,
    },

    /// Encodes a batch of records and runs the statements against Postgres.
    ///
    /// The connection string is read from `DATABASE_URL`.
    ///
    /// Example:
    /// `ribsink apply --family evpn --input routes.json`
    #[clap(name = "apply")]
    Apply {
        #[clap(flatten)]
        batch: BatchArgs,
    },
}
