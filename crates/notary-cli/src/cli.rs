use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "notary",
    about = "Tamper-evident custody ledger and citation service",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the ledger, keys, evidence, and audit files
    #[arg(short, long, global = true, default_value = ".")]
    pub dir: String,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a ledger directory and signing identity
    Init(InitArgs),
    /// Append a custody event to the ledger
    Record(RecordArgs),
    /// Show the custody ledger
    Log(LogArgs),
    /// Verify the full hash chain and every signature
    Verify(VerifyArgs),
    /// Hash, sign, chain, and store a citation for a document
    Cite(CiteArgs),
    /// Independently verify a citation receipt against a document
    VerifyCitation(VerifyCitationArgs),
}

#[derive(Args)]
pub struct InitArgs {}

#[derive(Args)]
pub struct RecordArgs {
    /// Event type, e.g. EVIDENCE_RECEIVED
    #[arg(short, long)]
    pub event_type: String,
    /// Acting identity recorded on the event
    #[arg(short, long)]
    pub actor: String,
    /// Payload entries as key=value, repeatable
    #[arg(long = "data", value_name = "KEY=VALUE")]
    pub data: Vec<String>,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
    #[arg(long)]
    pub oneline: bool,
}

#[derive(Args)]
pub struct VerifyArgs {}

#[derive(Args)]
pub struct CiteArgs {
    /// Path to the document to cite
    pub file: String,
    #[arg(long)]
    pub doc_type: String,
    #[arg(long)]
    pub subject: String,
    #[arg(long, default_value = "cli")]
    pub created_by: String,
    /// Metadata entries as key=value, repeatable
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,
}

#[derive(Args)]
pub struct VerifyCitationArgs {
    /// Path to the document to check
    pub file: String,
    /// Path to the citation receipt JSON
    #[arg(long)]
    pub citation: String,
    /// Public key PEM; defaults to the ledger directory's key
    #[arg(long)]
    pub key: Option<String>,
}
