use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "submit-invoice")]
#[command(about = "Submit an invoice file to Azure Document Intelligence (prebuilt-invoice)")]
pub struct CliArgs {
    #[arg(value_name = "INVOICE_FILE", help = "Path to PDF/image invoice file")]
    pub invoice_file: PathBuf,
}
