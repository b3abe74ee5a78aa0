use clap::Parser;
use submit_invoice::utils::logger;
use submit_invoice::{app::runner, CliArgs, CosmosPersister, InvoiceAnalyzer, InvoicePipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    let _ = dotenvy::dotenv();
    logger::init_cli_logger();

    tracing::info!("Starting submit-invoice-cosmos");

    let pipeline = InvoicePipeline::new(InvoiceAnalyzer::from_env())
        .with_persister(CosmosPersister::from_env());
    let code = runner::run(&pipeline, &args.invoice_file, &mut std::io::stdout()).await;

    if code != 0 {
        std::process::exit(code);
    }
}
