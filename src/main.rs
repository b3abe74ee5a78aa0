use clap::Parser;
use submit_invoice::utils::logger;
use submit_invoice::{app::runner, CliArgs, InvoiceAnalyzer, InvoicePipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    // 先載入 .env，已存在的環境變數優先
    let _ = dotenvy::dotenv();
    logger::init_cli_logger();

    tracing::info!("Starting submit-invoice");

    let pipeline = InvoicePipeline::new(InvoiceAnalyzer::from_env());
    let code = runner::run(&pipeline, &args.invoice_file, &mut std::io::stdout()).await;

    if code != 0 {
        std::process::exit(code);
    }
}
