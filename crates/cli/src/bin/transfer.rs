//! transfer - copy one local file to a local path or an S3 key

use clap::Parser;
use objmove::commands::transfer::{self, TransferCli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = TransferCli::parse();
    if let Err(e) = objmove::init_tracing(cli.global.debug) {
        eprintln!("{e:#}");
    }

    let exit_code = transfer::execute(cli).await;
    std::process::exit(exit_code.as_i32());
}
