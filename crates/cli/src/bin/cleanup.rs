//! cleanup - remove a directory tree, locally or under an S3 prefix

use clap::Parser;
use objmove::commands::cleanup::{self, CleanupCli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CleanupCli::parse();
    if let Err(e) = objmove::init_tracing(cli.global.debug) {
        eprintln!("{e:#}");
    }

    let exit_code = cleanup::execute(cli).await;
    std::process::exit(exit_code.as_i32());
}
