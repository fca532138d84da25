use anyhow::Result;
use blob_transfer::RequestContext;
use blob_transfer::cli::{Args, Runner};
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let runner = Runner::new(args);

    let shutdown = CancellationToken::new();
    let interrupt = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let ctx = RequestContext::with_cancellation(shutdown);

    runner.run(&ctx).await?;
    Ok(())
}
