use sanctions_watch::cli;
use sanctions_watch::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    cli::Cli::run().await
}
