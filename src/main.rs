#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pje_automation::cli::run().await
}
