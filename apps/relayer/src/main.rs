#[tokio::main]
async fn main() -> eyre::Result<()> {
    relayer::run().await
}
