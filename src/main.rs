#[tokio::main]
async fn main() -> anyhow::Result<()> {
    calmora_lib::run().await
}
