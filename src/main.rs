#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gemini_watermark_bot_lib::run().await
}
