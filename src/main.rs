#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    cardcraft_server::run().await?;
    Ok(())
}
