use user_service::service_entrypoint;

#[ntex::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    service_entrypoint().await?;
    Ok(())
}
