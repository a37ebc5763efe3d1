use robotrader::{config::AppConfig, db::{connect_with_retry, run_migrations}};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = connect_with_retry(&config).await?;
    run_migrations(&orm).await?;
    println!("Migrations applied");
    Ok(())
}
