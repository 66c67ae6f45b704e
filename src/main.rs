use clap::Parser;
use petstore_harness::core::scenario;
use petstore_harness::utils::{logger, validation::Validate};
use petstore_harness::{ApiClient, CliConfig, DataBuilder, PetStatus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting petstore-smoke");
    let config = cli.resolve()?;

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let client = ApiClient::from_config(&config)?;
    tracing::info!("Target API: {}", client.base_url());

    let pets = scenario::pet_lifecycle(
        &client,
        DataBuilder::new().with_pet("Fluffy", PetStatus::Available),
    )
    .await;

    let mut failed = false;
    match pets {
        Ok(run) => {
            println!(
                "✅ Pet lifecycle: created '{}' (id {:?}), now {}",
                run.created.name, run.fetched.id, run.fetched.status
            );
        }
        Err(e) => {
            failed = true;
            report_failure("Pet lifecycle", &e);
        }
    }

    if !cli.pets_only {
        match scenario::user_lifecycle(&client, DataBuilder::new()).await {
            Ok(run) => println!("✅ User lifecycle: '{}' logged in", run.fetched.username),
            Err(e) => {
                failed = true;
                report_failure("User lifecycle", &e);
            }
        }
    }

    if failed {
        std::process::exit(2);
    }

    Ok(())
}

fn report_failure(name: &str, error: &petstore_harness::HarnessError) {
    tracing::error!("❌ {} failed: {}", name, error);
    if let Some(response) = error.response() {
        tracing::error!("Response body: {}", response.body);
    }
    eprintln!("❌ {} failed: {}", name, error);
}
