use anyhow::Context;
use cart_bundle::utils::error::ErrorSeverity;
use cart_bundle::utils::{logger, validation::Validate};
use cart_bundle::{CartError, CartId, CartService, CliConfig, InMemoryCartStore, InMemoryCatalog, Operation, TomlConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if cli.log_json || config.json_logging() {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting cart-bundle");
    tracing::info!("📁 Configuration loaded from: {}", cli.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let operations = match cli.parsed_operations() {
        Ok(operations) => operations,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let catalog = InMemoryCatalog::from_config(&config.catalog).context("loading catalog")?;
    let service = CartService::new(catalog, InMemoryCartStore::new(), config.bundle);
    let cart = service.create_cart().await.context("creating cart")?;

    if let Err(e) = run(&service, cart.id, &operations).await {
        tracing::error!(
            "❌ Operation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 2,
            ErrorSeverity::Medium => 4,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    let cart = service.get_cart(cart.id).await?;
    println!("{}", serde_json::to_string_pretty(&cart)?);

    Ok(())
}

async fn run(
    service: &CartService<InMemoryCatalog, InMemoryCartStore, cart_bundle::BundleConfig>,
    cart_id: CartId,
    operations: &[Operation],
) -> Result<(), CartError> {
    for operation in operations {
        tracing::info!("▶ {:?}", operation);

        let cart = match operation {
            Operation::Add {
                variant_id,
                quantity,
            } => service.add_item(cart_id, *variant_id, *quantity).await?,
            Operation::Update {
                variant_id,
                quantity,
            } => {
                service
                    .update_item_quantity(cart_id, *variant_id, *quantity)
                    .await?
            }
            Operation::Remove { variant_id } => service.remove_item(cart_id, *variant_id).await?,
            Operation::Clear => service.clear(cart_id).await?,
            Operation::Draft => {
                let draft = service.order_draft(cart_id).await?;
                println!("{}", serde_json::to_string_pretty(&draft)?);
                continue;
            }
        };

        tracing::info!(
            "🛒 {} items, total {} (empty: {})",
            cart.items.len(),
            cart.total_price,
            service.is_empty(cart_id).await?
        );
    }

    Ok(())
}
