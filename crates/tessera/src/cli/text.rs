//! Text pipeline command handler.

use super::commands::TextArgs;
use super::generate::text_services;
use tessera::{ProductContext, TesseraConfig, TesseraResult, TokenLedger, format_table};

/// Run the staged pipeline and print the final table.
#[tracing::instrument(skip_all, fields(topic = %args.topic.topic, count = args.count))]
pub async fn run_text(args: &TextArgs, config: &TesseraConfig) -> TesseraResult<()> {
    let topic = args.topic.to_topic()?;
    let services = text_services(config, args.prompts.as_deref())?;
    let pipeline = services.pipeline();
    let mut ledger = TokenLedger::default();

    let table = if args.paired {
        let output = pipeline.run_paired(&topic, args.count, &mut ledger).await?;
        format_table(topic.name(), output.rows())
    } else {
        let products = if args.products.is_empty() {
            services
                .product_lookup()
                .context(&args.product_urls, &mut ledger)
                .await
        } else {
            Some(ProductContext::new(args.products.clone()))
        };
        let products = products
            .map(|context| context.with_share(*config.pipeline().product_context_share()));
        let output = pipeline
            .run_plain(&topic, products.as_ref(), args.count, &mut ledger)
            .await?;
        format_table(topic.name(), output.rows())
    };

    tracing::info!(
        calls = *ledger.calls(),
        total_tokens = ledger.total(),
        "Token usage"
    );
    println!("{}", table);
    Ok(())
}
