use dotenv::dotenv;
use statement_insight::{server, ProxyConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("statement_insight=info,tower_http=info")),
        )
        .init();

    let config = ProxyConfig::from_env();
    println!("📡 Serving statement proxy on http://{}", config.bind_addr);
    println!("   POST /analyze-statement  {{ pdfBase64, filename? }}");
    println!("   POST /chat-statement     {{ pdfBase64, messages, lang }}\n");

    server::serve(config).await?;
    Ok(())
}
