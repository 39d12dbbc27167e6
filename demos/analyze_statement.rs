use dotenv::dotenv;
use statement_insight::{
    AnalyzeOutcome, AppState, HttpStatementService, IngestionStateMachine, Language,
    LocalizedStatement, SendOutcome,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn print_summary(summary: &LocalizedStatement) {
    println!("\n🏪 {} · {}\n", summary.restaurant_name, summary.period);

    for line in &summary.highlights {
        println!("  {:<24} {}", line.label, line.value);
    }

    println!();
    println!("  {:<20} {:>8} {:>12} {:>10}", "", "#", "$", "tips");
    for row in &summary.order_breakdown {
        let marker = if row.is_total { "=" } else { " " };
        println!(
            "{} {:<20} {:>8} {:>12} {:>10}",
            marker, row.name, row.orders, row.revenue, row.tips
        );
    }

    for section in &summary.sections {
        println!("\n  {}", section.title);
        for item in &section.items {
            match &item.note {
                Some(note) => println!("    {:<30} {:>12}  ({})", item.label, item.value, note),
                None => println!("    {:<30} {:>12}", item.label, item.value),
            }
        }
    }

    println!("\n💡 {}\n", summary.insights);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let path: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("usage: analyze_statement <statement.pdf> [en|zh|es]"))?;
    let lang = std::env::args()
        .nth(2)
        .map(|code| Language::from_code(&code))
        .unwrap_or_default();
    let proxy_url =
        std::env::var("STATEMENT_PROXY_URL").unwrap_or_else(|_| "http://127.0.0.1:8787".into());

    let session = IngestionStateMachine::new(Arc::new(HttpStatementService::new(&proxy_url)));

    session.select_path(&path).await?;
    println!("📄 Analyzing {} via {} ...", path.display(), proxy_url);

    match session.analyze().await? {
        AnalyzeOutcome::Completed => {}
        _ => {
            if let AppState::Error { message, .. } = session.state() {
                eprintln!("❌ Error: {}", message);
            }
            return Ok(());
        }
    }

    if let Some(summary) = session.localized_summary(lang) {
        print_summary(&summary);
    }

    println!("🤖 Ask about this statement (type 'quit' to exit, 'lang zh' to switch language).");
    println!("------------------------------------------------------------------");

    let chat = session.conversation();
    let mut lang = lang;
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let prompt = input.trim();

        if prompt.eq_ignore_ascii_case("quit") || prompt.eq_ignore_ascii_case("exit") {
            break;
        }
        if let Some(code) = prompt.strip_prefix("lang ") {
            lang = Language::from_code(code);
            println!("Language set to '{}'.", lang.code());
            continue;
        }

        match chat.send(prompt, lang).await? {
            SendOutcome::Ignored | SendOutcome::Discarded => continue,
            SendOutcome::Degraded(e) => eprintln!("❌ Error: {}", e),
            SendOutcome::Replied => {}
        }

        if let Some(reply) = chat.messages().last() {
            println!("\n{}\n", reply.content);
            println!("------------------------------------------------------------------");
        }
    }

    session.reset();
    Ok(())
}
