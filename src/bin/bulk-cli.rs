use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use url::Url;

#[derive(Parser)]
#[command(name = "bulk-cli")]
#[command(about = "Client for the mock SMS bulk gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, default_value = "bulk-admin-key")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a send-SMS request
    Send {
        #[arg(long)]
        sender: String,
        #[arg(long)]
        receiver: String,
        #[arg(long)]
        text: String,
        /// Callback URL for delivery reports
        #[arg(long)]
        dlr_url: Option<String>,
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Show gateway status (admin API)
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = base_url(&cli.url)?;

    match cli.command {
        Commands::Send {
            sender,
            receiver,
            text,
            dlr_url,
            username,
            password,
        } => {
            let body = json!({
                "type": "text",
                "Auth": { "username": username, "password": password },
                "sender": sender,
                "receiver": receiver,
                "text": text,
                "dlrMask": if dlr_url.is_some() { 19 } else { 0 },
                "dlrUrl": dlr_url.unwrap_or_default(),
            });
            let res = client
                .post(base.join("bulk_server")?)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Status => {
            let mut headers = HeaderMap::new();
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
            );
            let res = client
                .get(base.join("admin/status")?)
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Parse `raw` as a directory-style base so relative joins keep its path prefix.
fn base_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(raw)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    println!("HTTP {}", status.as_u16());

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
