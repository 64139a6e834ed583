use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Admin CLI for the API gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the issued admin token
    Login {
        #[arg(long, default_value = "admin")]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Show the session carried by a token
    Session {
        #[arg(short, long)]
        token: String,
    },
    /// Check gateway status and the backend it forwards to
    Status {
        #[arg(short, long)]
        token: String,
    },
}

fn bearer(token: &str) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    Ok(headers)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Login { username, password } => {
            let res = client
                .post(format!("{}/admin/login", base))
                .json(&json!({ "username": username, "password": password }))
                .send()
                .await?;
            if let Some(body) = read_json(res).await? {
                match body.get("token").and_then(Value::as_str) {
                    Some(token) => println!("{}", token),
                    None => println!("{}", serde_json::to_string_pretty(&body)?),
                }
            }
        }
        Commands::Session { token } => {
            let res = client
                .get(format!("{}/admin/session", base))
                .headers(bearer(&token)?)
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Status { token } => {
            let res = client
                .get(format!("{}/admin/status", base))
                .headers(bearer(&token)?)
                .send()
                .await?;
            print_json(res).await?;
        }
    }

    Ok(())
}

async fn read_json(res: reqwest::Response) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(None);
    }
    Ok(Some(res.json().await?))
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(json) = read_json(res).await? {
        println!("{}", serde_json::to_string_pretty(&json)?);
    }
    Ok(())
}
