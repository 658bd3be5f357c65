use clap::Parser;
use serde_json::{Value, json};

/// Sends a sample inquiry (or a health check) to a running server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://localhost:5000")]
    base_url: String,

    #[arg(long, default_value = "Ada")]
    name: String,

    #[arg(long, default_value = "ada@example.com")]
    email: String,

    #[arg(long, default_value = "Hello from the tester")]
    message: String,

    /// Only hit the health endpoint.
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let base_url = args.base_url.trim_end_matches('/');
    let client = reqwest::Client::new();

    let response = if args.health {
        client.get(format!("{base_url}/api/health")).send().await?
    } else {
        let payload = json!({
            "name": args.name,
            "email": args.email,
            "message": args.message,
        });

        println!("Payload: {payload}");

        client
            .post(format!("{base_url}/api/contact"))
            .json(&payload)
            .send()
            .await?
    };

    let status = response.status();
    let body: Value = response.json().await?;

    println!("Status: {status}");
    println!("Body: {body}");

    Ok(())
}
