use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "breaker-cli")]
#[command(about = "Operator CLI for the circuit-breaker coordinator", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether a circuit is open or closed
    Status { circuit: String },
    /// Open a circuit for the configured cooldown
    Trip { circuit: String },
    /// Run a target through the breaker
    Execute {
        target: String,
        /// Circuit guarding the call (defaults to the configured circuit)
        #[arg(long)]
        circuit: Option<String>,
        /// JSON payload passed to the target
        #[arg(long)]
        payload: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Status { circuit } => {
            let res = client.get(format!("{}/circuits/{}", base, circuit)).send().await?;
            print_response(res).await?;
        }
        Commands::Trip { circuit } => {
            let res = client.post(format!("{}/circuits/{}/trip", base, circuit)).send().await?;
            print_response(res).await?;
        }
        Commands::Execute { target, circuit, payload } => {
            let payload: Value = match payload {
                Some(raw) => serde_json::from_str(&raw)?,
                None => Value::Null,
            };
            let mut body = json!({ "targetRef": target, "payload": payload });
            if let Some(circuit) = circuit {
                body["circuit"] = Value::String(circuit);
            }
            let res = client.post(format!("{}/execute", base)).json(&body).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(value) => serde_json::to_string_pretty(&value)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
        Ok(())
    } else {
        eprintln!("Error ({}): {}", status, rendered);
        std::process::exit(1);
    }
}
