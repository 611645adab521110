use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "todo-cli")]
#[command(about = "Command-line client for the TODO service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(long, env = "BASIC_AUTH_USER_ID", default_value = "")]
    user: String,

    #[arg(long, env = "BASIC_AUTH_PASSWORD", default_value = "")]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// Create a TODO
    Create {
        subject: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List TODOs, newest first
    List {
        /// Only show TODOs older than this id
        #[arg(long)]
        prev_id: Option<i64>,
        #[arg(long)]
        size: Option<i64>,
    },
    /// Update a TODO's subject and description
    Update {
        id: i64,
        subject: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Delete TODOs by id
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let todos = format!("{}/todos", cli.url);

    let request = match cli.command {
        Commands::Health => client.get(format!("{}/healthz", cli.url)),
        Commands::Create {
            subject,
            description,
        } => client
            .post(&todos)
            .json(&json!({ "subject": subject, "description": description })),
        Commands::List { prev_id, size } => {
            let mut query = Vec::new();
            if let Some(prev_id) = prev_id {
                query.push(("prev_id", prev_id));
            }
            if let Some(size) = size {
                query.push(("size", size));
            }
            client.get(&todos).query(&query)
        }
        Commands::Update {
            id,
            subject,
            description,
        } => client
            .put(&todos)
            .json(&json!({ "id": id, "subject": subject, "description": description })),
        Commands::Delete { ids } => client.delete(&todos).json(&json!({ "ids": ids })),
    };

    let res = request
        .basic_auth(&cli.user, Some(&cli.password))
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
