use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "todo-cli")]
#[command(about = "Command-line client for the todo service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every todo
    List,
    /// Show a single todo
    Get { id: String },
    /// Create a todo
    Create {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Update fields of an existing todo
    Update {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        completed: Option<bool>,
    },
    /// Delete a todo
    Delete { id: String },
    /// Print the service's own metric families
    Metrics,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::List => {
            let res = client.get(format!("{}/todos", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Get { id } => {
            let res = client.get(format!("{}/todos/{}", base, id)).send().await?;
            print_response(res).await?;
        }
        Commands::Create { title, description } => {
            let mut body = json!({ "title": title });
            if let Some(description) = description {
                body["description"] = Value::String(description);
            }
            let res = client
                .post(format!("{}/todos", base))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Update {
            id,
            title,
            description,
            completed,
        } => {
            let mut body = Map::new();
            if let Some(title) = title {
                body.insert("title".into(), Value::String(title));
            }
            if let Some(description) = description {
                body.insert("description".into(), Value::String(description));
            }
            if let Some(completed) = completed {
                body.insert("completed".into(), Value::Bool(completed));
            }
            let res = client
                .put(format!("{}/todos/{}", base, id))
                .json(&Value::Object(body))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Delete { id } => {
            let res = client
                .delete(format!("{}/todos/{}", base, id))
                .send()
                .await?;
            if res.status().is_success() {
                println!("Deleted {}", id);
            } else {
                print_response(res).await?;
            }
        }
        Commands::Metrics => {
            let res = client.get(format!("{}/metrics", base)).send().await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: metrics endpoint returned status {}", status);
                return Ok(());
            }
            let text = res.text().await?;
            for line in text.lines().filter(|l| is_service_metric(l)) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

/// Service-owned families, including their HELP/TYPE comments.
fn is_service_metric(line: &str) -> bool {
    let name = line
        .strip_prefix("# HELP ")
        .or_else(|| line.strip_prefix("# TYPE "))
        .unwrap_or(line);
    name.starts_with("todo_")
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: todo service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
