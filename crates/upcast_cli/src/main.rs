//! Command-line client for the Upcast API.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use serde_json::{json, Value};
use std::io;
use std::time::{Duration, Instant};
use upcast_core::DEFAULT_CLI_SERVER_URL;

#[derive(Parser)]
#[command(name = "upcast-cli", about = "Upcast CLI", version)]
struct Cli {
    /// Server URL (can also be set via UPCAST_SERVER env var)
    #[arg(short, long, env = "UPCAST_SERVER")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Print timing for API requests
    #[arg(long, global = true)]
    timing: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortArg {
    Recent,
    Top,
}

impl SortArg {
    fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Top => "top",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// List projects
    Projects {
        #[arg(short, long, default_value = "20")]
        limit: usize,
        #[arg(long, value_enum, default_value = "recent")]
        sort: SortArg,
        /// Only projects in this category id
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one project
    Project { id: String },
    /// Toggle your upvote on a project
    Upvote {
        project: String,
        #[arg(short, long)]
        user: String,
    },
    /// Toggle a project in your saved list
    Save {
        project: String,
        #[arg(short, long)]
        user: String,
    },
    /// Show a user's notifications
    Notifications {
        #[arg(short, long)]
        user: String,
        #[arg(long)]
        unread: bool,
    },
}

fn log_timing(timing: bool, label: &str, duration: Duration) {
    if timing {
        eprintln!(
            "[timing] {}: {:.1} ms",
            label,
            duration.as_secs_f64() * 1000.0
        );
    }
}

fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

fn exit_with(action: &str, message: impl std::fmt::Display) -> ! {
    eprintln!("{} failed: {}", action, message);
    std::process::exit(1);
}

async fn send_json_or_exit(
    request: reqwest::RequestBuilder,
    action: &str,
    timing: bool,
) -> Value {
    let start = Instant::now();
    let res = match request.send().await {
        Ok(res) => res,
        Err(err) => exit_with(action, err),
    };
    log_timing(timing, action, start.elapsed());

    let status = res.status();
    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => exit_with(action, format!("failed to read response body: {}", err)),
    };
    if !status.is_success() {
        eprintln!(
            "{} failed ({}): {}",
            action,
            status,
            error_message_for_response(status, &body)
        );
        std::process::exit(1);
    }
    match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(err) => exit_with(action, format!("invalid JSON response: {}", err)),
    }
}

fn pretty(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("response encoding error: {}", err))
}

fn field<'a>(value: &'a Value, key: &str) -> Result<&'a str, String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("response missing '{}' field", key))
}

fn format_project_rows(projects: &Value, json: bool) -> Result<String, String> {
    if json {
        return pretty(projects);
    }
    let Some(items) = projects.as_array() else {
        return Err("expected a list of projects".to_string());
    };
    let mut rows = Vec::with_capacity(items.len());
    for project in items {
        let upvotes = project
            .get("upvote_count")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        rows.push(format!(
            "{:<36} {:>5}  {}",
            field(project, "id")?,
            upvotes,
            field(project, "name")?
        ));
    }
    Ok(rows.join("\n"))
}

fn format_project_detail(project: &Value, json: bool) -> Result<String, String> {
    if json {
        return pretty(project);
    }
    let count = |key: &str| project.get(key).and_then(Value::as_u64).unwrap_or(0);
    let mut lines = vec![
        format!("{} - {}", field(project, "name")?, field(project, "tagline")?),
        format!(
            "upvotes: {}  saves: {}",
            count("upvote_count"),
            count("save_count")
        ),
    ];
    if let Some(url) = project.get("website_url").and_then(Value::as_str) {
        lines.push(url.to_string());
    }
    if let Some(description) = project
        .get("description")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
    {
        lines.push(String::new());
        lines.push(description.to_string());
    }
    Ok(lines.join("\n"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToggleKind {
    Upvote,
    Save,
}

impl ToggleKind {
    fn describe(self, action: &str, project_id: &str) -> Result<String, String> {
        match (self, action) {
            (Self::Upvote, "added") => Ok(format!("Upvoted {}", project_id)),
            (Self::Upvote, "removed") => Ok(format!("Removed upvote from {}", project_id)),
            (Self::Save, "added") => Ok(format!("Saved {}", project_id)),
            (Self::Save, "removed") => Ok(format!("Unsaved {}", project_id)),
            (_, other) => Err(format!("unexpected action '{}'", other)),
        }
    }
}

fn format_toggle_output(
    kind: ToggleKind,
    project_id: &str,
    response: &Value,
    json: bool,
) -> Result<String, String> {
    if json {
        return pretty(response);
    }
    kind.describe(field(response, "action")?, project_id)
}

fn format_notifications(notifications: &Value, json: bool) -> Result<String, String> {
    if json {
        return pretty(notifications);
    }
    let Some(items) = notifications.as_array() else {
        return Err("expected a list of notifications".to_string());
    };
    let mut rows = Vec::with_capacity(items.len());
    for notification in items {
        let read = notification
            .get("read")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        rows.push(format!(
            "{} {}",
            if read { " " } else { "*" },
            field(notification, "message")?
        ));
    }
    Ok(rows.join("\n"))
}

fn print_or_exit(action: &str, output: Result<String, String>) {
    match output {
        Ok(output) if output.is_empty() => {}
        Ok(output) => println!("{}", output),
        Err(message) => exit_with(action, message),
    }
}

fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Server URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

fn api_url_or_exit(server: &str, action: &str, segments: &[&str]) -> reqwest::Url {
    match api_url(server, segments) {
        Ok(url) => url,
        Err(message) => exit_with(action, message),
    }
}

fn normalize_server(server: &str) -> String {
    let trimmed = server.trim().trim_end_matches('/');
    match trimmed.strip_prefix("http://localhost") {
        Some(rest) if rest.is_empty() || rest.starts_with(':') || rest.starts_with('/') => {
            format!("http://127.0.0.1{}", rest)
        }
        _ => trimmed.to_string(),
    }
}

fn resolve_server(server: Option<String>) -> String {
    let server = server
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CLI_SERVER_URL.to_string());
    normalize_server(&server)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        server,
        json,
        timing,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()?;
    let server = resolve_server(server);

    match command {
        Commands::Completions { .. } => {}
        Commands::Projects {
            limit,
            sort,
            category,
        } => {
            let endpoint = api_url_or_exit(&server, "Projects", &["api", "projects"]);
            let mut query = vec![
                ("limit", limit.to_string()),
                ("sort", sort.as_str().to_string()),
            ];
            if let Some(category) = category {
                query.push(("category_id", category));
            }
            let projects =
                send_json_or_exit(client.get(endpoint).query(&query), "Projects", timing).await;
            print_or_exit("Projects", format_project_rows(&projects, json));
        }
        Commands::Project { id } => {
            let endpoint = api_url_or_exit(&server, "Project", &["api", "projects", id.as_str()]);
            let project = send_json_or_exit(client.get(endpoint), "Project", timing).await;
            print_or_exit("Project", format_project_detail(&project, json));
        }
        Commands::Upvote { project, user } => {
            let endpoint = api_url_or_exit(
                &server,
                "Upvote",
                &["api", "projects", project.as_str(), "upvote"],
            );
            let request = client.post(endpoint).json(&json!({ "user_id": user }));
            let response = send_json_or_exit(request, "Upvote", timing).await;
            print_or_exit(
                "Upvote",
                format_toggle_output(ToggleKind::Upvote, &project, &response, json),
            );
        }
        Commands::Save { project, user } => {
            let endpoint = api_url_or_exit(
                &server,
                "Save",
                &["api", "projects", project.as_str(), "save"],
            );
            let request = client.post(endpoint).json(&json!({ "user_id": user }));
            let response = send_json_or_exit(request, "Save", timing).await;
            print_or_exit(
                "Save",
                format_toggle_output(ToggleKind::Save, &project, &response, json),
            );
        }
        Commands::Notifications { user, unread } => {
            let endpoint = api_url_or_exit(
                &server,
                "Notifications",
                &["api", "users", user.as_str(), "notifications"],
            );
            let request = client
                .get(endpoint)
                .query(&[("unread_only", unread.to_string())]);
            let notifications = send_json_or_exit(request, "Notifications", timing).await;
            print_or_exit("Notifications", format_notifications(&notifications, json));
        }
    }

    Ok(())
}
