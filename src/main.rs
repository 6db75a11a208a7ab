mod app;
mod blog;
mod config;
mod llm;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use blog::{BlogRequest, Style};
use config::AppConfig;
use llm::{Generator, OllamaClient};

#[derive(Parser, Debug)]
#[command(name = "blogsmith")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "Generate blog posts with a local Ollama model")]
struct Args {
    /// Topic to write about (prints the blog instead of opening the form)
    #[arg(short, long)]
    topic: Option<String>,

    /// Maximum number of words, passed to the prompt as typed
    #[arg(short, long, requires = "topic")]
    words: Option<String>,

    /// Audience the blog is written for
    #[arg(short, long, value_enum, requires = "topic")]
    style: Option<Style>,

    /// Print the formatted prompt without contacting the model
    #[arg(long, requires = "topic")]
    dry_run: bool,

    /// List models installed on the Ollama server
    #[arg(long, conflicts_with = "topic")]
    list_models: bool,

    /// Ollama address (overrides OLLAMA_HOST and the config file)
    #[arg(long)]
    host: Option<String>,

    /// Model to generate with
    #[arg(short, long)]
    model: Option<String>,
}

/// What a command line asks for
#[derive(Debug, PartialEq)]
enum Mode {
    DryRun(BlogRequest),
    Generate(BlogRequest),
    ListModels,
    Tui,
}

impl Args {
    fn mode(&self, config: &AppConfig) -> Mode {
        if let Some(topic) = &self.topic {
            let request = BlogRequest::new(
                topic.clone(),
                self.words.clone().unwrap_or_default(),
                self.style.unwrap_or(config.default_style),
            );
            return if self.dry_run {
                Mode::DryRun(request)
            } else {
                Mode::Generate(request)
            };
        }

        if self.list_models {
            Mode::ListModels
        } else {
            Mode::Tui
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so the form and printed blogs own stdout)
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AppConfig::load().unwrap_or_default();

    match args.mode(&config) {
        Mode::DryRun(request) => {
            println!("{}", request.prompt(&config.prompt_template()));
            Ok(())
        }
        Mode::Generate(request) => {
            let client = build_client(&config, &args)?;
            print_blog(&config, &client, &request).await
        }
        Mode::ListModels => {
            let client = build_client(&config, &args)?;
            list_models(&client).await
        }
        Mode::Tui => {
            let client = build_client(&config, &args)?;
            run_tui(&config, Arc::new(client)).await
        }
    }
}

fn build_client(config: &AppConfig, args: &Args) -> Result<OllamaClient> {
    let host = config.resolve_host(args.host.as_deref());
    let model = args.model.clone().unwrap_or_else(|| config.model.clone());
    OllamaClient::new(&host, model).context("Could not create Ollama client")
}

async fn print_blog(config: &AppConfig, client: &OllamaClient, request: &BlogRequest) -> Result<()> {
    let prompt = request.prompt(&config.prompt_template());
    let blog = client
        .generate(&prompt)
        .await
        .with_context(|| format!("Generation with {} at {} failed", client.model(), client.host()))?;

    // Verbatim, no trimming
    print!("{}", blog);
    if !blog.ends_with('\n') {
        println!();
    }
    Ok(())
}

async fn list_models(client: &OllamaClient) -> Result<()> {
    let models = client
        .list_models()
        .await
        .with_context(|| format!("Could not list models at {}", client.host()))?;

    if models.is_empty() {
        println!("No models installed. Try: ollama pull {}", llm::ollama::DEFAULT_MODEL);
    }
    for model in models {
        println!("{}", model);
    }
    Ok(())
}

async fn run_tui(config: &AppConfig, generator: Arc<dyn Generator>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(config, generator);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                    match key.code {
                        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                            app.cancel_generation();
                            return Ok(());
                        }
                        _ => app.handle_key(key),
                    }
                }
            }
        }

        // Poll the running generation and expire status messages
        app.tick().await;
    }
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("accessories-text-editor")
        .show()?;
    Ok(())
}
