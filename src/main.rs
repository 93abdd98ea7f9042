use anyhow::{Context, Result};
use meetup_ops::cli::commands::ValidateConfigCommand;
use meetup_ops::cli::output::*;
use meetup_ops::cli::{Cli, Command};
use meetup_ops::clients::{TitoClient, WebDriverBrowser};
use meetup_ops::core::config::{
    default_settings_path, ENV_GITHUB_TOKEN, ENV_GITHUB_USER, ENV_MAPS_API_KEY, ENV_TITO_API_KEY,
};
use meetup_ops::workflows::{self, Collaborators};
use meetup_ops::{Config, Workflow, WorkflowContext, WorkflowRun, WorkflowRunner};
use std::sync::Arc;
use tracing::{error, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Credentials may live in a .env file next to the site
    dotenvy::dotenv().ok();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match &cli.command {
        Command::Create(_) => create_event(&config).await?,
        Command::EventSettings(_) => show_event_settings(&config).await?,
        Command::SocialImage(_) => social_image(&config).await?,
        Command::ValidateConfig(cmd) => validate_config(&config, cmd, cli.config.is_some())?,
    }

    Ok(())
}

async fn create_event(config: &Config) -> Result<()> {
    let collaborators =
        Collaborators::from_config(config).context("Missing configuration for the create workflow")?;
    let workflow = workflows::create_event(config, &collaborators)?;

    let run = run_workflow(&workflow).await;
    println!("\n{}", format_context(&run.context));
    Ok(())
}

async fn show_event_settings(config: &Config) -> Result<()> {
    let ticketing = Arc::new(TitoClient::from_config(config)?);
    let workflow = workflows::event_settings(config, ticketing)?;

    let run = run_workflow(&workflow).await;
    if let Some(settings) = run.context.get("eventSettings") {
        println!("{}", serde_json::to_string_pretty(settings)?);
    }
    Ok(())
}

async fn social_image(config: &Config) -> Result<()> {
    let browser = Arc::new(WebDriverBrowser::new(&config.settings.browser));
    let workflow = workflows::social_image(config, browser);

    let run = run_workflow(&workflow).await;
    if let Some(path) = run.context.get_str("socialImagePath") {
        println!("{} Social image written to {}", CHECK, style(path).bold());
    }
    Ok(())
}

/// Run `workflow` from an empty context with console progress
///
/// Exits the process with status 1 when a step fails.
async fn run_workflow(workflow: &Workflow) -> WorkflowRun {
    let mut runner = WorkflowRunner::new();
    ConsoleReporter::new().attach(&mut runner);

    let mut run = WorkflowRun::new(workflow, WorkflowContext::new());
    println!();
    let result = runner.execute(workflow, &mut run).await;
    println!("{}", format_run_summary(&run));

    if let Err(e) = result {
        let failed = e.failed_step().unwrap_or(&workflow.name).to_string();
        println!(
            "\n{} {} {} at {}",
            CROSS,
            style(&workflow.name).bold(),
            style("failed").red(),
            style(failed).red().bold()
        );
        error!("{:#}", anyhow::Error::new(e));

        if !run.context.is_empty() {
            println!("\n{} Fields collected before the failure:", INFO);
            println!("{}", format_context(&run.context));
        }
        std::process::exit(1);
    }

    println!(
        "\n{} {} completed {}",
        CHECK,
        style(&workflow.name).bold(),
        style("successfully").green()
    );
    run
}

fn validate_config(config: &Config, cmd: &ValidateConfigCommand, explicit_path: bool) -> Result<()> {
    println!("{} Settings are valid!", CHECK);
    if !explicit_path {
        match default_settings_path() {
            Some(path) if path.exists() => println!("  File: {}", style(path.display()).dim()),
            _ => println!("  File: {}", style("none, using built-in defaults").dim()),
        }
    }

    let settings = &config.settings;
    println!("  Repository: {}/{}", style(&settings.github.owner).bold(), style(&settings.github.repo).bold());
    println!("  Ticketing account: {}", style(&settings.ticketing.account).bold());
    println!(
        "  Template event: {}",
        style(settings.ticketing.template_event.as_deref().unwrap_or("none (create from scratch)")).cyan()
    );
    println!(
        "  Calendar form: {}",
        style(settings.calendar.as_ref().map(|c| c.form_url.as_str()).unwrap_or("not configured")).cyan()
    );
    println!("  Site root: {}", style(settings.site.root.display()).cyan());

    let credentials = &config.credentials;
    let mut missing = 0;
    for (name, present) in [
        (ENV_GITHUB_USER, credentials.github_user().is_ok()),
        (ENV_GITHUB_TOKEN, credentials.github_token().is_ok()),
        (ENV_TITO_API_KEY, credentials.tito_api_key().is_ok()),
        (ENV_MAPS_API_KEY, credentials.maps_api_key().is_ok()),
    ] {
        if present {
            println!("  {} {}", CHECK, name);
        } else {
            missing += 1;
            println!("  {} {} is not set", WARN, style(name).yellow());
        }
    }

    if cmd.json {
        let json = serde_json::to_string_pretty(settings)?;
        println!("\n{}", json);
    }

    if missing > 0 {
        println!(
            "\n{} {} credential(s) missing; the create workflow will not start",
            WARN, missing
        );
    }
    Ok(())
}
