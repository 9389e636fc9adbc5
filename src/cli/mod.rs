//! CLI commands for agentrelay using clap.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::agent::{AgentId, StatusValue};
use crate::config::{get_settings_path, load_settings_or_default, save_settings, Settings};
use crate::contact::{ContactClient, ContactForm, SubmitOutcome};
use crate::core::{AgentRegistry, Dispatched, Dispatcher, IndicatorBoard, Router};
use crate::monitoring::Monitor;
use crate::protocol::{InboxHandler, RelayEvent};
use crate::telegram::{chat_link, ChatClient};

/// agentrelay - route messages between agents and run the relay service.
#[derive(Parser)]
#[command(name = "agentrelay")]
#[command(version)]
#[command(about = "agentrelay - agent message router and relay service", long_about = None)]
pub struct Commands {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API and event dispatcher
    Serve {
        /// Host to bind (overrides settings)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides settings)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Route a message locally and show who received it
    Route {
        /// Sending agent
        from: AgentId,

        /// Recipient agent or "all"
        to: String,

        /// Message body
        message: String,
    },

    /// Apply a status to a local indicator and show the result
    Status {
        /// Agent reporting the status
        agent: AgentId,

        /// online, busy, away, or offline
        status: StatusValue,
    },

    /// Dispatch a JSON relay event locally
    Event {
        /// Event JSON, e.g. {"type":"status_changed","agent":"lee","status":"busy"}
        json: String,
    },

    /// Submit the contact form to the configured endpoint
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        message: String,
    },

    /// Send a chat message through the messaging endpoint
    Chat {
        /// Target chat id
        chat_id: String,

        /// Message text
        message: String,
    },

    /// Print a Telegram deep link for the bot
    ChatLink {
        /// Bot username (defaults to messaging.bot_username)
        username: Option<String>,

        /// Start payload
        #[arg(long)]
        start: Option<String>,
    },

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print effective settings
    Show,

    /// Write default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// Run the command.
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Command::Serve { host, port } => cmd_serve(host.clone(), *port).await,
            Command::Route { from, to, message } => cmd_route(*from, to, message),
            Command::Status { agent, status } => cmd_status(*agent, *status),
            Command::Event { json } => cmd_event(json),
            Command::Contact {
                name,
                email,
                subject,
                message,
            } => {
                let form = ContactForm {
                    name: name.clone(),
                    email: email.clone(),
                    subject: subject.clone(),
                    message: message.clone(),
                };
                cmd_contact(form).await
            }
            Command::Chat { chat_id, message } => cmd_chat(chat_id, message).await,
            Command::ChatLink { username, start } => cmd_chat_link(username.as_deref(), start.as_deref()),
            Command::Config(cmd) => cmd_config(cmd),
        }
    }
}

// Command implementations

async fn cmd_serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut settings = load_settings_or_default();
    if let Some(host) = host {
        settings.web.host = host;
    }
    if let Some(port) = port {
        settings.web.port = port;
    }
    crate::web::run_web_server(&settings).await?;
    Ok(())
}

/// Dispatcher with an inbox for every enabled agent.
fn local_dispatcher(settings: &Settings) -> Dispatcher {
    let mut registry = AgentRegistry::new();
    for &agent in &settings.agents.enabled {
        registry.register(agent, Arc::new(InboxHandler::new(agent)));
    }
    Dispatcher::new(Router::new(registry), IndicatorBoard::with_agents(AgentId::ALL))
}

fn cmd_route(from: AgentId, to: &str, message: &str) -> Result<()> {
    let dispatcher = local_dispatcher(&load_settings_or_default());
    let outcome = dispatcher.route(from, to, message);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn cmd_status(agent: AgentId, status: StatusValue) -> Result<()> {
    let dispatcher = local_dispatcher(&load_settings_or_default());
    print_status(&dispatcher, agent, dispatcher.update_status(agent, status));
    Ok(())
}

fn print_status(dispatcher: &Dispatcher, agent: AgentId, updated: bool) {
    let board = dispatcher.board();
    match board.element(agent).filter(|_| updated) {
        Some(element) => println!("{}  [{}]", element.title, element.status_classes().join(" ")),
        None => println!("No status indicator for {}", agent),
    }
}

fn cmd_event(json: &str) -> Result<()> {
    let event: RelayEvent = serde_json::from_str(json).context("invalid relay event JSON")?;
    let agent = match &event {
        RelayEvent::StatusChanged { agent, .. } => Some(*agent),
        RelayEvent::MessageSent { .. } => None,
    };

    let dispatcher = local_dispatcher(&load_settings_or_default());
    match dispatcher.handle(event) {
        Dispatched::Routed(outcome) => println!("{}", serde_json::to_string_pretty(&outcome)?),
        Dispatched::StatusApplied(updated) => {
            if let Some(agent) = agent {
                print_status(&dispatcher, agent, updated);
            }
        }
    }
    Ok(())
}

async fn cmd_contact(form: ContactForm) -> Result<()> {
    let settings = load_settings_or_default();
    let monitor = Arc::new(Monitor::init(&settings.monitoring));
    let client = ContactClient::new(settings.contact.submit_url.clone(), monitor);

    let outcome = client.submit(&form).await;
    match &outcome {
        SubmitOutcome::Invalid(errors) => {
            for error in errors {
                eprintln!("  {:?}: {}", error.field, error.message);
            }
            anyhow::bail!("contact form is invalid")
        }
        SubmitOutcome::Sent(message) => {
            println!("{}", message);
            Ok(())
        }
        SubmitOutcome::Rejected(_) | SubmitOutcome::Failed(_) => {
            anyhow::bail!("{}", outcome.user_message())
        }
    }
}

async fn cmd_chat(chat_id: &str, message: &str) -> Result<()> {
    let settings = load_settings_or_default();
    let client = ChatClient::new(settings.messaging.endpoint_url.clone());
    let response = client.send_message(chat_id, message).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn cmd_chat_link(username: Option<&str>, start: Option<&str>) -> Result<()> {
    let settings = load_settings_or_default();
    let username = username
        .map(str::to_string)
        .or(settings.messaging.bot_username)
        .context("no username given and messaging.bot_username is not set")?;
    println!("{}", chat_link(&username, start)?);
    Ok(())
}

fn cmd_config(cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let settings = load_settings_or_default();
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        ConfigCommand::Init { force } => {
            let path = get_settings_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Settings already exist at {} (use --force to overwrite)",
                    path.display()
                );
            }
            save_settings(&Settings::default())?;
            println!("Wrote default settings to {}", path.display());
        }
    }
    Ok(())
}
