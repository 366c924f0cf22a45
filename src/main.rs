//! Terminal chat front-end
//!
//! A small REPL over the client library: streamed chat with a chosen model,
//! plus commands for listing, pulling, and deleting models and switching the
//! server endpoint. Settings and the running conversation persist across
//! sessions.

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use ollamo::client::{ClientConfig, ServerClient};
use ollamo::storage::conversations::{conversations_dir, save_conversation};
use ollamo::storage::settings::{load_settings, save_settings, AppSettings};
use ollamo::types::api::ChatRequest;
use ollamo::types::message::{Conversation, Message, Role};

const HELP: &str = "\
commands:
  /models          list models on the server
  /model <name>    select the model for this session
  /pull <name>     pull a model onto the server
  /rm <name>       delete a model from the server
  /server <url>    switch server endpoint
  /status          check whether the server is reachable
  /quit            exit
anything else is sent to the model as a chat message";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut settings = load_settings();
    let mut client = ServerClient::new(ClientConfig {
        base_url: settings.server_url.clone(),
        ..ClientConfig::default()
    });

    println!("ollamo — chatting via {}", client.base_url());
    if !client.check_availability().await {
        println!("warning: server not reachable, check it is running (/server <url> to switch)");
    }

    let mut model = match settings.default_model.clone() {
        Some(m) => m,
        None => pick_first_model(&client).await.unwrap_or_default(),
    };
    if model.is_empty() {
        println!("no model selected; use /models and /model <name>");
    } else {
        println!("model: {model}");
    }

    let conv_dir = conversations_dir()?;
    let mut conversation = Conversation::new("terminal session");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest.trim())) {
            ("/quit", _) | ("/exit", _) => break,
            ("/help", _) => println!("{HELP}"),
            ("/status", _) => {
                if client.check_availability().await {
                    println!("server is reachable");
                } else {
                    println!("server is NOT reachable");
                }
            }
            ("/models", _) => match client.list_models().await {
                Ok(models) if models.is_empty() => println!("no models installed"),
                Ok(models) => {
                    for m in models {
                        println!(
                            "  {}  {}  {}",
                            m.name, m.details.parameter_size, m.details.quantization_level
                        );
                    }
                }
                Err(e) => println!("error: {e}"),
            },
            ("/model", name) if !name.is_empty() => {
                model = name.to_string();
                settings.default_model = Some(model.clone());
                persist(&settings);
                println!("model: {model}");
            }
            ("/pull", name) if !name.is_empty() => {
                println!("pulling {name}... (this can take a while)");
                match client.pull_model(name).await {
                    Ok(()) => println!("pulled {name}"),
                    Err(e) => println!("error: {e}"),
                }
            }
            ("/rm", name) if !name.is_empty() => match client.delete_model(name).await {
                Ok(()) => println!("deleted {name}"),
                Err(e) => println!("error: {e}"),
            },
            ("/server", url) if !url.is_empty() => {
                client.configure_endpoint(url);
                settings.server_url = client.base_url().to_string();
                persist(&settings);
                println!("endpoint: {}", client.base_url());
            }
            _ if line.starts_with('/') => println!("unknown command; /help for help"),
            _ => {
                if model.is_empty() {
                    println!("no model selected; use /models and /model <name>");
                    continue;
                }
                if conversation.messages.is_empty() {
                    conversation.title = line.chars().take(48).collect();
                }
                conversation.push(Message::new(Role::User, line));

                let mut request = ChatRequest::new(&model, &conversation.messages);
                request.options = Some(settings.sampling_options());

                match client.chat(request).await {
                    Ok(mut stream) => {
                        let mut reply = String::new();
                        while let Some(fragment) = stream.next().await {
                            match fragment {
                                Ok(fragment) => {
                                    print!("{}", fragment.text());
                                    std::io::stdout().flush()?;
                                    reply.push_str(fragment.text());
                                }
                                Err(e) => {
                                    println!("\nstream error: {e}");
                                    break;
                                }
                            }
                        }
                        println!();
                        conversation.push(Message::new(Role::Assistant, reply));
                        if let Err(e) = save_conversation(&conv_dir, &conversation) {
                            tracing::warn!("failed to save conversation: {e}");
                        }
                    }
                    Err(e) => println!("error: {e}"),
                }
            }
        }
    }

    Ok(())
}

/// Default to the first installed model when none is configured
async fn pick_first_model(client: &ServerClient) -> Option<String> {
    client
        .list_models()
        .await
        .ok()?
        .first()
        .map(|m| m.name.clone())
}

fn persist(settings: &AppSettings) {
    if let Err(e) = save_settings(settings) {
        tracing::warn!("failed to save settings: {e}");
    }
}
