//! services/client/src/bin/client.rs

use client_lib::{
    adapters::{FileProfileStore, HttpTutorBackend, NoopSpeech},
    config::Config,
    error::AppError,
    session::ConversationController,
};
use std::sync::Arc;
use study_tutor_core::domain::Role;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting client...");

    // --- 2. Initialize Service Adapters ---
    let backend = Arc::new(HttpTutorBackend::new(
        config.backend_base_url.clone(),
        config.request_timeout,
    ));
    let profile = Arc::new(FileProfileStore::new(config.profile_path.clone()));
    let speech = Arc::new(NoopSpeech);

    // --- 3. Build the Controller and Restore Cached State ---
    let mut controller = ConversationController::new(backend, profile)
        .with_speech(speech.clone(), speech);
    controller.startup().await;

    if let Some(user) = &controller.state().user {
        println!("Welcome back, {}!", user.name);
    }
    println!("Tutoring backend: {}", config.backend_base_url);
    println!("Type /help for commands.");

    // --- 4. Run the Input Loop ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if !handle_line(&mut controller, &line).await {
            break;
        }
    }

    info!("Client exiting.");
    Ok(())
}

/// Dispatches one input line. Returns `false` when the user asked to quit.
async fn handle_line(controller: &mut ConversationController, line: &str) -> bool {
    match line.split_whitespace().next().unwrap_or("") {
        "/quit" => return false,
        "/help" => {
            println!("/study <title>        start a new study");
            println!("/switch <number>      switch study (see /list)");
            println!("/list                 list studies by subject");
            println!("/login <name> <email> log in");
            println!("/logout               log out");
            println!("/theme                toggle light/dark theme");
            println!("/health               probe the backend");
            println!("/dictate              capture a spoken message");
            println!("/quit                 exit");
            return true;
        }
        "/study" => {
            let title = line.trim_start_matches("/study").trim();
            if title.is_empty() {
                println!("Usage: /study <title>");
                return true;
            }
            controller.start_new_study(title).await;
            print_conversation(controller);
            return true;
        }
        "/switch" => {
            let arg = line.trim_start_matches("/switch").trim();
            match arg.parse::<usize>().ok().and_then(|n| nth_study(controller, n)) {
                Some(id) => {
                    controller.switch_to(id).await;
                    print_conversation(controller);
                }
                None => println!("Usage: /switch <number from /list>"),
            }
            return true;
        }
        "/list" => {
            list_studies(controller);
            return true;
        }
        "/login" => {
            let mut parts = line.split_whitespace().skip(1);
            match (parts.next(), parts.next()) {
                (Some(name), Some(email)) => {
                    controller.login(name, email).await;
                    println!("Logged in as {name}.");
                }
                _ => println!("Usage: /login <name> <email>"),
            }
            return true;
        }
        "/logout" => {
            controller.logout().await;
            println!("Logged out.");
            return true;
        }
        "/theme" => {
            controller.toggle_theme().await;
            println!("Theme: {}", controller.state().theme.as_str());
            return true;
        }
        "/health" => {
            let reachable = controller.probe_health().await;
            println!(
                "Backend is {}.",
                if reachable { "reachable" } else { "unreachable" }
            );
            return true;
        }
        "/dictate" => {
            controller.dictate().await;
            let draft = controller.state().draft.clone();
            if draft.is_empty() {
                println!("Nothing captured.");
            } else {
                let before = controller.state().active_messages.len();
                controller.send_message(&draft).await;
                print_new_messages(controller, before);
            }
            return true;
        }
        _ => {
            let before = controller.state().active_messages.len();
            controller.send_message(line).await;
            print_new_messages(controller, before);
        }
    }
    true
}

/// Resolves the 1-based index shown by `/list` to a study id.
fn nth_study(controller: &ConversationController, n: usize) -> Option<Uuid> {
    controller
        .state()
        .directory
        .studies()
        .nth(n.checked_sub(1)?)
        .map(|s| s.id)
}

fn list_studies(controller: &ConversationController) {
    let mut index = 0;
    for group in controller.state().directory.groups() {
        println!("{} {}", group.icon(), group.name());
        for study in &group.studies {
            index += 1;
            let marker = if controller.state().active_study == Some(study.id) {
                "*"
            } else {
                " "
            };
            println!(
                " {marker}{index}. {} (progress {}%, {} answered)",
                study.title, study.progress, study.questions_answered
            );
        }
    }
    if index == 0 {
        println!("No studies yet. Start one with /study <title>.");
    }
}

/// Prints the messages a command appended to the active conversation.
fn print_new_messages(controller: &ConversationController, before: usize) {
    for message in controller.state().active_messages.iter().skip(before) {
        print_message(message);
    }
}

/// Prints the active study's full conversation, e.g. after a switch.
fn print_conversation(controller: &ConversationController) {
    if let Some(study) = controller.active_study() {
        println!("--- {} {} ---", study.subject.icon(), study.title);
    }
    for message in &controller.state().active_messages {
        print_message(message);
    }
}

fn print_message(message: &study_tutor_core::domain::Message) {
    match message.role {
        Role::User => println!("you> {}", message.content),
        Role::Ai => println!("tutor> {}", message.content),
    }
}
