//! Interactive assistant session: the chat transcript plus the CRM side
//! panel (lead summary, notes, scheduling, profile) driven by slash
//! commands.

use std::io::Write as _;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use leadline_agent::{Authenticator, LocalAuthenticator, Orchestrator, SharedSession};
use leadline_core::config::{AppConfig, LoadOptions};
use leadline_core::{
    LeadRecord, Meeting, Note, SessionState, Suggestion, UserProfile,
};
use leadline_gateway::{GeminiGateway, ModelGateway};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::CommandResult;

const HELP: &str = "Commands:\n  /lead              show the lead summary\n  /notes             list notes (newest first)\n  /note <text>       add a note\n  /meetings          list scheduled meetings\n  /meet <YYYY-MM-DD> <HH:MM> [title]  schedule a meeting\n  /profile           show your profile\n  /name <new name>   update your display name\n  /logout            sign out and return to the sign-in prompt\n  /quit              end the session\nAnything else is sent to the assistant; a bare number sends that suggestion.";

type InputLines = Lines<BufReader<Stdin>>;

pub fn run() -> CommandResult {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::failure("chat", "runtime", error.to_string(), 1),
    };
    runtime.block_on(run_chat())
}

fn init_logging(config: &AppConfig) {
    use leadline_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

async fn run_chat() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("chat", "configuration", error.to_string(), 1)
        }
    };
    init_logging(&config);

    let gateway = match GeminiGateway::from_config(&config.gemini) {
        Ok(gateway) => Arc::new(gateway) as Arc<dyn ModelGateway>,
        Err(error) => return CommandResult::failure("chat", "gateway", error.to_string(), 1),
    };

    let session: SharedSession = Arc::new(tokio::sync::Mutex::new(SessionState::new()));
    let orchestrator = Orchestrator::new(gateway, Arc::clone(&session), &config.session);
    let authenticator = LocalAuthenticator::from_delay_ms(config.session.login_delay_ms);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    'session: loop {
        let Some(profile) = sign_in(&authenticator, &mut lines).await else {
            break 'session;
        };
        let greeting_name = profile.name.clone();
        session.lock().await.sign_in(profile);

        println!();
        println!(
            "Hello {greeting_name}! I can help you qualify leads, schedule meetings, and manage \
             your notes. Who are we speaking with today? (/help for commands)"
        );

        loop {
            {
                let session = session.lock().await;
                let rendered = render_suggestions(session.suggestions());
                if !rendered.is_empty() {
                    println!("{rendered}");
                }
            }

            let Some(line) = read_line(&mut lines, "> ").await else {
                break 'session;
            };
            let input = line.trim().to_string();
            if input.is_empty() {
                continue;
            }

            if let Some(command) = input.strip_prefix('/') {
                match handle_command(&session, command).await {
                    LineAction::Continue => continue,
                    LineAction::Logout => {
                        session.lock().await.sign_out();
                        continue 'session;
                    }
                    LineAction::Quit => break 'session,
                }
            }

            let text = {
                let session = session.lock().await;
                match suggestion_index(&input, session.suggestions().len()) {
                    Some(index) => session.suggestions()[index].action.clone(),
                    None => input,
                }
            };

            send_message(&orchestrator, &text).await;
        }
    }

    CommandResult::success("chat", "session ended")
}

async fn sign_in(authenticator: &LocalAuthenticator, lines: &mut InputLines) -> Option<UserProfile> {
    println!("Sign in to Leadline.");
    loop {
        let email = read_line(lines, "Email: ").await?;
        let password = read_line(lines, "Password: ").await?;

        print!("Signing in...");
        let _ = std::io::stdout().flush();

        match authenticator.authenticate(&email, &password).await {
            Ok(profile) => {
                println!(" done.");
                return Some(profile);
            }
            Err(error) => println!(" failed: {error}"),
        }
    }
}

async fn send_message(orchestrator: &Orchestrator, text: &str) {
    println!("you: {text}");
    println!("assistant is typing...");

    match orchestrator.handle_user_turn(text).await {
        Ok(receipt) => {
            println!("assistant: {}", receipt.reply.text);
            // Enrichment continues in the background; results show up in
            // /lead and the suggestion list as they land.
            drop(receipt.background);
        }
        Err(error) => println!("could not send message: {error}"),
    }
}

enum LineAction {
    Continue,
    Logout,
    Quit,
}

async fn handle_command(session: &SharedSession, command: &str) -> LineAction {
    let (name, args) = match command.split_once(' ') {
        Some((name, args)) => (name, args.trim()),
        None => (command, ""),
    };

    match name {
        "help" => println!("{HELP}"),
        "lead" => println!("{}", render_lead(session.lock().await.lead())),
        "notes" => println!("{}", render_notes(session.lock().await.notes())),
        "note" => match session.lock().await.add_note(args) {
            Ok(note) => println!("note added: {}", note.text),
            Err(error) => println!("could not add note: {error}"),
        },
        "meetings" => println!("{}", render_meetings(session.lock().await.meetings())),
        "meet" => match parse_meeting_args(args) {
            Ok((date, time, title)) => {
                let meeting = session.lock().await.schedule_meeting(&title, date, time);
                println!(
                    "meeting scheduled: {} on {} at {} with {}",
                    meeting.title,
                    meeting.date,
                    meeting.time.format("%H:%M"),
                    meeting.participants.join(", ")
                );
            }
            Err(message) => println!("{message}"),
        },
        "profile" => match session.lock().await.profile() {
            Some(profile) => println!("{}", render_profile(profile)),
            None => println!("no user is signed in"),
        },
        "name" => {
            if args.is_empty() {
                println!("usage: /name <new display name>");
            } else {
                let mut session = session.lock().await;
                match session.profile().cloned() {
                    Some(mut profile) => {
                        profile.name = args.to_string();
                        match session.update_profile(profile) {
                            Ok(()) => {
                                if let Some(profile) = session.profile() {
                                    println!(
                                        "profile updated: {} ({})",
                                        profile.name, profile.avatar_initials
                                    );
                                }
                            }
                            Err(error) => println!("could not update profile: {error}"),
                        }
                    }
                    None => println!("no user is signed in"),
                }
            }
        }
        "logout" => return LineAction::Logout,
        "quit" | "exit" => return LineAction::Quit,
        other => println!("unknown command `/{other}` (/help for commands)"),
    }

    LineAction::Continue
}

async fn read_line(lines: &mut InputLines, prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = std::io::stdout().flush();
    lines.next_line().await.ok().flatten()
}

/// `<YYYY-MM-DD> <HH:MM> [title]`; the title defaults in the store when
/// omitted.
fn parse_meeting_args(args: &str) -> Result<(NaiveDate, NaiveTime, String), String> {
    let usage = "usage: /meet <YYYY-MM-DD> <HH:MM> [title]";
    let mut parts = args.splitn(3, ' ');

    let date_raw = parts.next().filter(|part| !part.is_empty()).ok_or(usage)?;
    let time_raw = parts.next().ok_or(usage)?;
    let title = parts.next().unwrap_or("").to_string();

    let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date `{date_raw}` (expected YYYY-MM-DD)"))?;
    let time = NaiveTime::parse_from_str(time_raw, "%H:%M")
        .map_err(|_| format!("invalid time `{time_raw}` (expected HH:MM)"))?;

    Ok((date, time, title))
}

/// A bare 1-based number selects the corresponding suggestion.
fn suggestion_index(input: &str, count: usize) -> Option<usize> {
    let index = input.parse::<usize>().ok()?;
    (1..=count).contains(&index).then(|| index - 1)
}

fn render_lead(lead: &LeadRecord) -> String {
    format!(
        "Lead: {} ({})\n  Score: {}/100\n  Company: {}\n  Email: {}\n  Phone: {}\n  Summary: {}",
        lead.name,
        lead.status.as_str(),
        lead.score,
        lead.company,
        lead.email,
        lead.phone,
        lead.summary
    )
}

fn render_notes(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "No notes yet. Add one with /note <text>.".to_string();
    }
    notes
        .iter()
        .map(|note| format!("- [{}] {}", note.created_at.format("%Y-%m-%d %H:%M"), note.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_meetings(meetings: &[Meeting]) -> String {
    if meetings.is_empty() {
        return "No meetings scheduled.".to_string();
    }
    meetings
        .iter()
        .map(|meeting| {
            format!(
                "- {} on {} at {} ({})",
                meeting.title,
                meeting.date,
                meeting.time.format("%H:%M"),
                meeting.participants.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_profile(profile: &UserProfile) -> String {
    format!(
        "{} [{}]\n  Email: {}\n  Title: {}\n  Presence: {}",
        profile.name,
        profile.avatar_initials,
        profile.email,
        profile.job_title,
        profile.presence.as_str()
    )
}

fn render_suggestions(suggestions: &[Suggestion]) -> String {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, suggestion)| format!("  [{}] {}", i + 1, suggestion.label))
        .collect::<Vec<_>>()
        .join("\n")
}
