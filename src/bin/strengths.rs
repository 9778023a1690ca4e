use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType},
};
use strengths_quiz::analysis::AnalysisClient;
use strengths_quiz::app::{AnalysisTicket, AnswerStep, Resolution};
use strengths_quiz::clients::{ClientType, FlexibleClient};
use strengths_quiz::config::AppConfig;
use strengths_quiz::core::LowLevelClient;
use strengths_quiz::error::{AnalysisError, AppError};
use strengths_quiz::render::{render_analyzing, render_screen};
use strengths_quiz::storage::FileStorage;
use strengths_quiz::{AnalysisReport, App, Choice, ClearOutcome, Confirm, QuestionBank, ResultStore, View};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Forced-choice strengths assessment with AI-generated reports", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    ANTHROPIC_API_KEY   API key for the Claude client
    DEEPSEEK_API_KEY    API key for the DeepSeek client
    STRENGTHS_DATA_DIR  Directory for saved results [default: ./.strengths]
    RUST_LOG            Log filter, logs go to stderr [default: warn]

EXAMPLES:
    strengths                         # Auto-detect client from available API keys
    strengths --client mock           # Offline run with a canned report
    strengths --client claude --model sonnet")]
struct Args {
    /// Analysis client: claude, deepseek, mock [default: auto-detect]
    #[arg(short, long)]
    client: Option<ClientType>,

    /// Model override for the selected client
    #[arg(short, long)]
    model: Option<String>,

    /// Directory holding saved results
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON file with a custom question bank
    #[arg(long)]
    questions: Option<PathBuf>,

    /// Give up on the analysis call after this many seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Status message rotation interval while analyzing
    #[arg(long, default_value_t = 2000)]
    status_interval_ms: u64,
}

impl Args {
    fn into_config(self) -> AppConfig {
        let mut config = AppConfig::default()
            .with_model(self.model)
            .with_questions_file(self.questions)
            .with_analysis_timeout(Duration::from_secs(self.timeout_secs))
            .with_status_interval(Duration::from_millis(self.status_interval_ms));
        if let Some(client) = self.client {
            config = config.with_client_type(client);
        }
        if let Some(dir) = self.data_dir {
            config = config.with_data_dir(dir);
        }
        config
    }
}

/// Yes/no prompt answered with a single keystroke; anything but `y` is no.
struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, message: &str) -> bool {
        print!("\n{message} (y/N): ");
        let _ = io::stdout().flush();
        let answer = matches!(read_key_blocking(), Ok(KeyCode::Char('y' | 'Y')));
        println!();
        answer
    }
}

/// Read one key press in raw mode. Ctrl-C is reported as `Esc`.
fn read_key_blocking() -> io::Result<KeyCode> {
    terminal::enable_raw_mode()?;
    let result = loop {
        match event::read() {
            Ok(Event::Key(KeyEvent { code, modifiers, kind, .. })) if kind == KeyEventKind::Press => {
                if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                    break Ok(KeyCode::Esc);
                }
                break Ok(code);
            }
            Ok(_) => continue,
            Err(e) => break Err(e),
        }
    };
    terminal::disable_raw_mode()?;
    result
}

async fn read_key() -> anyhow::Result<KeyCode> {
    Ok(tokio::task::spawn_blocking(read_key_blocking).await??)
}

/// Collect the digits of a history entry number, starting with `first`,
/// until Enter. Esc abandons the selection.
async fn read_entry_number(first: char) -> anyhow::Result<Option<usize>> {
    let mut digits = String::from(first);
    loop {
        print!("\rOpen entry: {digits} ");
        io::stdout().flush()?;
        match read_key().await? {
            KeyCode::Char(c) if c.is_ascii_digit() && digits.len() < 6 => digits.push(c),
            KeyCode::Backspace => {
                digits.pop();
            }
            KeyCode::Enter => return Ok(entry_index(&digits)),
            KeyCode::Esc => return Ok(None),
            _ => {}
        }
    }
}

/// Zero-based history index for a one-based entry number as shown on screen.
fn entry_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok()?.checked_sub(1)
}

fn draw(text: &str, notice: Option<&str>) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    if let Some(notice) = notice {
        writeln!(stdout, "! {notice}\n")?;
    }
    write!(stdout, "{text}")?;
    stdout.flush()
}

/// Drive the analyzing screen until the run resolves or the user cancels.
async fn analyze(
    app: &mut App<FileStorage>,
    client: &AnalysisClient<FlexibleClient>,
    ticket: AnalysisTicket,
) -> anyhow::Result<()> {
    let answers = ticket.answers().to_vec();
    let worker = client.clone();
    let mut call = tokio::spawn(async move { worker.analyze(&answers).await });
    let mut updates = app.status_updates();

    loop {
        if let Some(rx) = updates.as_mut() {
            let status = rx.borrow_and_update().clone();
            draw(&render_analyzing(&status), None)?;
        }

        let event = tokio::select! {
            joined = &mut call => AnalyzeEvent::Finished(joined.context("analysis task panicked")?),
            _ = tokio::signal::ctrl_c() => AnalyzeEvent::Cancelled,
            changed = async {
                match updates.as_mut() {
                    Some(rx) => rx.changed().await,
                    None => std::future::pending().await,
                }
            } => AnalyzeEvent::Status(changed.is_ok()),
        };

        match event {
            AnalyzeEvent::Finished(outcome) => {
                match app.resolve(ticket, outcome).await {
                    Resolution::Completed(id) => info!(%id, "Showing new result"),
                    Resolution::AnalysisFailed(e) => warn!(error = %e, "Analysis failed"),
                    Resolution::SaveFailed(e) => warn!(error = %e, "Result could not be saved"),
                    Resolution::Stale => {}
                }
                return Ok(());
            }
            AnalyzeEvent::Cancelled => {
                app.cancel_analysis()?;
                // The detached call finishes on its own; its outcome is dropped.
                return Ok(());
            }
            AnalyzeEvent::Status(true) => {}
            AnalyzeEvent::Status(false) => updates = None,
        }
    }
}

enum AnalyzeEvent {
    Finished(Result<AnalysisReport, AnalysisError>),
    Cancelled,
    Status(bool),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .try_init();

    let config = Args::parse().into_config();

    let bank = match &config.questions_file {
        Some(path) => QuestionBank::from_json_file(path)
            .with_context(|| format!("loading questions from {}", path.display()))?,
        None => QuestionBank::standard(),
    };
    let expected = bank.len();

    let storage = FileStorage::new(config.data_dir.clone());
    let store = ResultStore::load(storage, &config.history_key).await;
    let mut app = App::new(Arc::new(bank), store).with_status_interval(config.status_interval);

    let client = match config.analysis_client(expected) {
        Ok(client) => {
            info!(client = %client.client().describe(), "Analysis client ready");
            Some(client)
        }
        Err(e) => {
            app.disable_analysis(e.to_string());
            None
        }
    };

    let mut local_notice: Option<String> = None;
    loop {
        let notice = app.take_notice().or_else(|| local_notice.take());
        draw(&render_screen(&app.screen()), notice.as_deref())?;

        let key = read_key().await?;
        let step: Result<(), AppError> = match (app.view(), key) {
            (View::Landing, KeyCode::Char('q') | KeyCode::Esc) => break,
            (View::Landing, KeyCode::Char('s')) => app.start(),
            (View::Landing | View::Result, KeyCode::Char('h')) => app.view_history(),
            (View::Quiz, KeyCode::Char(c @ ('a' | 'b' | 'A' | 'B'))) => {
                let choice = if c.eq_ignore_ascii_case(&'a') { Choice::A } else { Choice::B };
                match app.answer(choice) {
                    Ok(AnswerStep::Next) => Ok(()),
                    Ok(AnswerStep::Analyze(ticket)) => {
                        match &client {
                            Some(client) => analyze(&mut app, client, ticket).await?,
                            None => app.cancel_analysis()?,
                        }
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            (View::Quiz, KeyCode::Esc) => break,
            (View::Result, KeyCode::Char('r')) => app.restart(),
            (View::Result | View::History, KeyCode::Char('b') | KeyCode::Esc) => app.back(),
            (View::History, KeyCode::Char(c @ '1'..='9')) => match read_entry_number(c).await? {
                Some(index) => app.select_history(index).map(|_| ()),
                None => Ok(()),
            },
            (View::History, KeyCode::Char('c')) => match app.clear_history(&TerminalConfirm).await {
                Ok(ClearOutcome::Cleared) => {
                    local_notice = Some("History cleared.".to_string());
                    Ok(())
                }
                Ok(_) => Ok(()),
                Err(e) => Err(e),
            },
            _ => Ok(()),
        };

        if let Err(e) = step {
            warn!(error = %e, "Action rejected");
            local_notice = Some(e.to_string());
        }
    }

    Ok(())
}
