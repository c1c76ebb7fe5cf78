use crate::app::App;
use aeroplan_core::config::AppConfig;
use aeroplan_core::session::ConversationSession;
use anyhow::Result;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Interactive loop sharing one session across turns.
pub async fn run(config: AppConfig) -> Result<()> {
    let app = App::build(config)?;
    let session = ConversationSession::shared(app.config.memory.window);
    let mut rl = DefaultEditor::new()?;

    println!("{}", "=== AEROPLAN ===".bright_magenta().bold());
    println!(
        "{}",
        "The knowledge graph question answering system has been launched. Enter 'exit' or 'quit' to exit."
            .bright_black()
    );

    loop {
        match rl.readline("\nUser query: ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                app.sweep().await;
                if let Err(err) = app.answer(trimmed, session.clone()).await {
                    eprintln!("{}", format!("Error: {err:#}").red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
