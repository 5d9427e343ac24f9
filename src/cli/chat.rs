use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::{ChatInput, exchange, list_turns};
use crate::core::AppConfig;
use crate::core::db::{async_db, initialize_db};
use crate::openai::OpenAiCompleter;

/// Chat from the terminal. Messages are stored the same way as
/// messages sent through the web UI so they show up in its history.
pub async fn run(config: AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    if !config.has_api_key() {
        println!("Warning: OPENROUTER_API_KEY is not set, replies will fail");
    }

    let db = async_db(&config.db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;

    let completer = OpenAiCompleter::new(&config);

    let previous = list_turns(&db).await?.len();
    if previous > 0 {
        println!("Continuing a conversation with {} messages", previous);
    }

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                let result = exchange(
                    &db,
                    &completer,
                    &config.uploads_path,
                    ChatInput::from_message(&line),
                )
                .await?;
                println!("{}", result.reply());
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
