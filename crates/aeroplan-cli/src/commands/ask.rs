use crate::app::App;
use aeroplan_core::config::AppConfig;
use aeroplan_core::session::ConversationSession;
use anyhow::Result;

/// Answers one question in a fresh session.
pub async fn run(config: AppConfig, question: String) -> Result<()> {
    let app = App::build(config)?;
    app.sweep().await;

    let session = ConversationSession::shared(app.config.memory.window);
    app.answer(&question, session).await
}
