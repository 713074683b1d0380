//! Interactive slot editor for `cb edit`

mod session;

pub use session::{EditSession, Outcome};

use eyre::Result;
use tracing::debug;

use crate::app::App;

/// Run the interactive editor on one progression
pub async fn run_editor(app: &App, progression_id: &str) -> Result<()> {
    debug!(%progression_id, "run_editor: called");
    let mut session = EditSession::load(app, progression_id).await?;
    session.run().await
}
