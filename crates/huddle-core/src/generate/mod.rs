//! Text generation: prompts, the generator adapter interface, and response
//! parsing.
//!
//! ```text
//! PlanRequest ──prompt()──▶ Generator::generate ──▶ parse_plan_response ──▶ Vec<PlanningItem>
//! PromotionRequest ──prompt()──▶ Generator::generate ──▶ String
//! ```

pub mod command;
pub mod parser;
pub mod prompts;
pub mod trait_def;

use tracing::{debug, warn};

use huddle_db::models::PlanningItem;

pub use command::CommandGenerator;
pub use parser::{PlanResponseError, parse_plan_response};
pub use prompts::{
    Audience, Horizon, PlanRequest, Planner, PlannerInfo, PromotionKind, PromotionRequest,
    load_planners, planner_info,
};
pub use trait_def::Generator;

/// Shown in place of promotional text when generation fails.
pub const PROMOTION_FAILURE_TEXT: &str = "Error generating text. Please try again.";

/// Errors from generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("failed to start generator {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("generator {command:?} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("generator {command:?} timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("generator I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not read generated plans: {0}")]
    Parse(#[from] PlanResponseError),

    #[error("describe the event or topic first")]
    MissingContext,
}

/// Ask `generator` for plans and decode them.
///
/// All returned items are ephemeral. Nothing partial is returned on error.
pub async fn generate_plans(
    generator: &dyn Generator,
    audience: &Audience,
    request: &PlanRequest,
) -> Result<Vec<PlanningItem>, GenerateError> {
    let prompt = request.prompt(audience)?;
    debug!(
        generator = generator.name(),
        planner = %request.planner,
        horizon = %request.horizon(),
        "requesting plans"
    );
    let text = generator
        .generate(&audience.plan_system_instruction(), &prompt)
        .await?;
    let items = parse_plan_response(&text)?;
    debug!(count = items.len(), "plans generated");
    Ok(items)
}

/// Ask `generator` for promotional text.
///
/// A missing context is an error. Any generation failure is logged and
/// replaced by [`PROMOTION_FAILURE_TEXT`], so callers always get text to
/// show.
pub async fn generate_promotion(
    generator: &dyn Generator,
    audience: &Audience,
    request: &PromotionRequest,
) -> Result<String, GenerateError> {
    let prompt = request.prompt(audience)?;
    debug!(generator = generator.name(), kind = %request.kind, "requesting promotion text");
    match generator
        .generate(&audience.text_system_instruction(), &prompt)
        .await
    {
        Ok(text) => Ok(text.trim().to_owned()),
        Err(e) => {
            warn!(error = %e, "promotion generation failed");
            Ok(PROMOTION_FAILURE_TEXT.to_owned())
        }
    }
}
