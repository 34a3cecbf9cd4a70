//! `huddle generate` and `huddle promote`: the two commands that call the
//! configured generator.

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use huddle_core::PlanBook;
use huddle_core::generate::{
    Horizon, PROMOTION_FAILURE_TEXT, PlanRequest, Planner, PromotionKind, PromotionRequest,
    generate_plans, generate_promotion,
};
use huddle_core::media::{MediaLibrary, NewMedia};
use huddle_core::store::Completion;
use huddle_db::SnapshotStore;

use crate::config::HuddleConfig;
use crate::plan_cmds::print_results;

/// Arguments to `huddle generate`.
#[derive(Debug)]
pub struct GenerateOptions {
    pub planner: Planner,
    pub horizon: Horizon,
    pub category: Option<String>,
    pub details: Option<String>,
}

/// Arguments to `huddle promote`.
#[derive(Debug)]
pub struct PromoteOptions {
    pub kind: PromotionKind,
    pub context: Option<String>,
    pub plan: Option<String>,
    pub tone: Option<String>,
    pub platform: Option<String>,
    pub message_type: Option<String>,
    pub save: bool,
    pub category: Option<String>,
}

// -----------------------------------------------------------------------
// huddle generate
// -----------------------------------------------------------------------

/// Replace the current results with freshly generated plans.
pub async fn run_generate(
    config: &HuddleConfig,
    store: Arc<dyn SnapshotStore>,
    options: GenerateOptions,
) -> Result<()> {
    let mut request = PlanRequest::new(options.planner);
    if let Some(category) = options.category {
        request.category = category;
    }
    if let Some(details) = options.details {
        request.details = details;
    }
    request.horizon = options.horizon;

    if options.planner != Planner::Event && options.horizon != Horizon::Single {
        eprintln!("note: --horizon only applies to the event planner; generating a single plan");
    }

    // Reject an incomplete request before the current results are cleared.
    request.prompt(&config.audience)?;

    let generator = config.command_generator();
    let mut book = PlanBook::open_with_results_cache(store);
    let ticket = book.begin_request()?;
    book.set_active_context(request.context_title());

    println!(
        "Generating {} plans with `{}`...",
        request.planner,
        generator.command()
    );
    let outcome = generate_plans(&generator, &config.audience, &request).await;

    match book.complete_request(ticket, outcome) {
        Completion::Applied(_) => {
            print_results(&book);
            println!();
            println!("Use `huddle save <n>` to keep a plan.");
            Ok(())
        }
        Completion::Stale => bail!("the generated plans were discarded because the view was reset"),
        Completion::Failed(e) => Err(e).context("plan generation failed"),
    }
}

// -----------------------------------------------------------------------
// huddle promote
// -----------------------------------------------------------------------

/// Generate promotional text, print it, and optionally file it in the
/// media library.
///
/// With `--plan`, the saved plan supplies the default context and its
/// title becomes the media category unless `--category` is given.
pub async fn run_promote(
    config: &HuddleConfig,
    store: Arc<dyn SnapshotStore>,
    options: PromoteOptions,
) -> Result<()> {
    let (context, active_context) = match &options.plan {
        Some(id) => {
            let book = PlanBook::open(store.clone());
            let plan = book.find_saved(id)?;
            let context = options
                .context
                .clone()
                .unwrap_or_else(|| format!("{}: {}", plan.title, plan.description));
            (context, Some(plan.title.clone()))
        }
        None => (options.context.clone().unwrap_or_default(), None),
    };

    let mut request = PromotionRequest::new(options.kind, context);
    if let Some(tone) = options.tone {
        request.tone = tone;
    }
    if let Some(platform) = options.platform {
        request.platform = platform;
    }
    if let Some(message_type) = options.message_type {
        request.message_type = message_type;
    }

    let generator = config.command_generator();
    let text = generate_promotion(&generator, &config.audience, &request)
        .await
        .context("use --context or --plan to say what to promote")?;
    println!("{text}");

    if !options.save {
        return Ok(());
    }
    if text == PROMOTION_FAILURE_TEXT {
        bail!("nothing saved: the generator did not produce any text");
    }

    let mut library = MediaLibrary::open(store);
    let item = library.save(
        NewMedia {
            kind: options.kind.media_kind(),
            content: text,
            context: request.context,
            title: None,
            category: options.category,
        },
        active_context.as_deref(),
    )?;

    println!();
    println!(
        "Saved to media library: \"{}\" in {} ({}).",
        item.title,
        item.category_or_default(),
        item.id.get(..8).unwrap_or(&item.id)
    );
    Ok(())
}
