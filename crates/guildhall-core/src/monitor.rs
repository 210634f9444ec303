//! Periodic health check of a running simulation.

use std::time::Duration;

use tracing::info;

use crate::control::EndReason;
use crate::generators::BackgroundContext;

/// Every `every`, log a one-line summary and end the run once an end
/// condition holds.
pub(crate) async fn monitor(ctx: BackgroundContext, every: Duration) {
    while ctx.control.pace(every).await {
        log_summary(&ctx);
        if let Some(reason) = end_condition(&ctx) {
            if ctx.control.finish(reason.clone()).await {
                ctx.narrate(format!("The tale ends: {reason}."));
            }
            break;
        }
    }
    info!("monitor stopped");
}

/// The first end condition that holds: a decided outcome, a fallen party,
/// then the wall-clock limit.
pub(crate) fn end_condition(ctx: &BackgroundContext) -> Option<EndReason> {
    if let Some(outcome) = ctx.world.evaluate_outcome() {
        return Some(EndReason::Decided { outcome });
    }
    if ctx.heroes.iter().all(|hero| !hero.is_alive()) {
        return Some(EndReason::AllHeroesFallen);
    }
    if ctx.control.time_limit_reached() {
        return Some(EndReason::TimeLimitReached);
    }
    None
}

fn log_summary(ctx: &BackgroundContext) {
    let world = ctx.world.status();
    let alive = ctx.heroes.iter().filter(|hero| hero.is_alive()).count();
    info!(
        stability = world.stability,
        corruption = world.corruption,
        phase = world.phase,
        heroes_alive = alive,
        mana_pool = ctx.store.mana().level(),
        loot_queued = ctx.store.loot().len(),
        elapsed_seconds = ctx.control.elapsed_seconds(),
        "monitor"
    );
}
