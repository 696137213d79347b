//! Headless skirmish loop.
//!
//! Demonstrates: build a profile → step with synthetic controls → read
//! step reports → clear the room → repeat. Set `RUST_LOG=volley_engine=debug`
//! to watch reloads, jams, and deaths.

use tracing_subscriber::EnvFilter;
use volley_bench::skirmish_profile;
use volley_core::HookKind;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("=== Volley Headless Skirmish ===\n");

    let mut skirmish = skirmish_profile(42, 48);
    println!(
        "Room 1: {} fighters on a {}x{} grid",
        skirmish.fighters.len(),
        skirmish.context.grid().width(),
        skirmish.context.grid().height(),
    );

    let mut shots = 0u32;
    let mut hits = 0u32;
    let mut kills = 0u32;
    for tick in 0..600 {
        let report = skirmish.tick(tick);
        shots += report.metrics.shots_fired;
        hits += report.metrics.projectile_hits;
        kills += report.metrics.kills;

        if tick % 120 == 0 || tick == 599 {
            println!(
                "  tick {:>3}: alive={:>2}, projectiles={:>4}, shots={:>5}, hits={:>5}, kills={:>2}, reloads={:>2}, time={:>6}μs",
                report.tick,
                skirmish.context.entities().len(),
                skirmish.context.projectiles().len(),
                shots,
                hits,
                kills,
                report.count(HookKind::OnReloadStart),
                report.metrics.total_us,
            );
        }
    }

    let top = skirmish
        .fighters
        .iter()
        .filter_map(|&h| skirmish.context.entity(h))
        .max_by(|a, b| a.damage_dealt.total_cmp(&b.damage_dealt));
    if let Some(best) = top {
        println!(
            "\nTop survivor: serial {} dealt {:.0} damage ({} hp left)",
            best.serial, best.damage_dealt, best.health
        );
    }

    // --- Room transition ---
    skirmish.context.clear_room();
    let stale = skirmish
        .fighters
        .iter()
        .filter(|&&h| skirmish.context.entity(h).is_some())
        .count();
    println!(
        "\nAfter clear_room: entities={}, stale handles still resolving={}",
        skirmish.context.entities().len(),
        stale
    );
}
