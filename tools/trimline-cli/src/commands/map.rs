//! Show how a trim range maps between frame spaces.

use trimline_timeline_model::frames::FrameMapping;
use trimline_timeline_model::trim::TrimRange;

pub fn run(total: u64, start: u64, end: Option<u64>, frame: Option<u64>) -> anyhow::Result<()> {
    let end = end.unwrap_or(total);
    let range = TrimRange::validated(start, end, total, 1)
        .map_err(|e| anyhow::anyhow!("Invalid trim range: {e}"))?;
    let mapping = FrameMapping::new(range, total);

    println!("Trim [{}, {}) of {} frames", range.start_frame, range.end_frame, total);
    println!("  Active: {}", mapping.is_active());
    println!("  Player frame 0 is source frame {}", mapping.window_start());
    println!("  Player duration: {} frames", mapping.player_duration());
    match mapping.engine_window() {
        Some(window) => println!(
            "  Engine window: startFrom={} endAt={}",
            window.start_from, window.end_at
        ),
        None => println!("  Engine window: full source"),
    }

    if let Some(source_frame) = frame {
        let player_frame = mapping.to_player(source_frame);
        println!();
        println!("Source frame {source_frame}:");
        println!("  Player frame: {player_frame}");
        println!("  Back to source: {}", mapping.to_source(player_frame));
        if mapping.is_active() && !range.contains(source_frame) {
            println!("  (outside the trim window; clamped)");
        }
    }

    Ok(())
}
