use crate::device::{PrimitiveType, Stats};

/// Writes one frame's draw statistics to the log.
///
/// This is the diagnostics sink driven by `RenderManager::process_stats`.
pub fn log_stats(frame: u64, stats: &Stats) {
    log::debug!(
        "frame {frame}: {} draw-arrays calls, {} draw-elements calls",
        stats.draw_arrays_calls,
        stats.draw_elements_calls
    );
    for primitive in PrimitiveType::ALL {
        let count = stats.primitives(primitive);
        if count > 0 {
            log::debug!("frame {frame}:   {primitive:?}: {count}");
        }
    }
}

