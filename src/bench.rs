use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::accel::AccelerationChoice;
use crate::camera::TraceAlgorithm;

/// Render statistics written to `Efficiency_results/<algorithm>_<accel>_efficiency.txt`,
/// mirroring the reference benchmark harness's render-time / throughput /
/// RSS columns (§6).
pub struct RenderStats {
    pub render_time: Duration,
    pub pixel_count: u64,
    pub peak_rss_mb: f64,
}

impl RenderStats {
    pub fn pixels_per_second(&self) -> f64 {
        self.pixel_count as f64 / self.render_time.as_secs_f64()
    }
}

/// Best-effort resident set size in megabytes, read from `/proc/self/status`.
/// Returns `0.0` on platforms without a `/proc` filesystem rather than
/// failing the render — this is a diagnostic number, not a hard dependency.
pub fn current_rss_mb() -> f64 {
    let status = match fs::read_to_string("/proc/self/status") {
        Ok(s) => s,
        Err(_) => return 0.0,
    };
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kb: f64 = rest.trim().trim_end_matches(" kB").trim().parse().unwrap_or(0.0);
            return kb / 1024.0;
        }
    }
    0.0
}

pub fn write_efficiency_report(
    dir: &Path,
    accel: AccelerationChoice,
    algorithm: TraceAlgorithm,
    stats: &RenderStats,
) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let algo_name = match algorithm {
        TraceAlgorithm::RayTracing => "raytracing",
        TraceAlgorithm::PathTracing => "pathtracing",
    };
    let accel_name = match accel {
        AccelerationChoice::Bvh => "bvh",
        AccelerationChoice::MeshBvh => "mesh_bvh",
        AccelerationChoice::KdTree => "kd_tree",
        AccelerationChoice::Grid => "grid",
        AccelerationChoice::None => "none",
    };
    let path = dir.join(format!("{algo_name}_{accel_name}_efficiency.txt"));
    let mut file = fs::File::create(path)?;
    writeln!(file, "Render time: {:.4} s", stats.render_time.as_secs_f64())?;
    writeln!(file, "Pixels per second: {:.2}", stats.pixels_per_second())?;
    writeln!(file, "Peak RAM usage: {:.2} MB", stats.peak_rss_mb)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_per_second_matches_closed_form() {
        let stats = RenderStats {
            render_time: Duration::from_secs(2),
            pixel_count: 1000,
            peak_rss_mb: 12.0,
        };
        assert!((stats.pixels_per_second() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn current_rss_mb_never_panics() {
        let _ = current_rss_mb();
    }
}
