//! Human-readable rendering of fused records and status reports.

use std::fmt::Write;

use trackfuse::adapter::CircuitState;
use trackfuse::orchestrator::ClassStatus;
use trackfuse::record::{AircraftRecord, FusedRecord, SourceId, VesselRecord};
use trackfuse::service::{SourceStatus, StatusReport};

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn sources(list: &[SourceId]) -> String {
    list.iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Aircraft table.
pub fn aircraft_table(records: &[FusedRecord<AircraftRecord>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Aircraft ({})", records.len());
    let _ = writeln!(
        out,
        "  {:<7} {:<8} {:>9} {:>10} {:>7} {:>5} {:>5} {:>4}  Sources",
        "Hex", "Callsign", "Lat", "Lon", "Alt ft", "Kts", "Trk", "Q"
    );
    for fused in records {
        let r = &fused.record;
        let _ = writeln!(
            out,
            "  {:<7} {:<8} {:>9.4} {:>10.4} {:>7} {:>5} {:>5} {:>4.2}  {}",
            fused.identity,
            r.callsign.as_deref().unwrap_or("-"),
            r.position.latitude,
            r.position.longitude,
            optional(r.altitude_ft.map(|a| a.round() as i64)),
            optional(r.ground_speed_kts.map(|s| s.round() as i64)),
            optional(r.track_deg.map(|t| t.round() as i64)),
            fused.data_quality,
            sources(&fused.contributing_sources)
        );
    }
    out
}

/// Vessel table.
pub fn vessel_table(records: &[FusedRecord<VesselRecord>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Vessels ({})", records.len());
    let _ = writeln!(
        out,
        "  {:<9} {:<20} {:>9} {:>10} {:>5} {:>5} {:>4}  Sources",
        "MMSI", "Name", "Lat", "Lon", "Kts", "Cog", "Q"
    );
    for fused in records {
        let r = &fused.record;
        let _ = writeln!(
            out,
            "  {:<9} {:<20} {:>9.4} {:>10.4} {:>5} {:>5} {:>4.2}  {}",
            fused.identity,
            r.name.as_deref().unwrap_or("-"),
            r.position.latitude,
            r.position.longitude,
            optional(r.speed_kts.map(|s| format!("{:.1}", s))),
            optional(r.course_deg.map(|c| c.round() as i64)),
            fused.data_quality,
            sources(&fused.contributing_sources)
        );
    }
    out
}

fn source_line(status: &SourceStatus) -> String {
    let health = &status.health;
    let circuit = match health.circuit_state {
        CircuitState::Open => format!(
            "{} ({}s)",
            health.circuit_state.display_status(),
            health.cooldown_remaining_ms.unwrap_or(0).div_ceil(1000)
        ),
        _ => health.circuit_state.display_status().to_string(),
    };
    format!(
        "  {:<15} {:<9} {:<13} {:>7} {:>4} {:>6} {:>7}  {}",
        status.source.as_str(),
        status.mode.to_string(),
        circuit,
        optional(health.success_rate.map(|r| format!("{:.0}%", r * 100.0))),
        health.consecutive_failures,
        health.last_record_count,
        optional(health.last_latency_ms.map(|ms| format!("{}ms", ms))),
        health.last_error.as_deref().unwrap_or("")
    )
}

fn class_line(status: &ClassStatus) -> String {
    let mut line = format!(
        "  {:<9} cycles {:>4}  sources {}/{} with data  collected {:>5}  fused {:>5}",
        status.class.as_str(),
        status.cycles,
        status.sources_with_data,
        status.sources_attempted,
        status.last_collected,
        status.last_fused
    );
    if status.all_sources_empty && status.cycles > 0 {
        let _ = write!(
            line,
            "  ALL SOURCES EMPTY ({} in a row)",
            status.consecutive_empty_cycles
        );
    }
    line
}

/// Status report as text.
pub fn status_report(report: &StatusReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Source Status ({})",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "=============");
    let _ = writeln!(
        out,
        "  {:<15} {:<9} {:<13} {:>7} {:>4} {:>6} {:>7}  Last error",
        "Source", "Mode", "Circuit", "Success", "Fail", "Recs", "Latency"
    );
    for source in &report.sources {
        let _ = writeln!(out, "{}", source_line(source));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Cycles");
    let _ = writeln!(out, "======");
    let _ = writeln!(out, "{}", class_line(&report.aircraft));
    let _ = writeln!(out, "{}", class_line(&report.vessel));
    let _ = writeln!(out);
    let t = &report.telemetry;
    let _ = writeln!(
        out,
        "Telemetry: {} cycles ({} empty), {} collected, {} fused, {} dropped, sink {}/{} failed",
        t.cycles, t.empty_cycles, t.records_collected, t.fused_records, t.records_dropped,
        t.sink_failures, t.sink_batches + t.sink_failures
    );
    out
}
