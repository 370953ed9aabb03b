//! Human-readable summary and CSV rendering of a finished run.

use prac_core::util::human_time;
use prac_core::{Simulator, TimingModel, Workload};
use serde::Serialize;
use std::io;
use thiserror::Error;

/// Errors when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Time parameters as the user wrote them, echoed into the CSV line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeStrings {
    pub trc: String,
    pub tfaw: Option<String>,
    pub rfmfreqmin: String,
    pub rfmfreqmax: String,
    pub trfcrfm: String,
    pub runtime: String,
}

/// Column names of the CSV line for the given timing model.
pub fn csv_header(timing: &TimingModel) -> Vec<&'static str> {
    let tfaw = timing.tfaw_s().is_some();
    let mut header = vec!["rows", "trc"];
    if tfaw {
        header.push("tfaw");
    }
    header.extend(["threshold", "isoc"]);
    if tfaw {
        header.push("abo_delay");
    }
    header.extend([
        "rfmabo",
        "rfmfreqmin",
        "rfmfreqmax",
        "trfcrfm",
        "runtime",
        "Row",
        "Activations",
        "ALERTs",
        "RFMs",
        "ALERTTime",
        "TotalALERTs",
        "LongestSeqB2BALERTs",
    ]);
    header
}

/// Shortest round-trip rendering of a float field. Magnitudes below 1e-4 or
/// from 1e16 up use an exponent with at least two digits (`7.6e-07`), whole
/// numbers keep a trailing `.0`.
fn float_field(x: f64) -> String {
    let sci = format!("{x:e}");
    match sci.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) if x != 0.0 && !(-4..16).contains(&exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            _ => {
                let plain = x.to_string();
                if plain.contains('.') {
                    plain
                } else {
                    format!("{plain}.0")
                }
            }
        },
        None => x.to_string(),
    }
}

fn csv_record(sim: &Simulator, times: &TimeStrings) -> Vec<String> {
    let config = sim.config();
    let mut record = vec![config.rows.to_string(), times.trc.clone()];
    if let Some(tfaw) = &times.tfaw {
        record.push(tfaw.clone());
    }
    record.push(config.threshold.to_string());
    record.push(config.isoc.to_string());
    if config.timing.tfaw_s().is_some() {
        record.push(config.abo_delay.to_string());
    }
    record.extend([
        config.rfmabo.to_string(),
        times.rfmfreqmin.clone(),
        times.rfmfreqmax.clone(),
        times.trfcrfm.clone(),
        times.runtime.clone(),
    ]);

    let rows = sim.rows();
    if config.rows == 1 {
        let row = rows.get(0);
        record.extend([
            "0".to_string(),
            row.activations.to_string(),
            row.alerts.to_string(),
            row.rfms.to_string(),
            float_field(row.alert_time_s),
        ]);
    } else {
        record.extend([
            "ALL".to_string(),
            rows.total_activations().to_string(),
            rows.total_alerts().to_string(),
            rows.total_rfms().to_string(),
            float_field(rows.total_alert_time_s()),
        ]);
    }

    let metrics = sim.metrics();
    record.push(metrics.total_alerts.to_string());
    record.push(metrics.longest_adjacent_run.to_string());
    record
}

/// Writes the CSV line of a finished run, optionally preceded by its header.
pub fn write_csv<W: io::Write>(
    sim: &Simulator,
    times: &TimeStrings,
    header: bool,
    writer: W,
) -> Result<(), ReportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    if header {
        wtr.write_record(csv_header(&sim.config().timing))?;
    }
    wtr.write_record(csv_record(sim, times))?;
    wtr.flush()?;
    Ok(())
}

/// The CSV line of a finished run, without trailing newline.
pub fn csv_line(sim: &Simulator, times: &TimeStrings) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    write_csv(sim, times, false, &mut buf)?;
    let line = String::from_utf8(buf)?;
    Ok(line.trim_end().to_string())
}

/// Human-readable summary of a finished run.
pub fn summary(sim: &Simulator) -> String {
    let config = sim.config();
    let metrics = sim.metrics();
    let rows = sim.rows();
    let tfaw_s = config.timing.tfaw_s();

    let mut lines = vec!["=== DRAM Activation Simulation Summary ===".to_string()];
    lines.push(format!("Runtime:            {}", human_time(config.runtime_s)));
    lines.push(format!("tRC per activate:   {}", human_time(config.trc_s)));
    if let Some(tfaw_s) = tfaw_s {
        lines.push(format!("tFAW window:        {}", human_time(tfaw_s)));
    }
    lines.push(format!("Rows:               {}", config.rows));
    lines.push(format!("Threshold (>):      {}", config.threshold));
    lines.push(format!("tRFC per RFM:       {}", human_time(config.trfcrfm_s)));
    lines.push(format!("RFM ABO:            {}", config.rfmabo));
    lines.push(format!("ISOC:               {}", config.isoc));
    if tfaw_s.is_some() {
        lines.push(format!("ABO delay:          {}", config.abo_delay));
    }
    lines.push(format!("RandReset:          {}", config.randreset));
    lines.push(format!("Workload:           {}", config.workload));
    lines.push(format!("Seed:               {}", sim.seed()));
    if config.trfcrfm_s > 0.0 {
        lines.push(format!(
            "ALERT servicing duration: {} (RFM ABO × tRFC per RFM)",
            human_time(config.alert_duration_s())
        ));
    } else {
        lines.push(format!(
            "ALERT servicing duration: {}",
            human_time(config.alert_duration_s())
        ));
    }

    lines.push(String::new());
    lines.push(format!("Total ACTIVATEs:    {}", metrics.total_activations));
    if matches!(config.workload, Workload::Mixed { .. }) {
        lines.push(format!("Untracked ACTIVATEs: {}", metrics.untracked_activations));
    }
    lines.push(format!("Used time:          {}", human_time(metrics.used_time_s)));
    lines.push(format!("Idle time:          {}", human_time(metrics.idle_time_s)));
    if tfaw_s.is_some() {
        lines.push(format!(
            "Forced tFAW waits:  {} ({})",
            metrics.forced_tfaw_waits,
            human_time(metrics.forced_tfaw_wait_s)
        ));
    }

    lines.push(String::new());
    lines.push(format!("Total RFMs:         {}", metrics.total_rfms));
    lines.push(format!("ABO-based RFMs:     {}", metrics.total_abo_rfms));
    lines.push(format!("Proactive RFMs:     {}", metrics.total_proactive_rfms));
    if config.rfm_enabled() {
        lines.push(format!("RFM window start:   {}", human_time(config.rfm_freq_min_s)));
        lines.push(format!("RFM window end:     {}", human_time(config.rfm_freq_max_s)));
        lines.push(format!(
            "RFM window dur.:    {}",
            human_time(config.rfm_freq_max_s - config.rfm_freq_min_s)
        ));
    }
    lines.push(format!("Proactive RFM time: {}", human_time(metrics.total_rfm_time_s)));

    if metrics.total_alerts > 0 {
        lines.push(String::new());
        lines.push(format!("Total ALERTs:       {}", metrics.total_alerts));
        lines.push(format!(
            "Total ALERT servicing time: {}",
            human_time(metrics.total_alert_time_s)
        ));
        if metrics.total_alerts >= 2 {
            lines.push(format!(
                "Longest seq. back-to-back ALERTs: {}",
                metrics.longest_adjacent_run
            ));
        }
    }

    if config.workload.retires_rows() {
        lines.push(String::new());
        lines.push(format!(
            "Rows dropped:       {}/{}",
            config.rows - metrics.active_rows,
            config.rows
        ));
    }

    lines.push(String::new());
    lines.push("Per-row metrics:".to_string());
    lines.push(format!(
        "{:>6} | {:>12} | {:>6} | {:>6} | {:>12}",
        "Row", "Activations", "ALERTs", "RFMs", "ALERT Time"
    ));
    lines.push("-".repeat(58));
    for (r, row) in rows.iter().enumerate() {
        lines.push(format!(
            "{:6} | {:12} | {:6} | {:6} | {:>12}",
            r,
            row.activations,
            row.alerts,
            row.rfms,
            human_time(row.alert_time_s)
        ));
    }
    lines.join("\n")
}
