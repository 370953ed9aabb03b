use crate::config::{ConfigError, SimulationConfig};
use crate::metrics::RunMetrics;
use crate::rfm::{self, RfmEvent, RfmKind, RfmSchedule};
use crate::rows::RowTable;
use crate::tfaw::TfawWindow;
use crate::util::{NamedProgress, PROGRESS_INTERVAL, Rng, human_time};
use crate::workload::Selection;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, info, trace};
use serde::Serialize;
use thiserror::Error;

/// One GLOBAL STALL: when it started and how much time it consumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlertRecord {
    /// Row whose counter triggered the ALERT
    pub row: usize,
    /// Simulated time at which the stall began
    pub start_s: f64,
    /// Stall time actually consumed (clipped at the runtime)
    pub consumed_s: f64,
}

/// Result of one attempt to ACTIVATE the next row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// An ACTIVATE happened. Carries the tracked row, `None` for untracked rows.
    Activated(Option<usize>),
    /// Not enough runtime left for another tRC.
    OutOfTime,
    /// The workload has no active row left.
    Exhausted,
}

/// Discrete-event PRAC simulator.
///
/// Owns the whole mutable state of one run: the clock, the row table, the
/// RNG stream, the tFAW window and the RFM window. [`Simulator::run`] drives
/// ACTIVATEs until the runtime is used up or, in feinting and mixed
/// workloads, every row has been retired.
///
/// Use [`Simulator::builder()`] to construct an instance.
///
/// # Examples
///
/// ```
/// use prac_core::{SimulationConfig, Simulator, TimingModel};
///
/// let config = SimulationConfig {
///     rows: 1,
///     trc_s: 10e-9,
///     timing: TimingModel::Legacy,
///     threshold: 2,
///     rfmabo: 1,
///     trfcrfm_s: 100e-9,
///     runtime_s: 1e-6,
///     ..Default::default()
/// };
/// let mut sim = Simulator::builder().config(config).build().unwrap();
/// sim.run();
/// assert_eq!(sim.total_activations(), 24);
/// assert_eq!(sim.total_alerts(), 8);
/// ```
#[derive(Debug)]
pub struct Simulator {
    pub(crate) config: SimulationConfig,
    pub(crate) alert_duration_s: f64,
    pub(crate) retire_rows: bool,
    pub(crate) rng: Rng,

    pub(crate) time_s: f64,
    pub(crate) cursor: usize,
    pub(crate) rows: RowTable,
    pub(crate) tfaw: Option<TfawWindow>,
    pub(crate) rfm_schedule: Option<RfmSchedule>,

    pub(crate) total_activations: u64,
    pub(crate) untracked_activations: u64,
    pub(crate) total_rfms: u64,
    pub(crate) total_proactive_rfms: u64,
    pub(crate) total_abo_rfms: u64,
    pub(crate) total_rfm_time_s: f64,
    pub(crate) forced_tfaw_waits: u64,
    pub(crate) forced_tfaw_wait_s: f64,
    pub(crate) alerts: Vec<AlertRecord>,

    pub(crate) activation_log: Option<Vec<f64>>,
    pub(crate) rfm_log: Option<Vec<RfmEvent>>,
    progress: Option<MultiProgress>,
}

impl Simulator {
    /// Creates a new simulator builder.
    pub fn builder() -> SimulatorBuilder {
        SimulatorBuilder::default()
    }

    /// Configuration of this run.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Seed of the RNG stream.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Current simulated time in seconds.
    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Per-row state.
    pub fn rows(&self) -> &RowTable {
        &self.rows
    }

    /// Ids of rows that can still be activated.
    pub fn active_rows(&self) -> Vec<usize> {
        self.rows.active_rows().collect()
    }

    /// All ACTIVATEs, tracked and untracked.
    pub fn total_activations(&self) -> u64 {
        self.total_activations
    }

    /// ACTIVATEs of the mixed workload that hit no tracked row.
    pub fn untracked_activations(&self) -> u64 {
        self.untracked_activations
    }

    /// All RFMs, proactive and reactive.
    pub fn total_rfms(&self) -> u64 {
        self.total_rfms
    }

    /// RFMs issued by the proactive scheduler.
    pub fn total_proactive_rfms(&self) -> u64 {
        self.total_proactive_rfms
    }

    /// RFMs issued in response to ALERTs.
    pub fn total_abo_rfms(&self) -> u64 {
        self.total_abo_rfms
    }

    /// Service time consumed by proactive RFMs.
    pub fn total_rfm_time_s(&self) -> f64 {
        self.total_rfm_time_s
    }

    /// Number of times tFAW forced the clock forward.
    pub fn forced_tfaw_waits(&self) -> u64 {
        self.forced_tfaw_waits
    }

    /// Total time skipped because of tFAW.
    pub fn forced_tfaw_wait_s(&self) -> f64 {
        self.forced_tfaw_wait_s
    }

    /// Number of ALERTs (GLOBAL STALLs) issued.
    pub fn total_alerts(&self) -> usize {
        self.alerts.len()
    }

    /// Every ALERT in issue order.
    pub fn alert_records(&self) -> &[AlertRecord] {
        &self.alerts
    }

    /// Start times of every ALERT in issue order.
    pub fn alert_timestamps(&self) -> Vec<f64> {
        self.alerts.iter().map(|a| a.start_s).collect()
    }

    /// Start time of every ACTIVATE. Empty unless enabled on the builder.
    pub fn activation_log(&self) -> &[f64] {
        self.activation_log.as_deref().unwrap_or_default()
    }

    /// Every issued RFM. Empty unless enabled on the builder.
    pub fn rfm_events(&self) -> &[RfmEvent] {
        self.rfm_log.as_deref().unwrap_or_default()
    }

    /// Aggregated results of the run so far.
    pub fn metrics(&self) -> RunMetrics {
        RunMetrics::from_simulator(self)
    }

    pub(crate) fn fits_activate(&self) -> bool {
        self.time_s + self.config.trc_s <= self.config.runtime_s
    }

    pub(crate) fn advance_cursor(&mut self) {
        self.cursor = (self.cursor + 1) % self.config.rows;
    }

    /// Issues the next ACTIVATE: waits out tFAW, selects a row and consumes tRC.
    pub(crate) fn activate_next(&mut self) -> Step {
        if !self.fits_activate() {
            return Step::OutOfTime;
        }
        if let Some(window) = self.tfaw.as_mut() {
            // a jump past the runtime ends the run at the runtime
            let earliest = window
                .earliest_activate(self.time_s)
                .min(self.config.runtime_s);
            if earliest > self.time_s {
                trace!("tFAW wait {} -> {}", self.time_s, earliest);
                self.forced_tfaw_waits += 1;
                self.forced_tfaw_wait_s += earliest - self.time_s;
                self.time_s = earliest;
            }
            if !self.fits_activate() {
                return Step::OutOfTime;
            }
        }
        let row = match self
            .config
            .workload
            .select(&self.rows, &mut self.cursor, &mut self.rng)
        {
            Selection::Row(row) => Some(row),
            Selection::Untracked => None,
            Selection::Exhausted => return Step::Exhausted,
        };
        trace!("ACT {:?} at {}", row, self.time_s);
        if let Some(row) = row {
            self.rows.activate(row);
        } else {
            self.untracked_activations += 1;
        }
        self.total_activations += 1;
        if let Some(window) = self.tfaw.as_mut() {
            window.record(self.time_s);
        }
        if let Some(log) = self.activation_log.as_mut() {
            log.push(self.time_s);
        }
        self.time_s += self.config.trc_s;
        Step::Activated(row)
    }

    /// Consumes up to `duration_s` of the remaining runtime, returns what was consumed.
    pub(crate) fn consume(&mut self, duration_s: f64) -> f64 {
        let remaining = self.config.runtime_s - self.time_s;
        if remaining <= 0.0 {
            return 0.0;
        }
        let consumed = duration_s.min(remaining);
        self.time_s += consumed;
        consumed
    }

    /// Issues one RFM to `row` and books it.
    pub(crate) fn issue_rfm(&mut self, row: usize, kind: RfmKind) {
        let counter = rfm::refresh(
            &mut self.rows,
            row,
            self.config.randreset,
            self.retire_rows,
            &mut self.rng,
        );
        self.total_rfms += 1;
        match kind {
            RfmKind::Proactive => self.total_proactive_rfms += 1,
            RfmKind::Reactive => self.total_abo_rfms += 1,
        }
        if let Some(log) = self.rfm_log.as_mut() {
            log.push(RfmEvent {
                time_s: self.time_s,
                row,
                counter,
                kind,
            });
        }
    }

    fn proactive_rfm(&mut self) {
        let Some(row) = rfm::proactive_target(&self.rows, self.retire_rows) else {
            debug!("Proactive RFM skipped at {}: no activated row", self.time_s);
            return;
        };
        debug!("Proactive RFM to row {} at {}", row, self.time_s);
        self.issue_rfm(row, RfmKind::Proactive);
        if self.config.trfcrfm_s > 0.0 {
            self.total_rfm_time_s += self.consume(self.config.trfcrfm_s);
        }
    }

    fn service_rfm_window(&mut self) {
        let Some(schedule) = self.rfm_schedule.as_ref() else {
            return;
        };
        if schedule.is_due(self.time_s) {
            self.proactive_rfm();
            if let Some(schedule) = self.rfm_schedule.as_mut() {
                schedule.disarm();
            }
        }
        if let Some(schedule) = self.rfm_schedule.as_mut() {
            if schedule.is_expired(self.time_s) {
                schedule.advance(&mut self.rng);
            }
        }
    }

    /// Runs the simulation until the runtime is used up or no active row is left.
    pub fn run(&mut self) {
        info!(
            "Starting PRAC simulation: {} rows, workload {}, runtime {}, seed {}",
            self.config.rows,
            self.config.workload,
            human_time(self.config.runtime_s),
            self.rng.seed()
        );
        let progress = self.progress.as_ref().map(|p| {
            let p = p.add(ProgressBar::new(
                (self.config.runtime_s * 1e9).round() as u64,
            ));
            p.set_style(ProgressStyle::named_bar("Simulated time"));
            p
        });

        let mut iterations: u64 = 0;
        loop {
            iterations += 1;
            if let Some(p) = progress.as_ref() {
                if iterations % PROGRESS_INTERVAL == 0 {
                    p.set_position((self.time_s * 1e9) as u64);
                }
            }

            self.service_rfm_window();

            if self.retire_rows && self.rows.active_count() == 0 {
                info!("All rows retired at {}", human_time(self.time_s));
                break;
            }
            let row = match self.activate_next() {
                Step::Activated(row) => row,
                Step::OutOfTime => break,
                Step::Exhausted => {
                    info!("No active row left at {}", human_time(self.time_s));
                    break;
                }
            };
            if let Some(row) = row {
                if self.rows.get(row).counter > self.config.threshold
                    && self.alert_duration_s > 0.0
                {
                    self.raise_alert(row);
                }
            }
            self.advance_cursor();
        }

        if let Some(p) = progress {
            p.set_position((self.time_s * 1e9) as u64);
            p.finish();
        }
        info!(
            "Simulation finished at {}: {} ACTIVATEs, {} ALERTs, {} RFMs",
            human_time(self.time_s),
            self.total_activations,
            self.alerts.len(),
            self.total_rfms
        );
    }
}

/// Builder for [`Simulator`].
#[derive(Default)]
pub struct SimulatorBuilder {
    config: Option<SimulationConfig>,
    seed: u64,
    progress: Option<MultiProgress>,
    record_activations: bool,
    record_rfms: bool,
}

impl SimulatorBuilder {
    /// Sets the run configuration.
    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the RNG seed (default 0).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Shows a progress bar over simulated time.
    pub fn progress(mut self, progress: MultiProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Keeps the start time of every ACTIVATE.
    pub fn record_activations(mut self, record: bool) -> Self {
        self.record_activations = record;
        self
    }

    /// Keeps a record of every RFM.
    pub fn record_rfms(mut self, record: bool) -> Self {
        self.record_rfms = record;
        self
    }

    /// Validates the configuration and builds the simulator.
    ///
    /// Arms the first proactive RFM window, which is the first draw from the
    /// RNG stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no configuration was given and
    /// [`Error::InvalidConfig`] if it violates an invariant.
    pub fn build(self) -> Result<Simulator, Error> {
        let config = self.config.ok_or(Error::Config)?;
        config.validate()?;
        let mut rng = Rng::from_seed(self.seed);
        let rfm_schedule =
            RfmSchedule::new(config.rfm_freq_min_s, config.rfm_freq_max_s, &mut rng);
        Ok(Simulator {
            alert_duration_s: config.alert_duration_s(),
            retire_rows: config.workload.retires_rows(),
            rng,
            time_s: 0.0,
            cursor: 0,
            rows: RowTable::new(config.rows),
            tfaw: config.timing.tfaw_s().map(TfawWindow::new),
            rfm_schedule,
            total_activations: 0,
            untracked_activations: 0,
            total_rfms: 0,
            total_proactive_rfms: 0,
            total_abo_rfms: 0,
            total_rfm_time_s: 0.0,
            forced_tfaw_waits: 0,
            forced_tfaw_wait_s: 0.0,
            alerts: Vec::new(),
            activation_log: self.record_activations.then(Vec::new),
            rfm_log: self.record_rfms.then(Vec::new),
            progress: self.progress,
            config,
        })
    }
}

/// Errors when building a [`Simulator`].
#[derive(Debug, Error)]
pub enum Error {
    /// No configuration was passed to the builder.
    #[error("No simulation config specified")]
    Config,
    /// The configuration violates an invariant.
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}
