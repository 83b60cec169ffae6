//! Batch resolution of facility addresses into coordinates.
//!
//! Every catalog load reserves the next generation number with
//! [`GeocodeResolver::begin`]. Only the newest generation may publish to the
//! observable [`ResolvedView`]; an older batch that is still running when a
//! newer generation is reserved stops at once and its results are discarded.

use super::{GeocodeResponse, GeocodeStatus, Geocoder, ResolveMode, ResolveOptions};
use crate::model::{Coordinates, Facility};
use futures::future::join_all;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Facility list as currently observable by a map view.
#[derive(Debug, Clone, Default)]
pub struct ResolvedView {
    /// Generation of the batch that produced this view (0 = nothing yet).
    pub generation: u64,
    pub facilities: Arc<Vec<Facility>>,
    /// False while a batch is still publishing intermediate lists.
    pub complete: bool,
}

/// Summary of one resolution batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub generation: u64,
    pub mode: ResolveMode,
    /// Input list with resolved coordinates merged in, in input order.
    #[serde(skip)]
    pub facilities: Vec<Facility>,
    pub resolved: usize,
    pub failed: usize,
    /// Facilities that needed no request (already located or no address).
    pub skipped: usize,
    /// Tasks never attempted because the batch stopped early.
    pub pending: usize,
    pub cancelled: bool,
    /// A newer batch started before this one finished.
    pub superseded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TaskStatus {
    Pending,
    Resolved(Coordinates),
    Failed,
}

#[derive(Debug)]
struct GeocodeTask {
    index: usize,
    facility_id: i64,
    address: String,
    status: TaskStatus,
}

pub struct GeocodeResolver {
    geocoder: Arc<dyn Geocoder>,
    latest: AtomicU64,
    /// Woken whenever a new generation is reserved.
    advanced: Notify,
    view: watch::Sender<ResolvedView>,
}

impl GeocodeResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        let (view, _) = watch::channel(ResolvedView::default());
        Self {
            geocoder,
            latest: AtomicU64::new(0),
            advanced: Notify::new(),
            view,
        }
    }

    /// Receiver notified on every accepted publish.
    pub fn subscribe(&self) -> watch::Receiver<ResolvedView> {
        self.view.subscribe()
    }

    pub fn current_view(&self) -> ResolvedView {
        self.view.borrow().clone()
    }

    /// Generation of the most recently reserved batch.
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Reserve the next generation. Every older batch becomes stale.
    pub fn begin(&self) -> u64 {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.advanced.notify_waiters();
        generation
    }

    /// Whether `generation` is still the newest reserved batch.
    pub fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    /// Publish `facilities` if `generation` is still the newest batch.
    pub fn publish(&self, generation: u64, facilities: Vec<Facility>, complete: bool) -> bool {
        self.view.send_if_modified(|view| {
            if !self.is_current(generation) || generation < view.generation {
                return false;
            }
            *view = ResolvedView {
                generation,
                facilities: Arc::new(facilities),
                complete,
            };
            true
        })
    }

    /// Resolves once `generation` is no longer the newest batch.
    async fn superseded(&self, generation: u64) {
        loop {
            // Registered before the check so a concurrent `begin` is not missed
            let advanced = self.advanced.notified();
            if !self.is_current(generation) {
                return;
            }
            advanced.await;
        }
    }

    /// Resolve coordinates under a freshly reserved generation.
    ///
    /// See [`GeocodeResolver::resolve_generation`].
    pub async fn resolve_all(
        &self,
        facilities: Vec<Facility>,
        mode: ResolveMode,
        options: &ResolveOptions,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let generation = self.begin();
        self.resolve_generation(generation, facilities, mode, options, cancel)
            .await
    }

    /// Resolve coordinates for every facility that has an address but no
    /// coordinates yet, as batch `generation` (from [`GeocodeResolver::begin`]).
    ///
    /// Per-facility failures leave `coordinates` empty and never fail the
    /// batch. The returned list keeps input order whatever the completion
    /// order of the requests. A stale generation issues no request.
    pub async fn resolve_generation(
        &self,
        generation: u64,
        facilities: Vec<Facility>,
        mode: ResolveMode,
        options: &ResolveOptions,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let mut tasks: Vec<GeocodeTask> = facilities
            .iter()
            .enumerate()
            .filter(|(_, f)| f.needs_geocoding())
            .map(|(index, f)| GeocodeTask {
                index,
                facility_id: f.id,
                address: f.address.trim().to_string(),
                status: TaskStatus::Pending,
            })
            .collect();

        info!(
            generation,
            %mode,
            facilities = facilities.len(),
            requests = tasks.len(),
            "starting geocode batch"
        );

        let (cancelled, superseded) = if !self.is_current(generation) {
            (false, true)
        } else {
            match mode {
                ResolveMode::Parallel => self.run_parallel(generation, &mut tasks, cancel).await,
                ResolveMode::Throttled => {
                    self.run_throttled(generation, &facilities, &mut tasks, options, cancel)
                        .await
                }
            }
        };

        let merged = merge(&facilities, &tasks);

        let superseded = if cancelled || superseded {
            superseded
        } else {
            !self.publish(generation, merged.clone(), true)
        };

        let report = BatchReport {
            generation,
            mode,
            resolved: count(&tasks, |s| matches!(s, TaskStatus::Resolved(_))),
            failed: count(&tasks, |s| matches!(s, TaskStatus::Failed)),
            pending: count(&tasks, |s| matches!(s, TaskStatus::Pending)),
            skipped: facilities.len() - tasks.len(),
            facilities: merged,
            cancelled,
            superseded,
        };

        if report.superseded {
            info!(generation, "geocode batch superseded, results discarded");
        } else if report.cancelled {
            info!(generation, pending = report.pending, "geocode batch cancelled");
        } else {
            info!(
                generation,
                resolved = report.resolved,
                failed = report.failed,
                skipped = report.skipped,
                "geocode batch complete"
            );
        }

        report
    }

    /// Fire every request at once and wait for all of them to settle.
    async fn run_parallel(
        &self,
        generation: u64,
        tasks: &mut [GeocodeTask],
        cancel: &CancellationToken,
    ) -> (bool, bool) {
        let geocoder = &*self.geocoder;
        let addresses: Vec<String> = tasks.iter().map(|t| t.address.clone()).collect();

        let statuses = tokio::select! {
            biased;
            _ = cancel.cancelled() => return (true, false),
            _ = self.superseded(generation) => return (false, true),
            statuses = join_all(addresses.iter().map(|a| resolve_one(geocoder, a))) => statuses,
        };

        for (task, status) in tasks.iter_mut().zip(statuses) {
            log_task(generation, task, status);
            task.status = status;
        }

        (false, !self.is_current(generation))
    }

    /// Issue requests one at a time, pausing `options.delay` in between and
    /// publishing a merge every `options.merge_every` completed tasks.
    async fn run_throttled(
        &self,
        generation: u64,
        facilities: &[Facility],
        tasks: &mut [GeocodeTask],
        options: &ResolveOptions,
        cancel: &CancellationToken,
    ) -> (bool, bool) {
        let geocoder = &*self.geocoder;
        let mut completed = 0usize;

        for i in 0..tasks.len() {
            if cancel.is_cancelled() {
                return (true, false);
            }
            if !self.is_current(generation) {
                return (false, true);
            }

            if i > 0 && !options.delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return (true, false),
                    _ = self.superseded(generation) => return (false, true),
                    _ = tokio::time::sleep(options.delay) => {}
                }
            }

            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return (true, false),
                _ = self.superseded(generation) => return (false, true),
                status = resolve_one(geocoder, &tasks[i].address) => status,
            };

            log_task(generation, &tasks[i], status);
            tasks[i].status = status;
            completed += 1;

            if options.merge_every > 0
                && completed % options.merge_every == 0
                && completed < tasks.len()
            {
                self.publish(generation, merge(facilities, tasks), false);
            }
        }

        (false, !self.is_current(generation))
    }
}

async fn resolve_one(geocoder: &dyn Geocoder, address: &str) -> TaskStatus {
    match geocoder.resolve(address).await {
        Ok(GeocodeResponse {
            status: GeocodeStatus::Ok,
            lat: Some(lat),
            lng: Some(lng),
        }) if lat.is_finite() && lng.is_finite() => TaskStatus::Resolved(Coordinates { lat, lng }),
        Ok(response) => {
            debug!(address, status = ?response.status, "address not resolved");
            TaskStatus::Failed
        }
        Err(e) => {
            warn!(address, error = %e, "geocode request failed");
            TaskStatus::Failed
        }
    }
}

fn log_task(generation: u64, task: &GeocodeTask, status: TaskStatus) {
    debug!(
        generation,
        facility_id = task.facility_id,
        resolved = matches!(status, TaskStatus::Resolved(_)),
        "geocode task settled"
    );
}

/// Copy of `facilities` with every resolved task's coordinates applied.
fn merge(facilities: &[Facility], tasks: &[GeocodeTask]) -> Vec<Facility> {
    let mut merged = facilities.to_vec();
    for task in tasks {
        if let TaskStatus::Resolved(coords) = task.status {
            merged[task.index].coordinates = Some(coords);
        }
    }
    merged
}

fn count(tasks: &[GeocodeTask], pred: impl Fn(&TaskStatus) -> bool) -> usize {
    tasks.iter().filter(|t| pred(&t.status)).count()
}
