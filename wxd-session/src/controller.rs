//! Interpolation session controller.
//!
//! One controller per map. It owns the current boundary, the attribute/day
//! selection, the rendered overlay and the latest `InterpolationResult`, and
//! drives a run through
//! `Idle -> Validating -> Collecting -> Interpolating -> Rendering -> Idle`
//! (or `-> Failed -> Idle`).
//!
//! State lives behind `Rc<RefCell<..>>` so clones of the controller can be
//! handed to UI callbacks on a single-threaded executor. No borrow is held
//! across an `.await`.

use futures::future::try_join_all;
use log::{debug, info, warn};
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use tokio::time::timeout;
use wxd_core::{Attribute, Boundary, Location, LocationStore, WeatherProvider};
use wxd_data::{
    classify,
    grid::{build_interpolation, locations_inside, primary_polygon},
    legend, ColorRamp, InterpolationError, InterpolationResult,
};

use crate::config::SessionConfig;
use crate::surface::{ColoredCell, OverlayHandle, RenderSurface};

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Validating,
    Collecting,
    Interpolating,
    Rendering,
    Failed,
}

/// What the user currently has selected on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub attribute: Attribute,
    pub day: usize,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            attribute: Attribute::TempMax,
            day: 0,
        }
    }
}

/// How a call to [`InterpolationController::run`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A new overlay and legend were drawn.
    Rendered {
        cells: usize,
        min_value: f64,
        max_value: f64,
    },
    /// The selection or boundary changed while the run was in flight.
    Discarded,
    /// The run failed; any previous overlay is still on the surface.
    Failed(InterpolationError),
}

struct Inner<S> {
    surface: S,
    config: SessionConfig,
    selection: Selection,
    boundary: Option<Boundary>,
    boundary_visible: bool,
    /// Bumped whenever the boundary or selection changes.
    generation: u64,
    in_flight: bool,
    state: SessionState,
    overlay: Option<OverlayHandle>,
    result: Option<InterpolationResult>,
    last_error: Option<String>,
}

impl<S: RenderSurface> Inner<S> {
    fn transition(&mut self, to: SessionState) {
        debug!("Interpolation state {:?} -> {:?}", self.state, to);
        self.state = to;
    }

    /// Drop the current overlay and result; stale in-flight runs will be discarded.
    fn invalidate(&mut self) {
        self.generation += 1;
        self.result = None;
        if let Some(handle) = self.overlay.take() {
            debug!("Removing interpolation overlay {:?}", handle);
            self.surface.remove_overlay(handle);
        }
    }
}

/// Settings captured when a run starts.
struct RunTicket {
    generation: u64,
    selection: Selection,
    config: SessionConfig,
}

/// Clears the in-flight flag however the run ends, including being dropped.
struct InFlightGuard<'a, S: RenderSurface> {
    inner: &'a RefCell<Inner<S>>,
}

impl<S: RenderSurface> Drop for InFlightGuard<'_, S> {
    fn drop(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.in_flight = false;
        inner.transition(SessionState::Idle);
    }
}

/// Coordinates interpolation runs against live map state.
pub struct InterpolationController<S> {
    inner: Rc<RefCell<Inner<S>>>,
}

impl<S> Clone for InterpolationController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: RenderSurface> InterpolationController<S> {
    pub fn new(surface: S, config: SessionConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                surface,
                config,
                selection: Selection::default(),
                boundary: None,
                boundary_visible: false,
                generation: 0,
                in_flight: false,
                state: SessionState::Idle,
                overlay: None,
                result: None,
                last_error: None,
            })),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.borrow().state
    }

    pub fn selection(&self) -> Selection {
        self.inner.borrow().selection
    }

    pub fn config(&self) -> SessionConfig {
        self.inner.borrow().config.clone()
    }

    /// The result behind the overlay currently on the surface.
    pub fn current_result(&self) -> Option<InterpolationResult> {
        self.inner.borrow().result.clone()
    }

    pub fn overlay(&self) -> Option<OverlayHandle> {
        self.inner.borrow().overlay
    }

    /// Message of the most recent failed run, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.inner.borrow().last_error.clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().in_flight
    }

    /// Read access to the surface, mostly for embedding code and tests.
    pub fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.borrow().surface)
    }

    /// Replace the boundary; it starts out visible.
    pub fn load_boundary(&self, boundary: Boundary) {
        let mut inner = self.inner.borrow_mut();
        info!("Loaded boundary with {} polygon(s)", boundary.polygons.len());
        inner.boundary = Some(boundary);
        inner.boundary_visible = true;
        inner.invalidate();
    }

    pub fn clear_boundary(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.boundary = None;
        inner.boundary_visible = false;
        inner.invalidate();
    }

    /// Show or hide the boundary. Hiding keeps the overlay but blocks new runs.
    pub fn set_boundary_visible(&self, visible: bool) {
        let mut inner = self.inner.borrow_mut();
        if inner.boundary.is_some() {
            inner.boundary_visible = visible;
        }
    }

    pub fn select_attribute(&self, attribute: Attribute) {
        let mut inner = self.inner.borrow_mut();
        if inner.selection.attribute != attribute {
            inner.selection.attribute = attribute;
            inner.invalidate();
        }
    }

    pub fn select_day(&self, day: usize) {
        let mut inner = self.inner.borrow_mut();
        if inner.selection.day != day {
            inner.selection.day = day;
            inner.invalidate();
        }
    }

    /// Remove the overlay without touching the selection.
    pub fn clear_overlay(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.result = None;
        if let Some(handle) = inner.overlay.take() {
            inner.surface.remove_overlay(handle);
        }
    }

    /// Run one interpolation for the current boundary and selection.
    ///
    /// Failures are recovered here and reported through the outcome and
    /// [`last_error`](Self::last_error); the surface is only touched when a
    /// fresh result is ready.
    pub async fn run<L, P>(&self, store: &L, provider: &P) -> RunOutcome
    where
        L: LocationStore,
        P: WeatherProvider,
    {
        let ticket = {
            let mut inner = self.inner.borrow_mut();
            if inner.in_flight {
                warn!("Interpolation requested while another run is in flight");
                return RunOutcome::Failed(InterpolationError::AlreadyRunning);
            }
            inner.in_flight = true;
            RunTicket {
                generation: inner.generation,
                selection: inner.selection,
                config: inner.config.clone(),
            }
        };
        let _guard = InFlightGuard { inner: &self.inner };

        let result = self.execute(&ticket, store, provider).await;

        let mut inner = self.inner.borrow_mut();
        if inner.generation != ticket.generation {
            info!("Selection changed during interpolation, discarding result");
            return RunOutcome::Discarded;
        }
        match result {
            Ok(result) => Self::render(&mut inner, result),
            Err(e) => {
                warn!("Interpolation failed: {}", e);
                inner.transition(SessionState::Failed);
                inner.last_error = Some(e.to_string());
                RunOutcome::Failed(e)
            }
        }
    }

    fn transition(&self, to: SessionState) {
        self.inner.borrow_mut().transition(to);
    }

    async fn execute<L, P>(
        &self,
        ticket: &RunTicket,
        store: &L,
        provider: &P,
    ) -> wxd_data::Result<InterpolationResult>
    where
        L: LocationStore,
        P: WeatherProvider,
    {
        self.transition(SessionState::Validating);
        let boundary = {
            let inner = self.inner.borrow();
            match (&inner.boundary, inner.boundary_visible) {
                (Some(boundary), true) => boundary.clone(),
                _ => return Err(InterpolationError::NoBoundary),
            }
        };
        ticket.config.validate()?;
        primary_polygon(&boundary)?;

        self.transition(SessionState::Collecting);
        let locations = store
            .get_all()
            .map_err(|e| InterpolationError::DataFetchFailed {
                location: "location store".into(),
                reason: e.to_string(),
            })?;
        let inside = locations_inside(&boundary, &locations)?;
        let min_samples = ticket.config.interpolation.min_samples;
        if inside.len() < min_samples {
            return Err(InterpolationError::InsufficientSamples {
                needed: min_samples,
                found: inside.len(),
            });
        }
        let values = Self::collect(&inside, ticket, provider).await?;

        self.transition(SessionState::Interpolating);
        build_interpolation(
            &boundary,
            &locations,
            ticket.selection.attribute,
            |id: &str, _: &Location| {
                values
                    .get(id)
                    .copied()
                    .ok_or_else(|| format!("no forecast collected for {id}"))
            },
            &ticket.config.interpolation,
        )
    }

    /// Fetch every location concurrently; the first failure or timeout wins.
    async fn collect<P: WeatherProvider>(
        inside: &[(&String, &Location)],
        ticket: &RunTicket,
        provider: &P,
    ) -> wxd_data::Result<HashMap<String, f64>> {
        let fetch_timeout = ticket.config.fetch_timeout();
        let Selection { attribute, day } = ticket.selection;
        info!(
            "Fetching {} forecast(s) for {} on day {}",
            inside.len(),
            attribute,
            day
        );
        let fetches = inside.iter().map(|&(id, location)| async move {
            let failed = |reason: String| InterpolationError::DataFetchFailed {
                location: id.clone(),
                reason,
            };
            let series = timeout(fetch_timeout, provider.fetch(location.position()))
                .await
                .map_err(|_| failed(format!("timed out after {:?}", fetch_timeout)))?
                .map_err(|e| failed(e.to_string()))?;
            let value = series
                .value_at(day, attribute)
                .map_err(|e| failed(e.to_string()))?;
            Ok::<_, InterpolationError>((id.clone(), value))
        });
        let values = try_join_all(fetches).await?;
        Ok(values.into_iter().collect())
    }

    fn render(inner: &mut Inner<S>, result: InterpolationResult) -> RunOutcome {
        inner.transition(SessionState::Rendering);
        let ramp = ColorRamp::for_attribute(result.attribute);
        let cells: Vec<ColoredCell> = result
            .cells
            .iter()
            .map(|cell| ColoredCell {
                position: cell.position,
                value: cell.value,
                color: classify(cell.value, result.min_value, result.max_value, &ramp).to_string(),
            })
            .collect();

        if let Some(previous) = inner.overlay.take() {
            inner.surface.remove_overlay(previous);
        }
        let handle = inner.surface.render_overlay(&cells);
        inner.surface.render_legend(&legend(
            result.attribute,
            result.min_value,
            result.max_value,
            &ramp,
        ));
        info!(
            "Rendered overlay {:?} with {} cells from {} samples",
            handle,
            cells.len(),
            result.sample_count
        );

        let outcome = RunOutcome::Rendered {
            cells: cells.len(),
            min_value: result.min_value,
            max_value: result.max_value,
        };
        inner.overlay = Some(handle);
        inner.result = Some(result);
        inner.last_error = None;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::{cell::Cell, collections::BTreeMap};
    use tokio::sync::Semaphore;
    use wxd_core::{CoreError, DailyRecord, DailySeries, GeoPoint, Polygon};
    use wxd_data::Legend;

    #[derive(Debug, Clone, PartialEq)]
    enum SurfaceEvent {
        Overlay(OverlayHandle, usize),
        Removed(OverlayHandle),
        Legend(String, String, String),
    }

    #[derive(Default)]
    struct RecordingSurface {
        next: u64,
        events: Vec<SurfaceEvent>,
    }

    impl RenderSurface for RecordingSurface {
        fn render_overlay(&mut self, cells: &[ColoredCell]) -> OverlayHandle {
            self.next += 1;
            let handle = OverlayHandle(self.next);
            self.events.push(SurfaceEvent::Overlay(handle, cells.len()));
            handle
        }

        fn remove_overlay(&mut self, handle: OverlayHandle) {
            self.events.push(SurfaceEvent::Removed(handle));
        }

        fn render_legend(&mut self, legend: &Legend) {
            self.events.push(SurfaceEvent::Legend(
                legend.label.clone(),
                legend.min_label.clone(),
                legend.max_label.clone(),
            ));
        }
    }

    /// Serves one value per position (same value for every attribute and
    /// day), optionally failing for some positions or waiting on a gate.
    #[derive(Default)]
    struct ScriptedProvider {
        values: Vec<(GeoPoint, f64)>,
        failing: Vec<GeoPoint>,
        gate: Option<Rc<Semaphore>>,
        calls: Cell<usize>,
    }

    impl ScriptedProvider {
        fn new(values: Vec<(GeoPoint, f64)>) -> Self {
            Self {
                values,
                ..Default::default()
            }
        }
    }

    fn series(value: f64) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        DailySeries {
            days: (0..3)
                .map(|i| DailyRecord {
                    date: start + chrono::Duration::days(i),
                    values: Attribute::ALL.iter().map(|a| (*a, value)).collect(),
                    wind_direction: None,
                })
                .collect(),
        }
    }

    impl WeatherProvider for ScriptedProvider {
        async fn fetch(&self, position: GeoPoint) -> wxd_core::Result<DailySeries> {
            self.calls.set(self.calls.get() + 1);
            if let Some(gate) = &self.gate {
                let _permit = gate
                    .acquire()
                    .await
                    .map_err(|e| CoreError::Provider(e.to_string()))?;
            }
            if self.failing.contains(&position) {
                return Err(CoreError::Provider("HTTP 503".into()));
            }
            self.values
                .iter()
                .find(|(p, _)| *p == position)
                .map(|(_, v)| series(*v))
                .ok_or_else(|| CoreError::Provider("unknown position".into()))
        }
    }

    fn location(name: &str, lat: f64, lon: f64) -> Location {
        Location {
            name: name.to_string(),
            lat,
            lon,
        }
    }

    fn store() -> BTreeMap<String, Location> {
        BTreeMap::from([
            ("a".to_string(), location("A", 0.0, 0.0)),
            ("b".to_string(), location("B", 0.0, 1.0)),
            ("c".to_string(), location("C", 1.0, 0.0)),
            ("outside".to_string(), location("Outside", 4.0, 4.0)),
        ])
    }

    fn provider() -> ScriptedProvider {
        ScriptedProvider::new(vec![
            (GeoPoint::new(0.0, 0.0), 10.0),
            (GeoPoint::new(0.0, 1.0), 20.0),
            (GeoPoint::new(1.0, 0.0), 30.0),
            (GeoPoint::new(4.0, 4.0), 99.0),
        ])
    }

    fn unit_square() -> Boundary {
        Boundary::new(vec![Polygon::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ])])
    }

    fn controller() -> InterpolationController<RecordingSurface> {
        let mut config = SessionConfig::default();
        config.interpolation.cell_size_degrees = 0.5;
        config.fetch_timeout_ms = 200;
        let controller = InterpolationController::new(RecordingSurface::default(), config);
        controller.load_boundary(unit_square());
        controller
    }

    fn events(controller: &InterpolationController<RecordingSurface>) -> Vec<SurfaceEvent> {
        controller.with_surface(|s| s.events.clone())
    }

    #[tokio::test]
    async fn test_run_renders_overlay_and_legend() {
        let controller = controller();
        let provider = provider();
        let outcome = controller.run(&store(), &provider).await;
        assert_eq!(
            outcome,
            RunOutcome::Rendered {
                cells: 9,
                min_value: 10.0,
                max_value: 30.0
            }
        );
        // only the three locations inside were fetched
        assert_eq!(provider.calls.get(), 3);
        assert_eq!(
            events(&controller),
            vec![
                SurfaceEvent::Overlay(OverlayHandle(1), 9),
                SurfaceEvent::Legend(
                    "Max Temperature (°C)".into(),
                    "10.0".into(),
                    "30.0".into()
                ),
            ]
        );
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(controller.current_result().unwrap().sample_count, 3);
        assert!(controller.last_error().is_none());
    }

    #[tokio::test]
    async fn test_rerun_replaces_previous_overlay() {
        let controller = controller();
        let provider = provider();
        controller.run(&store(), &provider).await;
        controller.run(&store(), &provider).await;
        let events = events(&controller);
        assert_eq!(events[2], SurfaceEvent::Removed(OverlayHandle(1)));
        assert_eq!(events[3], SurfaceEvent::Overlay(OverlayHandle(2), 9));
        assert_eq!(controller.overlay(), Some(OverlayHandle(2)));
    }

    #[tokio::test]
    async fn test_no_boundary() {
        let controller = InterpolationController::new(RecordingSurface::default(), SessionConfig::default());
        let outcome = controller.run(&store(), &provider()).await;
        assert_eq!(outcome, RunOutcome::Failed(InterpolationError::NoBoundary));
        assert!(events(&controller).is_empty());
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_hidden_boundary_counts_as_missing() {
        let controller = controller();
        controller.set_boundary_visible(false);
        let outcome = controller.run(&store(), &provider()).await;
        assert_eq!(outcome, RunOutcome::Failed(InterpolationError::NoBoundary));
        controller.set_boundary_visible(true);
        assert!(matches!(
            controller.run(&store(), &provider()).await,
            RunOutcome::Rendered { .. }
        ));
    }

    #[tokio::test]
    async fn test_insufficient_samples_skips_fetching() {
        let controller = controller();
        let provider = provider();
        let mut locations = store();
        locations.remove("c");
        let outcome = controller.run(&locations, &provider).await;
        assert_eq!(
            outcome,
            RunOutcome::Failed(InterpolationError::InsufficientSamples {
                needed: 3,
                found: 2
            })
        );
        assert_eq!(provider.calls.get(), 0);
        assert!(controller.last_error().unwrap().contains("found 2"));
    }

    #[tokio::test]
    async fn test_failed_run_keeps_previous_overlay() {
        let controller = controller();
        controller.run(&store(), &provider()).await;

        let mut broken = provider();
        broken.failing.push(GeoPoint::new(0.0, 1.0));
        let outcome = controller.run(&store(), &broken).await;
        assert!(matches!(
            outcome,
            RunOutcome::Failed(InterpolationError::DataFetchFailed { ref location, .. }) if location == "b"
        ));
        assert_eq!(controller.overlay(), Some(OverlayHandle(1)));
        assert!(controller.current_result().is_some());
        assert!(!events(&controller)
            .iter()
            .any(|e| matches!(e, SurfaceEvent::Removed(_))));
    }

    #[tokio::test]
    async fn test_day_out_of_range_is_a_fetch_failure() {
        let controller = controller();
        controller.select_day(7);
        let outcome = controller.run(&store(), &provider()).await;
        assert!(matches!(
            outcome,
            RunOutcome::Failed(InterpolationError::DataFetchFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_selection_change_removes_overlay_without_rerun() {
        let controller = controller();
        let provider = provider();
        controller.run(&store(), &provider).await;
        controller.select_attribute(Attribute::WindGusts);
        assert_eq!(controller.overlay(), None);
        assert!(controller.current_result().is_none());
        // selecting the same value again is a no-op
        controller.select_attribute(Attribute::WindGusts);
        controller.select_day(1);
        assert_eq!(
            events(&controller),
            vec![
                SurfaceEvent::Overlay(OverlayHandle(1), 9),
                SurfaceEvent::Legend(
                    "Max Temperature (°C)".into(),
                    "10.0".into(),
                    "30.0".into()
                ),
                SurfaceEvent::Removed(OverlayHandle(1)),
            ]
        );
        assert_eq!(provider.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_run_is_rejected() {
        let controller = controller();
        let gate = Rc::new(Semaphore::new(0));
        let mut gated = provider();
        gated.gate = Some(Rc::clone(&gate));
        let locations = store();

        let (first, second) = tokio::join!(controller.run(&locations, &gated), async {
            tokio::task::yield_now().await;
            assert!(controller.is_running());
            assert_eq!(controller.state(), SessionState::Collecting);
            let second = controller.run(&locations, &gated).await;
            gate.add_permits(16);
            second
        });
        assert!(matches!(first, RunOutcome::Rendered { .. }));
        assert_eq!(second, RunOutcome::Failed(InterpolationError::AlreadyRunning));
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_stale_run_is_discarded() {
        let controller = controller();
        let gate = Rc::new(Semaphore::new(0));
        let mut gated = provider();
        gated.gate = Some(Rc::clone(&gate));
        let locations = store();

        let (outcome, _) = tokio::join!(controller.run(&locations, &gated), async {
            tokio::task::yield_now().await;
            controller.select_day(1);
            gate.add_permits(16);
        });
        assert_eq!(outcome, RunOutcome::Discarded);
        assert!(events(&controller).is_empty());
        assert_eq!(controller.selection().day, 1);
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_a_fetch_failure() {
        let controller = controller();
        let mut stalled = provider();
        // no permits are ever added
        stalled.gate = Some(Rc::new(Semaphore::new(0)));
        let outcome = controller.run(&store(), &stalled).await;
        match outcome {
            RunOutcome::Failed(InterpolationError::DataFetchFailed { reason, .. }) => {
                assert!(reason.contains("timed out"), "{reason}");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(!controller.is_running());
    }
}
