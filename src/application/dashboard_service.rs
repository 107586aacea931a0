// Dashboard service - Refresh pipeline and page-view interactions
use crate::application::telemetry_client::{QueryError, TelemetryClient};
use crate::domain::annotation::{HoverState, PlotArea, SharedTooltip, TooltipRenderer};
use crate::domain::chart::{ChartId, ChartRegistry, RenderOutcome};
use crate::domain::dashboard::{latest_tiles, Dashboard, TileData};
use crate::domain::filament::build_filament_series;
use crate::domain::suggestions::{
    FilamentForm, LoadedFilaments, SuggestionField, SuggestionList, TextField,
};
use crate::domain::telemetry::TelemetryResponse;
use crate::domain::time_range::{parse_date, parse_time, RangeError, TimeRangeSelector};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Everything one page view owns. Handlers lock it, run to completion and
/// release it; the lock is never held across an `.await`.
pub struct DashboardSession {
    selector: TimeRangeSelector,
    charts: ChartRegistry,
    tooltip: SharedTooltip,
    tiles: Vec<TileData>,
    loaded: LoadedFilaments,
    form: FilamentForm,
    issued: u64,
}

impl DashboardSession {
    pub fn new(
        selector: TimeRangeSelector,
        plot: PlotArea,
        dark: bool,
        tooltip: Box<dyn TooltipRenderer>,
    ) -> Self {
        Self {
            selector,
            charts: ChartRegistry::new(plot, dark),
            tooltip: SharedTooltip::new(tooltip),
            tiles: Vec::new(),
            loaded: LoadedFilaments::default(),
            form: FilamentForm::default(),
            issued: 0,
        }
    }

    fn apply(&mut self, response: &TelemetryResponse) -> RefreshOutcome {
        let series = build_filament_series(&response.filament_timeline, response.len());
        let markers = response.markers();

        match self.charts.render(response, &series, &mut self.tooltip) {
            RenderOutcome::NoData => {
                self.tiles.clear();
                self.loaded = LoadedFilaments::default();
                RefreshOutcome::NoData
            }
            RenderOutcome::Rendered => {
                self.charts.install_markers(&markers, &mut self.tooltip);
                self.tiles = latest_tiles(response);
                self.loaded = LoadedFilaments::from_series(&series);
                RefreshOutcome::Rendered {
                    points: response.len(),
                    series: series.len(),
                    markers: markers.len(),
                }
            }
        }
    }

    fn pointer_move(&mut self, id: ChartId, x: f64, y: f64) -> Option<HoverState> {
        let chart = self.charts.chart_mut(id)?;
        for transition in chart.markers.pointer_move(x, y, &mut self.tooltip) {
            tracing::debug!(chart = id.key(), ?transition, "Marker hover changed");
        }
        Some(chart.markers.state())
    }

    fn pointer_leave(&mut self, id: ChartId) -> Option<HoverState> {
        let chart = self.charts.chart_mut(id)?;
        if let Some(transition) = chart.markers.pointer_leave(&mut self.tooltip) {
            tracing::debug!(chart = id.key(), ?transition, "Marker hover changed");
        }
        Some(chart.markers.state())
    }

    fn view(&self) -> Dashboard {
        Dashboard {
            title: self.selector.label().to_string(),
            window: self.selector.resolve(),
            full_day: self.selector.is_full_day(),
            theme: self.charts.palette(),
            tiles: self.tiles.clone(),
            charts: self.charts.slots().map(|(_, slot)| slot.clone()).collect(),
            tooltip: self.tooltip.current().cloned(),
            form: self.form.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    Rendered {
        points: usize,
        series: usize,
        markers: usize,
    },
    NoData,
    /// A newer refresh was issued while this one was in flight.
    Superseded,
}

/// Selector edits; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeEdit {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub full_day: Option<bool>,
}

#[derive(Clone)]
pub struct DashboardService {
    client: Arc<dyn TelemetryClient>,
    session: Arc<Mutex<DashboardSession>>,
}

impl DashboardService {
    pub fn new(client: Arc<dyn TelemetryClient>, session: DashboardSession) -> Self {
        Self {
            client,
            session: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DashboardSession> {
        lock_session(&self.session)
    }

    /// Fetch the selected window and redraw every chart.
    ///
    /// Fetch failures return before anything is touched, leaving the previous
    /// charts in place. Responses to anything but the most recently issued
    /// request are dropped.
    pub async fn refresh(&self) -> Result<RefreshOutcome, QueryError> {
        let (sequence, window) = {
            let mut session = self.lock();
            session.issued += 1;
            (session.issued, session.selector.resolve())
        };

        tracing::info!(
            sequence,
            start = %window.start_date,
            end = %window.end_date,
            "Refreshing telemetry"
        );

        let response = match self.client.fetch(&window).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(sequence, "Telemetry refresh failed: {}", e);
                return Err(e);
            }
        };

        let mut session = self.lock();
        if sequence != session.issued {
            tracing::warn!(
                sequence,
                latest = session.issued,
                "Dropping stale telemetry response"
            );
            return Ok(RefreshOutcome::Superseded);
        }

        let outcome = session.apply(&response);
        tracing::info!(sequence, ?outcome, "Telemetry refresh applied");
        Ok(outcome)
    }

    /// Apply selector edits and return the new range label. Nothing changes
    /// unless every field parses.
    pub fn edit_range(&self, edit: &RangeEdit) -> Result<String, RangeError> {
        let start_date = edit.start_date.as_deref().map(parse_date).transpose()?;
        let end_date = edit.end_date.as_deref().map(parse_date).transpose()?;
        let start_time = edit.start_time.as_deref().map(parse_time).transpose()?;
        let end_time = edit.end_time.as_deref().map(parse_time).transpose()?;

        let mut session = self.lock();
        let selector = &mut session.selector;
        if let Some(date) = start_date {
            selector.set_start_date(date);
        }
        if let Some(date) = end_date {
            selector.set_end_date(date);
        }
        if let Some(time) = start_time {
            selector.set_start_time(time);
        }
        if let Some(time) = end_time {
            selector.set_end_time(time);
        }
        if let Some(full_day) = edit.full_day {
            selector.set_full_day(full_day);
        }
        Ok(selector.label().to_string())
    }

    /// `None` when the chart is not constructed.
    pub fn pointer_move(&self, chart: ChartId, x: f64, y: f64) -> Option<HoverState> {
        self.lock().pointer_move(chart, x, y)
    }

    pub fn pointer_leave(&self, chart: ChartId) -> Option<HoverState> {
        self.lock().pointer_leave(chart)
    }

    /// Re-theme the charts whenever the host publishes a new mode.
    pub fn spawn_theme_listener(&self, mut theme: watch::Receiver<bool>) -> JoinHandle<()> {
        let session = self.session.clone();
        tokio::spawn(async move {
            let initial = *theme.borrow_and_update();
            lock_session(&session).charts.apply_theme(initial);

            while theme.changed().await.is_ok() {
                let dark = *theme.borrow_and_update();
                tracing::debug!(dark, "Theme changed");
                lock_session(&session).charts.apply_theme(dark);
            }
        })
    }

    pub fn suggestions(&self, field: SuggestionField, typed: &str) -> SuggestionList {
        SuggestionList::build(&self.lock().loaded, field, typed)
    }

    /// Write suggestion `index` for `typed` into the form field.
    pub fn select_suggestion(
        &self,
        field: SuggestionField,
        typed: &str,
        index: usize,
    ) -> Option<TextField> {
        let mut session = self.lock();
        let list = SuggestionList::build(&session.loaded, field, typed);
        let target = session.form.field_mut(field);
        list.select(index, target).then(|| target.clone())
    }

    pub fn view(&self) -> Dashboard {
        self.lock().view()
    }
}

fn lock_session(session: &Mutex<DashboardSession>) -> MutexGuard<'_, DashboardSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
