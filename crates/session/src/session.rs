//! One interactive chart: loaded data, control state, playback, status.
//!
//! A [`Session`] is owned by a single event loop. Control events and timer
//! expirations are fed in one at a time; every call that draws returns the
//! complete frame for the renderer and pushes a status line.

use std::sync::Arc;

use catalog::{IndicatorRecord, RegionIndex, RegionRecord, YearCatalog};
use foundation::bounds::Aabb2;
use layers::LayoutConfig;
use runtime::{StatusBus, StatusEvent, StatusKind, StatusLevel, TickScheduler, TimerId};
use scene::{ActiveRegions, AttributePair, EmptySelection, Frame, filter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::playback::{PlaybackConfig, PlaybackController, StopReason, TickOutcome};

pub const DRAWING_TEXT: &str =
    "Drawing chart. NOTE: Earlier years do not have all countries present.";
pub const NO_COUNTRIES_TEXT: &str = "No countries selected.";
pub const NO_COUNTRIES_PLAYING_TEXT: &str = "Cannot play timelapse, no countries selected.";
pub const NO_DATA_TEXT: &str = "No data for the selected year.";
pub const STOPPED_TEXT: &str = "Stopped timelapse.";

/// Read-only data shared by every frame.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<IndicatorRecord>,
    /// Attribute columns offered for position and size, in header order.
    pub attributes: Vec<String>,
    pub index: RegionIndex,
    pub years: YearCatalog,
}

impl Dataset {
    /// Joins the indicator rows with the region table.
    pub fn new(records: Vec<IndicatorRecord>, attributes: Vec<String>, regions: &[RegionRecord]) -> Self {
        let (index, years) = catalog::build(&records, regions);
        info!(
            records = records.len(),
            countries = index.len(),
            years = years.len(),
            attributes = attributes.len(),
            "dataset ready"
        );
        Self {
            records,
            attributes,
            index,
            years,
        }
    }

    /// Choices for the region control, in name order.
    pub fn regions(&self) -> Vec<String> {
        self.index.regions().map(str::to_string).collect()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }
}

/// Current state of the user controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub active: ActiveRegions,
    pub year: String,
    pub attributes: AttributePair,
}

impl Controls {
    pub fn new(active: ActiveRegions, year: impl Into<String>, attributes: AttributePair) -> Self {
        Self {
            active,
            year: year.into(),
            attributes,
        }
    }

    /// Every region checked, the first year, the first attribute on both
    /// axes.
    pub fn defaults_for(dataset: &Dataset) -> Self {
        let first = dataset.attributes.first().cloned().unwrap_or_default();
        Self {
            active: ActiveRegions::from_regions(dataset.regions()),
            year: dataset.years.first().unwrap_or_default().to_string(),
            attributes: AttributePair::new(first.clone(), first),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Drawing surface width in pixels, margins included.
    pub width: f64,
    pub height: f64,
    pub layout: LayoutConfig,
    pub playback: PlaybackConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 500.0,
            layout: LayoutConfig::default(),
            playback: PlaybackConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn plot_area(&self) -> Aabb2 {
        self.layout.plot_area(self.width, self.height)
    }
}

pub struct Session<S> {
    dataset: Arc<Dataset>,
    controls: Controls,
    playback: PlaybackController,
    scheduler: S,
    status: StatusBus,
    layout: LayoutConfig,
    area: Aabb2,
}

impl<S: TickScheduler> Session<S> {
    pub fn new(dataset: Arc<Dataset>, scheduler: S, config: SessionConfig) -> Self {
        let controls = Controls::defaults_for(&dataset);
        let area = config.plot_area();
        Self {
            dataset,
            controls,
            playback: PlaybackController::new(config.playback),
            scheduler,
            status: StatusBus::new(),
            layout: config.layout,
            area,
        }
    }

    pub fn with_controls(mut self, controls: Controls) -> Self {
        self.controls = controls;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn status(&self) -> &[StatusEvent] {
        self.status.events()
    }

    pub fn drain_status(&mut self) -> Vec<StatusEvent> {
        self.status.drain()
    }

    /// Draws the current controls.
    ///
    /// While playback runs, the year shown is the playback's year rather
    /// than the year control. If the selection became empty, playback
    /// stops.
    pub fn refresh(&mut self) -> Result<Frame, EmptySelection> {
        if !self.playback.is_running() {
            return draw(
                &self.dataset,
                &self.controls,
                &self.layout,
                self.area,
                &mut self.status,
                &self.controls.year,
                false,
            );
        }

        let year = self
            .playback
            .shown_year(&self.dataset.years)
            .unwrap_or(self.controls.year.as_str());
        let drawn = draw(
            &self.dataset,
            &self.controls,
            &self.layout,
            self.area,
            &mut self.status,
            year,
            true,
        );
        if drawn.is_err() {
            self.playback
                .stop(&mut self.scheduler, StopReason::EmptySelection);
            report_stop(&mut self.status, StopReason::EmptySelection);
        }
        drawn
    }

    /// Applies a change of any selection control and redraws.
    pub fn on_selection_changed(
        &mut self,
        active: ActiveRegions,
        year: impl Into<String>,
        position: impl Into<String>,
        size: impl Into<String>,
    ) -> Result<Frame, EmptySelection> {
        self.controls.active = active;
        self.controls.year = year.into();
        self.controls.attributes = AttributePair::new(position, size);
        self.refresh()
    }

    pub fn select_all(&mut self) -> Result<Frame, EmptySelection> {
        self.controls.active = ActiveRegions::from_regions(self.dataset.regions());
        self.refresh()
    }

    pub fn deselect_all(&mut self) -> Result<Frame, EmptySelection> {
        self.controls.active.clear();
        self.refresh()
    }

    /// Checks or unchecks one region and redraws.
    pub fn on_region_toggled(&mut self, region: &str) -> Result<Frame, EmptySelection> {
        let checked = self.controls.active.toggle(region);
        debug!(region, checked, "region toggled");
        self.refresh()
    }

    /// Play/stop control.
    pub fn on_play_toggle(&mut self) -> TickOutcome<Frame> {
        let dataset = &self.dataset;
        let controls = &self.controls;
        let (layout, area, status) = (&self.layout, self.area, &mut self.status);
        let outcome = self.playback.toggle(
            &dataset.years,
            &controls.year,
            &mut self.scheduler,
            |year| draw(dataset, controls, layout, area, status, year, true),
        );
        if let Some(reason) = outcome.stop_reason() {
            report_stop(&mut self.status, reason);
        }
        outcome
    }

    /// Delivers a timer expiration from the scheduler backend.
    pub fn on_timer(&mut self, id: TimerId) -> TickOutcome<Frame> {
        let dataset = &self.dataset;
        let controls = &self.controls;
        let (layout, area, status) = (&self.layout, self.area, &mut self.status);
        let outcome = self.playback.on_timer(
            id,
            &dataset.years,
            &mut self.scheduler,
            |year| draw(dataset, controls, layout, area, status, year, true),
        );
        if let Some(reason) = outcome.stop_reason() {
            report_stop(&mut self.status, reason);
        }
        outcome
    }

    /// Stops playback if it runs. Returns `false` when already idle.
    pub fn stop_playback(&mut self) -> bool {
        let stopped = self.playback.stop(&mut self.scheduler, StopReason::User);
        if stopped {
            report_stop(&mut self.status, StopReason::User);
        }
        stopped
    }
}

fn draw(
    dataset: &Dataset,
    controls: &Controls,
    layout: &LayoutConfig,
    area: Aabb2,
    status: &mut StatusBus,
    year: &str,
    playing: bool,
) -> Result<Frame, EmptySelection> {
    match filter(&controls.active, year, &dataset.records, &dataset.index) {
        Ok(records) => {
            status.emit(StatusKind::Drawing, StatusLevel::Info, DRAWING_TEXT);
            let out = layers::layout(&records, &controls.attributes, area, layout);
            Ok(Frame::assemble(
                year,
                &controls.active,
                &controls.attributes,
                &records,
                &out.placements,
            ))
        }
        // Playback shows a year without rows for the selection as an empty
        // frame and keeps going.
        Err(EmptySelection::NoRecords) if playing => {
            status.emit(StatusKind::Drawing, StatusLevel::Info, DRAWING_TEXT);
            Ok(Frame::assemble(year, &controls.active, &controls.attributes, &[], &[]))
        }
        Err(empty) => {
            let text = match (empty, playing) {
                (EmptySelection::NoRecords, _) => NO_DATA_TEXT,
                (_, true) => NO_COUNTRIES_PLAYING_TEXT,
                (_, false) => NO_COUNTRIES_TEXT,
            };
            debug!(year, %empty, "nothing to draw");
            status.emit(StatusKind::EmptySelection, StatusLevel::Warning, text);
            Err(empty)
        }
    }
}

fn report_stop(status: &mut StatusBus, reason: StopReason) {
    let text = match reason {
        StopReason::EmptySelection => format!("{STOPPED_TEXT} {NO_COUNTRIES_TEXT}"),
        StopReason::User | StopReason::Exhausted => STOPPED_TEXT.to_string(),
    };
    status.emit(StatusKind::PlaybackStopped, StatusLevel::Info, text);
}
