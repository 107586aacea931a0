// Print marker annotations and pointer-proximity hover handling
use super::chart::ChartId;
use super::markers::{MarkerKind, ProjectMarker};
use serde::Serialize;

/// Horizontal distance, inclusive, at which a marker line reacts.
pub const HOVER_THRESHOLD_PX: f64 = 10.0;

const START_COLOR: &str = "#22c55e";
const END_COLOR: &str = "#ef4444";

/// Position of the marker in the `project_markers` list it was built from.
pub type MarkerId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub width: f64,
    pub opacity: f64,
}

impl LineStyle {
    pub fn resting(kind: MarkerKind) -> Self {
        Self {
            color: kind_color(kind),
            width: 1.0,
            opacity: 0.5,
        }
    }

    pub fn hovered(kind: MarkerKind) -> Self {
        Self {
            color: kind_color(kind),
            width: 3.0,
            opacity: 1.0,
        }
    }
}

fn kind_color(kind: MarkerKind) -> &'static str {
    match kind {
        MarkerKind::Start => START_COLOR,
        MarkerKind::End => END_COLOR,
    }
}

/// Horizontal pixel extent of a chart's plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotArea {
    pub left: f64,
    pub right: f64,
}

impl PlotArea {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Pixel of category `index` on an axis of `count` evenly spaced labels.
    pub fn x_for_index(&self, index: usize, count: usize) -> Option<f64> {
        if index >= count {
            return None;
        }
        let width = self.right - self.left;
        if count == 1 {
            return Some(self.left + width / 2.0);
        }
        Some(self.left + width * index as f64 / (count - 1) as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLine {
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub project_name: String,
    pub index: usize,
    pub x: f64,
    pub style: LineStyle,
}

impl MarkerLine {
    fn is_near(&self, x: f64) -> bool {
        (self.x - x).abs() <= HOVER_THRESHOLD_PX
    }

    fn tooltip_text(&self) -> String {
        ProjectMarker::new(self.kind, self.index, self.project_name.clone()).tooltip_text()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "marker", rename_all = "lowercase")]
pub enum HoverState {
    Idle,
    Hovering(MarkerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTransition {
    Entered(MarkerId),
    Left(MarkerId),
}

/// Draws the single tooltip shared by every chart.
pub trait TooltipRenderer: Send {
    fn show(&mut self, x: f64, y: f64, text: &str);
    fn hide(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TooltipOwner {
    pub chart: ChartId,
    pub marker: MarkerId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipView {
    pub owner: TooltipOwner,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// The one tooltip on the page, remembering which marker currently owns it.
pub struct SharedTooltip {
    renderer: Box<dyn TooltipRenderer>,
    current: Option<TooltipView>,
}

impl SharedTooltip {
    pub fn new(renderer: Box<dyn TooltipRenderer>) -> Self {
        Self {
            renderer,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&TooltipView> {
        self.current.as_ref()
    }

    fn claim(&mut self, owner: TooltipOwner, x: f64, y: f64, text: String) {
        self.renderer.show(x, y, &text);
        self.current = Some(TooltipView { owner, text, x, y });
    }

    /// Move the tooltip with the pointer if `owner` still holds it.
    fn follow(&mut self, owner: TooltipOwner, x: f64, y: f64) -> bool {
        match self.current.as_mut().filter(|v| v.owner == owner) {
            Some(view) => {
                view.x = x;
                view.y = y;
                self.renderer.show(x, y, &view.text);
                true
            }
            None => false,
        }
    }

    /// Hide the tooltip, but only if `owner` still holds it.
    fn release(&mut self, owner: TooltipOwner) -> bool {
        if self.current.as_ref().is_some_and(|v| v.owner == owner) {
            self.current = None;
            self.renderer.hide();
            true
        } else {
            false
        }
    }

    fn release_chart(&mut self, chart: ChartId) {
        if let Some(owner) = self.current.as_ref().map(|v| v.owner).filter(|o| o.chart == chart) {
            self.release(owner);
        }
    }
}

/// Marker lines of one chart plus its hover state machine.
///
/// At most one marker per chart is hovered. A marker is claimed when the
/// pointer comes within [`HOVER_THRESHOLD_PX`] of its line and nothing else
/// on the chart is hovered; on ties the lowest id wins. The hovered marker is
/// released as soon as the pointer leaves its vicinity, before any other
/// marker gets a chance to claim, so a move from one marker straight onto a
/// neighbour hands over within a single event.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerLayer {
    chart: ChartId,
    lines: Vec<MarkerLine>,
    state: HoverState,
}

impl MarkerLayer {
    pub fn new(chart: ChartId) -> Self {
        Self {
            chart,
            lines: Vec::new(),
            state: HoverState::Idle,
        }
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[MarkerLine] {
        &self.lines
    }

    /// Replace every line with the markers of a fresh response.
    pub fn rebuild(
        &mut self,
        markers: &[ProjectMarker],
        points: usize,
        plot: PlotArea,
        tooltip: &mut SharedTooltip,
    ) {
        tooltip.release_chart(self.chart);
        self.state = HoverState::Idle;
        self.lines = markers
            .iter()
            .enumerate()
            .filter_map(|(id, marker)| {
                let Some(x) = plot.x_for_index(marker.index, points) else {
                    tracing::debug!(
                        "Marker {} at index {} outside {} points, skipping",
                        marker.project_name,
                        marker.index,
                        points
                    );
                    return None;
                };
                Some(MarkerLine {
                    id,
                    kind: marker.kind,
                    project_name: marker.project_name.clone(),
                    index: marker.index,
                    x,
                    style: LineStyle::resting(marker.kind),
                })
            })
            .collect();
    }

    pub fn clear(&mut self, tooltip: &mut SharedTooltip) {
        tooltip.release_chart(self.chart);
        self.lines.clear();
        self.state = HoverState::Idle;
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, tooltip: &mut SharedTooltip) -> Vec<HoverTransition> {
        let mut transitions = Vec::new();

        if let HoverState::Hovering(active) = self.state {
            if let Some(line) = self.line(active).filter(|line| line.is_near(x)) {
                // Another chart may have taken the tooltip in the meantime.
                let owner = self.owner(active);
                if !tooltip.follow(owner, x, y) {
                    tooltip.claim(owner, x, y, line.tooltip_text());
                }
                return transitions;
            }
            self.leave(active, tooltip);
            transitions.push(HoverTransition::Left(active));
        }

        let candidate = self.lines.iter().find(|line| line.is_near(x)).map(|line| line.id);
        if let Some(id) = candidate {
            self.enter(id, x, y, tooltip);
            transitions.push(HoverTransition::Entered(id));
        }

        transitions
    }

    /// Pointer left the chart canvas entirely.
    pub fn pointer_leave(&mut self, tooltip: &mut SharedTooltip) -> Option<HoverTransition> {
        match self.state {
            HoverState::Hovering(active) => {
                self.leave(active, tooltip);
                Some(HoverTransition::Left(active))
            }
            HoverState::Idle => None,
        }
    }

    fn owner(&self, marker: MarkerId) -> TooltipOwner {
        TooltipOwner {
            chart: self.chart,
            marker,
        }
    }

    fn line(&self, id: MarkerId) -> Option<&MarkerLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    fn enter(&mut self, id: MarkerId, x: f64, y: f64, tooltip: &mut SharedTooltip) {
        let owner = self.owner(id);
        if let Some(line) = self.lines.iter_mut().find(|line| line.id == id) {
            line.style = LineStyle::hovered(line.kind);
            tooltip.claim(owner, x, y, line.tooltip_text());
            self.state = HoverState::Hovering(id);
        }
    }

    fn leave(&mut self, id: MarkerId, tooltip: &mut SharedTooltip) {
        let owner = self.owner(id);
        if let Some(line) = self.lines.iter_mut().find(|line| line.id == id) {
            line.style = LineStyle::resting(line.kind);
        }
        tooltip.release(owner);
        self.state = HoverState::Idle;
    }
}
