// Print job boundary markers
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Start,
    End,
}

impl MarkerKind {
    pub fn caption(self) -> &'static str {
        match self {
            MarkerKind::Start => "Print Start",
            MarkerKind::End => "Print End",
        }
    }
}

/// A print job start or end at one index of the window.
///
/// Starts and ends do not pair up: a job that began before the window only
/// shows its end, and a job still running only shows its start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMarker {
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    pub index: usize,
    pub project_name: String,
}

impl ProjectMarker {
    pub fn new(kind: MarkerKind, index: usize, project_name: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            project_name: project_name.into(),
        }
    }

    pub fn tooltip_text(&self) -> String {
        format!("{}: {}", self.kind.caption(), self.project_name)
    }
}

fn is_finished(state: &str) -> bool {
    state == "FINISH" || state == "IDLE"
}

/// Reconstruct job boundaries from per-sample gcode states and subtask names.
pub fn derive_project_markers(
    gcode_state: &[Option<String>],
    subtask_name: &[Option<String>],
) -> Vec<ProjectMarker> {
    let mut markers = Vec::new();
    let mut current_job: Option<&str> = None;
    let mut last_state: Option<&str> = None;

    for (index, state) in gcode_state.iter().enumerate() {
        let state = state.as_deref().filter(|s| !s.is_empty());
        let subtask = subtask_name
            .get(index)
            .and_then(|s| s.as_deref())
            .filter(|s| !s.is_empty());
        let is_printing = state.is_some_and(|s| !is_finished(s));

        match (subtask, current_job) {
            (Some(name), job) if is_printing && job != Some(name) => {
                markers.push(ProjectMarker::new(MarkerKind::Start, index, name));
                current_job = Some(name);
            }
            (_, Some(job))
                if last_state.is_some_and(|s| !is_finished(s))
                    && state.is_some_and(is_finished) =>
            {
                markers.push(ProjectMarker::new(MarkerKind::End, index, job));
                current_job = None;
            }
            _ => {}
        }

        last_state = state;
    }

    markers
}
