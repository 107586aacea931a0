use crate::domain::annotation::TooltipRenderer;

/// Tooltip presenter for the headless dashboard. The page polls the view for
/// tooltip state, so drawing reduces to a trace line.
#[derive(Debug, Default)]
pub struct LogTooltip;

impl TooltipRenderer for LogTooltip {
    fn show(&mut self, x: f64, y: f64, text: &str) {
        tracing::debug!(x, y, "Tooltip shown: {}", text);
    }

    fn hide(&mut self) {
        tracing::debug!("Tooltip hidden");
    }
}
