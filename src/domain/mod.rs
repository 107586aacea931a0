// Domain layer - Telemetry shaping, charts and annotations
pub mod annotation;
pub mod chart;
pub mod dashboard;
pub mod filament;
pub mod markers;
pub mod suggestions;
pub mod telemetry;
pub mod time_range;
