use ratatui::Frame;

use repline::session::Phase;

use crate::{ui::render_summary, App};

/// A UI Screen boundary: responsible for rendering one stage of the session
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Countdown, exercise and rest views, rendered by the App widget
pub struct SessionScreen;

impl Screen for SessionScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Workout summary with the active/rest chart
pub struct SummaryScreen;

impl Screen for SummaryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_summary(app, f.area(), f.buffer_mut());
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: Option<Phase>) -> Box<dyn Screen> {
    match phase {
        Some(Phase::Finished) => Box::new(SummaryScreen),
        _ => Box::new(SessionScreen),
    }
}
