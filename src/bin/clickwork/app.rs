//! Clickwork - wires the metronome runtime to the terminal UI

use color_eyre::eyre::{Result as EyreResult, WrapErr};

use clickwork::{engine::CpalBackend, runtime, SchedulerConfig};

use super::ui::UiApp;

/// Main application
pub struct Clickwork {
    config: SchedulerConfig,
}

impl Clickwork {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Run the application (takes over the terminal until the user quits)
    pub fn run(self) -> EyreResult<()> {
        let metronome = runtime::spawn(CpalBackend::new(), self.config)
            .wrap_err("failed to start metronome")?;
        tracing::info!(tempo = %metronome.tempo(), "clickwork started");

        let mut terminal = ratatui::init();
        let result = UiApp::new(metronome).run(&mut terminal);
        ratatui::restore();

        result
    }
}
