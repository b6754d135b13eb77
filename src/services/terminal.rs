use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::render::{self, Screen, LOADING_TEXT, PAGE_TITLE};
use super::state::ViewState;

/// Draws the dashboard on stdout: a spinner while loading, the card once
/// data is in. Identical screens are not redrawn.
#[derive(Default)]
pub struct TerminalView {
    spinner: Option<ProgressBar>,
    last: Option<Screen>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, view: &ViewState) {
        let screen = render::screen(view);
        if self.last.as_ref() == Some(&screen) {
            return;
        }

        match &screen {
            Screen::Loading => {
                if self.spinner.is_none() {
                    self.spinner = Some(loading_spinner());
                }
            }
            Screen::Card(_) => {
                if let Some(spinner) = self.spinner.take() {
                    spinner.finish_and_clear();
                }
                if let ViewState::Loaded { updated_at, .. } = view {
                    println!(
                        "\n{} [{}]",
                        PAGE_TITLE,
                        updated_at.with_timezone(&chrono::Local).format("%H:%M:%S")
                    );
                }
                println!("─────────────────────────────────────────────");
                print!("{}", screen.to_text());
            }
        }

        self.last = Some(screen);
    }

    pub fn finish(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

fn loading_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(LOADING_TEXT);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
