use super::Action;
use crate::data::DataCatalog;
use crate::indicators::{self, Indicator, PyramidYear};
use crate::player::Player;
use crate::report::{self, ReportEntry};
use crate::route::Route;
use crossterm::event::KeyCode;
use rand::{Rng, rng};
use std::time::{Duration, Instant};

pub struct HomePage {
    pub indicators: Vec<Indicator>,
    pub player: Player,
    pub featured: Option<&'static ReportEntry>,
    last_frame: Instant,
}

impl HomePage {
    pub fn new(catalog: &DataCatalog) -> Self {
        Self {
            indicators: indicators::summarize(&catalog.indicators),
            player: Player::at_end(catalog.pyramid.len()),
            featured: random_report(),
            last_frame: Instant::now(),
        }
    }

    /// Pyramid year under the scrubber.
    pub fn current_year<'a>(&self, catalog: &'a DataCatalog) -> Option<&'a PyramidYear> {
        catalog.pyramid.get(self.player.index())
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Char(' ') | KeyCode::Char('p') => {
                self.player.toggle();
                self.last_frame = Instant::now();
            }
            KeyCode::Left => self.player.step_backward(),
            KeyCode::Right => self.player.step_forward(),
            KeyCode::Char('f') => self.featured = random_report(),
            KeyCode::Enter => {
                if let Some(r) = self.featured {
                    return Action::Navigate(Route::ReportDetail(r.id));
                }
            }
            _ => {}
        }
        Action::None
    }

    /// Advances the scrubber one frame per `interval` while playing.
    pub fn tick(&mut self, interval: Duration, now: Instant) {
        if self.player.is_playing() && now.saturating_duration_since(self.last_frame) >= interval {
            self.player.tick();
            self.last_frame = now;
        }
    }
}

fn random_report() -> Option<&'static ReportEntry> {
    if report::REPORTS.is_empty() {
        return None;
    }
    let idx = rng().random_range(0..report::REPORTS.len());
    report::REPORTS.get(idx)
}
