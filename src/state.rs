use crate::{
    config::Config,
    data::DataCatalog,
    datasource::{DataSource, FileDataSource},
    error::Result,
    fetch::Fetcher,
    pages::{Action, gis::GisPage, home::HomePage, reports::ReportsPage, wrap},
    report::{self, ReportEntry},
    route::Route,
    theme::Theme,
};
use crossterm::event::KeyCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub enum Page {
    Home(HomePage),
    Reports(ReportsPage),
    Detail(&'static ReportEntry),
    GisIndex { selected: usize },
    Gis(Box<GisPage>),
}

pub struct AppState {
    pub catalog: DataCatalog,
    pub config: Config,
    fetcher: Fetcher,
    pub route: Route,
    pub page: Page,
    pub history: Vec<Route>,
    /// One-line message shown in the footer.
    pub notice: String,
}

impl AppState {
    pub const HELP_TEXT: &'static str =
        "1 홈 · 2 보고서 · 3 지도 · Esc 뒤로 · q 종료";

    pub fn new(config: Config) -> Result<Self> {
        let catalog = DataCatalog::load(&config.data_dir)?;
        let source: Arc<dyn DataSource> = Arc::new(FileDataSource::new(&config.data_dir));
        Ok(Self::with_source(config, catalog, source))
    }

    pub fn with_source(config: Config, catalog: DataCatalog, source: Arc<dyn DataSource>) -> Self {
        let fetcher = Fetcher::spawn(source);
        let home = HomePage::new(&catalog);
        let mut state = Self {
            catalog,
            config,
            fetcher,
            route: Route::Home,
            page: Page::Home(home),
            history: Vec::new(),
            notice: String::new(),
        };
        match state.config.start_route.parse::<Route>() {
            Ok(Route::Home) => {}
            Ok(route) => {
                state.open(route);
            }
            Err(e) => {
                log::warn!("start route ignored: {e}");
                state.notice = e.to_string();
            }
        }
        state
    }

    /// Navigates to `route`, remembering the current one for Esc.
    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        let prev = self.route.clone();
        if self.open(route) {
            self.history.push(prev);
        }
    }

    pub fn back(&mut self) {
        if let Some(prev) = self.history.pop() {
            self.open(prev);
        }
    }

    /// Builds the page for `route`; false when the route has no page.
    fn open(&mut self, route: Route) -> bool {
        log::info!("open {route}");
        self.page = match &route {
            Route::Home => Page::Home(HomePage::new(&self.catalog)),
            Route::Reports { category } => Page::Reports(ReportsPage::new(category.clone())),
            Route::ReportDetail(id) => match report::find(*id) {
                Some(entry) => Page::Detail(entry),
                None => {
                    log::warn!("no report with id {id}");
                    self.notice = format!("보고서 {id}를 찾을 수 없습니다");
                    return false;
                }
            },
            Route::GisIndex => Page::GisIndex { selected: 0 },
            Route::Gis(theme) => Page::Gis(Box::new(GisPage::new(*theme))),
        };
        self.route = route;
        true
    }

    fn is_editing(&self) -> bool {
        match &self.page {
            Page::Reports(p) => p.editing,
            Page::Gis(p) => p.is_editing(),
            _ => false,
        }
    }

    /// Returns true when the app should exit.
    pub fn handle_input(&mut self, key: KeyCode) -> bool {
        use KeyCode::*;
        if !self.is_editing() {
            match key {
                Char('q') => return true,
                Char('1') => {
                    self.navigate(Route::Home);
                    return false;
                }
                Char('2') => {
                    self.navigate(Route::Reports { category: None });
                    return false;
                }
                Char('3') => {
                    self.navigate(Route::GisIndex);
                    return false;
                }
                _ => {}
            }
        }
        let action = match &mut self.page {
            Page::Home(home) => home.handle_key(key),
            Page::Reports(list) => list.handle_key(key),
            Page::Detail(_) => match key {
                Esc | Backspace => Action::Back,
                _ => Action::None,
            },
            Page::GisIndex { selected } => match key {
                Up => {
                    *selected = wrap(*selected, -1, Theme::ALL.len());
                    Action::None
                }
                Down => {
                    *selected = wrap(*selected, 1, Theme::ALL.len());
                    Action::None
                }
                Enter => Action::Navigate(Route::Gis(Theme::ALL[*selected])),
                Esc | Backspace => Action::Back,
                _ => Action::None,
            },
            Page::Gis(gis) => gis.handle_key(&self.catalog, key),
        };
        match action {
            Action::None => {}
            Action::Navigate(route) => self.navigate(route),
            Action::Back => self.back(),
        }
        false
    }

    /// Applies finished fetches and advances timers.
    pub fn tick(&mut self, now: Instant) {
        let responses = self.fetcher.drain();
        match &mut self.page {
            Page::Gis(gis) => {
                for resp in responses {
                    gis.on_response(resp);
                }
                gis.tick(&self.fetcher, Duration::from_millis(self.config.debounce_ms), now);
            }
            Page::Home(home) => {
                if !responses.is_empty() {
                    log::debug!("{} responses arrived after leaving the map", responses.len());
                }
                home.tick(Duration::from_millis(self.config.playback_ms), now);
            }
            _ => {}
        }
    }
}
