//! The thematic map page: filter panel, map layers and chart.
//!
//! Panel edits go through the filter reducer and arm a debounce timer. When
//! it expires the query is assembled; an empty query removes the data layer,
//! anything else takes a ticket and asks the fetch worker. Responses are
//! upserted through the layer manager, and the chart is regrouped from the
//! layer that was just written.

use super::{Action, wrap};
use crate::chart;
use crate::crop::CropSelection;
use crate::data::DataCatalog;
use crate::fetch::{FetchKind, FetchRequest, FetchResponse, Fetcher};
use crate::filter::{FilterAction, FilterField, FilterKey, FilterReducer, FilterState, Range};
use crate::hierarchy::Pick;
use crate::layer::{BoundaryLayer, FeatureLayer, LayerManager, LayerStyle, MapLayer, Upsert};
use crate::query::{QueryParams, assemble};
use crate::region::RegionLevel;
use crate::theme::Theme;
use crossterm::event::KeyCode;
use ratatui::style::Color;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const BOUNDARY_Z: i32 = 0;
const DATA_Z: i32 = 10;
const CHART_BARS: usize = 12;

/// One line of the filter panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Row {
    Level,
    City,
    Zone,
    Town,
    Village,
    CropGroup,
    Crop,
    Year,
    Area,
    OrganicMatter,
    SoilType,
}

impl Row {
    fn for_key(key: FilterKey) -> &'static [Row] {
        match key {
            FilterKey::Region => &[Row::Level, Row::City, Row::Zone, Row::Town, Row::Village],
            FilterKey::Crop => &[Row::CropGroup, Row::Crop],
            FilterKey::Year => &[Row::Year],
            FilterKey::Area => &[Row::Area],
            FilterKey::OrganicMatter => &[Row::OrganicMatter],
            FilterKey::SoilType => &[Row::SoilType],
        }
    }

    pub fn key(self) -> FilterKey {
        match self {
            Row::Level | Row::City | Row::Zone | Row::Town | Row::Village => FilterKey::Region,
            Row::CropGroup | Row::Crop => FilterKey::Crop,
            Row::Year => FilterKey::Year,
            Row::Area => FilterKey::Area,
            Row::OrganicMatter => FilterKey::OrganicMatter,
            Row::SoilType => FilterKey::SoilType,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Row::Level => "구분",
            Row::City => RegionLevel::City.label(),
            Row::Zone => RegionLevel::Zone.label(),
            Row::Town => RegionLevel::Town.label(),
            Row::Village => RegionLevel::Village.label(),
            Row::CropGroup => "부류",
            Row::Crop => "품목",
            other => other.key().label(),
        }
    }

    fn region_level(self) -> Option<RegionLevel> {
        match self {
            Row::City => Some(RegionLevel::City),
            Row::Zone => Some(RegionLevel::Zone),
            Row::Town => Some(RegionLevel::Town),
            Row::Village => Some(RegionLevel::Village),
            _ => None,
        }
    }
}

pub struct GisPage {
    pub theme: Theme,
    reducer: FilterReducer,
    pub filters: FilterState,
    pub crops: CropSelection,
    pub layers: LayerManager,
    pub rows: Vec<Row>,
    pub focus: usize,
    cursors: HashMap<Row, usize>,
    pub chart: Vec<(String, f64)>,
    pub status: String,
    pub loading: bool,
    /// Text typed after `:`, dispatched as a filter action on Enter.
    pub command: Option<String>,
    pending_since: Option<Instant>,
    boundary_level: Option<RegionLevel>,
}

impl GisPage {
    pub fn new(theme: Theme) -> Self {
        let reducer = FilterReducer::new(theme.default_filters());
        let filters = reducer.initial();
        let rows = theme
            .filters()
            .iter()
            .flat_map(|k| Row::for_key(*k).iter().copied())
            .collect();
        Self {
            theme,
            reducer,
            filters,
            crops: CropSelection::default(),
            layers: LayerManager::new(),
            rows,
            focus: 0,
            cursors: HashMap::new(),
            chart: Vec::new(),
            status: String::new(),
            loading: false,
            command: None,
            // first tick loads the defaults
            pending_since: Some(Instant::now()),
            boundary_level: None,
        }
    }

    pub fn focused(&self) -> Row {
        self.rows[self.focus.min(self.rows.len() - 1)]
    }

    pub fn cursor(&self, row: Row) -> usize {
        self.cursors.get(&row).copied().unwrap_or(0)
    }

    pub fn is_active(&self, row: Row) -> bool {
        self.filters.active.get(row.key())
    }

    pub fn is_editing(&self) -> bool {
        self.command.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn options(&self, catalog: &DataCatalog, row: Row) -> Vec<String> {
        let region = &self.filters.region;
        match row {
            Row::Level => RegionLevel::ALL.iter().map(|l| l.label().to_string()).collect(),
            Row::City | Row::Zone | Row::Town | Row::Village => match row.region_level() {
                Some(level) => region.options(&catalog.regions, level),
                None => Vec::new(),
            },
            Row::CropGroup => self.crops.group_options(&catalog.crops),
            Row::Crop => self.crops.item_options(&catalog.crops),
            Row::Year => self.theme.years().iter().map(|y| y.to_string()).collect(),
            Row::Area | Row::OrganicMatter => Theme::range_presets(row.key())
                .iter()
                .map(|&(lo, hi)| Range::new(lo, hi).to_string())
                .collect(),
            Row::SoilType => Theme::soil_types().iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether `option` is part of the row's current value.
    pub fn is_selected(&self, row: Row, option: &str) -> bool {
        let f = &self.filters;
        let picked = |pick: &Pick| matches!(pick, Pick::Only(names) if names.iter().any(|n| n == option));
        match row {
            Row::Level => f.region.level.label() == option,
            Row::City => f.region.city() == Some(option),
            Row::Zone | Row::Town | Row::Village => {
                row.region_level().is_some_and(|level| picked(f.region.pick(level)))
            }
            Row::CropGroup => picked(self.crops.groups()),
            Row::Crop => f.crops.iter().any(|c| c == option),
            Row::Year => f.year.is_some_and(|y| y.to_string() == option),
            Row::Area => f.area.to_string() == option,
            Row::OrganicMatter => f.organic_matter.to_string() == option,
            Row::SoilType => f.soil_type.as_deref() == Some(option),
        }
    }

    /// Short text for a row's current value.
    pub fn value_text(&self, row: Row) -> String {
        let f = &self.filters;
        let pick_text = |pick: &Pick| match pick {
            Pick::All => "전체".to_string(),
            Pick::Only(names) if names.is_empty() => "-".to_string(),
            Pick::Only(names) => names.join(", "),
        };
        match row {
            Row::Level => f.region.level.label().to_string(),
            Row::City => f.region.city().unwrap_or("-").to_string(),
            Row::Zone | Row::Town | Row::Village => match row.region_level() {
                Some(level) => pick_text(f.region.pick(level)),
                None => String::new(),
            },
            Row::CropGroup => pick_text(self.crops.groups()),
            Row::Crop if f.crops.is_empty() => "전체".to_string(),
            Row::Crop => f.crops.join(", "),
            Row::Year => f.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into()),
            Row::Area => f.area.to_string(),
            Row::OrganicMatter => f.organic_matter.to_string(),
            Row::SoilType => f.soil_type.clone().unwrap_or_else(|| "-".into()),
        }
    }

    pub fn move_focus(&mut self, delta: isize) {
        self.focus = wrap(self.focus, delta, self.rows.len());
    }

    pub fn move_cursor(&mut self, catalog: &DataCatalog, delta: isize) {
        let row = self.focused();
        let len = self.options(catalog, row).len();
        self.cursors.insert(row, wrap(self.cursor(row), delta, len));
    }

    /// Picks the option under the focused row's cursor.
    pub fn choose(&mut self, catalog: &DataCatalog) {
        let row = self.focused();
        let options = self.options(catalog, row);
        if let Some(option) = options.get(self.cursor(row)) {
            self.select(catalog, row, option);
        }
    }

    /// Applies `option` to `row` as the panel would: multi-valued rows toggle
    /// it, single-valued rows switch to it or clear it when already chosen.
    pub fn select(&mut self, catalog: &DataCatalog, row: Row, option: &str) {
        let f = &self.filters;
        let field = match row {
            Row::Level => {
                let Ok(level) = option.parse::<RegionLevel>() else { return };
                let mut region = f.region.clone();
                region.level = level;
                FilterField::Region(region)
            }
            Row::City | Row::Zone | Row::Town | Row::Village => {
                let Some(level) = row.region_level() else { return };
                let mut region = f.region.clone();
                region.toggle(&catalog.regions, level, option);
                FilterField::Region(region)
            }
            Row::CropGroup => {
                self.crops.toggle_group(&catalog.crops, option);
                FilterField::Crops(self.crops.resolve(&catalog.crops))
            }
            Row::Crop => {
                self.crops.toggle_item(&catalog.crops, option);
                FilterField::Crops(self.crops.resolve(&catalog.crops))
            }
            Row::Year => {
                let year = option.parse().ok();
                FilterField::Year(if f.year == year { None } else { year })
            }
            Row::Area => FilterField::Area(toggle_range(f.area, option)),
            Row::OrganicMatter => FilterField::OrganicMatter(toggle_range(f.organic_matter, option)),
            Row::SoilType => {
                let next = (f.soil_type.as_deref() != Some(option)).then(|| option.to_string());
                FilterField::SoilType(next)
            }
        };
        self.dispatch(Some(FilterAction::Set(field)));
        self.clamp_cursors(catalog);
    }

    pub fn toggle_active(&mut self) {
        let key = self.focused().key();
        self.dispatch(Some(FilterAction::Toggle(key)));
    }

    /// Runs an action through the reducer and arms the refresh timer.
    /// `None` (an unparseable command) and actions on categories the theme
    /// lacks change nothing.
    pub fn dispatch(&mut self, action: Option<FilterAction>) {
        let Some(action) = action else {
            self.status = "알 수 없는 명령입니다".into();
            return;
        };
        let key = match &action {
            FilterAction::Set(field) => Some(field.key()),
            FilterAction::Toggle(key) => Some(*key),
            FilterAction::Reset => None,
        };
        if let Some(key) = key.filter(|k| !self.offers(*k)) {
            self.status = format!("이 주제에는 {} 필터가 없습니다", key.label());
            return;
        }
        if action == FilterAction::Reset {
            self.crops = CropSelection::default();
        }
        self.reducer.dispatch(&mut self.filters, Some(action));
        self.pending_since = Some(Instant::now());
    }

    fn offers(&self, key: FilterKey) -> bool {
        self.theme.filters().contains(&key)
    }

    fn clamp_cursors(&mut self, catalog: &DataCatalog) {
        for row in self.rows.clone() {
            let len = self.options(catalog, row).len();
            if let Some(c) = self.cursors.get_mut(&row) {
                *c = (*c).min(len.saturating_sub(1));
            }
        }
    }

    pub fn handle_key(&mut self, catalog: &DataCatalog, key: KeyCode) -> Action {
        if self.command.is_some() {
            self.handle_command_key(catalog, key);
            return Action::None;
        }
        match key {
            KeyCode::Up => self.move_focus(-1),
            KeyCode::Down => self.move_focus(1),
            KeyCode::Left => self.move_cursor(catalog, -1),
            KeyCode::Right => self.move_cursor(catalog, 1),
            KeyCode::Enter | KeyCode::Char(' ') => self.choose(catalog),
            KeyCode::Char('t') => self.toggle_active(),
            KeyCode::Char('r') => self.dispatch(Some(FilterAction::Reset)),
            KeyCode::Char(':') => self.command = Some(String::new()),
            KeyCode::Esc | KeyCode::Backspace => return Action::Back,
            _ => {}
        }
        Action::None
    }

    fn handle_command_key(&mut self, catalog: &DataCatalog, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                let text = self.command.take().unwrap_or_default();
                let action = match FilterAction::parse(&text) {
                    // typed crops drive the group/pummok rows too
                    Some(FilterAction::Set(FilterField::Crops(items))) if self.offers(FilterKey::Crop) => {
                        self.crops = CropSelection::from_items(&catalog.crops, &items);
                        Some(FilterAction::Set(FilterField::Crops(self.crops.resolve(&catalog.crops))))
                    }
                    other => other,
                };
                self.dispatch(action);
            }
            KeyCode::Esc => self.command = None,
            KeyCode::Backspace => {
                if let Some(c) = self.command.as_mut() {
                    c.pop();
                }
            }
            KeyCode::Char(ch) => {
                if let Some(c) = self.command.as_mut() {
                    c.push(ch);
                }
            }
            _ => {}
        }
    }

    /// Refreshes once the debounce period since the last edit has passed.
    pub fn tick(&mut self, fetcher: &Fetcher, debounce: Duration, now: Instant) {
        if let Some(since) = self.pending_since {
            if now.saturating_duration_since(since) >= debounce {
                self.refresh(fetcher);
            }
        }
    }

    /// Requests whatever the current filters need, right away.
    pub fn refresh(&mut self, fetcher: &Fetcher) {
        self.pending_since = None;
        self.ensure_boundaries(fetcher);
        self.regroup_chart();

        let params = assemble(&self.filters);
        let name = self.theme.data_layer();
        if params.is_empty() {
            log::info!("{}: no active filter, removing {}", self.theme, name);
            self.layers.remove_layer(&name);
            self.chart.clear();
            self.loading = false;
            self.status = "활성화된 필터가 없습니다".into();
            return;
        }
        self.request_features(fetcher, &name, params);
    }

    fn request_features(&mut self, fetcher: &Fetcher, name: &str, params: QueryParams) {
        let ticket = self.layers.begin(name);
        let query = params.to_query_string();
        log::info!("{}: requesting {}", self.theme, query);
        let kind = FetchKind::Features { theme: self.theme, params };
        match fetcher.request(FetchRequest { ticket, kind }) {
            Ok(()) => {
                self.loading = true;
                self.status = format!("조회 중: {query}");
            }
            Err(e) => {
                log::error!("{}: {}", self.theme, e);
                self.loading = false;
                self.status = e.to_string();
            }
        }
    }

    /// Outlines follow the display level; switching level drops the old ones.
    fn ensure_boundaries(&mut self, fetcher: &Fetcher) {
        let level = self.filters.region.level;
        if self.boundary_level == Some(level) {
            return;
        }
        let name = self.theme.boundary_layer();
        self.layers.remove_layer(&name);
        let ticket = self.layers.begin(&name);
        match fetcher.request(FetchRequest { ticket, kind: FetchKind::Boundaries(level) }) {
            Ok(()) => self.boundary_level = Some(level),
            Err(e) => log::error!("{}: boundaries not requested: {}", self.theme, e),
        }
    }

    pub fn on_response(&mut self, resp: FetchResponse) {
        let FetchResponse { ticket, result } = resp;
        if !self.layers.is_current(&ticket) {
            log::debug!("{}: ignoring superseded {}", self.theme, ticket.name);
            return;
        }
        let is_data = ticket.name == self.theme.data_layer();
        let data = match result {
            Ok(data) => data,
            Err(e) => {
                log::warn!("{}: {} failed: {}", self.theme, ticket.name, e);
                if is_data {
                    self.loading = false;
                    self.status = format!("데이터를 불러오지 못했습니다: {e}");
                } else {
                    // retried on the next refresh
                    self.boundary_level = None;
                }
                return;
            }
        };
        let count = data.features.len();
        let outcome = if is_data {
            let style = LayerStyle::shaded(self.theme.color(), self.theme.value_property());
            self.layers.apply(&ticket, data, Some(DATA_Z), |fc| {
                Ok(MapLayer::Features(FeatureLayer::new(fc, style)?))
            })
        } else {
            let style = LayerStyle::outline(Color::Gray, "name");
            self.layers.apply(&ticket, data, Some(BOUNDARY_Z), |fc| {
                Ok(MapLayer::Boundary(BoundaryLayer::new(fc, style)?))
            })
        };
        match outcome {
            Ok(Upsert::Stale) => {}
            Ok(upsert) => {
                log::debug!("{}: {} {:?} with {} features", self.theme, ticket.name, upsert, count);
                if is_data {
                    self.loading = false;
                    self.regroup_chart();
                    self.status = if count == 0 {
                        "선택한 조건에 해당하는 데이터가 없습니다".into()
                    } else {
                        format!("{count}건")
                    };
                }
            }
            Err(e) => {
                log::warn!("{}: could not build {}: {}", self.theme, ticket.name, e);
                if is_data {
                    self.loading = false;
                    self.status = e.to_string();
                } else {
                    self.boundary_level = None;
                }
            }
        }
    }

    /// Property the chart groups by: the display level, or the crop when the
    /// theme has no region filter.
    pub fn chart_group(&self) -> &'static str {
        if self.theme.filters().contains(&FilterKey::Region) {
            self.filters.region.level.property()
        } else {
            "crop"
        }
    }

    fn regroup_chart(&mut self) {
        let group = self.chart_group();
        self.chart = match self.layers.get_layer(&self.theme.data_layer()) {
            Some(layer) => chart::ranked(
                chart::group_by(layer.shapes(), group, self.theme.value_property(), self.theme.aggregate()),
                CHART_BARS,
            ),
            None => Vec::new(),
        };
    }

    /// Outline names to emphasise on the map.
    pub fn highlighted(&self, catalog: &DataCatalog) -> Vec<String> {
        if self.filters.active.region && !self.filters.region.is_empty() {
            self.filters.region.visible(&catalog.regions)
        } else {
            Vec::new()
        }
    }
}

fn toggle_range(current: Range, option: &str) -> Range {
    match option.parse::<Range>() {
        Ok(r) if r == current => Range::default(),
        Ok(r) => r,
        Err(_) => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{Hierarchy, Node};

    fn catalog() -> DataCatalog {
        DataCatalog {
            base: ".".into(),
            regions: crate::hierarchy::tests::sample(),
            crops: Hierarchy::new(vec![
                Node::branch("과수", vec![Node::leaf("감귤"), Node::leaf("사과")]),
                Node::branch("채소", vec![Node::leaf("당근")]),
            ]),
            indicators: Vec::new(),
            pyramid: Vec::new(),
        }
    }

    #[test]
    fn rows_follow_theme_filters() {
        let page = GisPage::new(Theme::PricePrediction);
        assert_eq!(page.rows, vec![Row::CropGroup, Row::Crop, Row::Year]);
        assert_eq!(GisPage::new(Theme::CropDistribution).rows.len(), 11);
    }

    #[test]
    fn panel_city_clear_cascades_to_town() {
        let cat = catalog();
        let mut page = GisPage::new(Theme::CropDistribution);
        page.select(&cat, Row::City, "제주시");
        page.select(&cat, Row::Town, "한림읍");
        assert!(page.is_selected(Row::Town, "한림읍"));
        page.select(&cat, Row::City, "제주시");
        assert_eq!(page.filters.region.city(), None);
        assert!(!page.is_selected(Row::Town, "한림읍"));
        assert!(page.options(&cat, Row::Town).is_empty());
    }

    #[test]
    fn single_valued_rows_toggle_off() {
        let cat = catalog();
        let mut page = GisPage::new(Theme::CropDistribution);
        page.select(&cat, Row::Area, "500..2000");
        assert_eq!(page.filters.area, Range::new(500.0, 2000.0));
        page.select(&cat, Row::Area, "500..2000");
        assert_eq!(page.filters.area.bounds(), None);
        page.select(&cat, Row::Year, "2024");
        assert_eq!(page.filters.year, None);
    }

    #[test]
    fn crop_group_fills_crop_filter() {
        let cat = catalog();
        let mut page = GisPage::new(Theme::MarketTrade);
        page.select(&cat, Row::CropGroup, "과수");
        assert_eq!(page.filters.crops, vec!["감귤", "사과"]);
        page.dispatch(Some(FilterAction::Reset));
        assert!(page.filters.crops.is_empty());
        assert_eq!(page.crops, CropSelection::default());
    }

    fn type_command(page: &mut GisPage, cat: &DataCatalog, text: &str) {
        page.handle_key(cat, KeyCode::Char(':'));
        for ch in text.chars() {
            page.handle_key(cat, KeyCode::Char(ch));
        }
        page.handle_key(cat, KeyCode::Enter);
    }

    #[test]
    fn typed_crops_update_the_panel() {
        let cat = catalog();
        let mut page = GisPage::new(Theme::MarketTrade);
        page.select(&cat, Row::CropGroup, "과수");
        type_command(&mut page, &cat, "set crop=당근");
        assert_eq!(page.filters.crops, vec!["당근"]);
        assert!(page.is_selected(Row::CropGroup, "채소"));
        assert!(!page.is_selected(Row::CropGroup, "과수"));

        // a later panel pick builds on the typed crop
        page.select(&cat, Row::CropGroup, "과수");
        assert_eq!(page.filters.crops, vec!["당근"]);
    }

    #[test]
    fn commands_for_filters_the_theme_lacks_are_ignored() {
        let cat = catalog();
        let mut page = GisPage::new(Theme::Disaster);
        let before = page.filters.clone();
        type_command(&mut page, &cat, "toggle area");
        type_command(&mut page, &cat, "set soil_type=암쇄토");
        assert_eq!(page.filters, before);
        assert_eq!(page.status, "이 주제에는 토양 필터가 없습니다");
    }

    #[test]
    fn command_mode_dispatches_parsed_action() {
        let cat = catalog();
        let mut page = GisPage::new(Theme::CropDistribution);
        page.handle_key(&cat, KeyCode::Char(':'));
        for ch in "toggle area".chars() {
            page.handle_key(&cat, KeyCode::Char(ch));
        }
        assert!(page.is_editing());
        page.handle_key(&cat, KeyCode::Enter);
        assert!(!page.is_editing());
        assert!(page.filters.active.area);
    }

    #[test]
    fn cursor_wraps_within_options() {
        let cat = catalog();
        let mut page = GisPage::new(Theme::Disaster);
        // rows: Level, City, Zone, Town, Village, Year
        page.move_focus(1);
        assert_eq!(page.focused(), Row::City);
        page.move_cursor(&cat, -1);
        assert_eq!(page.cursor(Row::City), 1);
        page.choose(&cat);
        assert_eq!(page.filters.region.city(), Some("서귀포시"));
        assert_eq!(page.handle_key(&cat, KeyCode::Esc), Action::Back);
    }
}
