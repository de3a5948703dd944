use super::{Action, wrap};
use crate::report::{self, ReportEntry};
use crate::route::Route;
use crossterm::event::KeyCode;

/// Report list with a search box and a category switch.
pub struct ReportsPage {
    pub query: String,
    pub category: Option<String>,
    pub selected: usize,
    pub editing: bool,
}

impl ReportsPage {
    pub fn new(category: Option<String>) -> Self {
        Self { query: String::new(), category, selected: 0, editing: false }
    }

    pub fn results(&self) -> Vec<&'static ReportEntry> {
        report::filter(&self.query, self.category.as_deref())
    }

    /// Steps through "all" followed by each catalog category.
    fn cycle_category(&mut self) {
        let cats = report::categories();
        let pos = self.category.as_deref().and_then(|c| cats.iter().position(|x| *x == c));
        self.category = match pos {
            None => cats.first().map(|c| c.to_string()),
            Some(i) => cats.get(i + 1).map(|c| c.to_string()),
        };
        self.selected = 0;
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Action {
        if self.editing {
            match key {
                KeyCode::Enter | KeyCode::Esc => self.editing = false,
                KeyCode::Backspace => {
                    self.query.pop();
                }
                KeyCode::Char(c) => self.query.push(c),
                _ => {}
            }
            self.selected = 0;
            return Action::None;
        }
        let count = self.results().len();
        match key {
            KeyCode::Up => self.selected = wrap(self.selected, -1, count),
            KeyCode::Down => self.selected = wrap(self.selected, 1, count),
            KeyCode::Char('/') => self.editing = true,
            KeyCode::Char('c') => self.cycle_category(),
            KeyCode::Enter => {
                if let Some(r) = self.results().get(self.selected) {
                    return Action::Navigate(Route::ReportDetail(r.id));
                }
            }
            KeyCode::Esc | KeyCode::Backspace => return Action::Back,
            _ => {}
        }
        Action::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_narrows_results() {
        let mut page = ReportsPage::new(None);
        page.handle_key(KeyCode::Char('/'));
        for c in "태풍".chars() {
            page.handle_key(KeyCode::Char(c));
        }
        page.handle_key(KeyCode::Enter);
        assert!(!page.editing);
        assert_eq!(page.results().len(), 1);
        assert_eq!(page.handle_key(KeyCode::Enter), Action::Navigate(Route::ReportDetail(5)));
    }

    #[test]
    fn category_cycle_returns_to_all() {
        let mut page = ReportsPage::new(None);
        let cats = report::categories();
        for c in &cats {
            page.handle_key(KeyCode::Char('c'));
            assert_eq!(page.category.as_deref(), Some(*c));
        }
        page.handle_key(KeyCode::Char('c'));
        assert_eq!(page.category, None);
    }

    #[test]
    fn empty_results_do_not_navigate() {
        let mut page = ReportsPage::new(Some("없는분류".into()));
        assert_eq!(page.handle_key(KeyCode::Down), Action::None);
        assert_eq!(page.handle_key(KeyCode::Enter), Action::None);
    }
}
