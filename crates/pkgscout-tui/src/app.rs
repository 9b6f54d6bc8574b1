// TUI application state and event handling
use crate::toast::Toasts;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pkgscout_core::favorites::is_valid_reason;
use pkgscout_core::{
    Favorite, FavoritesStore, Notice, Package, PageKind, PageRequest, SearchPager,
};
use pkgscout_store::KeyValueStore;
use ratatui::widgets::{ListState, TableState};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Search,    // Search input + results (default)
    Favorites, // Saved packages
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,    // Navigating results
    Searching, // Typing in search box
}

/// Popup currently on top of the view, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    None,
    AddFavorite { package: String, reason: String },
    EditReason { name: String, reason: String },
    ConfirmDelete { name: String },
}

/// Visible window of the results list after the last draw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub first: usize,
    pub rows: usize,
}

pub struct App {
    pub should_quit: bool,
    pub view: View,
    pub input_mode: InputMode,
    pub search_input: String,
    pub pager: SearchPager,
    pub selected_index: usize,
    pub list_state: ListState,
    pub viewport: Viewport,
    pub favorites: Vec<Favorite>,
    pub favorites_index: usize,
    pub favorites_state: TableState,
    pub modal: Modal,
    pub toasts: Toasts,
}

impl App {
    pub fn new(toasts: Toasts) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            should_quit: false,
            view: View::Search,
            input_mode: InputMode::Searching,
            search_input: String::new(),
            pager: SearchPager::new(),
            selected_index: 0,
            list_state,
            viewport: Viewport::default(),
            favorites: Vec::new(),
            favorites_index: 0,
            favorites_state: TableState::default(),
            modal: Modal::None,
            toasts,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn notify(&mut self, notice: Notice) {
        self.toasts.push(notice);
    }

    pub fn results(&self) -> &[Package] {
        self.pager.results()
    }

    pub fn selected_package(&self) -> Option<&Package> {
        self.pager.results().get(self.selected_index)
    }

    pub fn selected_favorite(&self) -> Option<&Favorite> {
        self.favorites.get(self.favorites_index)
    }

    /// Ask the pager whether the last result is on screen.
    /// Called after every draw.
    pub fn poll_scroll_trigger(&mut self) -> Option<PageRequest> {
        if self.view != View::Search {
            return None;
        }
        self.pager.on_viewport(self.viewport.first, self.viewport.rows)
    }

    /// Feed a finished fetch back into the pager
    pub fn apply_page(
        &mut self,
        request: &PageRequest,
        outcome: pkgscout_core::Result<pkgscout_core::SearchPage>,
    ) {
        // A fresh result set starts at the top
        let reset = request.kind == PageKind::Initial
            && outcome.is_ok()
            && self.pager.is_current(request);

        if let Some(notice) = self.pager.complete(request, outcome) {
            self.notify(notice);
        }

        if reset {
            self.selected_index = 0;
        }
        self.clamp_selection();
    }

    /// Dispatch a key press. Returns a page request when the key started a search.
    pub fn handle_key<S: KeyValueStore>(
        &mut self,
        key: KeyEvent,
        store: &FavoritesStore<S>,
    ) -> Option<PageRequest> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return None;
        }

        if self.modal != Modal::None {
            self.handle_modal_key(key, store);
            return None;
        }

        match self.view {
            View::Search => self.handle_search_key(key, store),
            View::Favorites => {
                self.handle_favorites_key(key);
                None
            }
        }
    }

    fn handle_search_key<S: KeyValueStore>(
        &mut self,
        key: KeyEvent,
        store: &FavoritesStore<S>,
    ) -> Option<PageRequest> {
        match self.input_mode {
            InputMode::Searching => match key.code {
                KeyCode::Enter => return self.submit_search(),
                KeyCode::Char(c) => self.search_input.push(c),
                KeyCode::Backspace => {
                    self.search_input.pop();
                }
                KeyCode::Esc => self.input_mode = InputMode::Normal,
                _ => {}
            },
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => self.quit(),
                KeyCode::Char('/') => self.input_mode = InputMode::Searching,
                KeyCode::Char('j') | KeyCode::Down => self.next_result(),
                KeyCode::Char('k') | KeyCode::Up => self.previous_result(),
                KeyCode::Char('a') => self.open_add_modal(),
                KeyCode::Char('v') => self.show_favorites(store),
                KeyCode::Char('o') | KeyCode::Enter => self.open_selected_in_browser(),
                _ => {}
            },
        }
        None
    }

    fn handle_favorites_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('v') | KeyCode::Char('b') | KeyCode::Esc => self.show_search(),
            KeyCode::Char('j') | KeyCode::Down => self.next_favorite(),
            KeyCode::Char('k') | KeyCode::Up => self.previous_favorite(),
            KeyCode::Char('e') => {
                if let Some(fav) = self.selected_favorite() {
                    self.modal = Modal::EditReason {
                        name: fav.name.clone(),
                        reason: fav.reason.clone(),
                    };
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(fav) = self.selected_favorite() {
                    self.modal = Modal::ConfirmDelete {
                        name: fav.name.clone(),
                    };
                }
            }
            _ => {}
        }
    }

    fn handle_modal_key<S: KeyValueStore>(&mut self, key: KeyEvent, store: &FavoritesStore<S>) {
        let modal = std::mem::replace(&mut self.modal, Modal::None);

        self.modal = match modal {
            Modal::AddFavorite { package, mut reason } => match key.code {
                KeyCode::Esc => Modal::None,
                KeyCode::Enter => {
                    if !is_valid_reason(&reason) {
                        self.notify(Notice::warning("Please provide a reason"));
                        Modal::AddFavorite { package, reason }
                    } else {
                        self.run_store_op(store, |s| s.add(&package, &reason));
                        Modal::None
                    }
                }
                KeyCode::Backspace => {
                    reason.pop();
                    Modal::AddFavorite { package, reason }
                }
                KeyCode::Char(c) => {
                    reason.push(c);
                    Modal::AddFavorite { package, reason }
                }
                _ => Modal::AddFavorite { package, reason },
            },
            Modal::EditReason { name, mut reason } => match key.code {
                KeyCode::Esc => Modal::None,
                KeyCode::Enter => {
                    // Blank edits are ignored; the dialog stays put
                    if !is_valid_reason(&reason) {
                        Modal::EditReason { name, reason }
                    } else {
                        if self.run_store_op(store, |s| s.edit(&name, &reason)) {
                            self.reload_favorites(store);
                        }
                        Modal::None
                    }
                }
                KeyCode::Backspace => {
                    reason.pop();
                    Modal::EditReason { name, reason }
                }
                KeyCode::Char(c) => {
                    reason.push(c);
                    Modal::EditReason { name, reason }
                }
                _ => Modal::EditReason { name, reason },
            },
            Modal::ConfirmDelete { name } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    if self.run_store_op(store, |s| s.remove(&name)) {
                        self.reload_favorites(store);
                    }
                    Modal::None
                }
                KeyCode::Char('n') | KeyCode::Esc => Modal::None,
                _ => Modal::ConfirmDelete { name },
            },
            Modal::None => Modal::None,
        };
    }

    /// Run a favorites operation and toast its outcome. True when storage changed.
    fn run_store_op<S, F>(&mut self, store: &FavoritesStore<S>, op: F) -> bool
    where
        S: KeyValueStore,
        F: FnOnce(&FavoritesStore<S>) -> pkgscout_core::Result<pkgscout_core::FavoriteOutcome>,
    {
        match op(store) {
            Ok(outcome) => {
                info!("Favorites: {:?}", outcome);
                self.notify(outcome.notice());
                outcome.is_change()
            }
            Err(e) => {
                error!("Favorites storage failed: {}", e);
                self.notify(Notice::error(format!("Could not save favorites: {}", e)));
                false
            }
        }
    }

    fn submit_search(&mut self) -> Option<PageRequest> {
        match self.pager.begin_search(&self.search_input) {
            Ok(request) => {
                self.input_mode = InputMode::Normal;
                Some(request)
            }
            Err(notice) => {
                self.notify(notice);
                None
            }
        }
    }

    fn open_add_modal(&mut self) {
        if let Some(pkg) = self.selected_package() {
            self.modal = Modal::AddFavorite {
                package: pkg.name.clone(),
                reason: String::new(),
            };
        }
    }

    fn open_selected_in_browser(&mut self) {
        if let Some(pkg) = self.selected_package() {
            let url = pkg.page_url();
            if let Err(e) = open::that(&url) {
                self.notify(Notice::error(format!("Failed to open browser: {}", e)));
            }
        }
    }

    /// Switch to the favorites view, reading the list fresh from storage
    pub fn show_favorites<S: KeyValueStore>(&mut self, store: &FavoritesStore<S>) {
        self.view = View::Favorites;
        self.favorites_index = 0;
        self.reload_favorites(store);
    }

    pub fn show_search(&mut self) {
        self.view = View::Search;
        self.input_mode = InputMode::Normal;
    }

    fn reload_favorites<S: KeyValueStore>(&mut self, store: &FavoritesStore<S>) {
        match store.load() {
            Ok(favorites) => self.favorites = favorites,
            Err(e) => {
                error!("Failed to load favorites: {}", e);
                self.notify(Notice::error(format!("Could not read favorites: {}", e)));
            }
        }
        self.favorites_index = self
            .favorites_index
            .min(self.favorites.len().saturating_sub(1));
        self.favorites_state.select(if self.favorites.is_empty() {
            None
        } else {
            Some(self.favorites_index)
        });
    }

    pub fn next_result(&mut self) {
        let len = self.pager.results().len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1).min(len - 1);
            self.list_state.select(Some(self.selected_index));
        }
        self.pager.on_user_scroll();
    }

    pub fn previous_result(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
        }
        self.pager.on_user_scroll();
    }

    pub fn next_favorite(&mut self) {
        if !self.favorites.is_empty() {
            self.favorites_index = (self.favorites_index + 1).min(self.favorites.len() - 1);
            self.favorites_state.select(Some(self.favorites_index));
        }
    }

    pub fn previous_favorite(&mut self) {
        if self.favorites_index > 0 {
            self.favorites_index -= 1;
            self.favorites_state.select(Some(self.favorites_index));
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.pager.results().len();
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
        self.list_state.select(Some(self.selected_index));
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Toasts::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgscout_core::{NoticeLevel, SearchPage};
    use pkgscout_store::MemoryStore;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text<S: KeyValueStore>(app: &mut App, store: &FavoritesStore<S>, text: &str) {
        for c in text.chars() {
            app.handle_key(press(KeyCode::Char(c)), store);
        }
    }

    fn app_with_results(names: &[&str]) -> App {
        let mut app = App::default();
        let store = FavoritesStore::new(MemoryStore::new());
        type_text(&mut app, &store, "react");
        let req = app.handle_key(press(KeyCode::Enter), &store).unwrap();

        let packages = names.iter().map(|n| Package::new(*n, "1.0.0")).collect();
        app.apply_page(&req, Ok(SearchPage::new(packages, Some(100))));
        app
    }

    #[test]
    fn test_enter_starts_search_at_offset_zero() {
        let mut app = App::default();
        let store = FavoritesStore::new(MemoryStore::new());

        type_text(&mut app, &store, "react");
        let req = app.handle_key(press(KeyCode::Enter), &store).unwrap();

        assert_eq!(req.query, "react");
        assert_eq!(req.offset(), 0);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.pager.is_loading());
    }

    #[test]
    fn test_blank_search_raises_toast() {
        let mut app = App::default();
        let store = FavoritesStore::new(MemoryStore::new());

        type_text(&mut app, &store, "   ");
        assert!(app.handle_key(press(KeyCode::Enter), &store).is_none());

        let toast = app.toasts.latest().unwrap();
        assert_eq!(toast.level, NoticeLevel::Error);
        assert_eq!(app.input_mode, InputMode::Searching);
    }

    #[test]
    fn test_add_favorite_flow() {
        let mut app = app_with_results(&["lodash", "react"]);
        let store = FavoritesStore::new(MemoryStore::new());

        app.handle_key(press(KeyCode::Char('a')), &store);
        assert_eq!(
            app.modal,
            Modal::AddFavorite {
                package: "lodash".into(),
                reason: String::new()
            }
        );

        type_text(&mut app, &store, "utility functions");
        app.handle_key(press(KeyCode::Enter), &store);

        assert_eq!(app.modal, Modal::None);
        assert_eq!(
            store.load().unwrap(),
            vec![Favorite::new("lodash", "utility functions")]
        );
        assert_eq!(
            app.toasts.latest().unwrap().message,
            "lodash has been added to favorites!"
        );
    }

    #[test]
    fn test_add_with_blank_reason_keeps_modal_open() {
        let mut app = app_with_results(&["lodash"]);
        let store = FavoritesStore::new(MemoryStore::new());

        app.handle_key(press(KeyCode::Char('a')), &store);
        type_text(&mut app, &store, "  ");
        app.handle_key(press(KeyCode::Enter), &store);

        assert!(matches!(app.modal, Modal::AddFavorite { .. }));
        assert_eq!(app.toasts.latest().unwrap().message, "Please provide a reason");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_add_closes_modal_with_error() {
        let mut app = app_with_results(&["lodash"]);
        let store = FavoritesStore::new(MemoryStore::new());
        store.add("lodash", "first").unwrap();

        app.handle_key(press(KeyCode::Char('a')), &store);
        type_text(&mut app, &store, "second");
        app.handle_key(press(KeyCode::Enter), &store);

        assert_eq!(app.modal, Modal::None);
        assert!(app.toasts.latest().unwrap().is_error());
        assert_eq!(store.load().unwrap()[0].reason, "first");
    }

    #[test]
    fn test_favorites_edit_and_delete() {
        let mut app = App::default();
        let store = FavoritesStore::new(MemoryStore::new());
        store.add("lodash", "utils").unwrap();
        store.add("react", "ui").unwrap();

        app.input_mode = InputMode::Normal;
        app.handle_key(press(KeyCode::Char('v')), &store);
        assert_eq!(app.view, View::Favorites);
        assert_eq!(app.favorites.len(), 2);

        // Edit without changes
        app.handle_key(press(KeyCode::Char('e')), &store);
        app.handle_key(press(KeyCode::Enter), &store);
        assert_eq!(
            app.toasts.latest().unwrap().message,
            "You haven't updated the reason."
        );

        // Edit with a change
        app.handle_key(press(KeyCode::Char('e')), &store);
        type_text(&mut app, &store, "!");
        app.handle_key(press(KeyCode::Enter), &store);
        assert_eq!(app.favorites[0].reason, "utils!");

        // Delete the second one
        app.handle_key(press(KeyCode::Char('j')), &store);
        app.handle_key(press(KeyCode::Char('d')), &store);
        assert_eq!(
            app.modal,
            Modal::ConfirmDelete {
                name: "react".into()
            }
        );
        app.handle_key(press(KeyCode::Char('y')), &store);

        assert_eq!(app.favorites, vec![Favorite::new("lodash", "utils!")]);
        assert_eq!(app.favorites_index, 0);
        assert_eq!(
            app.toasts.latest().unwrap().message,
            "react has been removed from favorites!"
        );
    }

    #[test]
    fn test_cancel_delete_keeps_favorite() {
        let mut app = App::default();
        let store = FavoritesStore::new(MemoryStore::new());
        store.add("lodash", "utils").unwrap();

        app.show_favorites(&store);
        app.handle_key(press(KeyCode::Char('d')), &store);
        app.handle_key(press(KeyCode::Char('n')), &store);

        assert_eq!(app.modal, Modal::None);
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_scroll_trigger_only_on_search_view() {
        let names: Vec<String> = (0..12).map(|i| format!("pkg-{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut app = app_with_results(&refs);
        let store = FavoritesStore::new(MemoryStore::new());

        app.viewport = Viewport { first: 0, rows: 20 };
        app.show_favorites(&store);
        assert!(app.poll_scroll_trigger().is_none());

        app.show_search();
        let req = app.poll_scroll_trigger().unwrap();
        assert_eq!(req.offset(), 12);
        assert!(app.poll_scroll_trigger().is_none());
    }
}
