// Light/dark theme persisted in local storage.

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Unknown values fall back to the default theme.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn load() -> Self {
        if let Some(win) = web_sys::window() {
            if let Ok(Some(store)) = win.local_storage() {
                if let Ok(Some(raw)) = store.get_item(THEME_KEY) {
                    return Self::parse(&raw);
                }
            }
        }
        Self::default()
    }

    pub fn save(self) {
        if let Some(win) = web_sys::window() {
            if let Ok(Some(store)) = win.local_storage() {
                let _ = store.set_item(THEME_KEY, self.as_str());
            }
        }
    }

    /// Set `data-theme` on the root element so the stylesheet picks it up.
    pub fn apply(self) {
        let root = web_sys::window()
            .and_then(|win| win.document())
            .and_then(|doc| doc.document_element());
        if let Some(root) = root {
            let _ = root.set_attribute("data-theme", self.as_str());
        }
    }
}
