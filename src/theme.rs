use log::{ error, warn };
use std::sync::Arc;
use crate::history::KeyValueStore;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Button face: offers the sun while dark, the moon while light.
    pub fn icon(&self) -> &'static str {
        match self {
            Theme::Dark => "\u{2600}",
            Theme::Light => "\u{1F319}",
        }
    }

    fn flipped(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Global light/dark switch backed by durable storage.
pub struct ThemeToggle {
    store: Arc<dyn KeyValueStore>,
    theme: Theme,
}

impl ThemeToggle {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let theme = match store.get_item(THEME_KEY).await {
            Ok(Some(saved)) if saved == "dark" => Theme::Dark,
            Ok(_) => Theme::Light,
            Err(e) => {
                warn!("Could not read theme preference: {}", e);
                Theme::Light
            }
        };
        Self { store, theme }
    }

    pub fn current(&self) -> Theme {
        self.theme
    }

    pub async fn toggle(&mut self) -> Theme {
        self.theme = self.theme.flipped();
        if let Err(e) = self.store.set_item(THEME_KEY, self.theme.as_str()).await {
            error!("Could not save theme preference: {}", e);
        }
        self.theme
    }
}
