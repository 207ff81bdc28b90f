use crate::core::config::Settings;
use crate::core::taskbar::ContentSource;
use crate::core::values::{format_template, ValueFetcher};

/// The configured template bound to a live [`ValueFetcher`]
pub struct Dashboard {
    fetcher: ValueFetcher,
    template: String,
    stylesheet: String,
}

impl Dashboard {
    pub fn new(mut fetcher: ValueFetcher, settings: &Settings) -> Self {
        fetcher.load_settings(settings);
        Self {
            fetcher,
            template: settings.info_label.clone(),
            stylesheet: settings.container_stylesheet.clone(),
        }
    }

    pub fn load_settings(&mut self, settings: &Settings) {
        self.fetcher.load_settings(settings);
        self.template = settings.info_label.clone();
        self.stylesheet = settings.container_stylesheet.clone();
    }

    /// Start a new refresh cycle and fill the template from it
    pub fn render_body(&mut self) -> String {
        self.fetcher.clear_cache();
        let fetcher = &mut self.fetcher;
        format_template(&self.template, |key| fetcher.get(key))
    }

    /// [`render_body`](Self::render_body) wrapped in the styled container element
    pub fn render_html(&mut self) -> String {
        let body = self.render_body();
        format!("<div style=\"{}\">{}</div>", self.stylesheet, body)
    }

    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }

    pub fn fetcher(&self) -> &ValueFetcher {
        &self.fetcher
    }
}

impl ContentSource for Dashboard {
    fn render(&mut self) -> String {
        self.render_html()
    }
}
