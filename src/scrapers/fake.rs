//! In-memory browser used by the scraper tests

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::traits::{BrowserSession, ClickError};

pub enum ClickScript {
    /// Scripted outcomes, then `NotFound` once drained
    Sequence(Vec<Result<(), ClickError>>),
    AlwaysClickable,
    AlwaysIntercepted,
}

#[derive(Default)]
struct State {
    current_url: String,
    navigations: Vec<String>,
    clicks: usize,
    scroll_bys: usize,
    settles: Vec<Duration>,
    script: VecDeque<Result<(), ClickError>>,
}

pub struct FakeSession {
    default_cards: Vec<String>,
    /// Cards served when the current URL contains the key
    pages: Vec<(String, Vec<String>)>,
    failing_urls: Vec<String>,
    mode: ClickMode,
    state: Mutex<State>,
}

enum ClickMode {
    Scripted,
    AlwaysClickable,
    AlwaysIntercepted,
}

impl FakeSession {
    pub fn new(cards: Vec<String>) -> Self {
        Self {
            default_cards: cards,
            pages: Vec::new(),
            failing_urls: Vec::new(),
            mode: ClickMode::Scripted,
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_clicks(mut self, script: ClickScript) -> Self {
        self.mode = match script {
            ClickScript::Sequence(outcomes) => {
                self.state.get_mut().unwrap().script = outcomes.into();
                ClickMode::Scripted
            }
            ClickScript::AlwaysClickable => ClickMode::AlwaysClickable,
            ClickScript::AlwaysIntercepted => ClickMode::AlwaysIntercepted,
        };
        self
    }

    pub fn with_page(mut self, url_contains: &str, cards: Vec<String>) -> Self {
        self.pages.push((url_contains.to_string(), cards));
        self
    }

    pub fn failing_on(mut self, url_contains: &str) -> Self {
        self.failing_urls.push(url_contains.to_string());
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn click_calls(&self) -> usize {
        self.state.lock().unwrap().clicks
    }

    pub fn scroll_by_calls(&self) -> usize {
        self.state.lock().unwrap().scroll_bys
    }

    /// Pauses requested between scroll-into-view and click
    pub fn settles(&self) -> Vec<Duration> {
        self.state.lock().unwrap().settles.clone()
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        if self.failing_urls.iter().any(|f| url.contains(f.as_str())) {
            anyhow::bail!("net::ERR_CONNECTION_RESET");
        }
        state.current_url = url.to_string();
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        Ok(())
    }

    async fn scroll_by(&self, _pixels: i64) -> Result<()> {
        self.state.lock().unwrap().scroll_bys += 1;
        Ok(())
    }

    async fn wait_and_click(
        &self,
        _xpath: &str,
        _timeout: Duration,
        settle: Duration,
    ) -> Result<(), ClickError> {
        let mut state = self.state.lock().unwrap();
        state.clicks += 1;
        state.settles.push(settle);
        match self.mode {
            ClickMode::AlwaysClickable => Ok(()),
            ClickMode::AlwaysIntercepted => Err(ClickError::Intercepted),
            ClickMode::Scripted => state.script.pop_front().unwrap_or(Err(ClickError::NotFound)),
        }
    }

    async fn query_all(&self, _selector: &str) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        let cards = self
            .pages
            .iter()
            .find(|(key, _)| state.current_url.contains(key.as_str()))
            .map(|(_, cards)| cards.clone())
            .unwrap_or_else(|| self.default_cards.clone());
        Ok(cards)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
