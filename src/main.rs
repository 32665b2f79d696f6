//! Capy Whack entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlInputElement, HtmlSelectElement, MouseEvent};

    use capy_whack::audio::AudioManager;
    use capy_whack::consts::*;
    use capy_whack::highscores::{ScoreEntry, format_date};
    use capy_whack::persistence::LocalStorage;
    use capy_whack::platform::{Presenter, present, summary_message};
    use capy_whack::sim::{RoundEngine, RoundStatus, RoundSummary, SoundKind, TargetKind, TickInput, tick};
    use capy_whack::{Avatar, Difficulty, Settings};

    const BOMB_IMAGE: &str = "data:image/svg+xml,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%20viewBox%3D%220%200%20100%20100%22%3E%3Ccircle%20cx%3D%2250%22%20cy%3D%2260%22%20r%3D%2230%22%20fill%3D%22%23333%22%2F%3E%3Ctext%20x%3D%2250%22%20y%3D%2275%22%20text-anchor%3D%22middle%22%20font-size%3D%2220%22%20fill%3D%22white%22%3E%F0%9F%92%A3%3C%2Ftext%3E%3C%2Fsvg%3E";

    /// Writes engine updates into the page
    struct DomPresenter {
        document: Document,
        audio: AudioManager,
        avatar: Avatar,
        /// Summary waiting to be shown once the frame is done
        pending_summary: Option<RoundSummary>,
    }

    impl DomPresenter {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn mole(&self, slot: usize) -> Option<Element> {
            self.document
                .query_selector(&format!(".hole[data-index=\"{}\"] .mole", slot))
                .ok()
                .flatten()
        }
    }

    impl Presenter for DomPresenter {
        fn render_slot_state(&mut self, slot: usize, visible: bool, kind: Option<TargetKind>) {
            let Some(img) = self.mole(slot) else { return };
            match kind {
                Some(TargetKind::Hazard) => {
                    let _ = img.set_attribute("src", BOMB_IMAGE);
                    let _ = img.set_attribute("data-type", "bomb");
                }
                Some(TargetKind::Collectible) => {
                    let _ = img.set_attribute("src", self.avatar.image_file());
                    let _ = img.set_attribute("data-type", "capybara");
                }
                None => {}
            }
            let classes = img.class_list();
            let _ = if visible {
                classes.add_1("show")
            } else {
                classes.remove_1("show")
            };
        }

        fn update_scoreboard(&mut self, score: u32, level: u32, time_remaining: u32) {
            self.set_text("score", &score.to_string());
            self.set_text("level", &level.to_string());
            self.set_text("time", &time_remaining.to_string());
        }

        fn update_level_progress(&mut self, fraction: f32) {
            if let Some(bar) = self.document.get_element_by_id("levelProgressBar") {
                let _ = bar.set_attribute("style", &format!("width: {}%", fraction * 100.0));
            }
        }

        fn set_paused(&mut self, paused: bool) {
            let label = if paused { "▶️ Resume" } else { "⏸️ Pause" };
            self.set_text("pauseBtn", label);
        }

        fn show_session_summary(&mut self, summary: &RoundSummary) {
            self.pending_summary = Some(*summary);
        }

        fn play_sound(&mut self, kind: SoundKind) {
            self.audio.play(kind);
        }
    }

    /// Game instance holding all state
    struct Game {
        engine: RoundEngine<LocalStorage>,
        presenter: DomPresenter,
        input: TickInput,
        last_time: f64,
        /// Sub-millisecond remainder carried between frames
        carry_ms: f64,
    }

    impl Game {
        /// Run one frame of simulation and push the results to the page
        fn update(&mut self, time: f64) {
            let elapsed = if self.last_time > 0.0 {
                (time - self.last_time).clamp(0.0, MAX_FRAME_MS as f64)
            } else {
                0.0
            };
            self.last_time = time;
            self.carry_ms += elapsed;
            let step = self.carry_ms.floor();
            self.carry_ms -= step;

            self.input.wall_clock_ms = Some(js_sys::Date::now());
            tick(&mut self.engine, &self.input, step as u64);
            self.input.clear_one_shots();

            let sound = self.engine.settings().sound_enabled;
            present(self.engine.drain_events(), &mut self.presenter, sound);

            if let Some(summary) = self.presenter.pending_summary.take() {
                self.finish_round(&summary);
            }
        }

        fn finish_round(&self, summary: &RoundSummary) {
            if let Some(window) = web_sys::window() {
                let _ = window.alert_with_message(&summary_message(summary));
            }
            self.refresh_home();
            show_page(&self.presenter.document, "home");
        }

        fn start(&mut self) {
            self.presenter.avatar = self.engine.settings().avatar;
            self.engine.start_with_seed(js_sys::Date::now() as u64);
            show_page(&self.presenter.document, "game");
            log::info!("Round started with seed: {}", self.engine.seed());
        }

        /// Player name, best score and both leaderboard lists
        fn refresh_home(&self) {
            let document = &self.presenter.document;
            let ledger = self.engine.ledger();
            self.presenter
                .set_text("playerName", &self.engine.settings().player_name);
            self.presenter
                .set_text("highScore", &ledger.top_score().unwrap_or(0).to_string());

            if let Some(list) = document.get_element_by_id("leaderboardList") {
                list.set_inner_html(&render_rows(ledger.list_top_scores(10), true));
            }
            if let Some(list) = document.get_element_by_id("historyList") {
                list.set_inner_html(&render_rows(ledger.list_history(10), false));
            }
        }

        /// Copy settings into the form
        fn show_settings(&self) {
            let document = &self.presenter.document;
            let settings = self.engine.settings();
            if let Some(input) = input_element(document, "playerNameInput") {
                input.set_value(&settings.player_name);
            }
            if let Some(input) = input_element(document, "gameDuration") {
                input.set_value(&settings.game_duration.to_string());
            }
            if let Some(select) = select_element(document, "difficulty") {
                select.set_value(settings.difficulty.as_str());
            }
            if let Some(select) = select_element(document, "soundSetting") {
                select.set_value(if settings.sound_enabled { "on" } else { "off" });
            }
            self.presenter
                .set_text("durationValue", &settings.game_duration.to_string());
            highlight_avatar(document, settings.avatar);
            show_page(document, "settings");
        }

        /// Read the form and persist it
        fn save_settings(&mut self, avatar: Avatar) {
            let document = self.presenter.document.clone();
            let current = self.engine.settings().clone();

            let player_name = input_element(&document, "playerNameInput")
                .map(|i| i.value().trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| capy_whack::settings::DEFAULT_PLAYER_NAME.to_string());
            let game_duration = input_element(&document, "gameDuration")
                .and_then(|i| i.value().parse::<u32>().ok())
                .filter(|&s| s > 0)
                .unwrap_or(current.game_duration);
            let difficulty = select_element(&document, "difficulty")
                .and_then(|s| Difficulty::from_str(&s.value()))
                .unwrap_or(current.difficulty);
            let sound_enabled = select_element(&document, "soundSetting")
                .map(|s| s.value() == "on")
                .unwrap_or(current.sound_enabled);

            let settings = Settings {
                player_name,
                game_duration,
                difficulty,
                sound_enabled,
                avatar,
                ..current
            };
            match self.engine.save_settings(settings) {
                Ok(true) => flash_success(&document),
                Ok(false) => log::info!("Settings unchanged while a round is running"),
                Err(e) => log::warn!("Settings not saved: {}", e),
            }
            self.refresh_home();
        }
    }

    fn input_element(document: &Document, id: &str) -> Option<HtmlInputElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn select_element(document: &Document, id: &str) -> Option<HtmlSelectElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn render_rows(entries: &[ScoreEntry], ranked: bool) -> String {
        if entries.is_empty() {
            return "<li class=\"empty\">No games yet</li>".to_string();
        }
        entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let prefix = if ranked { format!("#{} ", i + 1) } else { String::new() };
                format!(
                    "<li>{}{} - {} (Lv {}, {}) <span class=\"date\">{}</span></li>",
                    prefix,
                    escape_html(&e.player),
                    e.score,
                    e.level,
                    e.difficulty.as_str(),
                    format_date(e.timestamp)
                )
            })
            .collect()
    }

    fn escape_html(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    fn show_page(document: &Document, id: &str) {
        if let Ok(pages) = document.query_selector_all(".page") {
            for i in 0..pages.length() {
                if let Some(page) = pages.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    let _ = page.class_list().remove_1("active");
                }
            }
        }
        if let Some(page) = document.get_element_by_id(id) {
            let _ = page.class_list().add_1("active");
        }
    }

    fn highlight_avatar(document: &Document, avatar: Avatar) {
        if let Ok(buttons) = document.query_selector_all(".preset-btn") {
            for i in 0..buttons.length() {
                if let Some(btn) = buttons.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    let active = btn.get_attribute("data-image").as_deref() == Some(avatar.key());
                    let _ = if active {
                        btn.class_list().add_1("active")
                    } else {
                        btn.class_list().remove_1("active")
                    };
                }
            }
        }
    }

    fn flash_success(document: &Document) {
        let Some(popup) = document.get_element_by_id("successPopup") else {
            return;
        };
        let _ = popup.class_list().add_1("show");
        let closure = Closure::once(move || {
            let _ = popup.class_list().remove_1("show");
        });
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                2000,
            );
        }
        closure.forget();
    }

    fn on_click(document: &Document, id: &str, handler: impl FnMut(MouseEvent) + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(MouseEvent)>::new(handler);
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("Missing #{} - control not wired", id);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Capy Whack starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            web_sys::console::error_1(&"no document".into());
            return;
        };

        let storage = LocalStorage::open();
        let seed = js_sys::Date::now() as u64;
        let engine = RoundEngine::new(storage, seed);
        let avatar = engine.settings().avatar;

        let game = Rc::new(RefCell::new(Game {
            engine,
            presenter: DomPresenter {
                document: document.clone(),
                audio: AudioManager::new(),
                avatar,
                pending_summary: None,
            },
            input: TickInput::default(),
            last_time: 0.0,
            carry_ms: 0.0,
        }));

        build_grid(&document, game.clone());
        setup_controls(&document, game.clone());
        setup_settings_page(&document, game.clone());
        setup_auto_pause(&document, game.clone());

        game.borrow().refresh_home();
        show_page(&document, "home");

        request_animation_frame(game);
        log::info!("Capy Whack running!");
    }

    fn build_grid(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(grid) = document.get_element_by_id("grid") else {
            log::error!("Missing #grid");
            return;
        };
        grid.set_inner_html("");

        for i in 0..SLOT_COUNT {
            let (Ok(hole), Ok(img)) = (document.create_element("div"), document.create_element("img"))
            else {
                continue;
            };
            let _ = hole.class_list().add_1("hole");
            let _ = hole.set_attribute("data-index", &i.to_string());
            let _ = img.class_list().add_1("mole");
            let _ = img.set_attribute("alt", "Capybara");
            let _ = hole.append_child(&img);
            let _ = grid.append_child(&hole);

            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.clicks.push(i);
            });
            let _ = hole.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_controls(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, "startBtn", move |_| game.borrow_mut().start());
        }
        {
            let game = game.clone();
            on_click(document, "pauseBtn", move |_| game.borrow_mut().input.pause = true);
        }
        {
            let game = game.clone();
            on_click(document, "settingsBtn", move |_| game.borrow().show_settings());
        }
        {
            let game = game.clone();
            on_click(document, "homeBtn", move |_| {
                let mut g = game.borrow_mut();
                if g.engine.state().is_active() {
                    g.engine.reset();
                }
                g.refresh_home();
                show_page(&g.presenter.document, "home");
            });
        }
        on_click(document, "clearLeaderboardBtn", move |_| {
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message("Clear all scores and history?").ok())
                .unwrap_or(false);
            if confirmed {
                let mut g = game.borrow_mut();
                g.engine.clear_leaderboard();
                g.refresh_home();
            }
        });
    }

    fn setup_settings_page(document: &Document, game: Rc<RefCell<Game>>) {
        // Avatar picked but not yet saved
        let selected = Rc::new(RefCell::new(game.borrow().engine.settings().avatar));

        for avatar in Avatar::ALL {
            let selected = selected.clone();
            let document_clone = document.clone();
            on_click(document, &format!("avatar-{}", avatar.key()), move |_| {
                *selected.borrow_mut() = avatar;
                highlight_avatar(&document_clone, avatar);
            });
        }

        if let Some(slider) = input_element(document, "gameDuration") {
            let document_clone = document.clone();
            let slider_clone = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some(label) = document_clone.get_element_by_id("durationValue") {
                    label.set_text_content(Some(&slider_clone.value()));
                }
            });
            let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let selected = selected.clone();
            on_click(document, "saveSettingsBtn", move |_| {
                let avatar = *selected.borrow();
                game.borrow_mut().save_settings(avatar);
            });
        }

        on_click(document, "resetSettingsBtn", move |_| {
            let mut g = game.borrow_mut();
            g.engine.reset_settings();
            *selected.borrow_mut() = g.engine.settings().avatar;
            g.refresh_home();
            g.show_settings();
        });
    }

    fn setup_auto_pause(document: &Document, game: Rc<RefCell<Game>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut g = game.borrow_mut();
                if g.engine.status() == RoundStatus::Running {
                    g.input.pause = true;
                    log::info!("Auto-paused (tab hidden)");
                }
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().update(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use capy_whack::consts::FRAME_MS;
    use capy_whack::highscores::format_date;
    use capy_whack::persistence::MemoryStorage;
    use capy_whack::platform::{LogPresenter, present};
    use capy_whack::sim::{RoundEngine, RoundStatus, TickInput, tick};

    env_logger::init();
    log::info!("Capy Whack (native) starting...");
    log::info!("Native mode plays demo rounds - run with `trunk serve` for the web version");

    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut engine = RoundEngine::new(MemoryStorage::new(), now_ms);
    let mut presenter = LogPresenter::default();
    let input = TickInput {
        autoplay: true,
        wall_clock_ms: Some(now_ms as f64),
        ..Default::default()
    };

    for round in 0..3 {
        engine.start_with_seed(now_ms.wrapping_add(round));
        while engine.status() == RoundStatus::Running {
            tick(&mut engine, &input, FRAME_MS);
            let sound = engine.settings().sound_enabled;
            present(engine.drain_events(), &mut presenter, sound);
        }
    }

    println!("\nLeaderboard:");
    for (i, entry) in engine.ledger().list_top_scores(10).iter().enumerate() {
        println!(
            "  #{} {} - {} (level {}, {}, {})",
            i + 1,
            entry.player,
            entry.score,
            entry.level,
            entry.difficulty.as_str(),
            format_date(entry.timestamp)
        );
    }
    println!("✓ {} demo rounds played", presenter.summaries.len());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
