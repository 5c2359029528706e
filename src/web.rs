//! Browser host
//!
//! Drives the simulation from `requestAnimationFrame`, feeds it keyboard
//! intent, hands each frame's snapshot to the JavaScript renderer and keeps
//! the DOM HUD, settings and high scores in sync.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::consts::*;
use crate::platform::KeyState;
use crate::sim::{GamePhase, GameState, Stepper, snapshot};
use crate::{HighScores, Settings};

// The renderer lives in JS; it receives the snapshot as JSON
#[wasm_bindgen(inline_js = "
    export function present_frame(json) {
        if (typeof window.cityHopperRender === 'function') {
            window.cityHopperRender(JSON.parse(json));
        }
    }
")]
extern "C" {
    fn present_frame(json: &str);
}

/// Game instance holding all host state
struct Game {
    state: GameState,
    stepper: Stepper,
    keys: KeyState,
    settings: Settings,
    high_scores: HighScores,
    last_time: f64,
    // FPS tracking
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
    last_phase: GamePhase,
    /// Rank earned by the run that just ended
    last_rank: Option<usize>,
}

impl Game {
    fn new(seed: u64) -> Self {
        let settings = Settings::load();
        let mut state = GameState::new(seed);
        settings.apply(&mut state);
        Self {
            state,
            stepper: Stepper::default(),
            keys: KeyState::new(),
            settings,
            high_scores: HighScores::load(),
            last_time: 0.0,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
            last_phase: GamePhase::Menu,
            last_rank: None,
        }
    }

    /// Run simulation ticks for one display frame
    fn update(&mut self, dt: f32, time: f64) {
        let input = self.keys.intent();
        self.stepper.advance(&mut self.state, &input, dt);

        // Track frame times for FPS
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % 60;
        let oldest_time = self.frame_times[self.frame_index];
        if oldest_time > 0.0 {
            let elapsed = time - oldest_time;
            if elapsed > 0.0 {
                self.fps = (60000.0 / elapsed).round() as u32;
            }
        }

        let phase = self.state.phase;
        if phase != self.last_phase {
            match phase {
                GamePhase::GameOver => self.finish_run(),
                GamePhase::Playing if self.last_phase != GamePhase::Paused => {
                    self.last_rank = None;
                    log::info!("Run started ({} mode)", self.state.mode.as_str());
                }
                _ => {}
            }
            self.last_phase = phase;
        }
    }

    fn finish_run(&mut self) {
        let meters = self.state.meters();
        self.last_rank = self.high_scores.record_run(
            meters,
            self.state.counters.notes,
            self.state.mode,
            js_sys::Date::now(),
        );
        if self.last_rank.is_some() {
            self.high_scores.save();
        }
    }

    /// Hand the frame to the JS renderer
    fn render(&self) {
        match snapshot(&self.state).to_json() {
            Ok(json) => present_frame(&json),
            Err(e) => log::warn!("Snapshot encode failed: {e}"),
        }
    }

    /// Toggle Easy/Normal from the menu screens
    fn toggle_difficulty(&mut self) {
        if !matches!(self.state.phase, GamePhase::Menu | GamePhase::GameOver) {
            return;
        }
        self.settings.toggle_difficulty();
        self.settings.apply(&mut self.state);
        self.settings.save();
    }

    fn toggle_adaptive(&mut self) {
        self.settings.adaptive_difficulty = !self.settings.adaptive_difficulty;
        self.settings.apply(&mut self.state);
        self.settings.save();
        log::info!("Adaptive difficulty: {}", self.settings.adaptive_difficulty);
    }

    /// Update HUD elements in DOM
    fn update_hud(&self) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let set_text = |selector: &str, text: &str| {
            if let Some(el) = document.query_selector(selector).ok().flatten() {
                el.set_text_content(Some(text));
            }
        };
        let show = |id: &str, visible: bool| {
            if let Some(el) = document.get_element_by_id(id) {
                let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
            }
        };

        let state = &self.state;
        set_text("#hud-meters .hud-value", &state.meters().to_string());
        set_text("#hud-notes .hud-value", &state.counters.notes.to_string());
        set_text("#hud-records .hud-value", &state.counters.records.to_string());
        set_text("#hud-quest", &state.quests.hud_text());
        set_text(
            "#hud-notification",
            state.notification.as_deref().unwrap_or(""),
        );
        set_text("#hud-mode", self.settings.difficulty.as_str());

        if let Some(bar) = document.get_element_by_id("hud-stamina-fill") {
            let style = format!("width: {:.0}%", state.player.stamina * 100.0);
            let _ = bar.set_attribute("style", &style);
        }

        show("hud-fps", self.settings.show_fps);
        if self.settings.show_fps {
            set_text("#hud-fps .hud-value", &self.fps.to_string());
        }

        show("menu", state.phase == GamePhase::Menu);
        show("pause-menu", state.phase == GamePhase::Paused);
        show("game-over", state.phase == GamePhase::GameOver);
        if state.phase == GamePhase::GameOver {
            set_text("#final-meters", &state.meters().to_string());
            let rank = match self.last_rank {
                Some(rank) => format!("New high score! Rank #{rank}"),
                None => String::new(),
            };
            set_text("#final-rank", &rank);
        }

        if let Some(list) = document.get_element_by_id("high-scores") {
            let items: String = self
                .high_scores
                .entries
                .iter()
                .map(|e| format!("<li>{} m</li>", e.meters))
                .collect();
            list.set_inner_html(&items);
        }
    }

    fn resize(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let width = window.inner_width().ok().and_then(|v| v.as_f64());
        let height = window.inner_height().ok().and_then(|v| v.as_f64());
        if let (Some(width), Some(height)) = (width, height) {
            self.state.set_viewport(width as f32, height as f32);
        }
    }
}

/// Start the browser game
pub fn run() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("City Hopper starting...");

    let Some(window) = web_sys::window() else {
        log::error!("No window available");
        return;
    };
    if let Some(loading) = window
        .document()
        .and_then(|d| d.get_element_by_id("loading"))
    {
        let _ = loading.set_attribute("class", "hidden");
    }

    let seed = js_sys::Date::now() as u64;
    let game = Rc::new(RefCell::new(Game::new(seed)));
    game.borrow_mut().resize();
    log::info!("Game initialized with seed: {}", seed);

    setup_input_handlers(&window, game.clone());
    setup_auto_pause(&window, game.clone());
    request_animation_frame(game);
    log::info!("City Hopper running!");
}

fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
    // Key down
    {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            match event.code().as_str() {
                "KeyM" => g.toggle_difficulty(),
                "KeyJ" => g.toggle_adaptive(),
                "KeyF" => {
                    g.settings.show_fps = !g.settings.show_fps;
                    g.settings.save();
                }
                code => {
                    if g.keys.key_down(code) {
                        event.prevent_default();
                    }
                }
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Key up
    {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            if game.borrow_mut().keys.key_up(&event.code()) {
                event.prevent_default();
            }
        });
        let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Resize
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().resize();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn setup_auto_pause(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
    let pause_if_playing = |g: &mut Game, reason: &str| {
        g.keys.clear();
        if g.settings.auto_pause && g.state.phase == GamePhase::Playing {
            g.state.phase = GamePhase::Paused;
            log::info!("Auto-paused ({reason})");
        }
    };

    // Visibility change (tab switch, minimize)
    if let Some(document) = window.document() {
        let game = game.clone();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                pause_if_playing(&mut game.borrow_mut(), "tab hidden");
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Window blur (click outside)
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            pause_if_playing(&mut game.borrow_mut(), "window blur");
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn request_animation_frame(game: Rc<RefCell<Game>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| {
        game_loop(game, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
    {
        let mut g = game.borrow_mut();
        let dt = if g.last_time > 0.0 {
            ((time - g.last_time) / 1000.0) as f32
        } else {
            SIM_DT
        };
        g.last_time = time;
        g.update(dt, time);
        g.render();
        g.update_hud();
    }
    request_animation_frame(game);
}
