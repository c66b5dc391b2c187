//! Melody Tiles entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, MouseEvent, TouchEvent};

    use melody_tiles::audio::AudioRouter;
    use melody_tiles::consts::*;
    use melody_tiles::engine::{
        FieldRect, FrameClock, GameEvent, GameState, GameStatus, Haptic, map_pointer, resolve_tap,
        tick,
    };
    use melody_tiles::view::status_to_visual;
    use melody_tiles::{HighScores, Settings, haptics};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        clock: FrameClock,
        audio: AudioRouter,
        settings: Settings,
        highscores: HighScores,
        /// Whether the current run has already been recorded
        run_recorded: bool,
    }

    impl Game {
        fn new(seed: u64, settings: Settings, highscores: HighScores) -> Self {
            let mut audio = AudioRouter::new(settings.audio_engine);
            audio.set_volume(settings.master_volume);
            audio.set_enabled(!settings.muted);
            Self {
                state: GameState::new(seed),
                clock: FrameClock::new(BASE_FALL_SPEED),
                audio,
                settings,
                highscores,
                run_recorded: false,
            }
        }

        /// One host frame: advance the clock and the field, then flush
        /// whatever the transitions produced
        fn frame(&mut self, timestamp: f64) {
            if self.state.status != GameStatus::Playing {
                // Parked: the next live frame must not see the gap
                self.clock.suspend();
                return;
            }
            let dt = self.clock.frame(timestamp);
            tick(&mut self.state, dt, self.clock.speed());
            self.dispatch_events();
        }

        /// Resolve a tap at screen coordinates against the field
        fn handle_tap(&mut self, document: &Document, x: f32, y: f32) {
            match self.state.status {
                GameStatus::Idle => {
                    self.state.start();
                    return;
                }
                GameStatus::Playing => {}
                _ => return,
            }

            let rect = field_rect(document);
            let Some(tap) = map_pointer(Vec2::new(x, y), rect.as_ref()) else {
                // Field not mounted yet; drop the tap
                return;
            };
            resolve_tap(&mut self.state, tap);
            self.dispatch_events();
        }

        /// Route engine events to the audio/haptic collaborators.
        /// Failures stay on their side of the boundary.
        fn dispatch_events(&mut self) {
            for event in self.state.drain_events() {
                match event {
                    GameEvent::PlayNote(note) => self.audio.play_note(note),
                    GameEvent::Haptic(intensity) => {
                        if self.settings.haptics {
                            haptics::impact(intensity);
                        }
                    }
                    GameEvent::LevelChanged(level) => {
                        log::info!("Level up -> {level}");
                        self.audio.set_level(level);
                        if self.settings.haptics {
                            haptics::impact(Haptic::Light);
                        }
                    }
                    GameEvent::MelodyCompleted => {
                        log::info!("Melody completed ({}x)", self.state.completed_melodies);
                    }
                    GameEvent::GameOver => {
                        log::info!("Game over at score {}", self.state.score);
                    }
                }
            }

            // A finished run goes on the board exactly once
            if !self.run_recorded
                && matches!(self.state.status, GameStatus::GameOver | GameStatus::Won)
            {
                self.run_recorded = true;
                if let Some(rank) = self.highscores.record(
                    self.state.score,
                    self.state.current_level,
                    self.state.completed_melodies,
                    js_sys::Date::now(),
                ) {
                    log::info!("New high score, rank {rank}");
                }
                self.highscores.save();
            }
        }

        /// Reset for a fresh run
        fn restart(&mut self, seed: u64) {
            self.state.reset(seed);
            self.clock.reset();
            self.run_recorded = false;
            log::info!("Game restarted with seed: {seed}");
        }

        fn toggle_pause(&mut self) {
            match self.state.status {
                GameStatus::Playing => self.state.pause(),
                GameStatus::Paused => self.state.resume(),
                _ => {}
            }
        }

        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.audio.set_enabled(!self.settings.muted);
            self.settings.save();
        }

        fn switch_audio_engine(&mut self) {
            use melody_tiles::AudioEngineKind;
            let next = match self.settings.audio_engine {
                AudioEngineKind::Sample => AudioEngineKind::Synth,
                AudioEngineKind::Synth => AudioEngineKind::Sample,
            };
            self.settings.audio_engine = next;
            self.audio.switch_engine(next);
            self.settings.save();
        }

        /// Reconcile the tile DOM with the current rows
        fn render_tiles(&self, document: &Document) {
            let Some(field) = document.get_element_by_id("playfield") else {
                return;
            };

            // Drop nodes whose rows were retired
            let children = field.children();
            let mut stale: Vec<Element> = Vec::new();
            for i in 0..children.length() {
                let Some(el) = children.item(i) else { continue };
                let live = el
                    .id()
                    .strip_prefix("row-")
                    .and_then(|s| s.parse::<u32>().ok())
                    .is_some_and(|id| self.state.tile_rows.iter().any(|r| r.id == id));
                if !live {
                    stale.push(el);
                }
            }
            for el in stale {
                el.remove();
            }

            for row in &self.state.tile_rows {
                let row_id = format!("row-{}", row.id);
                let row_el = match document.get_element_by_id(&row_id) {
                    Some(el) => el,
                    None => match create_row_element(document, &field, &row_id) {
                        Some(el) => el,
                        None => continue,
                    },
                };

                if let Some(html) = row_el.dyn_ref::<HtmlElement>() {
                    let _ = html
                        .style()
                        .set_property("transform", &format!("translateY({}px)", row.y));
                }

                let cells = row_el.children();
                for column in 0..COLUMN_COUNT {
                    if let Some(cell) = cells.item(u32::from(column)) {
                        cell.set_class_name(status_to_visual(row, column).css_class());
                    }
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            set_text(document, "#hud-score .hud-value", &self.state.score.to_string());
            set_text(document, "#hud-lives .hud-value", &self.state.lives.to_string());
            set_text(
                document,
                "#hud-level .hud-value",
                &self.state.current_level.to_string(),
            );

            set_overlay(document, "start-prompt", self.state.status == GameStatus::Idle);
            set_overlay(document, "pause-menu", self.state.status == GameStatus::Paused);
            set_overlay(document, "game-over", self.state.status == GameStatus::GameOver);
            set_overlay(document, "melody-won", self.state.status == GameStatus::Won);

            if self.state.status == GameStatus::GameOver {
                set_text(document, "#final-score", &self.state.score.to_string());
                if let Some(best) = self.highscores.top_score() {
                    set_text(document, "#best-score", &best.to_string());
                }
            }
        }
    }

    /// The play field's screen rectangle, fetched on demand.
    /// None before the element mounts.
    fn field_rect(document: &Document) -> Option<FieldRect> {
        let el = document.get_element_by_id("playfield")?;
        let rect = el.get_bounding_client_rect();
        Some(FieldRect {
            left: rect.left() as f32,
            top: rect.top() as f32,
            width: rect.width() as f32,
        })
    }

    /// Build a row node with one cell per column
    fn create_row_element(document: &Document, field: &Element, row_id: &str) -> Option<Element> {
        let row_el = document.create_element("div").ok()?;
        row_el.set_id(row_id);
        let _ = row_el.set_attribute("class", "tile-row");
        for _ in 0..COLUMN_COUNT {
            let cell = document.create_element("div").ok()?;
            let _ = row_el.append_child(&cell);
        }
        let _ = field.append_child(&row_el);
        Some(row_el)
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn set_overlay(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Melody Tiles starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let highscores = HighScores::load();
        let game = Rc::new(RefCell::new(Game::new(seed, settings, highscores)));

        log::info!("Game initialized with seed: {seed}");

        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Melody Tiles running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        let Some(field) = document.get_element_by_id("playfield") else {
            log::error!("No #playfield element");
            return;
        };

        // Touch - first active touch point only
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let Some(touch) = event.touches().get(0) else {
                    return;
                };
                let document = web_sys::window().unwrap().document().unwrap();
                game.borrow_mut().handle_tap(
                    &document,
                    touch.client_x() as f32,
                    touch.client_y() as f32,
                );
            });
            let _ = field
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let document = web_sys::window().unwrap().document().unwrap();
                game.borrow_mut().handle_tap(
                    &document,
                    event.client_x() as f32,
                    event.client_y() as f32,
                );
            });
            let _ = field
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "Escape" => g.toggle_pause(),
                    "m" | "M" => g.toggle_mute(),
                    "e" | "E" => g.switch_audio_engine(),
                    "r" | "R" => {
                        let seed = js_sys::Date::now() as u64;
                        g.restart(seed);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Restart (game-over and pause menus share it)
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resume from pause menu
        if let Some(btn) = document.get_element_by_id("resume-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().state.resume();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keep playing past a win (fallback note cycle takes over)
        if let Some(btn) = document.get_element_by_id("keep-playing-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().state.keep_playing();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.settings.pause_on_blur {
                        g.state.pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.pause_on_blur {
                    g.state.pause();
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let document = web_sys::window().unwrap().document().unwrap();
            let mut g = game.borrow_mut();
            g.frame(time);
            g.render_tiles(&document);
            g.update_hud(&document);
        }

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
    env_logger::init();
    log::info!("Melody Tiles (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    demo_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless smoke run: a few seconds of simulated play
#[cfg(not(target_arch = "wasm32"))]
fn demo_run() {
    use melody_tiles::consts::*;
    use melody_tiles::engine::{
        FrameClock, GameState, TapOutcome, TapPoint, TileStatus, resolve_tap, tick,
    };

    let mut state = GameState::new(0xC0FFEE);
    let mut clock = FrameClock::new(BASE_FALL_SPEED);
    state.start();

    let mut hits = 0u32;
    for frame in 0..600u64 {
        let now_ms = frame as f64 * (1000.0 / 60.0);
        let dt = clock.frame(now_ms);
        tick(&mut state, dt, clock.speed());

        // Tap the lowest pending row mid-band every few frames
        if frame % 20 == 0 {
            let target = state
                .tile_rows
                .iter()
                .filter(|r| {
                    r.status == TileStatus::Pending
                        && r.y >= 0.0
                        && r.y + TILE_HEIGHT <= FIELD_HEIGHT
                })
                .max_by(|a, b| a.y.partial_cmp(&b.y).unwrap())
                .map(|r| (i32::from(r.active_column), r.y + TILE_HEIGHT / 2.0));
            if let Some((column, y)) = target {
                if let TapOutcome::Hit { .. } = resolve_tap(&mut state, TapPoint { column, y }) {
                    hits += 1;
                }
            }
        }
        let _ = state.drain_events();
    }

    println!(
        "simulated 600 frames: {} hits, score {}, level {}, status {:?}",
        hits, state.score, state.current_level, state.status
    );
    assert_eq!(state.score, hits * SCORE_PER_HIT);
}
