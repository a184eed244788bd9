//! Celiac Catch entry point
//!
//! On the web the game is driven by the perception host's animation loop
//! through the `WasmGame` wrapper. Natively there is no camera, so `main`
//! runs a scripted headless session with synthetic hands to exercise the
//! whole machine.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::CanvasRenderingContext2d;

    use celiac_catch::config::GameConfig;
    use celiac_catch::questions::QuestionBank;
    use celiac_catch::scene::build_scene;
    use celiac_catch::sim::{
        FixedMeasure, FrameInput, GameState, HandInput, TextMeasure, update,
    };

    /// Text measurement through an off-screen 2d canvas context
    struct CanvasMeasure {
        ctx: CanvasRenderingContext2d,
    }

    impl CanvasMeasure {
        fn new() -> Option<Self> {
            let document = web_sys::window()?.document()?;
            let canvas = document
                .create_element("canvas")
                .ok()?
                .dyn_into::<web_sys::HtmlCanvasElement>()
                .ok()?;
            let ctx = canvas
                .get_context("2d")
                .ok()??
                .dyn_into::<CanvasRenderingContext2d>()
                .ok()?;
            Some(Self { ctx })
        }
    }

    impl TextMeasure for CanvasMeasure {
        fn text_width(&self, text: &str, font_px: f32) -> f32 {
            self.ctx
                .set_font(&format!("{font_px}px 'Segoe UI', Arial, sans-serif"));
            match self.ctx.measure_text(text) {
                Ok(metrics) => metrics.width() as f32,
                Err(_) => FixedMeasure::default().text_width(text, font_px),
            }
        }
    }

    /// The session as seen from JS: hand observations in, scene and events
    /// out, all control calls forwarded to the state machine
    #[wasm_bindgen]
    pub struct WasmGame {
        state: GameState,
        measure: Box<dyn TextMeasure>,
    }

    #[wasm_bindgen]
    impl WasmGame {
        #[wasm_bindgen(constructor)]
        pub fn new(seed: u32, canvas_width: f32, canvas_height: f32) -> WasmGame {
            let measure: Box<dyn TextMeasure> = match CanvasMeasure::new() {
                Some(m) => Box::new(m),
                None => {
                    log::warn!("no 2d context for text measurement, using fixed advance");
                    Box::new(FixedMeasure::default())
                }
            };
            WasmGame {
                state: GameState::new(
                    GameConfig::load(),
                    QuestionBank::builtin(),
                    seed as u64,
                    canvas_width,
                    canvas_height,
                ),
                measure,
            }
        }

        /// Replace the built-in question bank with host-supplied content
        pub fn load_questions(&mut self, json: &str) -> Result<(), JsError> {
            let bank = QuestionBank::from_json(json).map_err(|e| JsError::new(&e.to_string()))?;
            log::info!("loaded question bank ({} questions)", bank.len());
            self.state.set_question_bank(bank);
            Ok(())
        }

        /// One frame: `hands_json` is an array of
        /// `{hand: {keypoints: [[x,y],...], score}, player}` in camera space;
        /// mirroring into game space happens here, once.
        pub fn update(&mut self, now: f64, hands_json: &str) {
            let hands: Vec<HandInput> = match serde_json::from_str(hands_json) {
                Ok(hands) => hands,
                Err(e) => {
                    log::warn!("dropping malformed hands payload: {e}");
                    Vec::new()
                }
            };
            let width = self.state.canvas.x;
            let hands = hands
                .into_iter()
                .map(|hi| HandInput {
                    hand: hi.hand.mirrored(width),
                    player: hi.player,
                })
                .collect();

            update(&mut self.state, &FrameInput { now, hands }, self.measure.as_ref());
        }

        /// Current display list as JSON
        pub fn scene_json(&self, now: f64) -> String {
            serde_json::to_string(&build_scene(&self.state, now)).unwrap_or_else(|_| "[]".into())
        }

        /// Drain pending state-change events as JSON
        pub fn take_events_json(&mut self) -> String {
            serde_json::to_string(&self.state.take_events()).unwrap_or_else(|_| "[]".into())
        }

        // Control surface wired to host UI buttons and the video collaborator

        pub fn start_game(&mut self) {
            self.state.start_game();
        }

        pub fn end_game(&mut self) {
            self.state.end_game();
        }

        pub fn dismiss_intro(&mut self) {
            self.state.dismiss_intro();
        }

        pub fn stage_video_finished(&mut self, now: f64) {
            self.state.stage_video_finished(now);
        }

        pub fn repeat_current_stage(&mut self) {
            self.state.repeat_current_stage();
        }

        pub fn continue_to_next_stage(&mut self) {
            self.state.continue_to_next_stage();
        }

        pub fn pause(&mut self, now: f64) {
            self.state.pause(now);
        }

        pub fn resume(&mut self, now: f64) {
            self.state.resume(now);
        }

        pub fn set_canvas_size(&mut self, width: f32, height: f32) {
            self.state.set_canvas_size(width, height);
        }

        pub fn stage(&self) -> u32 {
            self.state.stage
        }

        pub fn player_score(&self, player: usize) -> i32 {
            self.state.players.get(player).map(|p| p.score).unwrap_or(0)
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Celiac Catch wasm module ready");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use celiac_catch::config::GameConfig;
    use celiac_catch::questions::QuestionBank;
    use celiac_catch::sim::{
        FixedMeasure, FrameInput, GamePhase, GameState, HandInput, TrackedHand, update,
    };
    use glam::Vec2;

    env_logger::init();
    log::info!("Celiac Catch (native) - headless demo session");

    let mut config = GameConfig::default();
    config.stage_duration_ms = 10_000.0; // short stages for the demo
    let mut state = GameState::new(config, QuestionBank::builtin(), 2024, 1280.0, 720.0);
    let measure = FixedMeasure::default();

    fn synthetic_hand(at: Vec2, player: usize) -> HandInput {
        HandInput {
            hand: TrackedHand::new(vec![at; 21], 0.95),
            player: Some(player),
        }
    }

    // Advance simulated time in 16ms frames, feeding hands from `driver`
    fn run_for(
        state: &mut GameState,
        measure: &FixedMeasure,
        now: &mut f64,
        ms: f64,
        driver: impl Fn(&GameState) -> Vec<HandInput>,
    ) {
        let end = *now + ms;
        while *now < end {
            *now += 16.0;
            let hands = driver(state);
            update(state, &FrameInput { now: *now, hands }, measure);
            for event in state.take_events() {
                log::info!("event: {event:?}");
            }
        }
    }

    let idle = |_: &GameState| Vec::new();

    // Player 0 chases the first active item during stages 1 and 2
    let chaser = |player: usize| {
        move |s: &GameState| {
            s.active_items()
                .next()
                .map(|item| vec![synthetic_hand(item.hitbox().center(), player)])
                .unwrap_or_default()
        }
    };

    // Stage 3: touch the focus target, then dwell on the correct option
    let quiz_driver = |s: &GameState| {
        if s.waiting_for_focus && s.focus.active {
            return vec![synthetic_hand(s.focus.bounds().center(), 0)];
        }
        if let Some(player) = s.focus_touched_by {
            if let Some(prompt) = s.prompts[player].as_ref() {
                if let Some(layout) = prompt.layout() {
                    let target = layout.options[prompt.correct].rect.center();
                    return vec![synthetic_hand(target, player)];
                }
            }
        }
        Vec::new()
    };

    let mut now = 0.0;
    state.start_game();
    state.dismiss_intro();
    state.stage_video_finished(now);

    for stage in 1..=state.config.stage_count() {
        // Intro card (4s) + countdown (3s)
        run_for(&mut state, &measure, &mut now, 7_100.0, idle);
        assert_eq!(state.phase, GamePhase::Playing, "stage {stage} never started");

        let stage_ms = state.config.stage_duration_ms + 100.0;
        if state.stage_rules().quiz {
            run_for(&mut state, &measure, &mut now, stage_ms, quiz_driver);
        } else {
            run_for(&mut state, &measure, &mut now, stage_ms, chaser(0));
        }
        assert_eq!(state.phase, GamePhase::StageResults);

        println!(
            "stage {stage}: red {} pts, blue {} pts, winner {:?}",
            state.players[0].score, state.players[1].score, state.winner()
        );

        state.continue_to_next_stage();
        if state.phase == GamePhase::StageVideo {
            state.stage_video_finished(now);
        }
    }

    assert_eq!(state.phase, GamePhase::GameOver);
    println!("session complete");
}
