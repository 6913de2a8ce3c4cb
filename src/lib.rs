pub mod engine;
pub mod game;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{KeyboardEvent, Request, RequestInit, RequestMode, Response, Window};
use std::cell::RefCell;
use std::rc::Rc;
use crate::engine::input::{Command, EdgeDetector, InputState};
use crate::engine::storage::{BrowserStore, NoStore, ScoreStore};
use crate::game::config::GameConfig;
use crate::game::Game;

struct App {
    game: Game,
    input: InputState,
    edges: EdgeDetector,
    last_frame_ms: Option<f64>,
}

impl App {
    fn frame(&mut self, now_ms: f64) {
        let dt = self
            .last_frame_ms
            .map_or(0.0, |last| ((now_ms - last) / 1000.0) as f32);
        self.last_frame_ms = Some(now_ms);

        for command in self.edges.poll(&mut self.input) {
            self.game.handle_command(command);
        }
        self.game.tick(dt);
    }
}

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

fn with_app(f: impl FnOnce(&mut App)) {
    APP.with(|app| {
        if let Some(app) = app.borrow_mut().as_mut() {
            f(app);
        }
    });
}

#[wasm_bindgen]
pub async fn init_game() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::warn!("logger already initialized");
    }

    let window = web_sys::window().ok_or("No window")?;

    let config = match fetch_config(&window).await {
        Ok(config) => config,
        Err(e) => {
            log::warn!("using default config: {:?}", e);
            GameConfig::default()
        }
    };

    let store: Box<dyn ScoreStore> = match BrowserStore::open(&config.storage_key) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("high score will not persist: {}", e);
            Box::new(NoStore)
        }
    };

    let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let game = Game::new(config, store, seed);
    APP.with(|app| {
        *app.borrow_mut() = Some(App {
            game,
            input: InputState::default(),
            edges: EdgeDetector::default(),
            last_frame_ms: None,
        })
    });

    // Input handling
    let keydown = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if let Some(command) = Command::from_key(&event.key()) {
            with_app(|app| app.input.set(command, true));
            event.prevent_default();
        }
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    keydown.forget();

    let keyup = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if let Some(command) = Command::from_key(&event.key()) {
            with_app(|app| app.input.set(command, false));
        }
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
    keyup.forget();

    // Keys released while unfocused never send keyup
    let blur = Closure::wrap(Box::new(move || {
        with_app(|app| {
            app.input.release_all();
            app.game.pause();
        });
    }) as Box<dyn FnMut()>);
    window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
    blur.forget();

    // Game loop
    let f = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let now = now_ms();
        with_app(|app| app.frame(now));
        if let Some(callback) = f.borrow().as_ref() {
            request_animation_frame(callback);
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        request_animation_frame(callback);
    }

    log::info!("froggy road ready");
    Ok(())
}

async fn fetch_config(window: &Window) -> Result<GameConfig, JsValue> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init("/assets/config.json", &opts)?;
    let resp: Response = JsFuture::from(window.fetch_with_request(&request)).await?.dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("config request returned {}", resp.status())));
    }
    let json = JsFuture::from(resp.json()?).await?;
    let config: GameConfig = serde_wasm_bindgen::from_value(json)?;
    config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(config)
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now())
}

fn request_animation_frame(f: &Closure<dyn FnMut()>) {
    let requested = web_sys::window()
        .map(|w| w.request_animation_frame(f.as_ref().unchecked_ref()));
    if let Some(Err(e)) = requested {
        log::error!("requestAnimationFrame failed: {:?}", e);
    }
}

fn dispatch(command: Command) {
    with_app(|app| app.game.handle_command(command));
}

#[wasm_bindgen]
pub fn touch_left() {
    dispatch(Command::Left);
}

#[wasm_bindgen]
pub fn touch_right() {
    dispatch(Command::Right);
}

#[wasm_bindgen]
pub fn touch_forward() {
    dispatch(Command::Forward);
}

#[wasm_bindgen]
pub fn touch_restart() {
    dispatch(Command::Restart);
}

#[wasm_bindgen]
pub fn press_pause() {
    dispatch(Command::Pause);
}

#[wasm_bindgen]
pub fn press_confirm() {
    dispatch(Command::Confirm);
}

#[wasm_bindgen]
pub fn press_escape() {
    dispatch(Command::Escape);
}

#[wasm_bindgen]
pub fn toggle_grid() {
    with_app(|app| app.game.toggle_grid());
}

#[wasm_bindgen]
pub fn toggle_axes() {
    with_app(|app| app.game.toggle_axes());
}

#[wasm_bindgen]
pub fn toggle_free_camera() {
    with_app(|app| app.game.toggle_free_camera());
}

#[wasm_bindgen]
pub fn toggle_god_mode() {
    with_app(|app| {
        let enabled = !app.game.debug().god_mode;
        app.game.set_god_mode(enabled);
    });
}

#[wasm_bindgen]
pub fn snapshot() -> Result<JsValue, JsValue> {
    APP.with(|app| match app.borrow().as_ref() {
        Some(app) => serde_wasm_bindgen::to_value(&app.game.snapshot()).map_err(Into::into),
        None => Ok(JsValue::NULL),
    })
}
