//! Skyward entry point
//!
//! In the browser: loads sprites, paints the draw list on a 2D canvas and
//! drives the game with requestAnimationFrame. Natively: a headless
//! autopilot session against an in-memory score ledger.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{JsFuture, spawn_local};
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, HtmlImageElement};

    use skyward::Game;
    use skyward::persistence::{LocalStorageCache, SaveStatus, ScoreBridge};
    use skyward::platform::LoopControl;
    use skyward::renderer::draw::Color;
    use skyward::renderer::{AssetId, AssetManifest, AssetProvider, DrawCommand, SpriteSheet};
    use skyward::settings::Settings;

    /// Decoded sprite images
    struct Images(HashMap<AssetId, HtmlImageElement>);

    impl AssetProvider for Images {
        fn dimensions(&self, id: AssetId) -> Option<Vec2> {
            let img = self.0.get(&id)?;
            Some(Vec2::new(
                img.natural_width() as f32,
                img.natural_height() as f32,
            ))
        }
    }

    async fn load_images(manifest: &AssetManifest) -> Images {
        let mut images = HashMap::new();
        for (id, path) in manifest.entries() {
            let Ok(img) = HtmlImageElement::new() else {
                continue;
            };
            img.set_src(path);
            match JsFuture::from(img.decode()).await {
                Ok(_) => {
                    images.insert(id, img);
                }
                Err(e) => log::warn!("Could not load {}: {:?}", path, e),
            }
        }
        log::info!("Loaded {} sprites", images.len());
        Images(images)
    }

    fn css(color: Color) -> String {
        let [r, g, b, a] = color;
        format!(
            "rgba({},{},{},{})",
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
            a
        )
    }

    /// Canvas 2D backend for the draw list
    struct Painter {
        ctx: CanvasRenderingContext2d,
        images: Images,
        width: f64,
        height: f64,
    }

    impl Painter {
        fn paint(&self, list: &[DrawCommand]) {
            let ctx = &self.ctx;
            ctx.clear_rect(0.0, 0.0, self.width, self.height);

            for cmd in list {
                match cmd {
                    DrawCommand::Pattern {
                        asset,
                        rect,
                        repeat,
                    } => {
                        let Some(img) = self.images.0.get(asset) else {
                            continue;
                        };
                        if let Ok(Some(pattern)) =
                            ctx.create_pattern_with_html_image_element(img, repeat.as_css())
                        {
                            ctx.set_fill_style_canvas_pattern(&pattern);
                            ctx.fill_rect(
                                rect.origin.x as f64,
                                rect.origin.y as f64,
                                rect.size.x as f64,
                                rect.size.y as f64,
                            );
                        }
                    }
                    DrawCommand::Sprite {
                        asset, pos, flip_y, ..
                    } => {
                        let Some(img) = self.images.0.get(asset) else {
                            continue;
                        };
                        if *flip_y {
                            ctx.save();
                            let _ = ctx.translate(pos.x as f64, pos.y as f64);
                            let _ = ctx.scale(1.0, -1.0);
                            let _ = ctx.draw_image_with_html_image_element(img, 0.0, 0.0);
                            ctx.restore();
                        } else {
                            let _ = ctx.draw_image_with_html_image_element(
                                img,
                                pos.x as f64,
                                pos.y as f64,
                            );
                        }
                    }
                    DrawCommand::FillRect { rect, color } => {
                        ctx.set_fill_style_str(&css(*color));
                        ctx.fill_rect(
                            rect.origin.x as f64,
                            rect.origin.y as f64,
                            rect.size.x as f64,
                            rect.size.y as f64,
                        );
                    }
                    DrawCommand::Text {
                        text,
                        pos,
                        px,
                        fill,
                        outline,
                    } => {
                        ctx.set_font(&format!("bold {}px sans-serif", px));
                        ctx.set_text_align("center");
                        if let Some(outline) = outline {
                            ctx.set_stroke_style_str(&css(*outline));
                            ctx.set_line_width(2.0);
                            let _ = ctx.stroke_text(text, pos.x as f64, pos.y as f64);
                        }
                        ctx.set_fill_style_str(&css(*fill));
                        let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
                    }
                }
            }
        }
    }

    struct Host {
        game: Game,
        painter: Painter,
        bridge: Rc<ScoreBridge>,
    }

    impl Host {
        fn redraw(&self) {
            self.painter.paint(&self.game.draw());
            self.update_hud();
        }

        fn update_hud(&self) {
            set_text("topScore", &format!("Top Score: {}", self.game.best_score()));
        }

        fn reset(&mut self) {
            self.game.reset();
            self.bridge.clear_status();
            set_display("saveStatus", "none");
            set_display("gameOver", "none");
            self.redraw();
        }
    }

    fn element(id: &str) -> Option<web_sys::Element> {
        web_sys::window()?.document()?.get_element_by_id(id)
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = element(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_display(id: &str, display: &str) {
        if let Some(el) = element(id).and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
            let _ = el.style().set_property("display", display);
        }
    }

    fn show_status(bridge: &ScoreBridge, status: &SaveStatus) {
        let Some(el) = element("saveStatus").and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        el.set_text_content(Some(&status.to_string()));
        let style = el.style();
        let _ = style.set_property("color", status.tone().color());
        let _ = style.set_property("display", "block");

        let link = bridge.network().and_then(|n| status.link(n));
        if let Some(anchor) = element("txLink") {
            match link {
                Some(url) => {
                    let _ = anchor.set_attribute("href", &url);
                    anchor.set_text_content(Some("View on Explorer"));
                }
                None => anchor.set_text_content(None),
            }
        }
    }

    fn on_game_over(host: &Rc<RefCell<Host>>, score: u32) {
        let bridge = {
            let h = host.borrow();
            set_text("finalScore", &score.to_string());
            set_text("bestScore", &h.game.best_score().to_string());
            set_display("gameOver", "block");
            h.bridge.clone()
        };
        spawn_local(async move {
            if let Some(status) = bridge.finish_session(score).await {
                show_status(&bridge, &status);
            }
        });
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Skyward starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let settings = Settings::load();
        let tuning = &settings.tuning;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        canvas.set_width(tuning.playfield_width as u32);
        canvas.set_height(tuning.playfield_height as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let images = load_images(&AssetManifest::default()).await;
        let sprites = SpriteSheet::from_provider(&images);

        let bridge = Rc::new(ScoreBridge::offline(Box::new(LocalStorageCache::new(
            LocalStorageCache::DEFAULT_KEY,
        ))));
        if let Some(network) = &settings.network {
            log::info!(
                "No wallet in this build; ignoring network {} and playing offline",
                network.name
            );
        }
        set_text("walletAddress", "Playing Offline");

        let seed = js_sys::Date::now() as u64;
        let game = Game::from_settings(&settings, sprites, seed, bridge.best());

        let host = Rc::new(RefCell::new(Host {
            game,
            painter: Painter {
                ctx,
                images,
                width: tuning.playfield_width as f64,
                height: tuning.playfield_height as f64,
            },
            bridge,
        }));
        host.borrow().redraw();

        // Input only after sprites are ready
        setup_input_handlers(&canvas, host.clone());
        setup_restart_button(host);

        log::info!("Skyward ready");
        Ok(())
    }

    fn jump(host: &Rc<RefCell<Host>>) {
        let start_loop = host.borrow_mut().game.submit_jump();
        if start_loop {
            request_animation_frame(host.clone());
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, host: Rc<RefCell<Host>>) {
        // Keyboard
        if let Some(window) = web_sys::window() {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if event.code() != "Space" || event.repeat() {
                    return;
                }
                event.prevent_default();
                jump(&host);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click / tap
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                jump(&host);
            });
            let _ =
                canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(host: Rc<RefCell<Host>>) {
        if let Some(btn) = element("restartBtn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                host.borrow_mut().reset();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(host);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(host: Rc<RefCell<Host>>) {
        let frame = {
            let mut h = host.borrow_mut();
            let frame = h.game.frame();
            h.painter.paint(&frame.draw);
            h.update_hud();
            frame
        };

        if let Some(score) = frame.game_over {
            on_game_over(&host, score);
        }
        if frame.control == LoopControl::Continue {
            request_animation_frame(host);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::rc::Rc;

    use futures::executor::block_on;
    use futures::{FutureExt, StreamExt};

    use skyward::highscores::LeaderboardView;
    use skyward::persistence::{FileCache, InMemoryLedger, ScoreBridge};
    use skyward::renderer::SpriteSheet;
    use skyward::{Game, PlayerId, Settings};

    const PLAYER: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    /// Ticks after which the autopilot stops flapping, per round
    const ROUND_LENGTHS: [u32; 3] = [400, 1200, 800];

    /// Flap whenever the bird sinks below a line just above the next gap's
    /// bottom edge
    fn should_flap(game: &Game) -> bool {
        let state = game.state();
        let tuning = game.tuning();
        let bird = &state.bird;
        let target = state
            .pipes
            .iter()
            .find(|p| p.right(tuning.pipe_width) >= bird.left())
            .map(|p| p.gap_bottom - 30.0)
            .unwrap_or(tuning.ground_line() / 2.0);
        bird.speed > 0.0 && bird.bottom() > target
    }

    fn autopilot(game: &mut Game, flap_for: u32) -> u32 {
        game.reset();
        game.start();
        let mut ticks = 0;
        loop {
            if ticks < flap_for && should_flap(game) {
                game.submit_jump();
            }
            if let Some(score) = game.step() {
                return score;
            }
            ticks += 1;
        }
    }

    fn seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    pub fn run() {
        let settings = Settings::load();
        let offline = std::env::args().any(|a| a == "--offline");
        let cache = Box::new(FileCache::new(std::env::temp_dir().join("skyward-best.txt")));

        let ledger = Rc::new(InMemoryLedger::new(PlayerId::new(PLAYER)));
        ledger.record_external(PlayerId::new("0x1111111111111111111111111111111111111111"), 12);
        ledger.record_external(PlayerId::new("0x2222222222222222222222222222222222222222"), 3);

        let bridge = if offline {
            ScoreBridge::offline(cache)
        } else {
            let network = settings.network.clone().unwrap_or_default();
            ScoreBridge::with_ledger(cache, ledger.clone(), network)
        };

        let mut feed = if bridge.is_online() {
            match block_on(bridge.connect()) {
                Ok(feed) => Some(feed),
                Err(e) => {
                    log::error!("Could not connect: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let mut game = Game::from_settings(&settings, SpriteSheet::default(), seed(), bridge.best());

        for (round, flap_for) in ROUND_LENGTHS.iter().enumerate() {
            let score = autopilot(&mut game, *flap_for);
            let cause = game
                .last_collision()
                .map(|c| c.describe())
                .unwrap_or_default();
            println!("Round {}: scored {} ({})", round + 1, score, cause);

            if let Some(status) = block_on(bridge.finish_session(score)) {
                let link = bridge
                    .network()
                    .and_then(|n| status.link(n))
                    .unwrap_or_default();
                println!("  [{:?}] {} {}", status.tone(), status, link);
            }

            // Deliver notifications raised by the confirmation
            if let Some(feed) = feed.as_mut() {
                while let Some(Some(event)) = feed.next().now_or_never() {
                    block_on(bridge.handle_score_event(event));
                }
            }
        }

        println!("\nBest score: {}", bridge.best_score());
        if bridge.is_online() {
            println!("Global top score: {}", bridge.global_top_score());
        }

        let view = bridge.leaderboard();
        if let Some(placeholder) = view.placeholder() {
            println!("{}", placeholder);
        }
        if let (LeaderboardView::Loaded(board), Some(network)) = (&view, bridge.network()) {
            println!("Leaderboard:");
            for row in board.rows(bridge.player(), network) {
                let marker = if row.highlighted { "*" } else { " " };
                println!("{} {:>2}. {}", marker, row.rank, row.label);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Skyward (native) starting...");
    headless::run();
}
