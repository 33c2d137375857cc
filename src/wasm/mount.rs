use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fastrand::Rng;
use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Event, MouseEvent, WheelEvent};

use super::dom::{render_content, split_title, DomProbe, StyleWriter};
use super::render::Canvas2dSurface;
use crate::config::EngineConfig;
use crate::content::SiteContent;
use crate::error::Result;
use crate::particles::ParticleKind;
use crate::scene::{title_key, Input, Scene, EVENTS_SPARKLE, HERO_OVERLAY, SENATE_BAND, TRACK};
use crate::scroll::LayoutProbe;
use crate::tilt::{CardId, Rect};
use crate::track::TrackFrame;

struct Inner {
    probe: DomProbe,
    content: SiteContent,
    scene: RefCell<Scene<Timeout>>,
    /// One canvas per scene overlay, in the same order.
    surfaces: RefCell<Vec<Canvas2dSurface>>,
    frame: RefCell<Option<AnimationFrame>>,
    /// Filled by copy timers, drained by the next frame.
    expired: Rc<Cell<Option<CardId>>>,
    /// Scroll length the pinned track last stretched its section by.
    track_length: Cell<f64>,
}

/// The engine attached to a live page. Dropping it removes every listener,
/// cancels the frame loop and pending timers, and detaches the canvases.
pub struct Mount {
    inner: Rc<Inner>,
    listeners: Vec<EventListener>,
}

impl Mount {
    pub fn new(probe: DomProbe, config: EngineConfig, content: SiteContent) -> Result<Self> {
        render_content(probe.document(), &content)?;
        let mut scene = Scene::new(config, &content)?;
        scene.handle(Input::Resize { viewport: probe.viewport(), scroll_limit: probe.scroll_limit() }, probe.now());
        scene.handle(Input::Scrolled { offset: probe.scroll_y() }, probe.now());

        let first = scene.frame(probe.now(), &probe);
        for (i, chars) in first.titles.iter().enumerate() {
            if let Some(title) = probe.document().get_element_by_id(&title_key(i)) {
                split_title(probe.document(), &title, chars);
            }
        }

        let inner = Rc::new(Inner {
            probe,
            content,
            scene: RefCell::new(scene),
            surfaces: RefCell::new(Vec::new()),
            frame: RefCell::new(None),
            expired: Rc::new(Cell::new(None)),
            track_length: Cell::new(0.0),
        });
        inner.mount_overlays();

        let mut mount = Self { inner, listeners: Vec::new() };
        mount.install_listeners();
        Inner::schedule(&mount.inner);
        info!(
            overlays = mount.inner.surfaces.borrow().len(),
            listeners = mount.listeners.len(),
            "motion engine mounted"
        );
        Ok(mount)
    }

    fn install_listeners(&mut self) {
        let window = self.inner.probe.window().clone();
        let document = self.inner.probe.document().clone();

        let inner = Rc::clone(&self.inner);
        self.listeners.push(EventListener::new_with_options(
            &window,
            "wheel",
            EventListenerOptions { phase: EventListenerPhase::Bubble, passive: false },
            move |event: &Event| {
                let Some(event) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                event.prevent_default();
                inner.input(Input::Wheel { delta: event.delta_y() });
            },
        ));

        let inner = Rc::clone(&self.inner);
        self.listeners.push(EventListener::new(&window, "scroll", move |_| {
            inner.input(Input::Scrolled { offset: inner.probe.scroll_y() });
        }));

        let inner = Rc::clone(&self.inner);
        self.listeners.push(EventListener::new(&window, "resize", move |_| {
            let viewport = inner.probe.viewport();
            inner.input(Input::Resize { viewport, scroll_limit: inner.probe.scroll_limit() });
        }));

        // Images inside the track change its scroll width once decoded.
        let inner = Rc::clone(&self.inner);
        self.listeners.push(EventListener::new(&window, "load", move |_| {
            inner.input(Input::ContentResized { section: TRACK.to_owned() });
            inner.input(Input::Resize { viewport: inner.probe.viewport(), scroll_limit: inner.probe.scroll_limit() });
        }));

        for index in 0..self.inner.content.events.len() {
            let Some(title) = document.get_element_by_id(&title_key(index)) else {
                continue;
            };
            for (name, active) in [("mouseenter", true), ("mouseleave", false)] {
                let inner = Rc::clone(&self.inner);
                self.listeners.push(EventListener::new(&title, name, move |_| {
                    inner.input(Input::TitleHover { index, active });
                }));
            }
        }

        let cards: Vec<CardId> = self.inner.content.members.iter().map(|m| m.card_id()).collect();
        for card in cards {
            if let Some(el) = document.get_element_by_id(&format!("member-{}", card.0)) {
                let inner = Rc::clone(&self.inner);
                let target = el.clone();
                self.listeners.push(EventListener::new(&el, "mousemove", move |event: &Event| {
                    let Some(event) = event.dyn_ref::<MouseEvent>() else {
                        return;
                    };
                    let r = target.get_bounding_client_rect();
                    let rect = Rect { left: r.left(), top: r.top(), width: r.width(), height: r.height() };
                    let (x, y) = (event.client_x() as f64, event.client_y() as f64);
                    inner.input(Input::PointerMove { card, rect, x, y });
                }));
                let inner = Rc::clone(&self.inner);
                self.listeners.push(EventListener::new(&el, "mouseleave", move |_| {
                    inner.input(Input::PointerLeave { card });
                }));
            }

            if let Some(button) = document.get_element_by_id(&format!("copy-{}", card.0)) {
                let inner = Rc::clone(&self.inner);
                self.listeners.push(EventListener::new(&button, "click", move |_| {
                    spawn_local(Rc::clone(&inner).copy(card));
                }));
            }
        }
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.listeners.clear();
        self.inner.frame.borrow_mut().take();
        self.inner.scene.borrow_mut().handle(Input::DismissToast, 0.0);
        for surface in self.inner.surfaces.borrow_mut().drain(..) {
            surface.detach();
        }
        info!("motion engine torn down");
    }
}

impl Inner {
    fn input(&self, input: Input) {
        let now = self.probe.now();
        self.scene.borrow_mut().handle(input, now);
    }

    fn mount_overlays(&self) {
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        let mut seeds = Rng::with_seed(seed);
        let layers = [
            (HERO_OVERLAY, Some(ParticleKind::AmbientSnow)),
            (EVENTS_SPARKLE, Some(ParticleKind::AccentSparkle)),
            (SENATE_BAND, Some(ParticleKind::GroundDrift)),
            (SENATE_BAND, None),
        ];

        let mut scene = self.scene.borrow_mut();
        let mut surfaces = self.surfaces.borrow_mut();
        for (container, kind) in layers {
            let Some(host) = self.probe.document().get_element_by_id(container) else {
                debug!(container, "overlay host absent");
                continue;
            };
            let surface = match Canvas2dSurface::attach(self.probe.document(), &host) {
                Ok(surface) => surface,
                Err(err) => {
                    warn!(container, %err, "overlay disabled");
                    continue;
                }
            };
            let bounds = self.probe.container_size(container).unwrap_or_default();
            let rng = seeds.fork();
            let mounted = match kind {
                Some(kind) => scene.mount_particles(container, kind, bounds, rng),
                None => scene.mount_snow_bank(container, bounds, rng),
            };
            if mounted {
                surfaces.push(surface);
            } else {
                surface.detach();
            }
        }
    }

    fn schedule(inner: &Rc<Self>) {
        let next = Rc::clone(inner);
        let handle = request_animation_frame(move |timestamp| {
            next.frame.borrow_mut().take();
            next.tick(timestamp / 1000.0);
            Inner::schedule(&next);
        });
        *inner.frame.borrow_mut() = Some(handle);
    }

    fn tick(&self, now: f64) {
        let mut scene = self.scene.borrow_mut();
        if let Some(card) = self.expired.take() {
            scene.expire_copy(card);
        }

        let animating = scene.is_scrolling();
        let frame = scene.frame(now, &self.probe);
        if animating {
            self.probe.window().scroll_to_with_x_and_y(0.0, frame.scroll);
        }

        StyleWriter::new(self.probe.document()).apply(&frame, self.probe.viewport(), scene.config().focus);

        // Pinning stretches the track's section, which moves the scroll limit.
        let track_length = match frame.track {
            TrackFrame::Pinned { scroll_length, .. } => scroll_length,
            TrackFrame::Flow | TrackFrame::Pending => 0.0,
        };
        if track_length != self.track_length.replace(track_length) {
            scene.handle(Input::ScrollLimit { limit: self.probe.scroll_limit() }, now);
        }

        let scale = self.probe.window().device_pixel_ratio();
        let mut surfaces = self.surfaces.borrow_mut();
        for (overlay, surface) in scene.overlays().iter().zip(surfaces.iter_mut()) {
            surface.fit(overlay.bounds(), scale);
            overlay.render(surface);
        }
    }

    async fn copy(self: Rc<Self>, card: CardId) {
        let Some(member) = self.content.member(card) else {
            return;
        };
        let promise = self.probe.window().navigator().clipboard().write_text(&member.email);
        if let Err(err) = JsFuture::from(promise).await {
            debug!(?err, "clipboard write rejected");
            return;
        }
        let expired = Rc::clone(&self.expired);
        let mut scene = self.scene.borrow_mut();
        let millis = (scene.config().toast_window * 1000.0).round() as u32;
        let timer = Timeout::new(millis, move || expired.set(Some(card)));
        scene.acknowledge_copy(card, self.probe.now(), timer);
    }
}
