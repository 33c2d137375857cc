//! The whole page as one frame-driven state machine.
//!
//! Input events mutate state immediately; [`Scene::frame`] then advances
//! every filter in a fixed order (page scroll, section progress, pinned
//! track, reveals, toast, cards, overlays), so each frame reads the previous
//! frame's filtered state exactly once.

use fastrand::Rng;
use tracing::{debug, info};

use crate::clipboard::CopyToast;
use crate::config::{DeviceClass, EngineConfig};
use crate::content::{Section, SiteContent};
use crate::error::Result;
use crate::motion::{map_range, Keyframes};
use crate::particles::{ParticleField, ParticleKind, SnowBank};
use crate::reveal::{CharFrame, FadeFrame, FadeUp, KineticText, RevealMode};
use crate::scroll::{visible_fraction, LayoutProbe, ScrollMapper, ScrollRegion, SmoothScroll, Smoothing, Viewport};
use crate::surface::{Bounds, Surface};
use crate::tilt::{CardDeck, CardFrame, CardId, Rect};
use crate::track::{PinnedTrack, TrackFrame};

pub const HERO: &str = "hero";
pub const TIMELINE: &str = "events";
pub const TRACK: &str = "departments";
pub const HERO_OVERLAY: &str = "hero-snow";
pub const EVENTS_SPARKLE: &str = "events-sparkle";
pub const SENATE_BAND: &str = "senate-snow";

/// Section headings that reveal once on entering the viewport.
pub const HEADINGS: [(Section, &str); 3] =
    [(Section::Departments, "Our Departments"), (Section::Events, "Active Events"), (Section::Senate, "The Senate")];

/// Longest frame delta fed to the filters.
const MAX_FRAME: f64 = 0.1;
/// Fraction of an item that must be on screen before it reveals.
const REVEAL_AMOUNT: f64 = 0.05;

/// Discrete inputs, already translated out of DOM events.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Wheel { delta: f64 },
    /// Navigation to an anchor.
    ScrollTo { offset: f64, immediate: bool },
    /// The page scrolled by some other means (keyboard, scrollbar, anchor).
    Scrolled { offset: f64 },
    Resize { viewport: Viewport, scroll_limit: f64 },
    /// The document grew or shrank without the viewport changing.
    ScrollLimit { limit: f64 },
    /// Content inside a section changed size (e.g. images finished loading).
    ContentResized { section: String },
    PointerMove { card: CardId, rect: Rect, x: f64, y: f64 },
    PointerLeave { card: CardId },
    TitleHover { index: usize, active: bool },
    DismissToast,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroFrame {
    pub video_scale: f64,
    pub overlay_opacity: f64,
    pub morph_opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArticleFrame {
    pub opacity: f64,
    pub translate_y: f64,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFrame {
    pub now: f64,
    pub device: DeviceClass,
    pub scroll: f64,
    pub nav_condensed: bool,
    pub hero: HeroFrame,
    /// Height of the events timeline line, as a fraction.
    pub timeline: f64,
    pub track: TrackFrame,
    pub titles: Vec<Vec<CharFrame>>,
    pub reveals: Vec<(String, FadeFrame)>,
    pub articles: Vec<ArticleFrame>,
    pub cards: Vec<CardFrame>,
    pub copied: Option<CardId>,
}

/// Converts callback timestamps into bounded frame deltas.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    /// Returns seconds since the previous call, 0 on the first.
    pub fn advance(&mut self, now: f64) -> f64 {
        let dt = self.last.map_or(0.0, |last| (now - last).clamp(0.0, MAX_FRAME));
        self.last = Some(now);
        dt
    }
}

enum Effect {
    Particles(ParticleField),
    Bank(SnowBank),
}

/// A canvas-backed decorative layer and the element that hosts it.
pub struct Overlay {
    container: &'static str,
    effect: Effect,
}

impl Overlay {
    pub fn container(&self) -> &'static str {
        self.container
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        match &self.effect {
            Effect::Particles(field) => field.render(surface),
            Effect::Bank(bank) => bank.render(surface),
        }
    }

    pub fn bounds(&self) -> Bounds {
        match &self.effect {
            Effect::Particles(field) => field.bounds(),
            Effect::Bank(bank) => bank.bounds(),
        }
    }

    fn resize(&mut self, bounds: Bounds) {
        match &mut self.effect {
            Effect::Particles(field) => field.resize(bounds),
            Effect::Bank(bank) => bank.resize(bounds),
        }
    }

    fn tick(&mut self, dt: f64) {
        match &mut self.effect {
            Effect::Particles(field) => field.tick(dt),
            Effect::Bank(bank) => bank.tick(dt),
        }
    }
}

impl std::fmt::Debug for Overlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.effect {
            Effect::Particles(field) => format!("{:?}", field.kind()),
            Effect::Bank(bank) => format!("SnowBank({})", bank.mounds().len()),
        };
        f.debug_struct("Overlay").field("container", &self.container).field("effect", &kind).finish()
    }
}

#[derive(Debug)]
struct Title {
    text: KineticText,
    /// Layout key for in-view titles; hover titles have none.
    in_view: Option<String>,
}

#[derive(Debug)]
pub struct Scene<H = ()> {
    config: EngineConfig,
    clock: FrameClock,
    smooth: SmoothScroll,
    regions: ScrollMapper,
    hero_scale: Keyframes,
    hero_overlay: Keyframes,
    hero_morph: Keyframes,
    track: PinnedTrack,
    titles: Vec<Title>,
    reveals: Vec<(String, FadeUp)>,
    articles: Vec<String>,
    deck: CardDeck,
    toast: CopyToast<H>,
    overlays: Vec<Overlay>,
}

impl<H> Scene<H> {
    pub fn new(config: EngineConfig, content: &SiteContent) -> Result<Self> {
        config.validate()?;

        let mut regions = ScrollMapper::new();
        regions.insert(HERO, ScrollRegion::parse("start start", "end end", Smoothing::Spring(config.spring))?);
        regions.insert(
            TIMELINE,
            ScrollRegion::parse("top 20%", "bottom 80%", Smoothing::Lag { seconds: config.scroll.timeline_lag })?,
        );
        let articles: Vec<String> =
            (0..content.items(Section::Articles).len()).map(|i| item_key(Section::Articles, i)).collect();
        for key in &articles {
            regions.insert(key.clone(), ScrollRegion::parse("top bottom", "top 80%", Smoothing::Lag { seconds: 1.0 })?);
        }

        let mut titles: Vec<Title> = content
            .items(Section::Events)
            .iter()
            .map(|e| Title { text: KineticText::new(&e.title, RevealMode::Reversible, config.text), in_view: None })
            .collect();
        for (section, heading) in HEADINGS {
            titles.push(Title {
                text: KineticText::new(heading, RevealMode::Once, config.text),
                in_view: Some(format!("{}-heading", section.anchor())),
            });
        }

        let mut reveals = Vec::new();
        for (section, mode) in
            [(Section::Goals, RevealMode::Reversible), (Section::Departments, RevealMode::Once), (Section::Events, RevealMode::Once)]
        {
            for i in 0..content.items(section).len() {
                reveals.push((item_key(section, i), FadeUp::new(i, mode, config.fade_up)));
            }
        }

        let deck = CardDeck::new(content.members.iter().map(|m| m.card_id()), config.tilt, config.focus);
        let scroll = SmoothScroll::new(config.scroll.smooth_duration, 0.0);

        debug!(regions = regions.len(), titles = titles.len(), reveals = reveals.len(), "scene assembled");
        Ok(Self {
            smooth: scroll,
            regions,
            hero_scale: keyframes([(0.0, 1.0), (0.8, 2.5)]),
            hero_overlay: keyframes([(0.4, 0.0), (0.8, 0.8)]),
            hero_morph: keyframes([(0.8, 0.0), (1.0, 1.0)]),
            track: PinnedTrack::new(config.track)?,
            titles,
            reveals,
            articles,
            deck,
            toast: CopyToast::new(config.toast_window),
            overlays: Vec::new(),
            clock: FrameClock::default(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn deck(&self) -> &CardDeck {
        &self.deck
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn scroll_position(&self) -> f64 {
        self.smooth.position()
    }

    pub fn is_scrolling(&self) -> bool {
        self.smooth.is_animating()
    }

    /// Starts a particle layer inside `container`. A container that has not
    /// been laid out yet (zero size) leaves the layer off.
    pub fn mount_particles(&mut self, container: &'static str, kind: ParticleKind, bounds: Bounds, rng: Rng) -> bool {
        let preset = self.config.particles.get(kind);
        match ParticleField::initialize(kind, preset, bounds, rng) {
            Some(field) => {
                self.overlays.push(Overlay { container, effect: Effect::Particles(field) });
                true
            }
            None => false,
        }
    }

    pub fn mount_snow_bank(&mut self, container: &'static str, bounds: Bounds, rng: Rng) -> bool {
        match SnowBank::new(self.config.snow_bank, bounds, rng) {
            Some(bank) => {
                self.overlays.push(Overlay { container, effect: Effect::Bank(bank) });
                true
            }
            None => false,
        }
    }

    /// Applies one input. `now` is the clock time in seconds.
    pub fn handle(&mut self, input: Input, now: f64) {
        match input {
            Input::Wheel { delta } => self.smooth.on_wheel(delta * self.config.scroll.wheel_multiplier),
            Input::ScrollTo { offset, immediate } => self.smooth.scroll_to(offset, immediate),
            Input::Scrolled { offset } => {
                if !self.smooth.is_animating() {
                    self.smooth.sync(offset);
                }
            }
            Input::Resize { viewport, scroll_limit } => {
                info!(width = viewport.width, height = viewport.height, "viewport resized");
                self.smooth.set_limit(scroll_limit);
                self.regions.invalidate_all();
                self.track.on_resize(viewport);
            }
            Input::ScrollLimit { limit } => self.smooth.set_limit(limit),
            Input::ContentResized { section } => {
                debug!(%section, "section content resized");
                self.regions.invalidate_all();
                if section == TRACK {
                    self.track.invalidate();
                }
            }
            Input::PointerMove { card, rect, x, y } => self.deck.pointer_move(card, rect, x, y, now),
            Input::PointerLeave { card } => self.deck.pointer_leave(card, now),
            Input::TitleHover { index, active } => {
                if let Some(title) = self.titles.get_mut(index).filter(|t| t.in_view.is_none()) {
                    title.text.set_active(active, now);
                }
            }
            Input::DismissToast => self.toast.dismiss(),
        }
    }

    /// Shows the copy acknowledgement on `card`. `timer` ends it early when
    /// dropped, so replacing an acknowledgement cancels the previous timer.
    pub fn acknowledge_copy(&mut self, card: CardId, now: f64, timer: H) {
        self.toast.acknowledge(card, now, timer);
    }

    /// Ends the acknowledgement on `card` if it is still showing.
    pub fn expire_copy(&mut self, card: CardId) {
        self.toast.dismiss_card(card);
    }

    /// Advances every component to `now` and returns what to draw.
    pub fn frame(&mut self, now: f64, probe: &dyn LayoutProbe) -> SceneFrame {
        let dt = self.clock.advance(now);
        let viewport = probe.viewport();

        let scroll = self.smooth.tick(dt);

        self.regions.update(scroll, dt, probe);
        let hero_progress = self.regions.progress(HERO).unwrap_or(0.0);
        let hero = HeroFrame {
            video_scale: self.hero_scale.sample(hero_progress),
            overlay_opacity: self.hero_overlay.sample(hero_progress),
            morph_opacity: self.hero_morph.sample(hero_progress),
        };
        let timeline = self.regions.progress(TIMELINE).unwrap_or(0.0);
        let articles = self
            .articles
            .iter()
            .map(|key| {
                let p = self.regions.progress(key).unwrap_or(0.0);
                ArticleFrame { opacity: p, translate_y: map_range(p, (0.0, 1.0), (50.0, 0.0)) }
            })
            .collect();

        let track = self.track.update(scroll, dt, TRACK, probe);

        let in_view = |key: &str| {
            probe.layout(key).is_some_and(|layout| visible_fraction(layout, scroll, viewport) > REVEAL_AMOUNT)
        };
        for title in &mut self.titles {
            if let Some(key) = &title.in_view {
                if in_view(key.as_str()) {
                    title.text.set_active(true, now);
                }
            }
        }
        for (key, reveal) in &mut self.reveals {
            reveal.set_in_view(in_view(key.as_str()), now);
        }

        self.toast.expire(now);

        let cards = self.deck.frames(now);

        for overlay in &mut self.overlays {
            if let Some(bounds) = probe.container_size(overlay.container) {
                overlay.resize(bounds);
            }
            overlay.tick(dt);
        }

        SceneFrame {
            now,
            device: self.config.device_class(viewport.width),
            scroll,
            nav_condensed: scroll > self.config.scroll.nav_threshold,
            hero,
            timeline,
            track,
            titles: self.titles.iter().map(|t| t.text.sample(now)).collect(),
            reveals: self.reveals.iter().map(|(key, r)| (key.clone(), r.sample(now))).collect(),
            articles,
            cards,
            copied: self.toast.copied(),
        }
    }
}

/// Element id of the `index`th kinetic title. Hover titles (one per event)
/// come first, then one per entry of [`HEADINGS`].
pub fn title_key(index: usize) -> String {
    format!("title-{index}")
}

/// Layout key of the `index`th item in `section`, e.g. `departments-2`.
pub fn item_key(section: Section, index: usize) -> String {
    format!("{}-{index}", section.anchor())
}

fn keyframes<const N: usize>(stops: [(f64, f64); N]) -> Keyframes {
    Keyframes::new(stops).unwrap_or_else(|| unreachable!("static keyframes are ascending"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::RegionLayout;
    use crate::track::stage_key;
    use std::cell::Cell;
    use std::collections::HashMap;

    struct Page {
        viewport: Viewport,
        layouts: HashMap<String, RegionLayout>,
        container: Cell<Bounds>,
        track_width: Cell<f64>,
    }

    impl Page {
        fn new() -> Self {
            let mut layouts = HashMap::new();
            layouts.insert(HERO.to_owned(), RegionLayout { top: 0.0, height: 3000.0 });
            layouts.insert(TIMELINE.to_owned(), RegionLayout { top: 6000.0, height: 1600.0 });
            layouts.insert(item_key(Section::Departments, 0), RegionLayout { top: 4000.0, height: 400.0 });
            layouts.insert("departments-heading".to_owned(), RegionLayout { top: 3900.0, height: 80.0 });
            layouts.insert(stage_key(TRACK), RegionLayout { top: 3000.0, height: 800.0 });
            Self {
                viewport: Viewport { width: 1280.0, height: 800.0 },
                layouts,
                container: Cell::new(Bounds::new(1280.0, 800.0)),
                track_width: Cell::new(3000.0),
            }
        }
    }

    impl LayoutProbe for Page {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn layout(&self, section: &str) -> Option<RegionLayout> {
            self.layouts.get(section).copied()
        }

        fn track_width(&self, _section: &str) -> f64 {
            self.track_width.get()
        }

        fn container_size(&self, _section: &str) -> Option<Bounds> {
            Some(self.container.get())
        }
    }

    fn scene() -> Scene {
        let content = SiteContent::embedded().unwrap();
        let mut scene = Scene::new(EngineConfig::default(), &content).unwrap();
        let viewport = Viewport { width: 1280.0, height: 800.0 };
        scene.handle(Input::Resize { viewport, scroll_limit: 20_000.0 }, 0.0);
        scene
    }

    #[test]
    fn frame_clock_bounds_long_gaps() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance(10.0), 0.0);
        assert!((clock.advance(10.016) - 0.016).abs() < 1e-9);
        assert_eq!(clock.advance(30.0), MAX_FRAME);
        assert_eq!(clock.advance(29.0), 0.0);
    }

    #[test]
    fn hero_starts_at_first_keyframe() {
        let page = Page::new();
        let mut scene = scene();
        let frame = scene.frame(0.0, &page);
        assert_eq!(frame.hero.video_scale, 1.0);
        assert_eq!(frame.hero.overlay_opacity, 0.0);
        assert_eq!(frame.hero.morph_opacity, 0.0);
        assert_eq!(frame.device, DeviceClass::Desktop);
        assert!(!frame.nav_condensed);
    }

    #[test]
    fn hero_springs_to_last_keyframe() {
        let page = Page::new();
        let mut scene = scene();
        scene.frame(0.0, &page);
        scene.handle(Input::Scrolled { offset: 2200.0 }, 0.0);

        let first = scene.frame(1.0 / 60.0, &page);
        assert!(first.hero.video_scale > 1.0 && first.hero.video_scale < 2.5);
        assert!(first.nav_condensed);

        let mut frame = first;
        for i in 2..=300 {
            frame = scene.frame(i as f64 / 60.0, &page);
        }
        assert_eq!(frame.hero.video_scale, 2.5);
        assert_eq!(frame.hero.overlay_opacity, 0.8);
        assert_eq!(frame.hero.morph_opacity, 1.0);
    }

    #[test]
    fn scroll_limit_follows_document_growth() {
        let page = Page::new();
        let mut scene = scene();
        let viewport = page.viewport;
        scene.handle(Input::Resize { viewport, scroll_limit: 1000.0 }, 0.0);

        scene.handle(Input::Scrolled { offset: 3000.0 }, 0.0);
        assert_eq!(scene.frame(0.0, &page).scroll, 3000.0);

        scene.handle(Input::ScrollLimit { limit: 9000.0 }, 0.0);
        scene.handle(Input::Wheel { delta: 5000.0 }, 0.0);
        let mut now = 0.0;
        while scene.is_scrolling() {
            now += 0.05;
            scene.frame(now, &page);
        }
        assert_eq!(scene.scroll_position(), 8000.0);
    }

    #[test]
    fn content_resize_remeasures_track() {
        let page = Page::new();
        let mut scene = scene();
        let start = 3000.0 - 0.2 * page.viewport.height;
        scene.handle(Input::ScrollTo { offset: start + 1500.0, immediate: true }, 0.0);

        let translate = |frame: SceneFrame| match frame.track {
            TrackFrame::Pinned { translate_x, scroll_length, .. } => (translate_x, scroll_length),
            other => panic!("expected a pinned track, got {other:?}"),
        };
        assert_eq!(translate(scene.frame(0.0, &page)), (-860.0, 3000.0));

        page.track_width.set(4000.0);
        assert_eq!(translate(scene.frame(0.016, &page)), (-860.0, 3000.0));

        scene.handle(Input::ContentResized { section: TRACK.to_owned() }, 0.016);
        assert_eq!(translate(scene.frame(0.032, &page)), (-700.0, 4000.0));
    }

    #[test]
    fn wheel_scroll_eases_and_settles() {
        let page = Page::new();
        let mut scene = scene();
        scene.frame(0.0, &page);
        scene.handle(Input::Wheel { delta: 600.0 }, 0.0);
        let early = scene.frame(0.05, &page).scroll;
        assert!(early > 0.0 && early < 600.0);
        let mut now = 0.05;
        while scene.is_scrolling() {
            now += 0.05;
            scene.frame(now, &page);
        }
        assert_eq!(scene.scroll_position(), 600.0);
    }

    #[test]
    fn external_scroll_is_ignored_while_animating() {
        let page = Page::new();
        let mut scene = scene();
        scene.frame(0.0, &page);
        scene.handle(Input::ScrollTo { offset: 4000.0, immediate: false }, 0.0);
        scene.frame(0.05, &page);
        let position = scene.scroll_position();
        scene.handle(Input::Scrolled { offset: 10.0 }, 0.05);
        assert_eq!(scene.scroll_position(), position);
    }

    #[test]
    fn department_reveal_latches_once_seen() {
        let page = Page::new();
        let mut scene = scene();
        let key = item_key(Section::Departments, 0);
        let opacity = |frame: &SceneFrame| frame.reveals.iter().find(|(k, _)| *k == key).map(|(_, f)| f.opacity);

        assert_eq!(opacity(&scene.frame(0.0, &page)), Some(0.0));
        scene.handle(Input::ScrollTo { offset: 3800.0, immediate: true }, 0.0);
        scene.frame(0.1, &page);
        assert_eq!(opacity(&scene.frame(5.0, &page)), Some(1.0));

        scene.handle(Input::ScrollTo { offset: 0.0, immediate: true }, 5.0);
        scene.frame(5.1, &page);
        assert_eq!(opacity(&scene.frame(10.0, &page)), Some(1.0));
    }

    #[test]
    fn only_hover_titles_follow_pointer() {
        let content = SiteContent::embedded().unwrap();
        let page = Page::new();
        let mut scene = scene();
        let headings = content.events.len();

        scene.handle(Input::TitleHover { index: 0, active: true }, 0.0);
        scene.handle(Input::TitleHover { index: headings, active: true }, 0.0);
        let frame = scene.frame(0.4, &page);
        assert!(frame.titles[0][0].primary_y < 0.0);
        assert_eq!(frame.titles[headings][0].primary_y, 0.0);
    }

    #[test]
    fn overlays_follow_container_size() {
        let page = Page::new();
        let mut scene = scene();
        assert!(scene.mount_particles(HERO_OVERLAY, ParticleKind::AmbientSnow, page.container.get(), Rng::with_seed(7)));
        assert!(!scene.mount_snow_bank(SENATE_BAND, Bounds::new(0.0, 0.0), Rng::with_seed(7)));
        scene.frame(0.0, &page);

        page.container.set(Bounds::new(640.0, 480.0));
        scene.frame(0.016, &page);
        assert_eq!(scene.overlays().len(), 1);
        assert_eq!(scene.overlays()[0].bounds(), Bounds::new(640.0, 480.0));
    }

    #[test]
    fn copy_acknowledgement_expires_on_frame() {
        let page = Page::new();
        let mut scene = scene();
        scene.acknowledge_copy(CardId(3), 1.0, ());
        assert_eq!(scene.frame(2.0, &page).copied, Some(CardId(3)));
        assert_eq!(scene.frame(3.5, &page).copied, None);
    }

    #[test]
    fn late_expiry_keeps_newer_acknowledgement() {
        let mut scene = scene();
        scene.acknowledge_copy(CardId(1), 0.0, ());
        scene.acknowledge_copy(CardId(2), 0.5, ());
        scene.expire_copy(CardId(1));
        let page = Page::new();
        assert_eq!(scene.frame(1.0, &page).copied, Some(CardId(2)));
    }
}
