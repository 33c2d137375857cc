use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::content::{ContentItem, Section, SiteContent, Tier};
use crate::error::{MotionError, Result};
use crate::reveal::CharFrame;
use crate::scene::{item_key, title_key, SceneFrame, HEADINGS, TRACK};
use crate::scroll::{LayoutProbe, RegionLayout, Viewport};
use crate::surface::Bounds;
use crate::tilt::FocusStyle;
use crate::track::{PinState, TrackFrame};

/// Reads layout straight from the live document. Every section, item and
/// overlay host is looked up by element id.
pub struct DomProbe {
    window: Window,
    document: Document,
}

impl DomProbe {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    /// Largest scroll offset the document allows.
    pub fn scroll_limit(&self) -> f64 {
        let height = self.document.document_element().map_or(0.0, |root| root.scroll_height() as f64);
        (height - self.viewport().height).max(0.0)
    }

    pub fn now(&self) -> f64 {
        self.window.performance().map_or(0.0, |p| p.now()) / 1000.0
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }
}

impl LayoutProbe for DomProbe {
    fn viewport(&self) -> Viewport {
        let dimension = |v: Result<wasm_bindgen::JsValue, _>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport { width: dimension(self.window.inner_width()), height: dimension(self.window.inner_height()) }
    }

    fn layout(&self, section: &str) -> Option<RegionLayout> {
        let rect = self.element(section)?.get_bounding_client_rect();
        if rect.width() == 0.0 && rect.height() == 0.0 {
            return None;
        }
        Some(RegionLayout { top: rect.top() + self.scroll_y(), height: rect.height() })
    }

    fn track_width(&self, section: &str) -> f64 {
        self.element(&format!("{section}-track")).map_or(0.0, |track| track.scroll_width() as f64)
    }

    fn container_size(&self, section: &str) -> Option<Bounds> {
        let host = self.element(section)?;
        Some(Bounds::new(host.client_width() as f64, host.client_height() as f64))
    }
}

/// Writes a frame into element styles. Elements that are absent are skipped.
pub struct StyleWriter<'a> {
    document: &'a Document,
}

impl<'a> StyleWriter<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn apply(&self, frame: &SceneFrame, viewport: Viewport, focus: FocusStyle) {
        if let Some(body) = self.document.body() {
            let _ = body.set_attribute("data-device", frame.device.as_str());
        }
        if let Some(nav) = self.document.get_element_by_id("navbar") {
            let _ = nav.set_attribute("data-condensed", if frame.nav_condensed { "true" } else { "false" });
        }

        self.set("hero-video", "transform", &format!("scale({})", frame.hero.video_scale));
        self.set("hero-overlay", "opacity", &frame.hero.overlay_opacity.to_string());
        self.set("hero-morph", "opacity", &frame.hero.morph_opacity.to_string());
        self.set("events-line", "height", &format!("{}%", frame.timeline * 100.0));

        self.apply_track(frame.track, viewport);

        for (i, chars) in frame.titles.iter().enumerate() {
            self.apply_title(&title_key(i), chars);
        }

        for (key, fade) in &frame.reveals {
            self.set(key, "opacity", &fade.opacity.to_string());
            self.set(key, "transform", &format!("translateY({}px)", fade.translate_y));
            self.set(key, "filter", &format!("blur({}px)", fade.blur));
        }

        for (i, article) in frame.articles.iter().enumerate() {
            let key = item_key(Section::Articles, i);
            self.set(&key, "opacity", &article.opacity.to_string());
            self.set(&key, "transform", &format!("translateY({}px)", article.translate_y));
        }

        for card in &frame.cards {
            let id = format!("member-{}", card.id.0);
            self.set(&id, "transform", &card.tilt.css());
            if focus.enabled && card.dimmed {
                self.set(&id, "filter", &format!("blur({}px)", focus.blur));
                self.set(&id, "opacity", &focus.opacity.to_string());
            } else {
                self.set(&id, "filter", "none");
                self.set(&id, "opacity", "1");
            }
            if let Some(button) = self.document.get_element_by_id(&format!("copy-{}", card.id.0)) {
                let copied = frame.copied == Some(card.id);
                let _ = button.set_attribute("data-copied", if copied { "true" } else { "false" });
            }
        }
    }

    fn apply_track(&self, track: TrackFrame, viewport: Viewport) {
        let pin = format!("{TRACK}-pin");
        let rail = format!("{TRACK}-track");
        match track {
            TrackFrame::Flow | TrackFrame::Pending => {
                self.set(&rail, "transform", "none");
                self.set(&pin, "position", "relative");
                self.set(&pin, "top", "0");
                self.set(TRACK, "height", "auto");
            }
            TrackFrame::Pinned { translate_x, pin: state, pin_top, scroll_length, .. } => {
                self.set(&rail, "transform", &format!("translate3d({translate_x}px, 0, 0)"));
                self.set(TRACK, "height", &format!("{}px", scroll_length + viewport.height));
                let (position, top) = match state {
                    PinState::Before => ("relative", "0px".to_owned()),
                    PinState::Pinned => ("fixed", format!("{pin_top}px")),
                    PinState::After => ("relative", format!("{scroll_length}px")),
                };
                self.set(&pin, "position", position);
                self.set(&pin, "top", &top);
            }
        }
    }

    /// Each glyph is a wrapper holding the primary span then its clone.
    fn apply_title(&self, id: &str, chars: &[CharFrame]) {
        let Some(title) = self.document.get_element_by_id(id) else {
            return;
        };
        let wrappers = title.children();
        for (i, frame) in chars.iter().enumerate() {
            let Some(wrapper) = wrappers.item(i as u32) else {
                break;
            };
            let glyphs = wrapper.children();
            for (slot, y) in [(0, frame.primary_y), (1, frame.clone_y)] {
                if let Some(glyph) = glyphs.item(slot).and_then(|e| e.dyn_into::<HtmlElement>().ok()) {
                    let _ = glyph.style().set_property("transform", &format!("translateY({y}%)"));
                }
            }
        }
    }

    fn set(&self, id: &str, property: &str, value: &str) {
        if let Some(el) = self.document.get_element_by_id(id).and_then(|e| e.dyn_into::<HtmlElement>().ok()) {
            let _ = el.style().set_property(property, value);
        }
    }
}

/// Splits a title's text into per-glyph wrappers, each holding the glyph and
/// its clone.
pub fn split_title(document: &Document, title: &Element, chars: &[CharFrame]) {
    title.set_text_content(None);
    for frame in chars {
        let Ok(wrapper) = document.create_element("span") else {
            return;
        };
        let _ = wrapper.set_attribute("class", "char");
        for class in ["char-primary", "char-clone"] {
            if let Ok(glyph) = document.create_element("span") {
                let _ = glyph.set_attribute("class", class);
                glyph.set_text_content(Some(&frame.glyph.to_string()));
                let _ = wrapper.append_child(&glyph);
            }
        }
        let _ = title.append_child(&wrapper);
    }
}

/// Element id of the list that holds a section's items.
pub fn container_key(section: Section) -> String {
    match section {
        Section::Departments => format!("{TRACK}-track"),
        Section::Senate => "senate-members".to_owned(),
        _ => format!("{}-items", section.anchor()),
    }
}

/// Fills every section's item list from `content` and tags the headings with
/// their kinetic title ids. Lists missing from the page are skipped.
pub fn render_content(document: &Document, content: &SiteContent) -> Result<()> {
    for section in Section::ALL {
        let Some(list) = document.get_element_by_id(&container_key(section)) else {
            continue;
        };
        list.set_text_content(None);

        if section == Section::Senate {
            for tier in [Tier::Top, Tier::General] {
                for member in content.tier(tier) {
                    let card = member.card_id();
                    let el = child(document, &list, "article", "member-card")?;
                    el.set_id(&format!("member-{}", card.0));
                    let _ = el.set_attribute("data-tier", if tier == Tier::Top { "top" } else { "general" });
                    image(document, &el, &member.img, &member.name)?;
                    child(document, &el, "h3", "member-name")?.set_text_content(Some(&member.name));
                    child(document, &el, "p", "member-role")?.set_text_content(Some(&member.role));
                    let button = child(document, &el, "button", "member-copy")?;
                    button.set_id(&format!("copy-{}", card.0));
                    button.set_text_content(Some("Copy email"));
                }
            }
            continue;
        }

        for (i, item) in content.items(section).iter().enumerate() {
            let el = child(document, &list, "article", "item")?;
            el.set_id(&item_key(section, i));
            item_body(document, &el, item, (section == Section::Events).then(|| title_key(i)))?;
        }
    }

    let hover_titles = content.events.len();
    for (k, (section, text)) in HEADINGS.iter().enumerate() {
        if let Some(heading) = document.get_element_by_id(&format!("{}-heading", section.anchor())) {
            heading.set_text_content(None);
            let span = child(document, &heading, "span", "kinetic")?;
            span.set_id(&title_key(hover_titles + k));
            span.set_text_content(Some(text));
        }
    }
    Ok(())
}

fn item_body(document: &Document, el: &Element, item: &ContentItem, title_id: Option<String>) -> Result<()> {
    if let Some(src) = &item.image {
        image(document, el, src, &item.title)?;
    }
    if let Some(accent) = &item.accent {
        child(document, el, "span", "item-accent")?.set_text_content(Some(accent));
    }
    let title = child(document, el, "h3", "item-title")?;
    if let Some(id) = title_id {
        title.set_id(&id);
    }
    title.set_text_content(Some(&item.title));
    child(document, el, "p", "item-body")?.set_text_content(Some(&item.body));
    if let Some(link) = &item.link {
        let a = child(document, el, "a", "item-link")?;
        let _ = a.set_attribute("href", link);
        let _ = a.set_attribute("target", "_blank");
        let _ = a.set_attribute("rel", "noopener");
        a.set_text_content(Some("Open"));
    }
    Ok(())
}

fn image(document: &Document, parent: &Element, src: &str, alt: &str) -> Result<()> {
    let img = child(document, parent, "img", "item-image")?;
    let _ = img.set_attribute("src", src);
    let _ = img.set_attribute("alt", alt);
    let _ = img.set_attribute("loading", "lazy");
    Ok(())
}

fn child(document: &Document, parent: &Element, tag: &str, class: &str) -> Result<Element> {
    let el = document.create_element(tag).map_err(|_| MotionError::Missing(format!("<{tag}> element").into()))?;
    el.set_class_name(class);
    parent.append_child(&el).map_err(|_| MotionError::Missing(format!("parent for <{tag}>").into()))?;
    Ok(el)
}
