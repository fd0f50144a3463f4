// Browser binding for the gesture controller: touch listeners on the player
// wrapper, the feedback overlay, and fullscreen handling.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    AddEventListenerOptions, Document, Element, HtmlElement, HtmlMediaElement, HtmlVideoElement,
    TouchEvent, TouchList,
};
use yew::Callback;

use super::{Bounds, Effect, GestureController, LevelKind, Playback, Reaction, Surface, TouchInput};
use crate::config::GestureConfig;
use crate::state::{Point, Zone};

impl Playback for HtmlMediaElement {
    fn current_time(&self) -> f64 {
        HtmlMediaElement::current_time(self)
    }
    fn set_current_time(&mut self, secs: f64) {
        HtmlMediaElement::set_current_time(self, secs);
    }
    fn duration(&self) -> f64 {
        HtmlMediaElement::duration(self)
    }
    fn volume(&self) -> f64 {
        HtmlMediaElement::volume(self)
    }
    fn set_volume(&mut self, volume: f64) {
        HtmlMediaElement::set_volume(self, volume);
    }
    fn paused(&self) -> bool {
        HtmlMediaElement::paused(self)
    }
    fn play(&mut self) {
        // Autoplay rejections surface as a rejected promise; nothing to do.
        let _ = HtmlMediaElement::play(self);
    }
    fn pause(&mut self) {
        let _ = HtmlMediaElement::pause(self);
    }
}

/// Call a promise-returning DOM method by name. `Err` means the method is
/// missing or threw; a later rejection shows up when the future resolves.
fn call_promise(target: &JsValue, method: &str) -> Result<JsFuture, JsValue> {
    let func: Function = Reflect::get(target, &JsValue::from_str(method))?.dyn_into()?;
    let returned = func.call0(target)?;
    let promise = returned
        .dyn_into::<Promise>()
        .unwrap_or_else(|value| Promise::resolve(&value));
    Ok(JsFuture::from(promise))
}

/// Try `request` on each target in turn until one is accepted, whether the
/// refusal is immediate (`Err`) or arrives later through the future.
pub async fn first_accepted<T, R, E, Fut>(
    targets: &[T],
    mut request: impl FnMut(&T) -> Result<Fut, E>,
) -> bool
where
    Fut: Future<Output = Result<R, E>>,
{
    for target in targets {
        let Ok(pending) = request(target) else {
            continue;
        };
        if pending.await.is_ok() {
            return true;
        }
    }
    false
}

/// Exit fullscreen if active, otherwise enter it on the wrapper and fall back
/// to the video element. Failures are ignored.
pub fn toggle_fullscreen(document: &Document, wrapper: &Element, video: &Element) {
    if document.fullscreen_element().is_some() {
        if let Ok(exit) = call_promise(document, "exitFullscreen") {
            spawn_local(async move {
                let _ = exit.await;
            });
        }
        return;
    }
    let targets = [wrapper.clone(), video.clone()];
    spawn_local(async move {
        let request = |el: &Element| call_promise(el, "requestFullscreen");
        let entered = first_accepted(&targets, request).await;
        if !entered {
            log::debug!("fullscreen request refused");
        }
    });
}

fn has_touch_support() -> bool {
    web_sys::window()
        .map(|win| Reflect::has(&win, &JsValue::from_str("ontouchstart")).unwrap_or(false))
        .unwrap_or(false)
}

fn points(list: &TouchList) -> Vec<Point> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .map(|t| Point::new(t.client_x() as f64, t.client_y() as f64))
        .collect()
}

fn touch_input(e: &TouchEvent) -> TouchInput {
    TouchInput {
        touches: points(&e.touches()),
        changed: points(&e.changed_touches()),
        timestamp_ms: e.time_stamp(),
    }
}

fn div(document: &Document, class: &str) -> Result<Element, JsValue> {
    let el = document.create_element("div")?;
    el.set_class_name(class);
    Ok(el)
}

fn find(parent: &Element, selector: &str) -> Result<Element, JsValue> {
    parent
        .query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("overlay is missing {selector}")))
}

/// Feedback elements layered over the player.
struct Overlay {
    document: Document,
    wrapper: HtmlElement,
    root: Element,
    left: Element,
    right: Element,
    center: Element,
    center_icon: Element,
    level: Element,
    level_icon: Element,
    level_fill: HtmlElement,
    level_text: Element,
    seek: Element,
    seek_time: Element,
    seek_preview: Element,
    // Created on the first brightness swipe.
    dimmer: RefCell<Option<HtmlElement>>,
    flash_ms: i32,
}

impl Overlay {
    fn build(
        document: &Document,
        wrapper: &HtmlElement,
        config: &GestureConfig,
    ) -> Result<Self, JsValue> {
        let step = config.seek_step_secs;
        let root = div(document, "gesture-overlay")?;
        root.set_id("gesture-overlay");

        let left = div(document, "double-tap-feedback left")?;
        left.set_inner_html(&format!(
            concat!(
                r#"<div class="ripple"></div>"#,
                r#"<div class="icon">◀◀<span class="seek-text">{}s</span></div>"#,
            ),
            step
        ));
        let right = div(document, "double-tap-feedback right")?;
        right.set_inner_html(&format!(
            concat!(
                r#"<div class="ripple"></div>"#,
                r#"<div class="icon"><span class="seek-text">{}s</span>▶▶</div>"#,
            ),
            step
        ));
        let center = div(document, "double-tap-feedback center")?;
        center.set_inner_html(r#"<div class="icon play-pause-icon">⏸</div>"#);

        let level = div(document, "control-indicator")?;
        level.set_inner_html(concat!(
            r#"<div class="indicator-icon"></div>"#,
            r#"<div class="indicator-bar"><div class="indicator-fill"></div></div>"#,
            r#"<div class="indicator-text"></div>"#,
        ));
        let seek = div(document, "seek-indicator")?;
        seek.set_inner_html(r#"<div class="seek-time"></div><div class="seek-preview"></div>"#);

        for child in [&left, &right, &center, &level, &seek] {
            root.append_child(child)?;
        }
        wrapper.append_child(&root)?;

        Ok(Self {
            document: document.clone(),
            wrapper: wrapper.clone(),
            center_icon: find(&center, ".play-pause-icon")?,
            level_icon: find(&level, ".indicator-icon")?,
            level_fill: find(&level, ".indicator-fill")?.dyn_into::<HtmlElement>()?,
            level_text: find(&level, ".indicator-text")?,
            seek_time: find(&seek, ".seek-time")?,
            seek_preview: find(&seek, ".seek-preview")?,
            root,
            left,
            right,
            center,
            level,
            seek,
            dimmer: RefCell::new(None),
            flash_ms: config.flash_ms,
        })
    }

    fn flash(&self, zone: Zone, icon: Option<&str>) {
        let el = match zone {
            Zone::Left => &self.left,
            Zone::Right => &self.right,
            Zone::Center => &self.center,
        };
        if let Some(icon) = icon {
            self.center_icon.set_text_content(Some(icon));
        }
        let _ = el.class_list().add_1("active");
        let el = el.clone();
        let clear = Closure::once_into_js(move || {
            let _ = el.class_list().remove_1("active");
        });
        if let Some(win) = web_sys::window() {
            let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                clear.unchecked_ref(),
                self.flash_ms,
            );
        }
    }

    fn show_level(&self, kind: LevelKind, value: f64, icon: &str) {
        let class = match kind {
            LevelKind::Volume => "volume",
            LevelKind::Brightness => "brightness",
        };
        self.level
            .set_class_name(&format!("control-indicator active {class}"));
        self.level_icon.set_text_content(Some(icon));
        self.level_text
            .set_text_content(Some(&format!("{}%", (value * 100.0).round())));
        let _ = self
            .level_fill
            .style()
            .set_property("height", &format!("{}%", value * 100.0));
    }

    fn show_seek(&self, delta: &str, target: &str) {
        let _ = self.seek.class_list().add_1("active");
        self.seek_time.set_text_content(Some(delta));
        self.seek_preview.set_text_content(Some(target));
    }

    fn hide_indicators(&self) {
        let _ = self.level.class_list().remove_1("active");
        let _ = self.seek.class_list().remove_1("active");
    }

    fn darken(&self, opacity: f64) {
        let mut dimmer = self.dimmer.borrow_mut();
        if dimmer.is_none() {
            let created = div(&self.document, "brightness-filter")
                .and_then(|el| el.dyn_into::<HtmlElement>().map_err(JsValue::from))
                .and_then(|el| self.wrapper.append_child(&el).map(|_| el));
            match created {
                Ok(el) => *dimmer = Some(el),
                Err(e) => {
                    log::warn!("could not create brightness layer: {e:?}");
                    return;
                }
            }
        }
        if let Some(el) = dimmer.as_ref() {
            let _ = el.style().set_property("opacity", &opacity.to_string());
        }
    }

    fn remove(&self) {
        self.root.remove();
        if let Some(el) = self.dimmer.borrow_mut().take() {
            el.remove();
        }
    }
}

/// Everything one player's listeners share.
struct Binding {
    controller: RefCell<GestureController>,
    media: HtmlMediaElement,
    video: Element,
    overlay: Overlay,
    toast: Callback<String>,
}

impl Binding {
    fn surface(&self) -> Surface {
        let rect = self.overlay.wrapper.get_bounding_client_rect();
        Surface {
            bounds: Bounds {
                left: rect.left(),
                top: rect.top(),
                width: rect.width(),
                height: rect.height(),
            },
            fullscreen: self.overlay.document.fullscreen_element().is_some(),
        }
    }

    fn render(&self, reaction: &Reaction) {
        for effect in &reaction.effects {
            match effect {
                Effect::Toast(msg) => self.toast.emit(msg.clone()),
                Effect::Flash { zone, icon } => self.overlay.flash(*zone, *icon),
                Effect::ShowLevel { kind, value, icon } => {
                    self.overlay.show_level(*kind, *value, icon)
                }
                Effect::ShowSeek { delta, target } => self.overlay.show_seek(delta, target),
                Effect::HideIndicators => self.overlay.hide_indicators(),
                Effect::Darken(opacity) => self.overlay.darken(*opacity),
                Effect::EnterFullscreen | Effect::ExitFullscreen => toggle_fullscreen(
                    &self.overlay.document,
                    &self.overlay.wrapper,
                    &self.video,
                ),
            }
        }
    }
}

type TouchHandler = fn(&Binding, &TouchInput, &mut HtmlMediaElement) -> Reaction;

/// Live gesture listeners for one player. Dropping it removes the listeners
/// and the overlay.
pub struct GestureBinding {
    binding: Rc<Binding>,
    listeners: Vec<(&'static str, Closure<dyn FnMut(TouchEvent)>)>,
}

impl GestureBinding {
    /// Attach gestures to `wrapper` driving `video`.
    ///
    /// Returns `None`, leaving the page untouched, when the browser has no
    /// touch support or the overlay cannot be built.
    pub fn attach(
        wrapper: &HtmlElement,
        video: &HtmlVideoElement,
        config: GestureConfig,
        toast: Callback<String>,
    ) -> Option<Self> {
        if !has_touch_support() {
            log::debug!("no touch support; gestures disabled");
            return None;
        }
        let document = web_sys::window()?.document()?;
        let overlay = match Overlay::build(&document, wrapper, &config) {
            Ok(overlay) => overlay,
            Err(e) => {
                log::warn!("gesture overlay failed: {e:?}");
                return None;
            }
        };
        let binding = Rc::new(Binding {
            controller: RefCell::new(GestureController::new(config)),
            media: video.clone().into(),
            video: video.clone().into(),
            overlay,
            toast,
        });

        let handlers: [(&'static str, bool, TouchHandler); 4] = [
            ("touchstart", true, |b, input, media| {
                b.controller
                    .borrow_mut()
                    .touch_start(input, &b.surface(), &*media)
            }),
            // Not passive: locked swipes and pinches must stop scrolling.
            ("touchmove", false, |b, input, media| {
                b.controller.borrow_mut().touch_move(input, media)
            }),
            ("touchend", true, |b, input, media| {
                b.controller
                    .borrow_mut()
                    .touch_end(input, &b.surface(), media)
            }),
            ("touchcancel", true, |b, _, _| {
                b.controller.borrow_mut().touch_cancel()
            }),
        ];

        let mut listeners = Vec::with_capacity(handlers.len());
        for (name, passive, handler) in handlers {
            let b = binding.clone();
            let cb = Closure::wrap(Box::new(move |e: TouchEvent| {
                let input = touch_input(&e);
                let mut media = b.media.clone();
                let reaction = handler(&b, &input, &mut media);
                if reaction.prevent_default {
                    e.prevent_default();
                }
                b.render(&reaction);
            }) as Box<dyn FnMut(TouchEvent)>);
            let opts = AddEventListenerOptions::new();
            opts.set_passive(passive);
            if let Err(e) = wrapper.add_event_listener_with_callback_and_add_event_listener_options(
                name,
                cb.as_ref().unchecked_ref(),
                &opts,
            ) {
                log::warn!("could not listen for {name}: {e:?}");
            }
            listeners.push((name, cb));
        }

        log::info!("touch gestures attached");
        Some(Self { binding, listeners })
    }
}

impl Drop for GestureBinding {
    fn drop(&mut self) {
        let wrapper = &self.binding.overlay.wrapper;
        for (name, cb) in &self.listeners {
            let _ =
                wrapper.remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
        }
        self.binding.overlay.remove();
        log::debug!("touch gestures detached");
    }
}
