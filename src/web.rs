//! Browser document backend and page wiring (feature `web`).

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Comment, Document, Element, HtmlAudioElement, HtmlElement, Node, Text, Window};

use crate::config::{ClassNames, LayoutConfig, TypingConfig};
use crate::error::{TypingError, TypingResult};
use crate::markup::Namespace;
use crate::responsive::{Layout, ResponsiveSwap};
use crate::sequence::{CancellationToken, Sequence, TypingHost};
use crate::skeleton::{Skeleton, SkeletonNode};
use crate::target::CaptureRecord;
use crate::toggle::{ToggleGate, ToggleSection};
use crate::CaretPlacement;

fn dom_error(context: &'static str) -> impl Fn(JsValue) -> TypingError {
    move |err| TypingError::Dom(format!("{}: {:?}", context, err))
}

fn window() -> TypingResult<Window> {
    web_sys::window().ok_or_else(|| TypingError::Dom("no window available".into()))
}

fn document(window: &Window) -> TypingResult<Document> {
    window
        .document()
        .ok_or_else(|| TypingError::Dom("no document available".into()))
}

fn query_all(document: &Document, selector: &str) -> TypingResult<Vec<HtmlElement>> {
    let list = document
        .query_selector_all(selector)
        .map_err(dom_error("querying elements"))?;
    Ok((0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

/// Resolve a promise whose executor schedules `resolve`, falling back to
/// resolving immediately when scheduling fails.
async fn scheduled(schedule: impl FnOnce(&js_sys::Function) -> Result<i32, JsValue>) {
    let mut schedule = Some(schedule);
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        let scheduled = schedule.take().map(|f| f(&resolve).is_ok()).unwrap_or(false);
        if !scheduled {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

/// Install `console_log` as the `log` backend.
pub fn init_logging(level: log::Level) {
    let _ = console_log::init_with_level(level);
}

/// [`TypingHost`] over a live browser document.
///
/// Only one target is revealed at a time, so the host keeps a single set
/// of output text nodes and a single caret.
pub struct DomHost {
    window: Window,
    document: Document,
    classes: ClassNames,
    slots: RefCell<Vec<Text>>,
    caret: RefCell<Option<HtmlElement>>,
}

impl DomHost {
    pub fn new(classes: ClassNames) -> TypingResult<Self> {
        let window = window()?;
        let document = document(&window)?;
        Ok(Self {
            window,
            document,
            classes,
            slots: RefCell::new(Vec::new()),
            caret: RefCell::new(None),
        })
    }

    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Elements matching the target selector, in document order.
    pub fn targets(&self) -> TypingResult<Vec<HtmlElement>> {
        query_all(&self.document, &self.classes.target_selector)
    }

    fn build(&self, nodes: &[SkeletonNode], parent: &Node, slots: &mut Vec<Text>) -> TypingResult<()> {
        for node in nodes {
            match node {
                SkeletonNode::Slot(_) => {
                    let text = self.document.create_text_node("");
                    parent
                        .append_child(&text)
                        .map_err(dom_error("appending text slot"))?;
                    slots.push(text);
                }
                SkeletonNode::Element {
                    tag,
                    namespace,
                    attributes,
                    children,
                } => {
                    let element = match namespace {
                        Namespace::Html => self.document.create_element(tag),
                        foreign => self.document.create_element_ns(Some(foreign.uri()), tag),
                    }
                    .map_err(dom_error("creating element"))?;
                    for (name, value) in attributes {
                        element
                            .set_attribute(name, value)
                            .map_err(dom_error("copying attribute"))?;
                    }
                    parent
                        .append_child(&element)
                        .map_err(dom_error("appending element"))?;
                    self.build(children, &element, slots)?;
                }
            }
        }
        Ok(())
    }

    fn new_caret(&self) -> TypingResult<HtmlElement> {
        let caret = self
            .document
            .create_element("span")
            .map_err(dom_error("creating caret"))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| TypingError::Dom("caret is not an HtmlElement".into()))?;
        caret.set_class_name(&self.classes.caret);
        let _ = caret.style().set_property("display", "none");
        Ok(caret)
    }

    fn clear_live_state(&self) {
        if let Some(caret) = self.caret.borrow_mut().take() {
            caret.remove();
        }
        self.slots.borrow_mut().clear();
    }
}

impl TypingHost for DomHost {
    type Target = HtmlElement;

    fn capture(&self, target: &HtmlElement) -> TypingResult<CaptureRecord> {
        let display = match self
            .window
            .get_computed_style(target)
            .map_err(dom_error("reading computed style"))?
        {
            Some(style) => style
                .get_property_value("display")
                .map_err(dom_error("reading display"))?,
            None => String::new(),
        };
        Ok(CaptureRecord::new(target.inner_html(), display))
    }

    fn show_pending(&self, target: &HtmlElement, _record: &CaptureRecord) {
        let _ = target.class_list().add_1(&self.classes.pending);
    }

    fn mount_skeleton(
        &self,
        target: &HtmlElement,
        record: &CaptureRecord,
        skeleton: &Skeleton,
    ) -> TypingResult<()> {
        self.clear_live_state();
        target.set_inner_html("");

        let mut slots = Vec::with_capacity(skeleton.slot_count());
        self.build(&skeleton.nodes, target, &mut slots)?;

        let class_list = target.class_list();
        class_list
            .remove_1(&self.classes.pending)
            .map_err(dom_error("clearing pending state"))?;
        class_list
            .add_1(&self.classes.revealing)
            .map_err(dom_error("setting revealing state"))?;
        target
            .style()
            .set_property("display", &record.original_display)
            .map_err(dom_error("reasserting display"))?;

        *self.slots.borrow_mut() = slots;
        *self.caret.borrow_mut() = Some(self.new_caret()?);
        Ok(())
    }

    fn append_text(&self, _target: &HtmlElement, fragment: usize, text: &str) -> TypingResult<()> {
        let slots = self.slots.borrow();
        let slot = slots
            .get(fragment)
            .ok_or_else(|| TypingError::Dom(format!("no text slot {}", fragment)))?;
        slot.append_data(text).map_err(dom_error("appending text"))
    }

    fn place_caret(&self, _target: &HtmlElement, caret: CaretPlacement) -> TypingResult<()> {
        let current = self.caret.borrow();
        let Some(element) = current.as_ref() else {
            return Ok(());
        };
        match caret {
            CaretPlacement::After(fragment) => {
                let slots = self.slots.borrow();
                let Some(slot) = slots.get(fragment) else {
                    return Ok(());
                };
                let _ = element.style().remove_property("display");
                if let Some(parent) = slot.parent_node() {
                    parent
                        .insert_before(element, slot.next_sibling().as_ref())
                        .map_err(dom_error("moving caret"))?;
                }
            }
            CaretPlacement::Hidden => {
                let _ = element.style().set_property("display", "none");
            }
            CaretPlacement::Retired => {
                let _ = element.class_list().add_1(&self.classes.caret_retiring);
            }
        }
        Ok(())
    }

    fn settle(&self, target: &HtmlElement) -> TypingResult<()> {
        self.clear_live_state();
        target
            .class_list()
            .remove_1(&self.classes.revealing)
            .map_err(dom_error("clearing revealing state"))?;
        target
            .style()
            .remove_property("display")
            .map_err(dom_error("removing display override"))?;
        Ok(())
    }

    fn restore(&self, target: &HtmlElement, record: &CaptureRecord) {
        self.clear_live_state();
        target.set_inner_html(&record.original_markup);
        let class_list = target.class_list();
        let _ = class_list.remove_1(&self.classes.pending);
        let _ = class_list.remove_1(&self.classes.revealing);
        let _ = target.style().remove_property("display");
    }

    fn next_frame(&self) -> impl Future<Output = ()> {
        let window = self.window.clone();
        scheduled(move |resolve| window.request_animation_frame(resolve))
    }

    fn sleep(&self, ms: u32) -> impl Future<Output = ()> {
        let window = self.window.clone();
        let ms = i32::try_from(ms).unwrap_or(i32::MAX);
        scheduled(move |resolve| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(resolve, ms)
        })
    }
}

/// Mark every toggle header visible (done at startup, before typing).
pub fn show_toggle_headers(document: &Document, classes: &ClassNames) -> TypingResult<()> {
    for header in query_all(document, &format!(".{}", classes.toggle_header))? {
        let _ = header.class_list().add_1(&classes.header_visible);
    }
    Ok(())
}

/// Attach click handlers to every toggle header.
///
/// Call once, after the gate has been activated; handlers stay inert while
/// the gate is closed. Returns the number of headers wired.
pub fn activate_toggles(document: &Document, classes: &ClassNames, gate: &ToggleGate) -> TypingResult<usize> {
    let headers = query_all(document, &format!(".{}", classes.toggle_header))?;
    for header in &headers {
        let target_id = header.get_attribute("data-target").unwrap_or_default();
        let content = document.get_element_by_id(&target_id);
        if content.is_none() {
            log::warn!("toggle header points at missing element {:?}", target_id);
        }

        let section = RefCell::new(ToggleSection::new(target_id));
        let gate = gate.clone();
        let classes = classes.clone();
        let element = header.clone();
        let on_click = Closure::<dyn FnMut()>::new(move || {
            let mut section = section.borrow_mut();
            if !section.click(&gate) {
                return;
            }
            let header_classes = element.class_list();
            let _ = header_classes.toggle_with_force(&classes.header_active, section.active);
            let _ = header_classes.toggle_with_force(&classes.header_open, section.open);
            if let Some(content) = &content {
                let _ = content
                    .class_list()
                    .toggle_with_force(&classes.content_shown, section.shown);
            }
        });
        header
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(dom_error("adding click listener"))?;
        on_click.forget();
    }
    Ok(headers.len())
}

/// Keeps exactly one of the compact/full greeting elements attached,
/// swapping them through comment placeholders.
pub struct GreetingSwap {
    state: ResponsiveSwap,
    compact: Element,
    full: Element,
    compact_placeholder: Comment,
    full_placeholder: Comment,
}

impl GreetingSwap {
    pub fn new(document: &Document, layout: &LayoutConfig) -> TypingResult<Self> {
        let find = |id: &str| {
            document
                .get_element_by_id(id)
                .ok_or_else(|| TypingError::ElementNotFound(id.to_string()))
        };
        Ok(Self {
            state: ResponsiveSwap::new(layout.width_threshold),
            compact: find(&layout.compact_id)?,
            full: find(&layout.full_id)?,
            compact_placeholder: document.create_comment(&format!("{} placeholder", layout.compact_id)),
            full_placeholder: document.create_comment(&format!("{} placeholder", layout.full_id)),
        })
    }

    fn parts(&self, layout: Layout) -> (&Element, &Comment) {
        match layout {
            Layout::Compact => (&self.compact, &self.compact_placeholder),
            Layout::Full => (&self.full, &self.full_placeholder),
        }
    }

    /// Bring the document in line with a viewport width.
    pub fn apply(&mut self, width: f64) -> TypingResult<()> {
        let steps = self.state.update(width);
        if let Some(layout) = steps.detach {
            let (element, placeholder) = self.parts(layout);
            if let Some(parent) = element.parent_node() {
                parent
                    .replace_child(placeholder, element)
                    .map_err(dom_error("detaching greeting"))?;
            }
        }
        if let Some(layout) = steps.attach {
            let (element, placeholder) = self.parts(layout);
            if let Some(parent) = placeholder.parent_node() {
                parent
                    .replace_child(element, placeholder)
                    .map_err(dom_error("attaching greeting"))?;
            }
        }
        Ok(())
    }
}

fn viewport_width(window: &Window) -> f64 {
    window
        .inner_width()
        .ok()
        .and_then(|width| width.as_f64())
        .unwrap_or(0.0)
}

/// Apply the greeting swap now and on every resize.
pub fn install_greeting_swap(window: &Window, document: &Document, layout: &LayoutConfig) -> TypingResult<()> {
    let swap = Rc::new(RefCell::new(GreetingSwap::new(document, layout)?));
    swap.borrow_mut().apply(viewport_width(window))?;

    let resize_window = window.clone();
    let on_resize = Closure::<dyn FnMut()>::new(move || {
        if let Err(err) = swap.borrow_mut().apply(viewport_width(&resize_window)) {
            log::warn!("greeting swap failed: {}", err);
        }
    });
    window
        .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
        .map_err(dom_error("adding resize listener"))?;
    on_resize.forget();
    Ok(())
}

/// Replay the click sound from the start at the configured volume.
///
/// Fire-and-forget: the playback promise is not awaited.
pub fn play_click_sound(document: &Document, layout: &LayoutConfig) -> TypingResult<()> {
    let audio = document
        .get_element_by_id(&layout.click_sound_id)
        .ok_or_else(|| TypingError::ElementNotFound(layout.click_sound_id.clone()))?
        .dyn_into::<HtmlAudioElement>()
        .map_err(|_| TypingError::Dom(format!("{} is not an audio element", layout.click_sound_id)))?;
    audio.set_current_time(0.0);
    audio.set_volume(layout.click_volume);
    let _ = audio.play().map_err(dom_error("playing click sound"))?;
    Ok(())
}

/// Start the page effect: capture targets, install the greeting swap, show
/// toggle headers and run the typing sequence in the background. Toggle
/// clicks are wired once the sequence completes.
///
/// Returns a token that cancels the sequence.
pub fn start(config: TypingConfig) -> TypingResult<CancellationToken> {
    let host = DomHost::new(config.classes.clone())?;
    let targets = host.targets()?;

    if let Err(err) = install_greeting_swap(&host.window, &host.document, &config.layout) {
        log::warn!("responsive greeting disabled: {}", err);
    }
    show_toggle_headers(&host.document, &config.classes)?;

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let gate = ToggleGate::new();
        let sequence = Sequence::new(config);
        let report = sequence.run(&host, &targets, &gate, &token).await;
        for (index, err) in report.failures() {
            log::warn!("typing target {} not animated: {}", index, err);
        }
        if report.toggles_activated {
            if let Err(err) = activate_toggles(&host.document, &sequence.config().classes, &gate) {
                log::warn!("toggle sections disabled: {}", err);
            }
        }
    });
    Ok(cancel)
}
