#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use scrim_dialog::{Dialog, DialogConfig, DialogProps, DialogRenderer, RenderedDialog};
use scrim_dom::{Document, EventTarget, EventType, ListenerHandle, NodeId, Result};
use scrim_runtime::Observable;

pub const TEST_ID: &str = "data-testid";

/// Install a test-writer subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Host page: `<body><div data-testid="app"><button>Show Dialog</button></div></body>`.
pub struct Page {
    pub doc: Document,
    pub is_open: Observable<bool>,
    pub app: NodeId,
    pub show: NodeId,
    pub dismissals: Rc<Cell<u32>>,
    _show_click: ListenerHandle,
}

impl Page {
    pub fn new(open: bool) -> Self {
        init_tracing();
        let doc = Document::new();
        let app = doc.append_element(doc.body(), "div").unwrap();
        doc.set_attribute(app, TEST_ID, "app").unwrap();
        let show = doc.append_element(app, "button").unwrap();
        doc.set_text(show, "Show Dialog").unwrap();

        let is_open = Observable::new(open);
        let signal = is_open.clone();
        let show_click = doc.add_listener(EventTarget::Node(show), EventType::Click, move |_| {
            signal.set(true)
        });

        Self {
            doc,
            is_open,
            app,
            show,
            dismissals: Rc::new(Cell::new(0)),
            _show_click: show_click,
        }
    }

    /// Props where dismissal closes the dialog, as a typical host would wire it.
    pub fn props(&self) -> DialogProps {
        let signal = self.is_open.clone();
        let count = Rc::clone(&self.dismissals);
        DialogProps::new(self.is_open.clone()).on_dismiss(move || {
            count.set(count.get() + 1);
            signal.set(false);
        })
    }

    pub fn mount(&self, props: DialogProps) -> Dialog {
        self.mount_with(props, DialogConfig::default())
    }

    pub fn mount_with(&self, props: DialogProps, config: DialogConfig) -> Dialog {
        let dialog = Dialog::with_config(&self.doc, props, BasicView::new(&self.is_open), config);
        self.doc.run_microtasks();
        dialog
    }

    /// Focus the trigger and click it, then let the dialog settle.
    pub fn open_via_trigger(&self) {
        self.doc.focus(self.show);
        self.doc.click(self.show);
        self.doc.run_microtasks();
    }

    pub fn by_test_id(&self, id: &str) -> Option<NodeId> {
        by_attribute(&self.doc, TEST_ID, id)
    }

    pub fn by_text(&self, text: &str) -> Option<NodeId> {
        let doc = &self.doc;
        doc.descendants(doc.root())
            .find(|node| doc.children(*node).is_empty() && doc.text_content(*node).trim() == text)
    }

    pub fn by_role(&self, role: &str) -> Option<NodeId> {
        by_attribute(&self.doc, "role", role)
    }

    pub fn portal(&self) -> Option<NodeId> {
        let doc = &self.doc;
        doc.descendants(doc.root())
            .find(|node| doc.has_attribute(*node, scrim_dialog::DEFAULT_PORTAL_ATTRIBUTE))
    }

    pub fn active_text(&self) -> Option<String> {
        self.doc
            .active_element()
            .map(|node| self.doc.text_content(node).trim().to_owned())
    }
}

pub fn by_attribute(doc: &Document, name: &str, value: &str) -> Option<NodeId> {
    doc.descendants(doc.root())
        .find(|node| doc.attribute(*node, name).as_deref() == Some(value))
}

/// Dialog markup:
///
/// ```text
/// <div data-testid="overlay">
///   <div data-testid="content">
///     <button>Close Dialog</button>
///     <input data-testid="input" value="Useless input">
///   </div>
/// </div>
/// ```
///
/// The close button sets the open signal to `false`.
pub struct BasicView {
    is_open: Observable<bool>,
    handles: Rc<RefCell<Vec<ListenerHandle>>>,
}

impl BasicView {
    pub fn new(is_open: &Observable<bool>) -> Self {
        Self {
            is_open: is_open.clone(),
            handles: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl DialogRenderer for BasicView {
    fn render(&mut self, doc: &Document, portal: NodeId) -> Result<RenderedDialog> {
        self.handles.borrow_mut().clear();
        let rendered = RenderedDialog::scaffold(doc, portal)?;
        doc.set_attribute(rendered.overlay, TEST_ID, "overlay")?;
        doc.set_attribute(rendered.content, TEST_ID, "content")?;

        let close = doc.append_element(rendered.content, "button")?;
        doc.set_text(close, "Close Dialog")?;
        let input = doc.append_element(rendered.content, "input")?;
        doc.set_attribute(input, TEST_ID, "input")?;
        doc.set_attribute(input, "value", "Useless input")?;

        let signal = self.is_open.clone();
        self.handles.borrow_mut().push(doc.add_listener(
            EventTarget::Node(close),
            EventType::Click,
            move |_| signal.set(false),
        ));
        Ok(rendered)
    }
}
