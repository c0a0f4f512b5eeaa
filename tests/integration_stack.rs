use overlay_stack::{
    Document, EventLog, FocusableContent, NodeId, NodeTree, Notification, OpenOutcome,
    OverlayConfig, OverlayContent, OverlayError, OverlayHandle, OverlayKind, OverlayManager,
    OverlayState,
};

const BASE: i32 = 1000;

struct Page {
    overlays: OverlayManager<NodeTree>,
    log: EventLog,
}

impl Page {
    fn new() -> Self {
        Self::with_config(OverlayConfig::default())
    }

    fn with_config(config: OverlayConfig) -> Self {
        let overlays = OverlayManager::with_config(NodeTree::new(), config);
        let mut page = Self {
            overlays,
            log: EventLog::new(),
        };
        let hook = page.log.observer();
        page.overlays.add_hook(hook);
        page
    }

    /// A dialog declared on the page with one field and a close button.
    fn dialog(&mut self) -> OverlayHandle {
        let doc = self.overlays.document_mut();
        let root = doc.root();
        let section = doc.create_element("section");
        doc.append_child(root, section).unwrap();
        doc.add_control(section, "field").unwrap();
        let close = doc.add_control(section, "close").unwrap();
        self.overlays
            .register(FocusableContent::new(section).with_close_button(close))
    }

    fn sentinels_hidden(&self) -> bool {
        match self.overlays.sentinels() {
            Some(s) => {
                let doc = self.overlays.document();
                doc.is_hidden(s.top) && doc.is_hidden(s.bottom)
            }
            None => true,
        }
    }
}

#[test]
fn scenario_a_single_open() {
    let mut page = Page::new();
    let d1 = page.dialog();
    assert_eq!(page.overlays.open(d1), Ok(OpenOutcome::Opened));
    assert_eq!(page.overlays.open_overlays(), vec![d1]);
    assert!(page.overlays.backdrop_visible());
    assert_eq!(page.overlays.z_rank(d1), Some(BASE + 1));

    let slot = page.overlays.slot(d1).unwrap();
    assert_eq!(page.overlays.document().z_index(slot), Some(BASE + 1));
}

#[test]
fn scenario_b_to_d_stacking_and_unwinding() {
    let mut page = Page::new();
    let d1 = page.dialog();
    let d2 = page.dialog();

    // B
    page.overlays.open(d1).unwrap();
    page.overlays.open(d2).unwrap();
    assert_eq!(page.overlays.open_overlays(), vec![d1, d2]);
    assert_eq!(page.overlays.z_rank(d2), Some(BASE + 1));
    assert_eq!(page.overlays.z_rank(d1), Some(BASE - 1));
    assert!(page.overlays.backdrop_visible());

    // C
    assert!(page.overlays.close(d1));
    assert_eq!(page.overlays.open_overlays(), vec![d2]);
    assert_eq!(page.overlays.z_rank(d2), Some(BASE + 1));
    assert_eq!(page.overlays.z_rank(d1), None);
    assert!(page.overlays.backdrop_visible());
    assert!(page.overlays.sentinels_visible());

    // D
    assert!(page.overlays.close(d2));
    assert!(page.overlays.open_overlays().is_empty());
    assert!(!page.overlays.backdrop_visible());
    assert!(!page.overlays.sentinels_visible());
    assert!(page.sentinels_hidden());
}

#[test]
fn scenario_e_close_all_is_silent() {
    let mut page = Page::new();
    let handles: Vec<_> = (0..3).map(|_| page.dialog()).collect();
    for h in &handles {
        page.overlays.open(*h).unwrap();
    }
    page.log.clear();

    page.overlays.close_all();
    assert!(page.overlays.open_overlays().is_empty());
    assert!(!page.overlays.backdrop_visible());
    assert!(page.sentinels_hidden());

    // nothing now, and nothing left queued for the next tick either
    assert_eq!(page.overlays.tick(), 0);
    assert!(page.log.is_empty());
    for h in handles {
        assert_eq!(page.overlays.state(h), Some(OverlayState::Closed));
    }
}

#[test]
fn reopening_lower_overlay_brings_it_to_top() {
    let mut page = Page::new();
    let [a, b, c] = [page.dialog(), page.dialog(), page.dialog()];
    for h in [a, b, c] {
        page.overlays.open(h).unwrap();
        assert_eq!(page.overlays.active(), Some(h));
    }
    page.overlays.tick();
    page.log.clear();

    assert_eq!(page.overlays.open(a), Ok(OpenOutcome::Reactivated));
    assert_eq!(page.overlays.active(), Some(a));
    assert_eq!(page.overlays.open_overlays(), vec![b, c, a]);
    assert_eq!(page.overlays.z_rank(a), Some(BASE + 1));
    assert_eq!(page.overlays.z_rank(c), Some(BASE - 1));
    assert_eq!(page.overlays.z_rank(b), Some(BASE - 2));

    // re-activation announces focus but not a second open
    assert_eq!(page.log.count(a, Notification::BeforeOpen), 0);
    assert_eq!(page.log.count(a, Notification::Open), 0);
    assert_eq!(page.log.count(a, Notification::FocusFirst), 1);
}

#[test]
fn double_open_notifies_once() {
    let mut page = Page::new();
    let a = page.dialog();
    page.overlays.open(a).unwrap();
    page.overlays.open(a).unwrap();
    page.overlays.tick();
    page.overlays.tick();
    assert_eq!(
        page.log.for_handle(a),
        vec![
            Notification::BeforeOpen,
            Notification::Open,
            Notification::FocusFirst
        ]
    );
    assert_eq!(page.overlays.state(a), Some(OverlayState::Open));
}

#[test]
fn overlay_uncovered_before_tick_sees_open_before_focus() {
    let mut page = Page::new();
    let a = page.dialog();
    let b = page.dialog();
    page.overlays.open(a).unwrap();
    page.overlays.open(b).unwrap();
    page.overlays.close(b);
    page.overlays.tick();
    assert_eq!(
        page.log.for_handle(a),
        vec![
            Notification::BeforeOpen,
            Notification::Open,
            Notification::FocusFirst
        ]
    );
}

#[test]
fn close_notifications_and_focus_handoff() {
    let mut page = Page::new();
    let a = page.dialog();
    let b = page.dialog();
    page.overlays.open(a).unwrap();
    page.overlays.open(b).unwrap();
    page.overlays.tick();
    page.log.clear();

    assert!(page.overlays.close(b));
    assert_eq!(
        page.log.for_handle(b),
        vec![Notification::BeforeClose, Notification::Close]
    );
    // the overlay underneath becomes active and gets focus
    assert_eq!(page.log.for_handle(a), vec![Notification::FocusFirst]);
    let focused = page.overlays.document().focused().unwrap();
    let anchor = page.overlays.records()[0].content_anchor;
    assert!(page.overlays.document().is_within(focused, anchor));

    // closing again is a no-op
    assert!(!page.overlays.close(b));
    assert_eq!(page.log.count(b, Notification::Close), 1);
}

#[test]
fn depth_is_reported_with_each_event() {
    let mut page = Page::new();
    let a = page.dialog();
    let b = page.dialog();
    page.overlays.open(a).unwrap();
    page.overlays.open(b).unwrap();
    page.overlays.close(b);
    let depths: Vec<(Notification, usize)> = page
        .log
        .events()
        .into_iter()
        .filter(|e| e.handle == b)
        .map(|e| (e.notification, e.depth))
        .collect();
    assert_eq!(
        depths,
        vec![
            (Notification::BeforeOpen, 1),
            (Notification::Open, 2),
            (Notification::FocusFirst, 2),
            (Notification::BeforeClose, 2),
            (Notification::Close, 1),
        ]
    );
}

#[test]
fn silent_close_skips_notifications() {
    let mut page = Page::new();
    let a = page.dialog();
    page.overlays.open(a).unwrap();
    page.log.clear();
    assert!(page.overlays.close_silently(a));
    assert_eq!(page.overlays.tick(), 0);
    assert!(page.log.is_empty());
    assert!(!page.overlays.is_open(a));
}

#[test]
fn content_returns_to_original_position_on_close() {
    let mut page = Page::new();
    let doc = page.overlays.document_mut();
    let root = doc.root();
    let main = doc.create_element("main");
    doc.append_child(root, main).unwrap();
    let before = doc.create_text("p", "before");
    let section = doc.create_element("section");
    let after = doc.create_text("p", "after");
    for n in [before, section, after] {
        doc.append_child(main, n).unwrap();
    }
    let h = page.overlays.register(FocusableContent::new(section));

    page.overlays.open(h).unwrap();
    let container = page.overlays.container().unwrap();
    assert!(page.overlays.document().is_within(section, container.content));

    page.overlays.close(h);
    assert_eq!(
        page.overlays.document().children(main),
        vec![before, section, after]
    );
}

#[test]
fn open_scrolls_content_to_top() {
    let mut page = Page::new();
    let h = page.dialog();
    let anchor = page.overlays.content::<FocusableContent>(h).unwrap().content_anchor().unwrap();
    page.overlays.document_mut().set_scroll_top(anchor, 12).unwrap();
    page.overlays.open(h).unwrap();
    assert_eq!(page.overlays.document().scroll_top(anchor), 0);
}

#[test]
fn custom_base_z_is_respected() {
    let mut page = Page::with_config(OverlayConfig::new().with_base_z(10));
    let a = page.dialog();
    let b = page.dialog();
    page.overlays.open(a).unwrap();
    page.overlays.open(b).unwrap();
    assert_eq!(page.overlays.z_rank(b), Some(11));
    assert_eq!(page.overlays.z_rank(a), Some(9));
}

#[test]
fn modal_kind_keeps_content_until_destroyed() {
    let mut page = Page::with_config(OverlayConfig::new().with_default_kind(OverlayKind::Modal));
    let h = page.dialog();
    assert_eq!(page.overlays.kind(h), Some(OverlayKind::Modal));
    page.overlays.open(h).unwrap();
    let slot = page.overlays.slot(h).unwrap();
    let anchor = page.overlays.records()[0].content_anchor;

    page.overlays.close(h);
    let doc = page.overlays.document();
    assert_eq!(doc.parent(anchor), Some(slot));
    assert!(doc.is_hidden(slot));
    assert!(!doc.is_rendered(anchor));

    assert!(page.overlays.destroy(h));
    assert_eq!(page.overlays.document().parent(anchor), Some(page.overlays.document().root()));
    assert_eq!(page.overlays.slot(h), None);
}

#[test]
fn destroyed_handles_are_rejected() {
    let mut page = Page::new();
    let h = page.dialog();
    page.overlays.open(h).unwrap();
    page.log.clear();

    assert!(page.overlays.destroy(h));
    assert!(page.log.is_empty());
    assert!(!page.overlays.backdrop_visible());
    assert_eq!(page.overlays.state(h), Some(OverlayState::Destroyed));
    assert_eq!(page.overlays.open(h), Err(OverlayError::Destroyed(h)));
    assert!(!page.overlays.close(h));
    assert!(!page.overlays.focus_first(h));
    assert!(!page.overlays.destroy(h));

    // the slot is recycled without reviving the old handle
    let fresh = page.dialog();
    assert_ne!(fresh, h);
    assert_eq!(page.overlays.open(fresh), Ok(OpenOutcome::Opened));
    assert_eq!(page.overlays.open(h), Err(OverlayError::Destroyed(h)));
}

#[test]
fn unrendered_content_cannot_open() {
    let mut page = Page::new();
    let h = page.overlays.register(FocusableContent::pending());
    assert_eq!(page.overlays.open(h), Err(OverlayError::AnchorMissing(h)));
    assert!(page.log.is_empty());
    assert!(!page.overlays.backdrop_visible());

    // an anchor that exists but was never attached anywhere is fine
    let loose: NodeId = page.overlays.document_mut().create_element("section");
    let h2 = page.overlays.register(FocusableContent::new(loose));
    assert_eq!(page.overlays.open(h2), Ok(OpenOutcome::Opened));
    page.overlays.close(h2);
    assert_eq!(page.overlays.document().parent(loose), None);
}

#[test]
fn document_root_cannot_be_overlay_content() {
    let mut page = Page::new();
    let root = page.overlays.document().root();
    let h = page.overlays.register(FocusableContent::new(root));
    assert!(matches!(page.overlays.open(h), Err(OverlayError::Document(_))));
    assert!(!page.overlays.is_open(h));
}

#[test]
fn panicking_observer_does_not_break_the_stack() {
    let mut page = Page::new();
    let a = page.dialog();
    page.overlays.set_observer(a, |event| {
        if event.notification == Notification::BeforeOpen {
            panic!("observer failure");
        }
    });
    page.overlays.add_hook(|_| panic!("hook failure"));

    assert_eq!(page.overlays.open(a), Ok(OpenOutcome::Opened));
    assert!(page.overlays.backdrop_visible());
    page.overlays.tick();
    assert!(page.overlays.close(a));
    assert!(!page.overlays.backdrop_visible());

    // the well-behaved hook added first saw everything
    assert_eq!(
        page.log.for_handle(a),
        vec![
            Notification::BeforeOpen,
            Notification::Open,
            Notification::FocusFirst,
            Notification::BeforeClose,
            Notification::Close,
        ]
    );
}
