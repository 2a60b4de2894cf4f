//! Tests for the component system.

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use quanta_comp_core::{CompContext, CompError, CompResult, State, StateRecord};
    use serde_json::{Value, json};

    use crate::component::{Comp, CompBase, Component};
    use crate::headless::HeadlessHost;
    use crate::host::{HostChildren, HostNode, LiveNode};
    use crate::render::RenderCx;
    use crate::scroll::ScrollPos;

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Clone, Copy)]
    enum Failure {
        Error,
        Panic,
    }

    /// A test component that records its lifecycle.
    struct Probe {
        base: CompBase,
        log: Log,
        failure: Option<Failure>,
        reject: bool,
        scroll: Option<ScrollPos>,
    }

    impl Probe {
        fn new(ctx: &CompContext, id: &str, log: &Log) -> Self {
            Self {
                base: CompBase::new::<Self>(ctx, json!({ "id": id })).unwrap(),
                log: Rc::clone(log),
                failure: None,
                reject: false,
                scroll: None,
            }
        }

        fn leaf(ctx: &CompContext, id: &str, text: &str, log: &Log) -> Comp {
            let mut probe = Self::new(ctx, id, log);
            probe.base.set_tag("span");
            probe.base.set_content(text);
            Comp::new(probe)
        }

        fn record(&self, event: &str) {
            self.log
                .borrow_mut()
                .push(format!("{event}:{}", self.base.id()));
        }
    }

    impl Component for Probe {
        fn base(&self) -> &CompBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut CompBase {
            &mut self.base
        }

        fn pre_render(&mut self) -> bool {
            !self.reject
        }

        fn comp_render(&mut self, cx: &RenderCx<'_>) -> CompResult<HostNode> {
            match self.failure {
                Some(Failure::Error) => Err(CompError::render(self.base.label(), "broken")),
                Some(Failure::Panic) => panic!("probe exploded"),
                None => Ok(cx.materialize(&self.base)),
            }
        }

        fn on_attach(&mut self) {
            self.record("attach");
        }

        fn on_update(&mut self) {
            self.record("update");
        }

        fn on_remove(&mut self) {
            self.record("remove");
        }

        fn scroll_pos(&self) -> Option<ScrollPos> {
            self.scroll.clone()
        }
    }

    /// Shows a `count` field from its state as content.
    struct Counter {
        base: CompBase,
    }

    impl Counter {
        fn new(ctx: &CompContext) -> Comp {
            let mut initial = StateRecord::new();
            initial.insert("count".into(), json!(0));
            let mut base =
                CompBase::with_state::<Self>(ctx, json!({"id": "counter"}), State::with_record(initial))
                    .unwrap();
            base.set_tag("output");
            Comp::new(Self { base })
        }
    }

    impl Component for Counter {
        fn base(&self) -> &CompBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut CompBase {
            &mut self.base
        }

        fn pre_render(&mut self) -> bool {
            let count = self
                .base
                .state_record()
                .and_then(|record| record.get("count").and_then(Value::as_i64))
                .unwrap_or_default();
            self.base.set_content(count.to_string());
            true
        }
    }

    /// Renders its content inside a nested `<b>` through a custom render.
    struct Badge {
        base: CompBase,
    }

    impl Component for Badge {
        fn base(&self) -> &CompBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut CompBase {
            &mut self.base
        }

        fn comp_render(&mut self, cx: &RenderCx<'_>) -> CompResult<HostNode> {
            let text = self.base.content().unwrap_or_default().to_string();
            let inner = HostNode::element(
                "b",
                Default::default(),
                HostChildren::from_nodes(vec![HostNode::text(text)]),
            );
            Ok(cx.element(&self.base, HostChildren::from_nodes(vec![inner])))
        }
    }

    fn setup() -> (CompContext, Log, HeadlessHost) {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        (CompContext::new(), Log::default(), HeadlessHost::new())
    }

    fn count(log: &Log, entry: &str) -> usize {
        log.borrow().iter().filter(|e| *e == entry).count()
    }

    // =========================================================================
    // Identity and Construction
    // =========================================================================

    #[test]
    fn test_invalid_attributes_rejected() {
        let ctx = CompContext::new();
        let err = CompBase::new::<Probe>(&ctx, json!("nope")).unwrap_err();
        assert!(err.is_construction_error());
        assert!(err.to_string().contains("Probe"));
    }

    #[test]
    fn test_generated_ids_and_labels() {
        let ctx = CompContext::new();
        let first = CompBase::new::<Probe>(&ctx, Value::Null).unwrap();
        let second = CompBase::new::<Probe>(&ctx, json!({"className": "x"})).unwrap();
        assert_eq!(first.id().as_str(), "1");
        assert_eq!(second.id().as_str(), "2");
        assert_eq!(second.label(), "Probe_2");
        assert_eq!(second.key(), "2");
    }

    #[test]
    fn test_downcast_through_handle() {
        let (ctx, log, _) = setup();
        let comp = Comp::new(Probe::new(&ctx, "p", &log));
        assert!(comp.is::<Probe>());
        assert!(!comp.is::<Counter>());
        assert_eq!(comp.with(|probe: &Probe| probe.reject), Some(false));
        comp.with_mut(|probe: &mut Probe| probe.reject = true);
        assert_eq!(comp.with(|probe: &Probe| probe.reject), Some(true));
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    #[test]
    fn test_attach_runs_once() {
        let (ctx, log, host) = setup();
        let comp = Comp::new(Probe::new(&ctx, "p", &log));
        host.mount(&comp);

        assert!(comp.borrow().base().is_mounted());
        assert_eq!(count(&log, "attach:p"), 1);

        // Hosts may deliver the attach notification again.
        assert!(host.simulate_attach(comp.id()));
        assert!(host.simulate_attach(comp.id()));
        assert_eq!(count(&log, "attach:p"), 1);

        host.invalidate();
        host.flush();
        assert_eq!(count(&log, "attach:p"), 1);
        assert_eq!(count(&log, "update:p"), 2);
    }

    #[test]
    fn test_detach_on_unmount() {
        let (ctx, log, host) = setup();
        let comp = Comp::new(Probe::new(&ctx, "p", &log));
        host.mount(&comp);
        host.unmount();

        assert!(!comp.borrow().base().is_mounted());
        assert_eq!(count(&log, "remove:p"), 1);
        assert!(comp.borrow().base().live_node().is_none());
        assert_eq!(host.instance_count(), 0);
    }

    #[test]
    fn test_children_attach_before_parent() {
        let (ctx, log, host) = setup();
        let child = Probe::leaf(&ctx, "child", "x", &log);
        let mut parent = Probe::new(&ctx, "parent", &log);
        parent.base.add_child(child);
        host.mount(&Comp::new(parent));

        let attaches: Vec<String> = log
            .borrow()
            .iter()
            .filter(|e| e.starts_with("attach"))
            .cloned()
            .collect();
        assert_eq!(attaches, vec!["attach:child", "attach:parent"]);
    }

    #[test]
    fn test_removed_child_detaches() {
        let (ctx, log, host) = setup();
        let child = Probe::leaf(&ctx, "child", "x", &log);
        let mut parent = Probe::new(&ctx, "parent", &log);
        parent.base.add_child(child);
        let parent = Comp::new(parent);
        host.mount(&parent);

        parent.borrow_mut().base_mut().clear_children();
        host.invalidate();
        host.flush();

        assert_eq!(count(&log, "remove:child"), 1);
        assert_eq!(count(&log, "remove:parent"), 0);
        assert_eq!(host.markup(), r#"<div id="parent"></div>"#);
    }

    // =========================================================================
    // Deferred Mount Queue
    // =========================================================================

    #[test]
    fn test_on_mount_runs_in_registration_order() {
        let (ctx, log, host) = setup();
        let mut probe = Probe::new(&ctx, "p", &log);
        for name in ["f1", "f2", "f3"] {
            let log = Rc::clone(&log);
            probe
                .base
                .on_mount(move |_| log.borrow_mut().push(name.to_string()));
        }
        assert_eq!(probe.base.pending_mount_callbacks(), 3);

        let comp = Comp::new(probe);
        host.mount(&comp);

        let deferred: Vec<String> = log
            .borrow()
            .iter()
            .filter(|e| e.starts_with('f'))
            .cloned()
            .collect();
        assert_eq!(deferred, vec!["f1", "f2", "f3"]);
        // Deferred work runs before on_attach.
        assert_eq!(log.borrow()[3], "attach:p");
        assert_eq!(comp.borrow().base().pending_mount_callbacks(), 0);

        host.simulate_attach(comp.id());
        assert_eq!(count(&log, "f1"), 1);
    }

    #[test]
    fn test_on_mount_immediate_when_live() {
        let (ctx, log, host) = setup();
        let comp = Comp::new(Probe::new(&ctx, "p", &log));
        host.mount(&comp);

        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        comp.borrow_mut()
            .base_mut()
            .on_mount(move |node| *sink.borrow_mut() = node.id());

        assert_eq!(seen.borrow().as_deref(), Some("p"));
        assert_eq!(comp.borrow().base().pending_mount_callbacks(), 0);
    }

    #[test]
    fn test_custom_render_keeps_live_node() {
        let (ctx, log, host) = setup();
        let mut base = CompBase::new::<Badge>(&ctx, json!({"id": "badge"})).unwrap();
        base.set_content("new");
        let mounted = Rc::clone(&log);
        base.on_mount(move |node| {
            let id = node.id().unwrap_or_default();
            mounted.borrow_mut().push(format!("mounted:{id}"));
        });
        base.focus();
        let comp = Comp::new(Badge { base });
        host.mount(&comp);

        assert_eq!(count(&log, "mounted:badge"), 1);
        assert!(comp.borrow().base().live_node().is_some());
        assert_eq!(host.focused_id().as_deref(), Some("badge"));
        assert_eq!(host.markup(), r#"<div id="badge"><b>new</b></div>"#);
    }

    #[test]
    fn test_inner_html_replaces_children() {
        let (ctx, log, host) = setup();
        let mut note = Probe::new(&ctx, "note", &log);
        note.base.set_tag("span");
        note.base.set_content("plain");
        note.base.add_child(Probe::leaf(&ctx, "hidden", "child", &log));
        note.base
            .set_inner_html(r#"<b title="t">bold</b><img src="javascript:x()" onerror="x()">"#);
        host.mount(&Comp::new(note));

        assert_eq!(host.markup(), r#"<span id="note"><b title="t">bold</b><img></span>"#);
        assert!(host.live_node(&quanta_comp_core::CompId::new("note")).is_some());
        assert_eq!(count(&log, "attach:hidden"), 0);
    }

    #[test]
    fn test_rejected_render_has_no_live_node() {
        let (ctx, log, host) = setup();
        let mut probe = Probe::new(&ctx, "p", &log);
        probe.reject = true;
        probe.base.on_mount(|_| panic!("must not run without a node"));
        let comp = Comp::new(probe);
        host.mount(&comp);

        let component = comp.borrow();
        assert!(component.base().was_pre_render_rejected());
        assert!(component.base().live_node().is_none());
        assert_eq!(component.base().pending_mount_callbacks(), 1);
        assert_eq!(host.markup(), "");
    }

    // =========================================================================
    // Focus
    // =========================================================================

    #[test]
    fn test_last_focus_claim_wins() {
        let (ctx, log, host) = setup();
        let first = Probe::leaf(&ctx, "first", "", &log);
        let second = Probe::leaf(&ctx, "second", "", &log);
        first.borrow_mut().base_mut().focus();
        second.borrow_mut().base_mut().focus();

        let mut parent = Probe::new(&ctx, "form", &log);
        parent.base.add_children([Some(first.clone()), Some(second.clone())]);
        host.mount(&Comp::new(parent));

        assert_eq!(host.focused_id().as_deref(), Some("second"));
        assert_eq!(host.live_node(first.id()).map(|n| n.focus_count()), Some(0));
        assert!(second.borrow().base().has_focus_claim());
        assert!(!first.borrow().base().has_focus_claim());
    }

    #[test]
    fn test_focus_restored_after_node_recreated() {
        let (ctx, log, host) = setup();
        let input = Probe::leaf(&ctx, "query", "", &log);
        input.borrow_mut().base_mut().focus();
        host.mount(&input);

        let original = host.live_node(input.id()).map(|n| n.serial());
        assert_eq!(host.focused_id().as_deref(), Some("query"));

        assert!(host.recreate_node(input.id()));
        let fresh = host.live_node(input.id()).unwrap();
        assert_ne!(Some(fresh.serial()), original);
        assert!(fresh.focus_count() >= 1);
        assert_eq!(host.focused_id().as_deref(), Some("query"));
        assert_eq!(count(&log, "attach:query"), 2);
    }

    #[test]
    fn test_released_claim_not_restored() {
        let (ctx, log, host) = setup();
        let input = Probe::leaf(&ctx, "query", "", &log);
        input.borrow_mut().base_mut().focus();
        host.mount(&input);

        ctx.focus().release(input.id());
        host.recreate_node(input.id());
        assert_eq!(host.focused_id(), None);
    }

    // =========================================================================
    // Scroll Persistence
    // =========================================================================

    fn scroller(ctx: &CompContext, log: &Log, store: &ScrollPos) -> Comp {
        let mut probe = Probe::new(ctx, "pane", log);
        probe.scroll = Some(store.clone());
        Comp::new(probe)
    }

    #[test]
    fn test_scroll_survives_new_instance() {
        let (ctx, log, host) = setup();
        let store = ScrollPos::new();
        let pane = scroller(&ctx, &log, &store);
        host.mount(&pane);

        assert!(host.user_scroll(pane.id(), 120));
        assert_eq!(store.get(), 120);

        // The panel is rebuilt; the store outlives the instance.
        host.unmount();
        let rebuilt = scroller(&ctx, &log, &store);
        let next_host = HeadlessHost::new();
        next_host.mount(&rebuilt);
        let node = next_host.live_node(rebuilt.id()).unwrap();
        assert_eq!(node.scroll_top(), 120);

        // Re-renders re-apply the stored offset before paint.
        next_host.invalidate();
        next_host.flush();
        assert_eq!(node.scroll_top(), 120);
    }

    #[test]
    fn test_scroll_gate_suspends_writes() {
        let (ctx, log, host) = setup();
        let store = ScrollPos::new();
        let pane = scroller(&ctx, &log, &store);
        host.mount(&pane);
        host.user_scroll(pane.id(), 80);

        {
            let _suspended = ctx.suspend_scroll_writes();
            host.user_scroll(pane.id(), 300);
            assert_eq!(store.get(), 80);
        }

        host.user_scroll(pane.id(), 50);
        assert_eq!(store.get(), 50);
    }

    #[test]
    fn test_set_scroll_top_records_and_scrolls() {
        let (ctx, log, host) = setup();
        let store = ScrollPos::new();
        let pane = scroller(&ctx, &log, &store);
        host.mount(&pane);

        pane.borrow_mut().set_scroll_top(40);
        assert_eq!(store.get(), 40);
        assert_eq!(host.live_node(pane.id()).map(|n| n.scroll_top()), Some(40));
    }

    // =========================================================================
    // Children
    // =========================================================================

    #[test]
    fn test_null_children_skipped() {
        let (ctx, log, host) = setup();
        let a = Probe::leaf(&ctx, "a", "A", &log);
        let b = Probe::leaf(&ctx, "b", "B", &log);
        let mut parent = Probe::new(&ctx, "list", &log);
        parent.base.add_children([None, Some(a), None, Some(b)]);
        parent.base.add_child(None::<Comp>);
        assert_eq!(parent.base.children().len(), 4);
        assert_eq!(parent.base.child_comps().count(), 2);

        host.mount(&Comp::new(parent));
        assert_eq!(
            host.markup(),
            r#"<div id="list"><span id="a">A</span><span id="b">B</span></div>"#
        );
    }

    #[test]
    fn test_content_only_without_children() {
        let (ctx, log, _) = setup();
        let mut base = CompBase::new::<Probe>(&ctx, json!({"id": "t"})).unwrap();
        assert!(!base.has_children());
        base.set_content("text");
        assert!(base.has_children());
        base.add_child(Probe::leaf(&ctx, "c", "child", &log));
        let comp = Comp::new(Probe {
            base,
            log,
            failure: None,
            reject: false,
            scroll: None,
        });
        assert_eq!(
            crate::headless::render_to_markup(&comp),
            r#"<div id="t"><span id="c">child</span></div>"#
        );
    }

    #[test]
    fn test_ordinal_sort_is_stable() {
        let (ctx, log, _) = setup();
        let mut parent = CompBase::new::<Probe>(&ctx, Value::Null).unwrap();
        let children = [
            ("c", Some(3)),
            ("x", None),
            ("b2", Some(2)),
            ("a", Some(1)),
            ("b1", Some(2)),
            ("y", None),
            ("b3", Some(2)),
        ];
        for (id, ordinal) in children {
            let child = Probe::leaf(&ctx, id, id, &log);
            child.borrow_mut().base_mut().set_ordinal(ordinal);
            parent.add_child(child);
        }
        parent.ordinal_sort_children();

        let order: Vec<&str> = parent.child_comps().map(|c| c.id().as_str()).collect();
        // Equal ordinals keep their insertion order.
        assert_eq!(order, vec!["a", "b2", "b1", "b3", "c", "x", "y"]);
    }

    #[test]
    fn test_insert_first_child() {
        let (ctx, log, _) = setup();
        let mut parent = CompBase::new::<Probe>(&ctx, Value::Null).unwrap();
        parent.add_child(Probe::leaf(&ctx, "second", "", &log));
        parent.insert_first_child(Probe::leaf(&ctx, "first", "", &log));
        parent.insert_first_child(None::<Comp>);

        let order: Vec<&str> = parent.child_comps().map(|c| c.id().as_str()).collect();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[test]
    fn test_try_add_child_skips_failed_construction() {
        let ctx = CompContext::new();
        let mut parent = CompBase::new::<Probe>(&ctx, Value::Null).unwrap();
        let failed = CompBase::new::<Probe>(&ctx, json!([1, 2])).map(|base| {
            Comp::new(Probe {
                base,
                log: Log::default(),
                failure: None,
                reject: false,
                scroll: None,
            })
        });
        assert!(!parent.try_add_child(failed));
        assert!(parent.children().is_empty());
    }

    // =========================================================================
    // Render Error Isolation
    // =========================================================================

    #[test]
    fn test_failing_children_isolated() {
        let (ctx, log, host) = setup();
        let mut broken = Probe::new(&ctx, "broken", &log);
        broken.failure = Some(Failure::Error);
        let mut exploding = Probe::new(&ctx, "exploding", &log);
        exploding.failure = Some(Failure::Panic);
        let sibling = Probe::leaf(&ctx, "ok", "fine", &log);

        let mut parent = Probe::new(&ctx, "root", &log);
        parent
            .base
            .add_children([Some(Comp::new(broken)), Some(sibling), Some(Comp::new(exploding))]);
        let parent = Comp::new(parent);
        host.mount(&parent);

        assert_eq!(
            host.markup(),
            r#"<div id="root"><span id="ok">fine</span></div>"#
        );
        assert!(parent.borrow().base().is_mounted());
        // A panicking render leaves the component usable.
        assert!(parent.borrow().base().children()[2].as_ref().unwrap().try_borrow_mut().is_ok());
    }

    #[test]
    fn test_ancestry_names_path() {
        let (ctx, log, host) = setup();
        let leaf = Probe::leaf(&ctx, "leaf", "", &log);
        let mut middle = Probe::new(&ctx, "middle", &log);
        middle.base.add_child(leaf.clone());
        let mut root = Probe::new(&ctx, "root", &log);
        root.base.add_child(Comp::new(middle));
        host.mount(&Comp::new(root));

        assert_eq!(leaf.ancestry(), "Probe_root / Probe_middle / Probe_leaf");
    }

    // =========================================================================
    // State
    // =========================================================================

    #[test]
    fn test_state_created_lazily_before_render() {
        let (ctx, log, host) = setup();
        let mut probe = Probe::new(&ctx, "p", &log);
        assert!(!probe.base.has_state());
        probe.base.merge_state(&json!({"open": true}));
        assert!(probe.base.has_state());
        let comp = Comp::new(probe);
        host.mount(&comp);

        let mut component = comp.borrow_mut();
        assert_eq!(component.base_mut().get_state::<Value>(), Some(json!({"open": true})));
    }

    #[test]
    fn test_state_after_render_is_misuse() {
        let (ctx, log, host) = setup();
        let comp = Comp::new(Probe::new(&ctx, "p", &log));
        host.mount(&comp);

        let mut component = comp.borrow_mut();
        assert!(component.base_mut().check_state().is_none());
        component.base_mut().merge_state(&json!({"open": true}));
        assert!(!component.base().has_state());
    }

    #[test]
    fn test_merge_state_rerenders() {
        let (ctx, _, host) = setup();
        let counter = Counter::new(&ctx);
        host.mount(&counter);
        assert_eq!(host.markup(), r#"<output id="counter">0</output>"#);

        counter
            .borrow_mut()
            .base_mut()
            .merge_state(&json!({"count": 5}));
        assert!(host.is_dirty());
        assert_eq!(host.flush(), 1);
        assert_eq!(host.markup(), r#"<output id="counter">5</output>"#);
    }

    #[test]
    fn test_visibility_flags() {
        let (ctx, _, host) = setup();
        let counter = Counter::new(&ctx);
        host.mount(&counter);

        {
            let mut component = counter.borrow_mut();
            let base = component.base_mut();
            assert!(base.is_visible());
            base.set_visible(false);
            base.set_enabled(false);
            assert!(!base.is_visible());
            assert!(!base.is_enabled());
        }
        host.flush();
        let mut component = counter.borrow_mut();
        let record = component.base_mut().state_record().unwrap();
        assert_eq!(record.get("count"), Some(&json!(0)));
        assert_eq!(record.get("visible"), Some(&json!(false)));
    }

    #[test]
    fn test_visibility_defaults_survive_rerender() {
        let (ctx, _, host) = setup();
        let counter = Counter::new(&ctx);
        host.mount(&counter);

        counter.borrow_mut().base_mut().ensure_visibility_defaults();
        host.invalidate();
        host.flush();

        let mut component = counter.borrow_mut();
        let record = component.base_mut().state_record().unwrap();
        assert_eq!(record.get("count"), Some(&json!(0)));
        assert_eq!(record.get("visible"), Some(&json!(true)));
        assert_eq!(record.get("enabled"), Some(&json!(true)));
    }

    #[test]
    fn test_force_render() {
        let (ctx, _, host) = setup();
        let counter = Counter::new(&ctx);
        host.mount(&counter);
        let commits = host.commit_count();

        counter.borrow_mut().base_mut().force_render();
        host.flush();
        assert_eq!(host.commit_count(), commits + 1);
    }
}
