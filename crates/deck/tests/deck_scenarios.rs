//! End-to-end behavior of a wired [`Deck`] against the tween engine.
//!
//! 1. Sorted and reversed items land in grid cells by display order
//! 2. Filtered-out items animate out but stay in the index
//! 3. A re-shown item gets a fresh node and replays its show animation
//! 4. Stack cards restack when the displayed count changes
//! 5. Removal reports `RenderRemoved` before `ItemErased`
//! 6. Row groups pan in lock-step and shrink as renders leave
//! 7. Config loading and build-time validation
//! 8. Bus dispatch is traced as `deck.dispatch` spans
//! 9. After any mix of adds, removals, and filters, the realized items are
//!    exactly the displayed ones

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ahash::AHashMap;
use deck::prelude::*;
use proptest::prelude::*;
use deck::{
    Animator, ConfigError, ConfigurationError, DeckError, EventBindable, EventKind, GridLayout,
    Interest, RenderId, filter_by_field, sort_by_field,
};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ---------------------------------------------------------------------------
// Host doubles
// ---------------------------------------------------------------------------

struct Panel {
    node: NodeId,
    rect: Cell<Rect>,
}

impl Surface for Panel {
    fn node(&self) -> NodeId {
        self.node
    }

    fn rect(&self) -> Rect {
        self.rect.get()
    }

    fn set_position(&self, position: Point) {
        let r = self.rect.get();
        self.rect.set(Rect::new(position.x, position.y, r.width, r.height));
    }
}

#[derive(Default)]
struct Host {
    next: Cell<u64>,
    panels: RefCell<AHashMap<NodeId, Rc<Panel>>>,
    destroyed: Cell<usize>,
}

impl Host {
    fn panel(&self, node: NodeId) -> Rc<Panel> {
        Rc::clone(&self.panels.borrow()[&node])
    }
}

impl Canvas for Host {
    fn frame_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, 400.0, 300.0)
    }

    fn create_node(&self, _item: &ItemId, _render: RenderId) -> NodeId {
        self.next.set(self.next.get() + 1);
        let node = NodeId(self.next.get());
        self.panels.borrow_mut().insert(
            node,
            Rc::new(Panel {
                node,
                rect: Cell::new(Rect::default()),
            }),
        );
        node
    }

    fn attach(&self, _node: NodeId) {}

    fn apply(&self, node: NodeId, transform: &Transform) {
        if let Some(panel) = self.panels.borrow().get(&node) {
            panel.rect.set(transform.rect());
        }
    }

    fn destroy(&self, node: NodeId) {
        self.panels.borrow_mut().remove(&node);
        self.destroyed.set(self.destroyed.get() + 1);
    }

    fn surface(&self, node: NodeId) -> Option<Rc<dyn Surface>> {
        self.panels
            .borrow()
            .get(&node)
            .map(|p| Rc::clone(p) as Rc<dyn Surface>)
    }
}

fn setup(layout: Option<GridLayout>) -> (Deck, Rc<Host>, Rc<TweenEngine>) {
    let host = Rc::new(Host::default());
    let engine = Rc::new(TweenEngine::new());
    let mut builder = Deck::builder()
        .canvas(Rc::clone(&host) as Rc<dyn Canvas>)
        .animator(Rc::clone(&engine) as Rc<dyn Animator>);
    if let Some(layout) = layout {
        builder = builder.layout(Rc::new(layout));
    }
    (builder.build().unwrap(), host, engine)
}

fn settle(engine: &TweenEngine) {
    for _ in 0..200 {
        engine.tick(Duration::from_millis(16));
        if engine.is_idle() {
            return;
        }
    }
    panic!("engine did not settle");
}

fn setup_with(layout: Rc<dyn LayoutPolicy>) -> (Deck, Rc<Host>, Rc<TweenEngine>) {
    let host = Rc::new(Host::default());
    let engine = Rc::new(TweenEngine::new());
    let deck = Deck::builder()
        .canvas(Rc::clone(&host) as Rc<dyn Canvas>)
        .animator(Rc::clone(&engine) as Rc<dyn Animator>)
        .layout(layout)
        .build()
        .unwrap();
    (deck, host, engine)
}

fn left(deck: &Deck, id: &str) -> f64 {
    deck.reconciler()
        .render(&ItemId::new(id), RenderId(0))
        .unwrap()
        .current()
        .left
}

fn fruit() -> Vec<serde_json::Value> {
    vec![
        json!({"id": "c", "name": "cherry", "color": "red"}),
        json!({"id": "a", "name": "apple", "color": "red"}),
        json!({"id": "b", "name": "banana", "color": "yellow"}),
    ]
}

// ---------------------------------------------------------------------------
// Ordering and visibility
// ---------------------------------------------------------------------------

#[test]
fn sorted_items_fill_cells_in_display_order() {
    let (deck, _host, engine) = setup(None);
    deck.set_sort_key(Some(sort_by_field("name")));
    deck.add_all_values(fruit()).unwrap();
    settle(&engine);

    assert_eq!(left(&deck, "a"), 0.0);
    assert_eq!(left(&deck, "b"), 110.0);
    assert_eq!(left(&deck, "c"), 220.0);

    deck.set_reversed(true);
    settle(&engine);
    assert_eq!(left(&deck, "c"), 0.0);
    assert_eq!(left(&deck, "a"), 220.0);
}

#[test]
fn filtered_items_exit_but_stay_indexed() {
    let (deck, host, engine) = setup(None);
    deck.add_all_values(fruit()).unwrap();
    settle(&engine);
    assert_eq!(deck.reconciler().render_count(), 3);

    deck.set_filter(Some(filter_by_field("color", json!("red"))));
    settle(&engine);
    let banana = ItemId::new("b");
    assert!(deck.reconciler().renders(&banana).is_empty());
    assert_eq!(host.destroyed.get(), 1);
    assert!(deck.index().contains(&banana));

    deck.set_filter(None);
    settle(&engine);
    assert_eq!(deck.reconciler().renders(&banana).len(), 1);
}

#[test]
fn reshown_item_gets_a_fresh_node() {
    let (deck, host, engine) = setup(None);
    deck.add_all_values(fruit()).unwrap();
    settle(&engine);
    let banana = ItemId::new("b");
    let node = |deck: &Deck| deck.reconciler().render(&banana, RenderId(0)).unwrap().node();
    let first = node(&deck);

    deck.set_filter(Some(filter_by_field("color", json!("red"))));
    settle(&engine);
    assert!(host.surface(first).is_none());

    deck.set_filter(None);
    let second = node(&deck);
    assert_ne!(second, first);
    // Enters from the show state again rather than resuming the old node.
    let entering = deck.reconciler().render(&banana, RenderId(0)).unwrap();
    assert_eq!(entering.current().opacity, 0.0);
    settle(&engine);
    assert_eq!(
        deck.reconciler().render(&banana, RenderId(0)).unwrap().current().opacity,
        1.0
    );
}

#[test]
fn stack_cards_restack_as_items_arrive_and_leave() {
    let (deck, _host, engine) = setup_with(Rc::new(StackLayout::new(100.0, 100.0)));
    let z = |deck: &Deck, id: &str| {
        let render = deck
            .reconciler()
            .render(&ItemId::new(id), RenderId(0))
            .unwrap();
        (render.target().z_index, render.current().z_index)
    };

    for id in ["a", "b", "c"] {
        deck.add_value(json!({ "id": id })).unwrap();
        settle(&engine);
    }
    // First displayed card on top: z = count - depth.
    assert_eq!(z(&deck, "a"), (3, 3));
    assert_eq!(z(&deck, "b"), (2, 2));
    assert_eq!(z(&deck, "c"), (1, 1));

    deck.remove(&ItemId::new("a"));
    settle(&engine);
    assert_eq!(z(&deck, "b"), (2, 2));
    assert_eq!(z(&deck, "c"), (1, 1));

    deck.set_filter(Some(filter_by_field("id", json!("c"))));
    settle(&engine);
    assert_eq!(z(&deck, "c"), (1, 1));
}

#[test]
fn removal_reports_render_removed_then_item_erased() {
    let (deck, _host, engine) = setup(None);
    let order = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&order);
    let _sub = deck.bind(
        Interest::Kinds(vec![EventKind::RenderRemoved, EventKind::ItemErased]),
        move |env| log.borrow_mut().push(env.event.kind()),
    );

    deck.add_value(json!({"id": "a"})).unwrap();
    settle(&engine);
    assert!(deck.remove(&ItemId::new("a")));
    assert!(!deck.remove(&ItemId::new("a")));
    settle(&engine);

    assert_eq!(
        *order.borrow(),
        vec![EventKind::RenderRemoved, EventKind::ItemErased]
    );
    assert_eq!(deck.reconciler().render_count(), 0);
    assert!(deck.index().is_empty());
}

// ---------------------------------------------------------------------------
// Gesture groups
// ---------------------------------------------------------------------------

#[test]
fn row_groups_pan_together() {
    let (deck, host, engine) = setup(Some(GridLayout::default().group_rows(true)));
    for id in ["a", "b", "c", "d"] {
        deck.add_value(json!({ "id": id })).unwrap();
    }
    settle(&engine);

    assert_eq!(deck.groups().group_count(), 2);
    let row0 = deck.groups().group(&GridLayout::row_group(0)).unwrap();
    assert_eq!(row0.len(), 3);

    let node = |id: &str| {
        deck.reconciler()
            .render(&ItemId::new(id), RenderId(0))
            .unwrap()
            .node()
    };
    let before: Vec<Point> = ["a", "b", "c", "d"]
        .iter()
        .map(|id| host.panel(node(id)).rect().origin())
        .collect();

    assert!(deck.handle_gesture(node("b"), &GestureInput::PanStart));
    deck.handle_gesture(
        node("b"),
        &GestureInput::PanMove {
            delta: Point::new(-50.0, 0.0),
        },
    );

    // The row fits the frame, so the whole drag is rubber-banded.
    for (i, id) in ["a", "b", "c"].iter().enumerate() {
        let now = host.panel(node(id)).rect().origin();
        assert_eq!(now.x - before[i].x, -25.0, "{id} moved with the row");
    }
    assert_eq!(host.panel(node("d")).rect().origin(), before[3]);

    deck.remove(&ItemId::new("d"));
    settle(&engine);
    assert_eq!(deck.groups().group_count(), 1);
}

#[test]
fn gestures_on_ungrouped_nodes_are_ignored() {
    let (deck, _host, engine) = setup(None);
    deck.add_value(json!({"id": "a"})).unwrap();
    settle(&engine);
    let node = deck
        .reconciler()
        .render(&ItemId::new("a"), RenderId(0))
        .unwrap()
        .node();
    assert!(!deck.handle_gesture(node, &GestureInput::PanStart));
    assert_eq!(deck.groups().member_count(), 0);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn toml_config_tunes_canvas_gestures() {
    let config = DeckConfig::from_toml_str(
        "[gesture]\nresistance_scale = 0.25\n\n[animation]\nshow_duration_ms = 100\n",
    )
    .unwrap();
    let deck = Deck::builder()
        .canvas(Rc::new(Host::default()))
        .animator(Rc::new(TweenEngine::new()))
        .config(config)
        .build()
        .unwrap();
    assert_eq!(deck.canvas_gesture_config().resistance_scale, 0.25);
    assert_eq!(deck.config().animation.show_duration_ms, 100);
}

#[test]
fn layout_gesture_options_override_config() {
    let custom = GestureConfig {
        resistance_scale: 0.9,
        ..GestureConfig::default()
    };
    let (deck, _host, _engine) = setup(Some(GridLayout::default().gesture(custom)));
    assert_eq!(deck.canvas_gesture_config().resistance_scale, 0.9);
}

#[test]
fn build_rejects_missing_parts_and_bad_config() {
    let err = Deck::builder()
        .animator(Rc::new(TweenEngine::new()))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Deck(DeckError::Configuration(ConfigurationError::MissingCanvas))
    ));

    let mut config = DeckConfig::default();
    config.gesture.resistance_scale = 0.0;
    let err = Deck::builder()
        .canvas(Rc::new(Host::default()))
        .animator(Rc::new(TweenEngine::new()))
        .config(config)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Validation(ref e)) if e.len() == 1));
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

struct SpanCapture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for SpanCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

#[test]
fn dispatch_is_traced() {
    let spans = Arc::new(Mutex::new(Vec::new()));
    let layer = SpanCapture {
        spans: Arc::clone(&spans),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, || {
        let (deck, _host, _engine) = setup(None);
        deck.add_value(json!({"id": "a"})).unwrap();
    });

    let spans = spans.lock().unwrap().clone();
    let dispatch: Vec<_> = spans.iter().filter(|s| s.name == "deck.dispatch").collect();
    assert!(!dispatch.is_empty(), "expected deck.dispatch span");
    assert!(
        dispatch
            .iter()
            .any(|s| s.fields.get("kind").is_some_and(|k| k == "ItemAdded"))
    );
}

// ---------------------------------------------------------------------------
// Realized set follows the index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Remove(u8),
    OnlyRed(bool),
    Tick(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u8..6).prop_map(Op::Add),
        2 => (0u8..6).prop_map(Op::Remove),
        1 => any::<bool>().prop_map(Op::OnlyRed),
        1 => (1u8..20).prop_map(Op::Tick),
    ]
}

fn realized(deck: &Deck) -> Vec<ItemId> {
    deck.reconciler()
        .item_ids()
        .into_iter()
        .filter(|id| !deck.reconciler().renders(id).is_empty())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn realized_items_match_displayed_items(ops in prop::collection::vec(op(), 1..30)) {
        let (deck, _host, engine) = setup(None);
        for op in ops {
            match op {
                Op::Add(n) => {
                    let color = if n % 2 == 0 { "red" } else { "blue" };
                    // Re-adding a present id overwrites it in place.
                    deck.add_value(json!({ "id": format!("i{n}"), "color": color })).unwrap();
                }
                Op::Remove(n) => {
                    deck.remove(&ItemId::new(format!("i{n}")));
                }
                Op::OnlyRed(true) => {
                    deck.set_filter(Some(filter_by_field("color", json!("red"))));
                }
                Op::OnlyRed(false) => deck.set_filter(None),
                Op::Tick(n) => {
                    for _ in 0..n {
                        engine.tick(Duration::from_millis(16));
                    }
                }
            }
        }
        settle(&engine);

        let mut displayed = deck.index().display_order();
        displayed.sort();
        prop_assert_eq!(realized(&deck), displayed);
    }
}
