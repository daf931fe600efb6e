#![allow(dead_code, reason = "each test binary uses a different subset of the fixtures")]

use anyhow::{Result, anyhow};
use spatial_nav::Document as _;
use spatial_nav::{
    BoundingBox, HandlerOutcome, MemoryDocument, NodeId, NotificationKind, SectionConfig,
    SpatialNavigation,
};
use std::cell::RefCell;
use std::rc::Rc;

pub type Nav = SpatialNavigation<MemoryDocument>;

/// Shared log of `(notification, target)` pairs seen by a recording handler.
pub type Trail = Rc<RefCell<Vec<(NotificationKind, NodeId)>>>;

pub const VIEWPORT: BoundingBox = BoundingBox::new(0.0, 0.0, 400.0, 300.0);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Box of the standard 40x20 button at `(left, top)`.
pub const fn button(left: f64, top: f64) -> BoundingBox {
    BoundingBox::new(left, top, 40.0, 20.0)
}

/// Three links: A top-left, B top-right, C bottom-left.
pub fn abc_document() -> (MemoryDocument, [NodeId; 3]) {
    let mut doc = MemoryDocument::new(VIEWPORT);
    let link_a = doc.append_element(None, "a", button(20.0, 20.0));
    let link_b = doc.append_element(None, "a", button(120.0, 20.0));
    let link_c = doc.append_element(None, "a", button(20.0, 80.0));
    let doc = doc
        .with_attribute(link_a, "id", "a")
        .with_attribute(link_b, "id", "b")
        .with_attribute(link_c, "id", "c");
    (doc, [link_a, link_b, link_c])
}

/// The A/B/C layout mounted as one section over `a`.
pub fn mounted_abc(config: SectionConfig<NodeId>) -> Result<(Nav, [NodeId; 3])> {
    let (doc, links) = abc_document();
    let mut nav = SpatialNavigation::new(doc);
    nav.mount(config.selector("a"))?;
    Ok((nav, links))
}

/// A menu row above a two-item grid row.
pub struct TwoRows {
    pub menu: [NodeId; 2],
    pub grid: [NodeId; 2],
}

pub fn two_rows_document() -> (MemoryDocument, TwoRows) {
    let mut doc = MemoryDocument::new(VIEWPORT);
    let menu = doc.append_element(None, "nav", BoundingBox::new(0.0, 0.0, 400.0, 60.0));
    let home = doc.append_element(Some(menu), "a", button(20.0, 20.0));
    let about = doc.append_element(Some(menu), "a", button(120.0, 20.0));
    let grid = doc.append_element(None, "div", BoundingBox::new(0.0, 100.0, 400.0, 100.0));
    let first = doc.append_element(Some(grid), "a", button(20.0, 140.0));
    let second = doc.append_element(Some(grid), "a", button(120.0, 140.0));
    let doc = doc
        .with_attribute(menu, "id", "menu")
        .with_attribute(grid, "class", "grid")
        .with_attribute(home, "id", "home")
        .with_attribute(second, "id", "second");
    (
        doc,
        TwoRows {
            menu: [home, about],
            grid: [first, second],
        },
    )
}

/// Engine over [`two_rows_document`] with sections `menu` and `grid`.
pub fn mounted_two_rows(
    menu: SectionConfig<NodeId>,
    grid: SectionConfig<NodeId>,
) -> Result<(Nav, TwoRows)> {
    let (doc, rows) = two_rows_document();
    let mut nav = SpatialNavigation::new(doc);
    nav.mount(SectionConfig::new())?;
    nav.add_section(menu.id("menu").selector("#menu a"))?;
    nav.add_section(grid.id("grid").selector(".grid a"))?;
    Ok((nav, rows))
}

/// Record every notification of the given kinds in handler order.
pub fn record(nav: &mut Nav, kinds: &[NotificationKind]) -> Trail {
    let trail: Trail = Rc::default();
    for kind in kinds {
        let sink = Rc::clone(&trail);
        nav.on(*kind, move |_, event| {
            sink.borrow_mut().push((event.kind, event.target));
            HandlerOutcome::Continue
        });
    }
    trail
}

pub fn active(nav: &Nav) -> Result<NodeId> {
    nav.document()
        .active_element()
        .ok_or_else(|| anyhow!("nothing focused"))
}
