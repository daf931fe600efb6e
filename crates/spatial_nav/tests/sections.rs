use anyhow::Error;
use spatial_nav::Document as _;
use spatial_nav::{
    BoundingBox, Direction, ElementSelector, EnterTo, KeyMods, MemoryDocument, Restrict, SectionConfig,
    SpatialNavigation,
};

mod common;

/// `self-only` keeps focus inside the section even when another section has
/// a candidate.
#[test]
fn self_only_never_leaves_the_section() -> Result<(), Error> {
    common::init_logging();
    let (mut nav, rows) = common::mounted_two_rows(
        SectionConfig::new().restrict(Restrict::SelfOnly),
        SectionConfig::new(),
    )?;
    let [home, about] = rows.menu;
    assert!(nav.focus_element(home, None, None));
    assert_eq!(nav.next_candidate(Direction::Down, home, "menu"), None);
    assert!(!nav.focus_next(Direction::Down, home, "menu"));
    assert_eq!(common::active(&nav)?, home);
    assert_eq!(nav.next_candidate(Direction::Right, home, "menu"), Some(about));
    Ok(())
}

/// `self-first` falls back to other sections only when its own pool has no
/// candidate.
#[test]
fn self_first_falls_back_to_other_sections() -> Result<(), Error> {
    let (mut nav, rows) = common::mounted_two_rows(SectionConfig::new(), SectionConfig::new())?;
    let [home, about] = rows.menu;
    let [first, _] = rows.grid;
    assert_eq!(nav.next_candidate(Direction::Right, home, "menu"), Some(about));
    assert_eq!(nav.next_candidate(Direction::Down, home, "menu"), Some(first));

    assert!(nav.focus_element(home, None, None));
    nav.on_key_down("ArrowDown", KeyMods::default());
    assert_eq!(common::active(&nav)?, first);
    assert_eq!(nav.last_section_id(), Some("grid"));
    Ok(())
}

/// `self-first` takes an own-section candidate even when another section
/// has a much closer one.
#[test]
fn self_first_prefers_own_section_over_distance() -> Result<(), Error> {
    let mut doc = MemoryDocument::new(common::VIEWPORT);
    let current = doc.append_element(None, "a", BoundingBox::new(10.0, 20.0, 20.0, 20.0));
    let near = doc.append_element(None, "a", BoundingBox::new(40.0, 20.0, 20.0, 20.0));
    let far_own = doc.append_element(None, "a", BoundingBox::new(350.0, 20.0, 20.0, 20.0));
    let doc = doc
        .with_attribute(current, "class", "own")
        .with_attribute(near, "class", "other")
        .with_attribute(far_own, "class", "own");
    let mut nav = SpatialNavigation::new(doc);
    nav.mount(SectionConfig::new().id("own").selector(".own"))?;
    nav.add_section(SectionConfig::new().id("other").selector(".other"))?;

    assert_eq!(nav.next_candidate(Direction::Right, current, "own"), Some(far_own));
    assert_eq!(nav.next_candidate(Direction::Right, far_own, "own"), None);
    assert_eq!(nav.next_candidate(Direction::Left, far_own, "own"), Some(current));
    Ok(())
}

/// Focusing with an explicit disabled section id leaves that section's
/// memory alone.
#[test]
fn disabled_section_is_not_recorded() -> Result<(), Error> {
    let (mut nav, rows) = common::mounted_two_rows(SectionConfig::new(), SectionConfig::new())?;
    let [home, _] = rows.menu;
    let [first, _] = rows.grid;
    assert!(nav.focus_element(home, None, None));
    nav.disable_section("grid")?;

    assert!(nav.focus_element(first, Some("grid"), None));
    assert_eq!(common::active(&nav)?, first);
    assert_ne!(nav.last_section_id(), Some("grid"));
    nav.enable_section("grid")?;
    assert_eq!(nav.sections().last_focused(nav.document(), "grid"), None);
    Ok(())
}

/// `none` ranks every section's elements together.
#[test]
fn unrestricted_ranks_across_sections() -> Result<(), Error> {
    let (nav, rows) = common::mounted_two_rows(
        SectionConfig::new().restrict(Restrict::Unrestricted),
        SectionConfig::new(),
    )?;
    let [_, about] = rows.menu;
    let [_, second] = rows.grid;
    assert_eq!(nav.next_candidate(Direction::Down, about, "menu"), Some(second));
    Ok(())
}

/// Entering a `last-focused` section restores its remembered element rather
/// than the geometric winner.
#[test]
fn enter_to_last_focused_restores_memory() -> Result<(), Error> {
    let (mut nav, rows) = common::mounted_two_rows(
        SectionConfig::new(),
        SectionConfig::new().enter_to(EnterTo::LastFocused),
    )?;
    let [home, about] = rows.menu;
    let [first, second] = rows.grid;

    assert!(nav.focus_element(first, None, None));
    assert!(nav.focus_next(Direction::Up, first, "grid"));
    assert_eq!(common::active(&nav)?, home);
    assert!(nav.focus_next(Direction::Right, home, "menu"));
    assert_eq!(common::active(&nav)?, about);

    assert_eq!(nav.next_candidate(Direction::Down, about, "menu"), Some(second));
    assert!(nav.focus_next(Direction::Down, about, "menu"));
    assert_eq!(common::active(&nav)?, first);
    let memory = nav.sections().get("menu").and_then(|menu| menu.previous());
    assert_eq!(memory.map(|step| (step.from, step.to)), Some((about, second)));
    Ok(())
}

/// Without an enter policy a section is entered at its default element.
#[test]
fn default_element_wins_without_enter_policy() -> Result<(), Error> {
    let (mut nav, rows) = common::mounted_two_rows(
        SectionConfig::new(),
        SectionConfig::new().default_element("#second"),
    )?;
    let [home, _] = rows.menu;
    let [_, second] = rows.grid;
    assert!(nav.focus_element(home, None, None));
    assert!(nav.focus_section(Some("grid")));
    assert_eq!(common::active(&nav)?, second);
    Ok(())
}

/// `focus_section(None)` prefers the last active section, skips disabled
/// ones and reports failure when nothing can take focus.
#[test]
fn focus_section_walks_sections_in_order() -> Result<(), Error> {
    let mut empty = SpatialNavigation::new(MemoryDocument::new(common::VIEWPORT));
    assert!(!empty.focus_section(None));

    let (mut nav, rows) = common::mounted_two_rows(SectionConfig::new(), SectionConfig::new())?;
    let [home, _] = rows.menu;
    let [first, _] = rows.grid;
    assert!(nav.focus_section(None));
    assert_eq!(common::active(&nav)?, home);

    assert!(nav.focus_element(first, None, None));
    nav.document_mut().blur(first);
    assert!(nav.focus_section(None));
    assert_eq!(common::active(&nav)?, first);

    nav.disable_section("grid")?;
    nav.document_mut().blur(first);
    assert!(nav.focus_section(None));
    assert_eq!(common::active(&nav)?, home);
    assert!(!nav.focus_section(Some("grid")));

    nav.enable_section("grid")?;
    nav.remove_section("grid")?;
    assert_eq!(nav.remove_section("grid").ok(), None);
    assert_eq!(nav.disable_section("grid").ok(), None);
    assert_eq!(nav.sections().len(), 2);
    Ok(())
}

/// `make_focusable` gives `tabindex="-1"` only to elements without one that
/// are not on the ignore list.
#[test]
fn make_focusable_respects_existing_tabindex() -> Result<(), Error> {
    let mut doc = MemoryDocument::new(common::VIEWPORT);
    let tile = doc.append_element(None, "div", common::button(20.0, 20.0));
    let ranked = doc.append_element(None, "div", common::button(120.0, 20.0));
    let editor = doc.append_element(None, "div", common::button(20.0, 80.0));
    let link = doc.append_element(None, "a", common::button(120.0, 80.0));
    let doc = doc
        .with_attribute(ranked, "tabindex", "3")
        .with_attribute(editor, "contentEditable", "true");
    let mut nav = SpatialNavigation::new(doc);
    nav.mount(SectionConfig::new().selector("div, a"))?;

    assert_eq!(nav.document().attribute(tile, "tabindex"), Some("-1"));
    assert_eq!(nav.document().attribute(ranked, "tabindex"), Some("3"));
    assert_eq!(nav.document().attribute(editor, "tabindex"), None);
    assert_eq!(nav.document().attribute(link, "tabindex"), None);
    assert_eq!(nav.make_focusable(Some("missing")).ok(), None);

    let extra = nav.add_section(
        SectionConfig::new()
            .selector(ElementSelector::Element(link))
            .tab_index_ignore_list(""),
    )?;
    nav.make_focusable(Some(&extra))?;
    assert_eq!(nav.document().attribute(link, "tabindex"), Some("-1"));
    Ok(())
}

/// Explicit ids must be unique; generated ids skip taken ones.
#[test]
fn section_ids_are_unique() -> Result<(), Error> {
    let (doc, _) = common::abc_document();
    let mut nav = SpatialNavigation::new(doc);
    nav.mount(SectionConfig::new().id("section-1").selector("a"))?;
    assert_eq!(nav.add_section(SectionConfig::new())?, "section-2");
    assert_eq!(nav.add_section(SectionConfig::new().id("section-2")).ok(), None);
    Ok(())
}
