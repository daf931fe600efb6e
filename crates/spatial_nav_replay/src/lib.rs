//! Replays scripted key presses against a layout described in JSON and
//! reports where focus lands after each one.

use anyhow::{Context as _, Result, bail};
use log::{debug, info};
use serde::Deserialize;
use spatial_nav::Document as _;
use spatial_nav::{
    BoundingBox, EngineSettings, HandlerOutcome, KeyDisposition, KeyMods, MemoryDocument,
    NavOptions, NodeId, NotificationKind, SpatialNavigation, fragment_of, sibling_traversal,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A replay script: a layout, the engine options and the keys to press.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Fixture {
    pub viewport: BoundingBox,
    /// Options passed to `mount`.
    #[serde(default)]
    pub options: NavOptions,
    /// Additional sections, registered in order after mounting.
    #[serde(default)]
    pub sections: Vec<NavOptions>,
    pub elements: Vec<ElementSpec>,
    /// URL fragment used for initial focus.
    #[serde(default)]
    pub initial: Option<String>,
    /// Walk row siblings when a horizontal move dead-ends.
    #[serde(default)]
    pub sibling_traversal: bool,
    pub steps: Vec<Step>,
}

/// One element of the layout tree.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ElementSpec {
    pub tag: String,
    pub rect: BoundingBox,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

/// A key press and what should happen after it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Step {
    pub key: String,
    /// Any of `ctrl`, `alt`, `shift`, `meta`.
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// `id` attribute of the element expected to hold focus afterwards.
    #[serde(default)]
    pub expect: Option<String>,
    /// Whether the engine is expected to consume the key.
    #[serde(default)]
    pub consumed: Option<bool>,
    /// Expected location fragment, e.g. `#about`.
    #[serde(default)]
    pub fragment: Option<String>,
}

/// What one step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub key: String,
    pub disposition: KeyDisposition,
    /// `id` attribute (or node index) of the focused element.
    pub focused: Option<String>,
    /// Location fragment written by the last will-focus with an `id`.
    pub fragment: Option<String>,
}

/// Directory holding the bundled fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// All `.json` fixtures in `dir`, sorted by path.
///
/// # Errors
/// The directory cannot be read.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Load a fixture from disk.
///
/// # Errors
/// Unreadable file or malformed fixture.
pub fn load(path: &Path) -> Result<Fixture> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Build the in-memory document for a fixture.
pub fn build_document(fixture: &Fixture) -> MemoryDocument {
    let mut doc = MemoryDocument::new(fixture.viewport);
    for element in &fixture.elements {
        append(&mut doc, None, element);
    }
    doc
}

fn append(doc: &mut MemoryDocument, parent: Option<NodeId>, spec: &ElementSpec) {
    let node = doc.append_element(parent, &spec.tag, spec.rect);
    for (name, value) in &spec.attrs {
        doc.set_attribute(node, name, value);
    }
    for child in &spec.children {
        append(doc, Some(node), child);
    }
}

fn parse_mods(modifiers: &[String]) -> Result<KeyMods> {
    let mut mods = KeyMods::default();
    for modifier in modifiers {
        match modifier.to_ascii_lowercase().as_str() {
            "ctrl" => mods.ctrl = true,
            "alt" => mods.alt = true,
            "shift" => mods.shift = true,
            "meta" => mods.meta = true,
            other => bail!("unknown modifier {other:?}"),
        }
    }
    Ok(mods)
}

fn describe(doc: &MemoryDocument, node: NodeId) -> String {
    doc.attribute(node, "id")
        .map_or_else(|| format!("node {}", node.0), str::to_owned)
}

/// Run a fixture and check every step's expectations.
///
/// # Errors
/// Invalid options, or a step whose outcome differs from its expectation.
pub fn replay(fixture: &Fixture) -> Result<Vec<StepOutcome>> {
    let mut nav =
        SpatialNavigation::with_settings(build_document(fixture), EngineSettings::from_env());
    nav.mount(fixture.options.clone().into_config()?)?;
    for section in &fixture.sections {
        let id = nav.add_section(section.clone().into_config()?)?;
        nav.make_focusable(Some(&id))?;
    }
    if fixture.sibling_traversal {
        nav.on(NotificationKind::WillMove, sibling_traversal);
    }
    let location: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(fixture.initial.clone()));
    let sink = Rc::clone(&location);
    nav.on(NotificationKind::WillFocus, move |engine, event| {
        if let Some(fragment) = fragment_of(engine.document(), event.target) {
            *sink.borrow_mut() = Some(fragment);
        }
        HandlerOutcome::Continue
    });
    nav.focus_initial(fixture.initial.as_deref());

    let mut outcomes = Vec::with_capacity(fixture.steps.len());
    for (index, step) in fixture.steps.iter().enumerate() {
        let mods = parse_mods(&step.modifiers)?;
        let disposition = nav.on_key_down(&step.key, mods);
        nav.on_key_up(&step.key, mods);
        nav.run_deferred();

        let focused = nav
            .document()
            .active_element()
            .map(|node| describe(nav.document(), node));
        info!(
            "step {index}: {} -> {} ({disposition:?})",
            step.key,
            focused.as_deref().unwrap_or("<none>")
        );

        if let Some(expected) = &step.expect
            && focused.as_deref() != Some(expected.as_str())
        {
            bail!(
                "step {index} ({}): expected #{expected}, focus is on {focused:?}",
                step.key
            );
        }
        if let Some(consumed) = step.consumed
            && consumed != (disposition == KeyDisposition::Consumed)
        {
            bail!(
                "step {index} ({}): expected consumed={consumed}, got {disposition:?}",
                step.key
            );
        }
        let fragment = location.borrow().clone();
        if let Some(expected) = &step.fragment
            && fragment.as_deref() != Some(expected.as_str())
        {
            bail!(
                "step {index} ({}): expected location {expected}, got {fragment:?}",
                step.key
            );
        }
        outcomes.push(StepOutcome {
            key: step.key.clone(),
            disposition,
            focused,
            fragment,
        });
    }
    debug!("replayed {} steps", outcomes.len());
    Ok(outcomes)
}

/// Load and replay one fixture file.
///
/// # Errors
/// See [`load`] and [`replay`].
pub fn replay_file(path: &Path) -> Result<Vec<StepOutcome>> {
    let fixture = load(path)?;
    replay(&fixture).with_context(|| format!("replaying {}", path.display()))
}
