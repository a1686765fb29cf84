//! # Document Store
//!
//! Owns the stored CSL style and everything that reads it.
//!
//! The style lives in a [`Storage`] backend as one JSON snapshot. Every read
//! deserializes a fresh copy, every write replaces the whole snapshot. Writers
//! renumber the tree before storing it, so identities read back are always
//! contiguous pre-order positions.
//!
//! ## Lifecycle
//!
//! ```text
//! init / set_from_markup → get → mutate copy → renumber → set → emit
//!        ↓                                                  ↓
//!   codec.parse                                   storage.write_raw
//! ```

use std::rc::Rc;

use chrono::Utc;
use csledit_codec::{MarkupCodec, XmlCodec};
use csledit_tree::{find_by_path, locate, renumber, Node};
use tracing::{debug, info, warn};

use crate::commands::Position;
use crate::errors::{EditorError, StyleError};
use crate::macro_resolver;
use crate::mutations::MacroIndex;
use crate::observers::{ObserverId, ObserverRegistry, StyleEvent, StyleObserver};
use crate::options::EditorOptions;
use crate::ordering::reorder_style_info;
use crate::schema::Schema;
use crate::source::{strip_comments, StyleSource};
use crate::storage::{MemoryStorage, Storage};

/// Node stamped with the last-modified time when `update_time` is on
pub const UPDATED_PATH: &str = "style/info/updated";

/// Editable CSL style backed by a storage collaborator
pub struct Document {
    /// Incremented on every stored write
    pub version: u64,

    pub(crate) options: EditorOptions,
    storage: Box<dyn Storage>,
    codec: Box<dyn MarkupCodec>,
    pub(crate) schema: Box<dyn Schema>,
    observers: ObserverRegistry,
}

/// A node together with its parent (`None` for the root)
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAndParent {
    pub node: Node,
    pub parent: Option<Node>,
}

impl Document {
    pub fn new(storage: Box<dyn Storage>, options: EditorOptions) -> Self {
        let schema = Box::new(options.schema.clone());
        Self {
            version: 0,
            options,
            storage,
            codec: Box::new(XmlCodec::new()),
            schema,
            observers: ObserverRegistry::new(),
        }
    }

    /// Memory-backed document with default options
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()), EditorOptions::default())
    }

    pub fn with_codec(mut self, codec: impl MarkupCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    pub fn with_schema(mut self, schema: impl Schema + 'static) -> Self {
        self.schema = Box::new(schema);
        self
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    // ------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------

    /// The stored snapshot exactly as persisted
    pub fn raw_snapshot(&self) -> Result<Option<String>, EditorError> {
        Ok(self.storage.read_raw(&self.options.storage_key)?)
    }

    pub fn has_document(&self) -> Result<bool, EditorError> {
        Ok(self
            .raw_snapshot()?
            .is_some_and(|raw| !raw.trim().is_empty()))
    }

    /// Current style tree
    pub fn get(&self) -> Result<Node, EditorError> {
        let raw = self
            .raw_snapshot()?
            .filter(|raw| !raw.trim().is_empty())
            .ok_or(EditorError::NoDocument)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Replace the stored style tree
    pub fn set(&mut self, tree: Node) -> Result<Node, EditorError> {
        let stamp = self.options.update_time;
        self.store(tree, stamp)
    }

    fn store(&mut self, mut tree: Node, stamp: bool) -> Result<Node, EditorError> {
        if stamp {
            stamp_updated(&mut tree)?;
        }

        let json = serde_json::to_string(&tree)?;
        self.storage.write_raw(&self.options.storage_key, &json)?;
        self.version += 1;
        Ok(tree)
    }

    /// Put back a snapshot taken with [`Document::raw_snapshot`]
    pub(crate) fn restore_raw(&mut self, raw: &str) -> Result<(), EditorError> {
        self.storage.write_raw(&self.options.storage_key, raw)?;
        self.version += 1;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Markup
    // ------------------------------------------------------------------

    /// Replace the stored style with one parsed from CSL markup.
    ///
    /// Rejected styles leave the stored snapshot untouched.
    pub fn set_from_markup(&mut self, markup: &str) -> Result<(), EditorError> {
        let mut tree = self.codec.parse(markup).map_err(|e| {
            debug!("Rejecting style markup: {}", e);
            StyleError::CslParsing {
                message: "Error parsing CSL Code".to_string(),
            }
        })?;

        self.check_loadable(&tree)?;
        reorder_style_info(&mut tree)?;
        renumber(&mut tree);

        if self.options.update_time && find_by_path(&tree, UPDATED_PATH)?.is_empty() {
            // Create the node once here so later edits never have to
            self.store(tree, false)?;
            let stored = self.get()?;
            let info_id = find_by_path(&stored, "style/info")?
                .first()
                .map(|info| info.node_id);

            match info_id {
                Some(info_id) => {
                    debug!("Creating required updated node");
                    self.suppressed(|doc| {
                        doc.insert_node(
                            info_id,
                            Position::Last,
                            Node::new("updated"),
                            MacroIndex::Literal,
                        )
                    })?;
                }
                None => warn!("No style/info node, cannot create {}", UPDATED_PATH),
            }
            tree = self.get()?;
        }

        let tree = self.set(tree)?;
        info!("Loaded style <{}> with {} nodes", tree.name, tree.count());
        self.emit(StyleEvent::NewStyle);
        Ok(())
    }

    fn check_loadable(&self, tree: &Node) -> Result<(), EditorError> {
        for link in find_by_path(tree, "style/info/link")? {
            if link.attr("rel") == Some("independent-parent") {
                let parent_url = link.attr_or_empty("href").to_string();
                return Err(StyleError::DependentStyle {
                    message: format!(
                        "Editing of dependent styles not yet supported.\n\n\
                         Please find and edit this master style instead:\n\n{}",
                        parent_url
                    ),
                    parent_url,
                }
                .into());
            }
        }

        for required in &self.options.required_nodes {
            if find_by_path(tree, required)?.is_empty() {
                return Err(StyleError::NodeMissing {
                    node: required.clone(),
                    message: format!("CSL code is missing essential node: {}", required),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Serialize the stored style, `style/info` in canonical order
    pub fn get_markup(&self, comment: Option<&str>) -> Result<String, EditorError> {
        let mut tree = self.get()?;
        reorder_style_info(&mut tree)?;
        Ok(self.codec.serialize(&tree, comment))
    }

    /// Make sure a style is loaded.
    ///
    /// Tries the configured initial markup first, keeps whatever is already
    /// stored, and otherwise fetches the default style from `source`.
    pub fn init(&mut self, source: &dyn StyleSource) -> Result<(), EditorError> {
        if let Some(markup) = self.options.initial_markup.clone() {
            match self.set_from_markup(&markup) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_user_error() => warn!("Ignoring initial markup: {}", e),
                Err(e) => return Err(e),
            }
        }

        if self.has_document()? {
            return Ok(());
        }

        let url = self
            .options
            .default_style_url
            .clone()
            .ok_or(EditorError::NoDefaultStyle)?;
        info!("Fetching default style from {}", url);
        let markup = source.fetch(&url)?;
        self.set_from_markup(&strip_comments(&markup))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_node(&self, id: usize) -> Result<Option<Node>, EditorError> {
        let tree = self.get()?;
        Ok(locate(&tree, id).map(|found| found.node.clone()))
    }

    pub fn get_node_and_parent(&self, id: usize) -> Result<Option<NodeAndParent>, EditorError> {
        let tree = self.get()?;
        Ok(locate(&tree, id).map(|found| NodeAndParent {
            node: found.node.clone(),
            parent: found.parent.cloned(),
        }))
    }

    /// Ancestors of `id`, root first, the node itself last
    pub fn get_node_stack(&self, id: usize) -> Result<Option<Vec<Node>>, EditorError> {
        let tree = self.get()?;
        Ok(locate(&tree, id).map(|found| found.stack.into_iter().cloned().collect()))
    }

    /// Names from the root to `id`, e.g. `style/citation/layout`
    pub fn get_node_path(&self, id: usize) -> Result<Option<String>, EditorError> {
        let tree = self.get()?;
        Ok(locate(&tree, id).map(|found| found.names_path()))
    }

    /// Position of `child_id` among the children of `parent_id`
    pub fn index_of_child(
        &self,
        child_id: usize,
        parent_id: usize,
    ) -> Result<Option<usize>, EditorError> {
        let tree = self.get()?;
        let index = locate(&tree, parent_id).and_then(|parent| {
            parent
                .node
                .children
                .iter()
                .position(|child| child.node_id == child_id)
        });
        Ok(index)
    }

    pub fn get_nodes_from_path(&self, path: &str) -> Result<Vec<Node>, EditorError> {
        let tree = self.get()?;
        let found = find_by_path(&tree, path)?;
        Ok(found.into_iter().cloned().collect())
    }

    /// Identity of the first node named `name` in document order
    pub fn get_first_id(&self, name: &str) -> Result<Option<usize>, EditorError> {
        let tree = self.get()?;
        let first = tree.traverse().find(|node| node.name == name);
        Ok(first.map(|node| node.node_id))
    }

    pub fn node_count(&self) -> Result<usize, EditorError> {
        Ok(self.get()?.count())
    }

    /// Identity edits aimed at `id` should go to (see [`macro_resolver::resolve_macro_target`])
    pub fn resolve_macro_target(&self, id: usize) -> Result<usize, EditorError> {
        let tree = self.get()?;
        Ok(macro_resolver::resolve_macro_target(&tree, id)?)
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    pub fn add_observer(&mut self, observer: Rc<dyn StyleObserver>) -> ObserverId {
        self.observers.add(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    pub fn notifications_enabled(&self) -> bool {
        self.observers.is_enabled()
    }

    pub(crate) fn emit(&self, event: StyleEvent) {
        self.observers.emit(&event);
    }

    /// Run a compound operation without notifying observers of its steps
    pub(crate) fn suppressed<T>(
        &mut self,
        operation: impl FnOnce(&mut Self) -> Result<T, EditorError>,
    ) -> Result<T, EditorError> {
        let previous = self.observers.set_enabled(false);
        let result = operation(self);
        self.observers.set_enabled(previous);
        result
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("version", &self.version)
            .field("options", &self.options)
            .field("observers", &self.observers)
            .finish()
    }
}

fn stamp_updated(tree: &mut Node) -> Result<(), EditorError> {
    let updated_id = find_by_path(tree, UPDATED_PATH)?
        .first()
        .map(|updated| updated.node_id);
    let path = updated_id.and_then(|id| locate(tree, id).map(|found| found.path));

    match path.as_deref().and_then(|path| tree.descendant_mut(path)) {
        Some(updated) => updated.text_value = Some(timestamp()),
        None => warn!("No {} node, leaving last-modified time alone", UPDATED_PATH),
    }
    Ok(())
}

/// Current UTC time as `2012-01-31T13:45:07+00:00`
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
}
