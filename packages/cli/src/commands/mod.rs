pub mod apply;
pub mod normalize;
pub mod query;
pub mod tree;

pub use apply::{apply, ApplyArgs};
pub use normalize::{normalize, NormalizeArgs};
pub use query::{query, QueryArgs};
pub use tree::{tree, TreeArgs};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csledit_editor::{Document, EditorOptions, MemoryStorage};

/// Load a style file into a memory-backed document
pub(crate) fn open(path: &Path, options: EditorOptions) -> Result<Document> {
    let markup = fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;

    let mut doc = Document::new(Box::new(MemoryStorage::new()), options);
    doc.set_from_markup(&markup)?;
    Ok(doc)
}

/// Write to `output` if given, stdout otherwise
pub(crate) fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)
                .with_context(|| format!("Cannot write {}", path.display()))
        }
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const STYLE: &str = r#"<style class="in-text" version="1.0">
  <info>
    <id>http://example.org/styles/example</id>
    <title>Example Style</title>
  </info>
  <macro name="author">
    <names variable="author"/>
  </macro>
  <citation>
    <layout delimiter="; ">
      <text macro="author"/>
    </layout>
  </citation>
</style>
"#;

    pub fn style_file(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("example.csl");
        std::fs::write(&path, STYLE).unwrap();
        path
    }
}
