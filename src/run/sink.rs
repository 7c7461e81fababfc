use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::render::{self, CycleOutput};

/// Destination for each cycle's rendered output.
pub trait RenderSink: Send {
    fn publish(&mut self, output: &CycleOutput) -> Result<()>;
}

/// Writes a self-refreshing HTML document, replacing it atomically each cycle.
pub struct FileSink {
    path: PathBuf,
    refresh_secs: u64,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, refresh_secs: u64) -> Self {
        FileSink {
            path: path.into(),
            refresh_secs: refresh_secs.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RenderSink for FileSink {
    fn publish(&mut self, output: &CycleOutput) -> Result<()> {
        let doc = render::document(&render::page(output), self.refresh_secs);
        // Write beside the target then rename, so a reader never sees a partial page.
        let tmp = self.path.with_extension("html.tmp");
        std::fs::write(&tmp, doc).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

/// Keeps every published cycle in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub cycles: Vec<CycleOutput>,
}

impl RenderSink for MemorySink {
    fn publish(&mut self, output: &CycleOutput) -> Result<()> {
        self.cycles.push(output.clone());
        Ok(())
    }
}
