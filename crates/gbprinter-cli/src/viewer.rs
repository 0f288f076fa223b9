use std::path::PathBuf;
use std::process::Command;

use gbprinter_core::{DirectorySink, OutputSink, SinkError};
use image::GrayImage;

#[cfg(target_os = "macos")]
pub const DEFAULT_VIEWER: &str = "open";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_VIEWER: &str = "xdg-open";

/// Shows images through an external viewer; persisting goes to a directory.
pub struct ViewerSink {
    viewer: String,
    scratch: PathBuf,
    shown: u32,
    directory: DirectorySink,
}

impl ViewerSink {
    pub fn new(viewer: String, directory: DirectorySink) -> Self {
        Self {
            viewer,
            scratch: std::env::temp_dir(),
            shown: 0,
            directory,
        }
    }
}

impl OutputSink for ViewerSink {
    fn display(&mut self, image: &GrayImage) -> Result<(), SinkError> {
        let path = self.scratch.join(format!(
            "gbprinter-{}-{:04}.png",
            std::process::id(),
            self.shown
        ));
        image.save(&path)?;
        let status = Command::new(&self.viewer)
            .arg(&path)
            .status()
            .map_err(|err| {
                SinkError::Viewer(format!("failed to launch '{}': {}", self.viewer, err))
            })?;
        if !status.success() {
            return Err(SinkError::Viewer(format!(
                "'{}' exited with {}",
                self.viewer, status
            )));
        }
        self.shown += 1;
        log::info!("showing {}", path.display());
        Ok(())
    }

    fn persist(&mut self, image: &GrayImage, basename: &str) -> Result<(), SinkError> {
        self.directory.persist(image, basename)
    }

    fn persist_log(&mut self, lines: &[String], basename: &str) -> Result<(), SinkError> {
        self.directory.persist_log(lines, basename)
    }
}
