use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;

use super::{OutputSink, SinkError};

pub const IMAGE_EXTENSION: &str = "png";
pub const LOG_EXTENSION: &str = "txt";

/// Writes `<basename>.png` and `<basename>.txt` into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn image_path(&self, basename: &str) -> PathBuf {
        self.dir.join(format!("{basename}.{IMAGE_EXTENSION}"))
    }

    pub fn log_path(&self, basename: &str) -> PathBuf {
        self.dir.join(format!("{basename}.{LOG_EXTENSION}"))
    }

    fn ensure_dir(&self) -> Result<(), SinkError> {
        if !self.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

impl OutputSink for DirectorySink {
    fn display(&mut self, _image: &GrayImage) -> Result<(), SinkError> {
        Err(SinkError::Viewer(format!(
            "directory sink cannot display images (output dir: {})",
            self.dir.display()
        )))
    }

    fn persist(&mut self, image: &GrayImage, basename: &str) -> Result<(), SinkError> {
        self.ensure_dir()?;
        let path = self.image_path(basename);
        image.save(&path)?;
        log::info!("image written -> {}", path.display());
        Ok(())
    }

    fn persist_log(&mut self, lines: &[String], basename: &str) -> Result<(), SinkError> {
        self.ensure_dir()?;
        let path = self.log_path(basename);
        let mut text = lines.join("\n");
        text.push('\n');
        fs::write(&path, text)?;
        log::info!("input log written -> {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};
    use tempfile::TempDir;

    use super::DirectorySink;
    use crate::sink::{OutputSink, SinkError};

    #[test]
    fn persist_writes_png_and_log() {
        let temp = TempDir::new().unwrap();
        let mut sink = DirectorySink::new(temp.path().join("out"));
        let image = GrayImage::from_pixel(160, 8, Luma([85]));

        sink.persist(&image, "20260101-000000-0000").unwrap();
        sink.persist_log(
            &["!{\"command\":\"INIT\"}".to_string(), "# done".to_string()],
            "20260101-000000-0000",
        )
        .unwrap();

        let decoded = image::open(sink.image_path("20260101-000000-0000"))
            .unwrap()
            .to_luma8();
        assert_eq!(decoded.dimensions(), (160, 8));
        assert_eq!(decoded.get_pixel(3, 3).0, [85]);

        let log = std::fs::read_to_string(sink.log_path("20260101-000000-0000")).unwrap();
        assert_eq!(log, "!{\"command\":\"INIT\"}\n# done\n");
    }

    #[test]
    fn display_is_unsupported() {
        let mut sink = DirectorySink::new(".");
        let err = sink.display(&GrayImage::new(1, 1)).unwrap_err();
        assert!(matches!(err, SinkError::Viewer(_)));
    }
}
