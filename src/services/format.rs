//! Output naming service
//!
//! Every output is written as `{baseName}{suffix}.png` regardless of the
//! input's extension, since only PNG keeps the alpha channel.

use std::path::{Path, PathBuf};

/// Default suffix appended to the input's base name
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_nobg";

/// Default batch destination, created inside the source directory
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "no_background";

/// Naming policy for removal outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    suffix: String,
}

impl OutputNaming {
    pub fn new<S: Into<String>>(suffix: S) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Output file name for an input path, e.g. `cat.JPG` -> `cat_nobg.png`
    #[must_use]
    pub fn file_name_for(&self, input: &Path) -> String {
        let stem = input
            .file_stem()
            .map_or_else(|| "output".into(), |s| s.to_string_lossy());
        format!("{stem}{}.png", self.suffix)
    }

    /// Output path for `input` inside `directory`
    #[must_use]
    pub fn output_path_in(&self, input: &Path, directory: &Path) -> PathBuf {
        directory.join(self.file_name_for(input))
    }

    /// Output path next to the input file
    #[must_use]
    pub fn sibling_output_path(&self, input: &Path) -> PathBuf {
        let directory = input.parent().unwrap_or_else(|| Path::new(""));
        self.output_path_in(input, directory)
    }

    /// Default batch destination for `source`
    #[must_use]
    pub fn default_batch_destination(source: &Path) -> PathBuf {
        source.join(DEFAULT_OUTPUT_DIR_NAME)
    }
}

impl Default for OutputNaming {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_always_png() {
        let naming = OutputNaming::default();
        assert_eq!(naming.file_name_for(Path::new("photos/cat.JPG")), "cat_nobg.png");
        assert_eq!(naming.file_name_for(Path::new("dog.png")), "dog_nobg.png");
        assert_eq!(naming.file_name_for(Path::new("archive.tar.gif")), "archive.tar_nobg.png");
    }

    #[test]
    fn test_custom_suffix() {
        let naming = OutputNaming::new("-cutout");
        assert_eq!(naming.suffix(), "-cutout");
        assert_eq!(
            naming.output_path_in(Path::new("in/a.bmp"), Path::new("out")),
            PathBuf::from("out/a-cutout.png")
        );
    }

    #[test]
    fn test_sibling_output_path() {
        let naming = OutputNaming::default();
        assert_eq!(
            naming.sibling_output_path(Path::new("dir/sub/face.webp")),
            PathBuf::from("dir/sub/face_nobg.png")
        );
        assert_eq!(
            naming.sibling_output_path(Path::new("face.webp")),
            PathBuf::from("face_nobg.png")
        );
    }

    #[test]
    fn test_default_batch_destination() {
        assert_eq!(
            OutputNaming::default_batch_destination(Path::new("/data/in")),
            PathBuf::from("/data/in/no_background")
        );
    }
}
