use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::ids::MovieId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageKind {
    Backdrop,
    Poster,
    Logo,
}

impl ImageKind {
    pub const ALL: [ImageKind; 3] =
        [ImageKind::Backdrop, ImageKind::Poster, ImageKind::Logo];

    pub fn as_str(self) -> &'static str {
        match self {
            ImageKind::Backdrop => "backdrop",
            ImageKind::Poster => "poster",
            ImageKind::Logo => "logo",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "backdrop" => Ok(ImageKind::Backdrop),
            "poster" => Ok(ImageKind::Poster),
            "logo" => Ok(ImageKind::Logo),
            other => Err(format!("unknown image kind '{other}'")),
        }
    }
}

/// Image metadata keyed by its remote file path (e.g. `/kXfq.jpg`).
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub file_path: String,
    pub kind: ImageKind,
    pub width: i32,
    pub height: i32,
    pub aspect_ratio: f64,
    /// ISO 639-1 language tag; `None` for language-neutral artwork.
    pub language: Option<String>,
    pub vote_average: f64,
    pub vote_count: i64,
}

/// One movie → image association that the asset fetcher can materialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetRef {
    pub movie_id: MovieId,
    pub file_path: String,
}

impl AssetRef {
    pub fn new(movie_id: MovieId, file_path: impl Into<String>) -> Self {
        Self {
            movie_id,
            file_path: file_path.into(),
        }
    }

    /// Resolve the on-disk location of this asset under `root`.
    ///
    /// Returns `None` for empty paths and for paths that would escape `root`.
    pub fn local_path(&self, root: &Path) -> Option<PathBuf> {
        let relative = Path::new(self.file_path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return None;
        }
        let clean = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        clean.then(|| root.join(relative))
    }
}
