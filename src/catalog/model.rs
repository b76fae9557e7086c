//! Catalog data model: remote file nodes, file types and format tokens.

use std::fmt;

use serde::Deserialize;

/// Declared type of a remote catalog entry.
///
/// The set is closed; unrecognized tags land in [`FileType::Other`] with the
/// original tag preserved for logging.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Whiteboard. Not exportable.
    Board,
    /// Form. Not exportable.
    Form,
    /// Mind map, converted to `xmind`.
    Mindmap,
    /// Slide deck, exported as `pptx`.
    Slide,
    /// Spreadsheet, exported as `xlsx`.
    Mosheet,
    /// Office-style document, exported as `docx`.
    Modoc,
    /// Rich-text document, exported as Markdown.
    Newdoc,
    /// Uploaded spreadsheet, downloaded as-is.
    Xls,
    /// Uploaded PDF, downloaded as-is.
    Pdf,
    /// Uploaded image, downloaded as-is.
    Img,
    /// A folder.
    Folder,
    /// Any other tag reported by the service.
    Other(String),
}

impl FileType {
    /// Parses a type tag as reported by the catalog.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "board" => Self::Board,
            "form" => Self::Form,
            "mindmap" => Self::Mindmap,
            "slide" => Self::Slide,
            "mosheet" => Self::Mosheet,
            "modoc" => Self::Modoc,
            "newdoc" => Self::Newdoc,
            "xls" => Self::Xls,
            "pdf" => Self::Pdf,
            "img" => Self::Img,
            "folder" => Self::Folder,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the wire tag for this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Board => "board",
            Self::Form => "form",
            Self::Mindmap => "mindmap",
            Self::Slide => "slide",
            Self::Mosheet => "mosheet",
            Self::Modoc => "modoc",
            Self::Newdoc => "newdoc",
            Self::Xls => "xls",
            Self::Pdf => "pdf",
            Self::Img => "img",
            Self::Folder => "folder",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target format passed to the export and conversion endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatToken {
    /// `PowerPoint` deck.
    Pptx,
    /// Excel workbook.
    Xlsx,
    /// Word document.
    Docx,
    /// Markdown.
    Md,
    /// `XMind` mind map.
    Xmind,
}

impl FormatToken {
    /// Returns the token as sent on the wire; also used as the file extension.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pptx => "pptx",
            Self::Xlsx => "xlsx",
            Self::Docx => "docx",
            Self::Md => "md",
            Self::Xmind => "xmind",
        }
    }
}

impl fmt::Display for FormatToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remote catalog entry, file or folder.
///
/// Only the fields the exporter consumes are modelled; everything else in the
/// listing payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawFileNode")]
pub struct FileNode {
    /// Stable remote identifier.
    pub guid: String,
    /// Display name, used as the local file or directory name.
    pub name: String,
    /// Declared type.
    pub file_type: FileType,
    /// Whether this entry is a folder.
    pub is_folder: bool,
    /// Direct download URL, present for raw uploaded files.
    pub download_url: Option<String>,
}

impl FileNode {
    /// Creates a file node of the given type.
    #[must_use]
    pub fn file(guid: impl Into<String>, name: impl Into<String>, file_type: FileType) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            file_type,
            is_folder: false,
            download_url: None,
        }
    }

    /// Creates a folder node.
    #[must_use]
    pub fn folder(guid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            file_type: FileType::Folder,
            is_folder: true,
            download_url: None,
        }
    }

    /// Sets the direct download URL.
    #[must_use]
    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }
}

/// Folder flag as sent by the service: either a JSON bool or a legacy 0/1 integer.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum FolderFlag {
    Bool(bool),
    Int(i64),
}

impl FolderFlag {
    fn is_set(self) -> bool {
        match self {
            Self::Bool(value) => value,
            Self::Int(value) => value != 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFileNode {
    guid: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    file_type: Option<String>,
    #[serde(default)]
    is_folder: Option<FolderFlag>,
    #[serde(rename = "is_folder", default)]
    legacy_is_folder: Option<FolderFlag>,
    #[serde(default)]
    download_url: Option<String>,
}

impl From<RawFileNode> for FileNode {
    fn from(raw: RawFileNode) -> Self {
        let file_type = raw
            .file_type
            .as_deref()
            .map_or_else(|| FileType::Other(String::new()), FileType::from_tag);
        let flagged = raw
            .is_folder
            .or(raw.legacy_is_folder)
            .is_some_and(FolderFlag::is_set);
        Self {
            is_folder: flagged || file_type == FileType::Folder,
            guid: raw.guid,
            name: raw.name,
            file_type,
            download_url: raw.download_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Folder metadata returned by the folder-info endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FolderInfo {
    /// Remote identifier (may be absent in some payloads).
    #[serde(default)]
    pub guid: String,
    /// Display name.
    pub name: String,
}
