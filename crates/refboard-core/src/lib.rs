//! RefBoard Core Library
//!
//! Platform-agnostic document model and interaction logic for a freeform
//! reference board: images, text, sticky notes and canvas groups on
//! multiple boards, with undo history and persistence.

pub mod align;
pub mod board;
pub mod camera;
pub mod config;
pub mod editor;
pub mod history;
pub mod input;
pub mod items;
pub mod scene;
pub mod selection;
pub mod shortcuts;
pub mod storage;
pub mod tools;
pub mod upload;

pub use align::{AlignMode, DistributeMode};
pub use board::{Board, BoardId, Snapshot};
pub use camera::Viewport;
pub use config::EditorConfig;
pub use editor::{Editor, InteractionState, Notice, NoticeLevel};
pub use history::History;
pub use input::{InputState, KeyEvent, KeyPress, Modifiers, MouseButton, PointerEvent};
pub use items::{CanvasGroup, ImageFormat, ImageItem, ItemId, ItemKind, ItemPatch, SceneItem, StickyNote, TextItem};
pub use scene::{Scene, SceneError, SceneResult};
pub use selection::{Corner, Handle, Selection};
pub use shortcuts::{Command, ShortcutRegistry};
pub use storage::{AutoSaveManager, BlobStore, LoadSource, LoadedScene, Persistence, StorageError};
pub use tools::{ToolKind, ToolManager};
pub use upload::{AssetUploader, PendingUpload, UploadError};
