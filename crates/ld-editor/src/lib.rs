pub mod editor;
pub mod input;
pub mod scene;
pub mod shortcuts;
pub mod text_edit;
pub mod tools;
pub mod viewport;

pub use editor::Editor;
pub use input::{InputEvent, Modifiers};
pub use scene::{SceneCommand, SceneModel};
pub use text_edit::{EditOutcome, TextEditSession, TextOverlay};
pub use tools::{SelectTool, ToolAction};
pub use viewport::Viewport;
