//! Rendering and storage collaborators.
//!
//! [`DocumentRenderer`] turns generated text into an [`Artifact`](forge_core::Artifact);
//! [`ArtifactStore`] puts it somewhere a user can download it. Both are plain
//! I/O seams: the generation saga treats any error from them as a failure that
//! must be compensated.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod outline;
mod renderer;
mod store;
mod supabase;

pub use filesystem::FilesystemArtifactStore;
pub use outline::{Block, Outline, OutlineMetadata, Section};
pub use renderer::{DocumentRenderer, MarkdownRenderer};
pub use store::ArtifactStore;
pub use supabase::SupabaseArtifactStore;
