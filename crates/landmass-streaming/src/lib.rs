//! Chunk streaming: chunk addressing, background generation workers, and the
//! [`ChunkManager`] state machine that keeps the chunks around a viewer
//! generated, meshed at the right LOD, and shown.

mod chunk;
mod coords;
mod manager;
mod settings;
mod sink;
mod worker;

pub use chunk::{ChunkPhase, HeightState, MeshState, TerrainChunk};
pub use coords::{ChunkBounds, ChunkCoord};
pub use manager::{ChunkManager, StreamingError, StreamingStats};
pub use settings::{GeneratorSettings, SettingsError, default_worker_count};
pub use sink::{CpuTextures, RenderSink, TextureMaterializer, TextureSource};
pub use worker::{GenerationWorkers, Job, JobOutput, JobRequest, JobResult, run_job};
