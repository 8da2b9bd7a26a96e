//! Background generation workers.
//!
//! Height and mesh jobs run on a pool of named threads. Completed results go
//! to an unbounded FIFO channel that the update thread drains once per tick,
//! so results are applied in completion order and exactly once. With zero
//! threads a job runs at submission and its result waits in the same channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::DVec2;
use landmass_mesh::{MeshData, MeshError};
use landmass_terrain::{ColorMap, HeightMap};

use crate::coords::ChunkCoord;
use crate::settings::GeneratorSettings;

/// Work for one chunk.
#[derive(Clone, Debug)]
pub enum Job {
    /// Build the height and colour maps centered on `origin`.
    Height { coord: ChunkCoord, origin: DVec2 },
    /// Mesh an existing height map at `lod`.
    Mesh {
        coord: ChunkCoord,
        lod: u32,
        map: Arc<HeightMap>,
    },
}

/// A job tagged with the configuration generation it belongs to.
#[derive(Clone, Debug)]
pub struct JobRequest {
    pub epoch: u64,
    pub settings: Arc<GeneratorSettings>,
    pub job: Job,
}

/// Output of a finished job.
#[derive(Debug)]
pub enum JobOutput {
    Height {
        coord: ChunkCoord,
        map: Arc<HeightMap>,
        colors: Arc<ColorMap>,
    },
    Mesh {
        coord: ChunkCoord,
        lod: u32,
        mesh: Result<Arc<MeshData>, MeshError>,
    },
}

impl JobOutput {
    pub fn coord(&self) -> ChunkCoord {
        match self {
            Self::Height { coord, .. } | Self::Mesh { coord, .. } => *coord,
        }
    }
}

/// A finished job, ready to be applied on the update thread.
#[derive(Debug)]
pub struct JobResult {
    pub epoch: u64,
    pub output: JobOutput,
    /// Time spent generating, in microseconds.
    pub elapsed_us: u64,
}

/// Run one job synchronously.
pub fn run_job(request: JobRequest) -> JobResult {
    let start = Instant::now();
    let settings = &request.settings;
    let output = match request.job {
        Job::Height { coord, origin } => {
            let map = settings.heights.build(origin);
            let colors = settings.classifier.color_map(&map);
            JobOutput::Height {
                coord,
                map: Arc::new(map),
                colors: Arc::new(colors),
            }
        }
        Job::Mesh { coord, lod, map } => JobOutput::Mesh {
            coord,
            lod,
            mesh: settings.mesher.build(&map, lod).map(Arc::new),
        },
    };
    let elapsed_us = start.elapsed().as_micros() as u64;
    tracing::trace!(coord = ?output.coord(), elapsed_us, "generation job finished");

    JobResult {
        epoch: request.epoch,
        output,
        elapsed_us,
    }
}

/// A pool of generation threads plus the result queue.
pub struct GenerationWorkers {
    /// Channel sender for submitting jobs; `None` runs jobs inline.
    task_sender: Option<Sender<JobRequest>>,
    /// Kept so shutdown can discard jobs no worker has picked up yet.
    task_receiver: Option<Receiver<JobRequest>>,
    /// Used by inline execution to queue results.
    result_sender: Sender<JobResult>,
    /// Channel receiver for collecting completed results on the update thread.
    result_receiver: Receiver<JobResult>,
    /// Handles to the worker threads (for shutdown).
    worker_handles: Vec<JoinHandle<()>>,
    /// Current number of queued or executing jobs.
    in_flight: Arc<AtomicUsize>,
}

impl GenerationWorkers {
    /// Spawn `thread_count` workers. Zero selects inline execution.
    pub fn new(thread_count: usize) -> std::io::Result<Self> {
        let (result_sender, result_receiver) = unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        if thread_count == 0 {
            return Ok(Self {
                task_sender: None,
                task_receiver: None,
                result_sender,
                result_receiver,
                worker_handles: Vec::new(),
                in_flight,
            });
        }

        let (task_sender, task_receiver) = unbounded::<JobRequest>();
        let mut worker_handles = Vec::with_capacity(thread_count);
        for index in 0..thread_count {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let flight = Arc::clone(&in_flight);

            let handle = std::thread::Builder::new()
                .name(format!("terrain-gen-{index}"))
                .spawn(move || {
                    while let Ok(request) = receiver.recv() {
                        let result = run_job(request);
                        // Receiver gone means the pool is being torn down.
                        let _ = sender.send(result);
                        flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
            worker_handles.push(handle);
        }
        tracing::debug!(threads = thread_count, "generation workers started");

        Ok(Self {
            task_sender: Some(task_sender),
            task_receiver: Some(task_receiver),
            result_sender,
            result_receiver,
            worker_handles,
            in_flight,
        })
    }

    /// Returns `true` when jobs run on the submitting thread.
    pub fn is_inline(&self) -> bool {
        self.task_sender.is_none()
    }

    pub fn thread_count(&self) -> usize {
        self.worker_handles.len()
    }

    /// Queue a job. Its result appears in a later [`drain_results`](Self::drain_results).
    pub fn submit(&self, request: JobRequest) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        let request = match &self.task_sender {
            Some(sender) => match sender.send(request) {
                Ok(()) => return,
                Err(err) => err.into_inner(),
            },
            None => request,
        };

        let result = run_job(request);
        let _ = self.result_sender.send(result);
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    /// Drain all completed results, oldest first.
    ///
    /// Call this once per tick on the update thread.
    pub fn drain_results(&self) -> Vec<JobResult> {
        self.result_receiver.try_iter().collect()
    }

    /// Number of jobs queued or executing on worker threads.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Shut down all worker threads.
    ///
    /// Drops the task sender and discards queued jobs, so each worker exits
    /// after at most the job it is running. Then joins all threads.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        if let Some(receiver) = self.task_receiver.take() {
            let discarded = receiver.try_iter().count();
            if discarded > 0 {
                self.in_flight.fetch_sub(discarded, Ordering::Relaxed);
                tracing::debug!(discarded, "queued generation jobs dropped at shutdown");
            }
        }
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for GenerationWorkers {
    fn drop(&mut self) {
        self.shutdown();
    }
}
