use crate::assets::CardAssets;
use crate::layout::LayoutConfig;
use crate::rendering::{Compositor, Rendered};
use crate::{Error, Result};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use tokio::sync::{oneshot, Semaphore};

enum Command {
    Render(Box<LayoutConfig>, f32, oneshot::Sender<Result<Rendered>>),
    Close(oneshot::Sender<()>),
}

/// An async-friendly render facade backed by a dedicated worker thread.
///
/// The worker owns the compositor and the assets; callers hand it a
/// snapshot of the layout and await the raster, so later edits to their
/// own `LayoutConfig` never race with a render in flight.
#[derive(Clone)]
pub struct RenderService {
    cmd_tx: Sender<Command>,
}

impl RenderService {
    /// Spawn the worker thread that owns `compositor` and `assets`.
    pub async fn new(compositor: Compositor, assets: CardAssets) -> Result<Self> {
        if assets.background().is_none() {
            return Err(Error::NoBackground);
        }

        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<()>();

        thread::Builder::new()
            .name("cardsmith-render".into())
            .spawn(move || {
                let _ = init_tx.send(());

                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        Command::Render(config, scale, resp) => {
                            let res = compositor.render(&config, &assets, scale);
                            let _ = resp.send(res);
                        }
                        Command::Close(resp) => {
                            let _ = resp.send(());
                            break;
                        }
                    }
                }
                log::debug!("Render worker stopped");
            })?;

        init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))?;

        Ok(Self { cmd_tx })
    }

    /// Render a snapshot of `config` at `scale`.
    pub async fn render(&self, config: &LayoutConfig, scale: f32) -> Result<Rendered> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Render(Box::new(config.clone()), scale, tx))
            .map_err(|_| Error::Other("Render worker is gone".into()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Render canceled: {}", e)))?
    }

    /// Shut the worker down. Other clones of the handle stop working too.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))
    }
}

/// One card of a batch: a layout snapshot, the assets it composites with
/// and the scale to render at
pub struct BatchJob {
    pub config: LayoutConfig,
    pub assets: Arc<CardAssets>,
    pub scale: f32,
}

/// Render independent jobs in parallel on blocking tasks, at most one per
/// CPU at a time. Results come back in job order.
pub async fn render_batch(compositor: Arc<Compositor>, jobs: Vec<BatchJob>) -> Vec<Result<Rendered>> {
    let limit = Arc::new(Semaphore::new(num_cpus::get().max(1)));
    log::info!("Rendering batch of {} cards", jobs.len());

    let tasks = jobs.into_iter().map(|job| {
        let compositor = Arc::clone(&compositor);
        let limit = Arc::clone(&limit);
        async move {
            let _permit = limit
                .acquire_owned()
                .await
                .map_err(|e| Error::Other(e.to_string()))?;
            tokio::task::spawn_blocking(move || compositor.render(&job.config, &job.assets, job.scale))
                .await
                .map_err(|e| Error::Other(format!("Render task failed: {}", e)))?
        }
    });

    futures::future::join_all(tasks).await
}
