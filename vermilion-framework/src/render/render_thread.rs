use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

pub type RenderWork = Box<dyn FnOnce() + Send>;

enum Message {
    Work {
        work: RenderWork,
        completion: Option<RenderWork>,
        done: Option<Sender<()>>,
    },
    Stop,
}

/// A dedicated thread consuming a work queue posted from the main/game thread.
///
/// Synchronous posts block the caller until the render thread signals completion;
/// asynchronous posts return immediately, optionally with a completion callback
/// invoked on the render thread. Posting from the render thread itself executes the
/// work inline, so the render thread can safely re-enter its own queue API.
pub struct RenderThread {
    sender: Sender<Message>,
    join_handle: Option<JoinHandle<()>>,
    thread_id: std::thread::ThreadId,
    stopping: Arc<AtomicBool>,
}

impl RenderThread {
    pub fn start() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded::<Message>();
        let (id_tx, id_rx) = crossbeam_channel::bounded(1);
        let stopping = Arc::new(AtomicBool::new(false));

        let worker_stopping = stopping.clone();
        let join_handle = std::thread::Builder::new()
            .name("vermilion-render".to_string())
            .spawn(move || {
                let _ = id_tx.send(std::thread::current().id());
                Self::run(receiver, worker_stopping);
            })
            .expect("failed to spawn the render thread");

        let thread_id = id_rx
            .recv()
            .expect("render thread died before reporting its id");

        RenderThread {
            sender,
            join_handle: Some(join_handle),
            thread_id,
            stopping,
        }
    }

    fn run(
        receiver: Receiver<Message>,
        stopping: Arc<AtomicBool>,
    ) {
        while let Ok(message) = receiver.recv() {
            match message {
                Message::Work {
                    work,
                    completion,
                    done,
                } => {
                    // Once stop is requested, pending work is dropped, not executed
                    if !stopping.load(Ordering::Acquire) {
                        profiling::scope!("RenderThread::work");
                        work();
                        if let Some(completion) = completion {
                            completion();
                        }
                    }
                    if let Some(done) = done {
                        let _ = done.send(());
                    }
                }
                Message::Stop => break,
            }
        }
    }

    pub fn is_render_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Executes `work` on the render thread and blocks until it completes. Runs
    /// inline when called from the render thread itself.
    pub fn post_sync<'env, F>(
        &self,
        work: F,
    ) where
        F: FnOnce() + Send + 'env,
    {
        if self.is_render_thread() {
            work();
            return;
        }

        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        // The work does not escape this stack frame; the done channel guarantees it
        let work: Box<dyn FnOnce() + Send + 'env> = Box::new(work);
        let work: RenderWork = unsafe {
            std::mem::transmute::<Box<dyn FnOnce() + Send + 'env>, RenderWork>(work)
        };

        if self
            .sender
            .send(Message::Work {
                work,
                completion: None,
                done: Some(done_tx),
            })
            .is_ok()
        {
            let _ = done_rx.recv();
        }
    }

    /// Queues `work` for the render thread and returns immediately.
    pub fn post_async<F>(
        &self,
        work: F,
    ) where
        F: FnOnce() + Send + 'static,
    {
        if self.is_render_thread() {
            work();
            return;
        }

        let _ = self.sender.send(Message::Work {
            work: Box::new(work),
            completion: None,
            done: None,
        });
    }

    /// Queues `work` for the render thread; `completion` is invoked on the render
    /// thread after the work finishes.
    pub fn post_async_with_callback<F, C>(
        &self,
        work: F,
        completion: C,
    ) where
        F: FnOnce() + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        if self.is_render_thread() {
            work();
            completion();
            return;
        }

        let _ = self.sender.send(Message::Work {
            work: Box::new(work),
            completion: Some(Box::new(completion)),
            done: None,
        });
    }

    /// Stops the render thread. Pending queued work is dropped without executing;
    /// work already running completes first. In-flight GPU submissions are not
    /// cancelled.
    pub fn stop(&mut self) {
        if self.join_handle.is_none() {
            return;
        }

        self.stopping.store(true, Ordering::Release);
        let _ = self.sender.send(Message::Stop);
        if let Some(join_handle) = self.join_handle.take() {
            let _ = join_handle.join();
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn post_sync_blocks_until_complete() {
        let thread = RenderThread::start();
        let mut value = 0;
        thread.post_sync(|| value = 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn post_async_runs_on_the_render_thread() {
        let thread = RenderThread::start();
        let ran_on_render_thread = Arc::new(AtomicBool::new(false));

        let flag = ran_on_render_thread.clone();
        let main_id = std::thread::current().id();
        thread.post_async(move || {
            flag.store(std::thread::current().id() != main_id, Ordering::Release);
        });

        // Synchronous barrier to flush the queue
        thread.post_sync(|| {});
        assert!(ran_on_render_thread.load(Ordering::Acquire));
    }

    #[test]
    fn completion_callback_runs_after_the_work() {
        let thread = RenderThread::start();
        let sequence = Arc::new(AtomicU32::new(0));

        let work_sequence = sequence.clone();
        let completion_sequence = sequence.clone();
        thread.post_async_with_callback(
            move || {
                work_sequence
                    .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
                    .unwrap();
            },
            move || {
                completion_sequence
                    .compare_exchange(1, 2, Ordering::AcqRel, Ordering::Acquire)
                    .unwrap();
            },
        );

        thread.post_sync(|| {});
        assert_eq!(sequence.load(Ordering::Acquire), 2);
    }

    #[test]
    fn posting_from_the_render_thread_runs_inline() {
        let thread = Arc::new(RenderThread::start());
        let ran = Arc::new(AtomicBool::new(false));

        let thread_clone = thread.clone();
        let ran_clone = ran.clone();
        thread.post_sync(move || {
            assert!(thread_clone.is_render_thread());
            // Would deadlock if this did not execute inline
            let inner_ran = ran_clone.clone();
            thread_clone.post_sync(move || inner_ran.store(true, Ordering::Release));
        });

        assert!(ran.load(Ordering::Acquire));
    }

    #[test]
    fn stop_drops_pending_work() {
        let mut thread = RenderThread::start();
        let executed = Arc::new(AtomicU32::new(0));

        // Stall the queue so pending work piles up behind the running item
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(1);
        thread.post_async(move || {
            let _ = gate_rx.recv();
        });
        for _ in 0..16 {
            let executed = executed.clone();
            thread.post_async(move || {
                executed.fetch_add(1, Ordering::AcqRel);
            });
        }

        // Open the gate once stop() has requested shutdown; the worker then drains
        // the queue without executing the dropped items
        let opener = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            let _ = gate_tx.send(());
        });
        thread.stop();
        opener.join().unwrap();

        assert_eq!(executed.load(Ordering::Acquire), 0);
    }
}
