use crossbeam_channel::{unbounded, Receiver, Sender};
use log::trace;

use crate::scene::{EntityId, Shape, ShapeKind, ShapeParams};

/// Cross-thread entry point for adding shapes.
///
/// Cheap to clone and safe to move into worker threads. It only builds the
/// plain [`Shape`] record; GPU allocation happens later on the render thread.
#[derive(Debug, Clone)]
pub struct ShapeSubmitter {
    sender: Sender<Shape>,
}

impl ShapeSubmitter {
    /// Queue a new shape and return its id. Never blocks.
    ///
    /// If the owning renderer is gone the record is dropped silently.
    pub fn request_add_shape(&self, kind: ShapeKind, params: ShapeParams) -> EntityId {
        let shape = Shape::new(kind, params);
        let id = shape.id();
        if self.sender.send(shape).is_err() {
            trace!("Renderer dropped, discarding shape {id}");
        }
        id
    }
}

/// Receiving half of the pending queue, owned by a renderer.
#[derive(Debug)]
pub(crate) struct PendingQueue {
    sender: Sender<Shape>,
    receiver: Receiver<Shape>,
}

impl PendingQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn submitter(&self) -> ShapeSubmitter {
        ShapeSubmitter {
            sender: self.sender.clone(),
        }
    }

    pub fn push(&self, shape: Shape) {
        // The receiver lives in self, so this cannot disconnect
        let _ = self.sender.send(shape);
    }

    /// Everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<Shape> {
        self.receiver.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_fifo_order() {
        let queue = PendingQueue::new();
        let submitter = queue.submitter();
        let a = submitter.request_add_shape(ShapeKind::Box, ShapeParams::default());
        let b = submitter.request_add_shape(ShapeKind::Disc, ShapeParams::default());

        assert_eq!(queue.len(), 2);
        let drained: Vec<_> = queue.drain().iter().map(|s| s.id()).collect();
        assert_eq!(drained, vec![a, b]);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn submitter_outliving_queue_is_harmless() {
        let queue = PendingQueue::new();
        let submitter = queue.submitter();
        drop(queue);
        submitter.request_add_shape(ShapeKind::Triangle, ShapeParams::default());
    }

    #[test]
    fn submitter_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<ShapeSubmitter>();
    }
}
