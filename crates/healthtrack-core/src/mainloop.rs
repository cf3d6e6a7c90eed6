//! Single-owner dispatch loop.
//!
//! Background work (sensor readers, network calls) never touches the
//! application state directly. It posts closures through a [`Poster`], and
//! the thread that owns the [`MainLoop`] runs them against its context.

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

type Callback<C> = Box<dyn FnOnce(&mut C) + Send>;

/// Cloneable handle for posting work to a [`MainLoop`].
pub struct Poster<C> {
    tx: UnboundedSender<Callback<C>>,
}

impl<C> Clone for Poster<C> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<C> Poster<C> {
    /// Queue `f` to run on the main loop. Returns false once the loop is gone.
    pub fn post<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.tx.send(Box::new(f)).is_ok()
    }
}

pub struct MainLoop<C> {
    context: C,
    tx: UnboundedSender<Callback<C>>,
    rx: UnboundedReceiver<Callback<C>>,
}

impl<C> MainLoop<C> {
    pub fn new(context: C) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { context, tx, rx }
    }

    pub fn poster(&self) -> Poster<C> {
        Poster { tx: self.tx.clone() }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Run everything already queued, without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        loop {
            match self.rx.try_recv() {
                Ok(callback) => {
                    callback(&mut self.context);
                    ran += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return ran,
            }
        }
    }

    /// Wait for at least one callback, then drain the rest.
    pub async fn run_next(&mut self) -> usize {
        match self.rx.recv().await {
            Some(callback) => {
                callback(&mut self.context);
                1 + self.run_pending()
            }
            None => 0,
        }
    }

    /// Run callbacks until `done` returns true for the context.
    pub async fn run_until(&mut self, mut done: impl FnMut(&C) -> bool) {
        while !done(&self.context) {
            if self.run_next().await == 0 {
                return;
            }
        }
    }

    pub fn into_context(self) -> C {
        self.context
    }
}
