use crossterm::event::{self, KeyEvent};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::packages::StatusUpdate;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    Tick,
    /// A package status settled; redraw
    Status(StatusUpdate),
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Poll the terminal on a background thread and, if given, forward
    /// status updates from the resolver into the same stream.
    pub fn new(tick_rate: Duration, status_rx: Option<mpsc::UnboundedReceiver<StatusUpdate>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        std::thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    let forwarded = match event::read() {
                        Ok(event::Event::Key(key)) => event_tx.send(Event::Key(key)),
                        Ok(event::Event::Resize(_, _)) => event_tx.send(Event::Resize),
                        _ => Ok(()),
                    };
                    if forwarded.is_err() {
                        break;
                    }
                } else if event_tx.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        if let Some(mut status_rx) = status_rx {
            let status_tx = tx.clone();
            tokio::spawn(async move {
                while let Some(update) = status_rx.recv().await {
                    if status_tx.send(Event::Status(update)).is_err() {
                        break;
                    }
                }
            });
        }

        Self { rx, _tx: tx }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
