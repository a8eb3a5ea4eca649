use crate::audio::speaker::Speaker;
use crate::inspection::message::SafetyMessage;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

/// Something that can be asked to voice a safety message without waiting for it.
pub trait Announcer: Send + Sync {
    fn announce(&self, message: &SafetyMessage);
}

/// Submit-and-forget speech on a dedicated worker thread.
///
/// `announce` only enqueues. The worker speaks messages one at a time; a failing or panicking
/// speaker is logged and the worker moves on to the next message.
pub struct SpeechQueue {
    sender: Sender<String>,
    worker: JoinHandle<()>,
}

impl SpeechQueue {
    pub fn spawn<S: Speaker>(speaker: S) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<String>();
        let worker = thread::Builder::new()
            .name("speech-queue".into())
            .spawn(move || {
                for text in receiver {
                    match panic::catch_unwind(AssertUnwindSafe(|| speaker.speak(&text))) {
                        Ok(Ok(())) => log::debug!("spoke {} characters", text.len()),
                        Ok(Err(err)) => log::warn!("speech failed: {err}"),
                        Err(_) => log::error!("speech engine panicked"),
                    }
                }
            })?;
        Ok(SpeechQueue { sender, worker })
    }

    /// Queues `text` for speaking. Returns false if the worker is gone.
    pub fn submit(&self, text: impl Into<String>) -> bool {
        self.sender.send(text.into()).is_ok()
    }

    /// Stops accepting work and blocks until everything already queued has been spoken.
    pub fn shutdown(self) {
        drop(self.sender);
        if self.worker.join().is_err() {
            log::error!("speech worker exited abnormally");
        }
    }
}

impl Announcer for SpeechQueue {
    fn announce(&self, message: &SafetyMessage) {
        if !self.submit(message.as_str()) {
            log::warn!("speech queue is closed, dropping announcement");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpeechError;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Speaker for Recorder {
        fn speak(&self, text: &str) -> Result<(), SpeechError> {
            if text == "panic" {
                panic!("engine crashed");
            }
            if text == "fail" {
                return Err(SpeechError::Launch {
                    program: "recorder".into(),
                    source: std::io::Error::other("device busy"),
                });
            }
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn drains_queued_messages_in_order_on_shutdown() {
        let recorder = Recorder::default();
        let queue = SpeechQueue::spawn(recorder.clone()).unwrap();
        assert!(queue.submit("first"));
        assert!(queue.submit("second"));
        queue.shutdown();
        assert_eq!(*recorder.0.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn failures_and_panics_do_not_stop_the_worker() {
        let recorder = Recorder::default();
        let queue = SpeechQueue::spawn(recorder.clone()).unwrap();
        queue.submit("fail");
        queue.submit("panic");
        queue.submit("still speaking");
        queue.shutdown();
        assert_eq!(*recorder.0.lock().unwrap(), vec!["still speaking"]);
    }
}
