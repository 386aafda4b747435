// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Work that runs off the interactive thread.
//!
//! A task runs a closure on its own thread and sends the single result back
//! through a channel. Each task carries the key of the item it was started
//! for (a file path, a video name); when the result arrives the owner passes
//! the key of the item it is showing now, and results for anything else are
//! dropped.

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, RecvError, TryRecvError};
use std::sync::Arc;

use anyhow::Result;
use image::DynamicImage;

use crate::io::media::decode_raster;
use crate::io::store::load_video_dir;
use crate::models::video::VideoFrameIndex;

/// Outcome of checking a task.
#[derive(Debug)]
pub enum TaskPoll<T> {
    Pending,
    Ready(T),
    /// The result belongs to an item the owner has moved away from.
    Stale,
    /// The worker ended without a result (it panicked), or the result was
    /// already taken.
    Lost,
}

impl<T> TaskPoll<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            TaskPoll::Ready(value) => Some(value),
            _ => None,
        }
    }
}

pub struct BackgroundTask<K, T> {
    key: K,
    receiver: Receiver<T>,
}

impl<K, T> BackgroundTask<K, T>
where
    K: PartialEq + Debug,
    T: Send + 'static,
{
    /// Run `work` on a new thread on behalf of `key`.
    pub fn spawn<F>(key: K, work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = channel();
        std::thread::spawn(move || {
            // The owner may have dropped the task already.
            let _ = sender.send(work());
        });
        Self { key, receiver }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    fn accept(&self, value: T, current: &K) -> TaskPoll<T> {
        if self.key == *current {
            TaskPoll::Ready(value)
        } else {
            log::debug!("Dropping result for {:?}, now showing {:?}", self.key, current);
            TaskPoll::Stale
        }
    }

    /// Non-blocking check.
    pub fn poll(&self, current: &K) -> TaskPoll<T> {
        match self.receiver.try_recv() {
            Ok(value) => self.accept(value, current),
            Err(TryRecvError::Empty) => TaskPoll::Pending,
            Err(TryRecvError::Disconnected) => TaskPoll::Lost,
        }
    }

    /// Block until the worker finishes.
    pub fn wait(self, current: &K) -> TaskPoll<T> {
        match self.receiver.recv() {
            Ok(value) => self.accept(value, current),
            Err(RecvError) => TaskPoll::Lost,
        }
    }
}

/// Decode `path` in the background, keyed by the path.
pub fn load_raster(path: PathBuf) -> BackgroundTask<PathBuf, Result<Arc<DynamicImage>>> {
    let source = path.clone();
    BackgroundTask::spawn(path, move || decode_raster(&source).map(Arc::new))
}

/// Rebuild the frame index of `video_name` in the background, keyed by the
/// video name.
pub fn scan_video(annotation_dir: PathBuf, video_name: String) -> BackgroundTask<String, VideoFrameIndex> {
    let name = video_name.clone();
    BackgroundTask::spawn(video_name, move || load_video_dir(&annotation_dir, &name))
}
