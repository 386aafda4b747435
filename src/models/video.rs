// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Sparse per-frame annotation storage for videos.
//!
//! Only frames the user actually visited and saved have a record. Records
//! are keyed by frame index; a sorted list of the keys is rebuilt after
//! every insert or removal, and navigation between labeled frames works on
//! positions in that list.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;

use crate::io::store::frame_annotation_path;
use crate::models::frame::FrameRecord;

/// Frame index shown at `millis` into a video playing at `fps`.
pub fn frame_index_at(millis: u64, fps: f64) -> Option<u32> {
    (fps > 0.0).then(|| ((millis as f64 / 1000.0) * fps) as u32)
}

/// Timestamp in milliseconds of `frame_index` for a video playing at `fps`.
pub fn millis_at(frame_index: u32, fps: f64) -> Option<u64> {
    (fps > 0.0).then(|| (frame_index as f64 * (1000.0 / fps)) as u64)
}

#[derive(Debug, Clone, Default)]
pub struct VideoFrameIndex {
    video_stem: String,
    records: HashMap<u32, FrameRecord>,
    sorted: Vec<u32>,
}

impl VideoFrameIndex {
    /// Empty index for the video whose file stem is `video_stem`.
    pub fn new(video_stem: impl Into<String>) -> Self {
        Self {
            video_stem: video_stem.into(),
            records: HashMap::new(),
            sorted: Vec::new(),
        }
    }

    pub fn video_stem(&self) -> &str {
        &self.video_stem
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Labeled frame indices in ascending order.
    pub fn frames(&self) -> &[u32] {
        &self.sorted
    }

    /// Insert or replace the record for its frame index. Returns the record
    /// it replaced.
    pub fn register(&mut self, record: FrameRecord) -> Option<FrameRecord> {
        let previous = self.records.insert(record.frame_index(), record);
        self.rebuild_sorted();
        previous
    }

    pub fn remove(&mut self, frame_index: u32) -> Option<FrameRecord> {
        let removed = self.records.remove(&frame_index);
        self.rebuild_sorted();
        removed
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.sorted.clear();
    }

    pub fn get(&self, frame_index: u32) -> Option<&FrameRecord> {
        self.records.get(&frame_index)
    }

    pub fn get_mut(&mut self, frame_index: u32) -> Option<&mut FrameRecord> {
        self.records.get_mut(&frame_index)
    }

    /// Record for `frame_index`, created empty with the given frame size on
    /// the first visit.
    pub fn get_or_create(&mut self, frame_index: u32, width: u32, height: u32) -> &mut FrameRecord {
        match self.records.entry(frame_index) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let position = self.sorted.partition_point(|&f| f < frame_index);
                self.sorted.insert(position, frame_index);
                entry.insert(FrameRecord::for_video_frame(
                    &self.video_stem,
                    frame_index,
                    width,
                    height,
                ))
            }
        }
    }

    /// Frame index stored at `position` of the sorted view.
    pub fn frame_at(&self, position: usize) -> Option<u32> {
        self.sorted.get(position).copied()
    }

    /// Record stored at `position` of the sorted view.
    pub fn record_at(&self, position: usize) -> Option<&FrameRecord> {
        self.frame_at(position).and_then(|f| self.records.get(&f))
    }

    /// Position of `frame_index` in the sorted view.
    pub fn find_exact(&self, frame_index: u32) -> Option<usize> {
        self.sorted.binary_search(&frame_index).ok()
    }

    /// Position of the greatest stored frame index `<= frame_index`.
    pub fn find_lower_closest(&self, frame_index: u32) -> Option<usize> {
        let upper = self.sorted.partition_point(|&f| f <= frame_index);
        upper.checked_sub(1)
    }

    /// Position of the smallest stored frame index `> frame_index`.
    pub fn find_upper_closest(&self, frame_index: u32) -> Option<usize> {
        let upper = self.sorted.partition_point(|&f| f <= frame_index);
        (upper < self.sorted.len()).then_some(upper)
    }

    /// Records in ascending frame order.
    pub fn iter(&self) -> impl Iterator<Item = &FrameRecord> {
        self.sorted.iter().filter_map(|f| self.records.get(f))
    }

    /// Save one labeled frame into `video_dir`.
    pub fn save_frame(&self, video_dir: &Path, frame_index: u32) -> Result<bool> {
        match self.records.get(&frame_index) {
            Some(record) => {
                record.save(&frame_annotation_path(video_dir, &self.video_stem, frame_index))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Save every labeled frame into `video_dir`, in ascending frame order.
    ///
    /// Stops at the first failure; frames written before it stay on disk.
    pub fn save_all(&self, video_dir: &Path) -> Result<()> {
        for record in self.iter() {
            record.save(&frame_annotation_path(
                video_dir,
                &self.video_stem,
                record.frame_index(),
            ))?;
        }
        Ok(())
    }

    fn rebuild_sorted(&mut self) {
        self.sorted = self.records.keys().copied().collect();
        self.sorted.sort_unstable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::load_video_dir;
    use tempfile::TempDir;

    fn index_with(frames: &[u32]) -> VideoFrameIndex {
        let mut index = VideoFrameIndex::new("clip");
        for &f in frames {
            index.register(FrameRecord::for_video_frame("clip", f, 320, 240));
        }
        index
    }

    fn linear_exact(sorted: &[u32], k: u32) -> Option<usize> {
        sorted.iter().position(|&f| f == k)
    }

    fn linear_lower(sorted: &[u32], k: u32) -> Option<usize> {
        sorted.iter().rposition(|&f| f <= k)
    }

    fn linear_upper(sorted: &[u32], k: u32) -> Option<usize> {
        sorted.iter().position(|&f| f > k)
    }

    #[test]
    fn test_register_scenario() {
        let index = index_with(&[30, 5, 12]);
        assert_eq!(index.frames(), [5, 12, 30]);
        assert_eq!(index.find_lower_closest(20), Some(1));
        assert_eq!(index.find_upper_closest(20), Some(2));
        assert_eq!(index.find_exact(12), Some(1));
        assert_eq!(index.find_exact(11), None);
        assert_eq!(index.frame_at(index.find_upper_closest(20).unwrap()), Some(30));
    }

    #[test]
    fn test_searches_match_linear_scan() {
        let sets: [&[u32]; 5] = [&[], &[7], &[0, 1, 2], &[3, 9, 10, 40, 41, 100], &[0, 1000]];
        for set in sets {
            let index = index_with(set);
            let sorted = index.frames().to_vec();
            for k in 0..=1001 {
                assert_eq!(index.find_exact(k), linear_exact(&sorted, k), "exact {k} in {set:?}");
                assert_eq!(index.find_lower_closest(k), linear_lower(&sorted, k), "lower {k} in {set:?}");
                assert_eq!(index.find_upper_closest(k), linear_upper(&sorted, k), "upper {k} in {set:?}");
            }
            assert_eq!(index.find_upper_closest(u32::MAX), None);
        }
    }

    #[test]
    fn test_empty_and_out_of_range() {
        let empty = VideoFrameIndex::new("clip");
        assert_eq!(empty.find_exact(0), None);
        assert_eq!(empty.find_lower_closest(10), None);
        assert_eq!(empty.find_upper_closest(10), None);

        let index = index_with(&[10, 20]);
        assert_eq!(index.find_lower_closest(9), None);
        assert_eq!(index.find_upper_closest(9), Some(0));
        assert_eq!(index.find_lower_closest(25), Some(1));
        assert_eq!(index.find_upper_closest(20), None);
    }

    #[test]
    fn test_remove_and_replace_keep_sorted_view_exact() {
        let mut index = index_with(&[5, 12, 30]);
        assert!(index.remove(12).is_some());
        assert_eq!(index.frames(), [5, 30]);
        assert!(index.remove(12).is_none());

        let replaced = index.register(FrameRecord::for_video_frame("clip", 5, 640, 480));
        assert_eq!(replaced.unwrap().width, 320);
        assert_eq!(index.frames(), [5, 30]);
        assert_eq!(index.get(5).unwrap().width, 640);
        assert_eq!(index.len(), index.frames().len());

        index.clear();
        assert!(index.is_empty() && index.frames().is_empty());
    }

    #[test]
    fn test_get_or_create_creates_once() {
        let mut index = index_with(&[2, 20]);
        index.get_or_create(8, 10, 10).width = 11;
        assert_eq!(index.get_or_create(8, 99, 99).width, 11);
        assert_eq!(index.frames(), [2, 8, 20]);
        let record = index.record_at(1).unwrap();
        assert_eq!(record.frame_index(), 8);
        assert_eq!(record.image_path(), "clip_0000008.jpeg");
    }

    #[test]
    fn test_save_all_then_reload() {
        let dir = TempDir::new().unwrap();
        let index = index_with(&[3, 1, 2]);
        let video_dir = dir.path().join("clip");
        index.save_all(&video_dir).unwrap();
        assert!(video_dir.join("clip_0000003.json").exists());
        assert!(!index.save_frame(&video_dir, 99).unwrap());

        let reloaded = load_video_dir(dir.path(), "clip.mp4");
        assert_eq!(reloaded.frames(), [1, 2, 3]);
        for (a, b) in index.iter().zip(reloaded.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_time_conversion() {
        assert_eq!(frame_index_at(1000, 30.0), Some(30));
        assert_eq!(frame_index_at(1500, 24.0), Some(36));
        assert_eq!(millis_at(30, 30.0), Some(1000));
        assert_eq!(frame_index_at(10, 0.0), None);
        assert_eq!(millis_at(10, -1.0), None);
    }
}
