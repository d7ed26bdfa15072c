//! 异步请求的过期丢弃
//!
//! 每类请求只认最新发出的 req_id；切歌后旧曲目的歌词 / 译文响应在这里被丢掉。

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
pub struct RequestTracker<K> {
    next_id: u64,
    pending: HashMap<K, u64>,
}

impl<K: Eq + Hash> Default for RequestTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> RequestTracker<K> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: HashMap::new(),
        }
    }

    /// 分配一个新的 req_id 并记为该 key 的最新请求
    pub fn issue(&mut self, key: K) -> u64 {
        let id = self.next_id();
        self.pending.insert(key, id);
        id
    }

    /// 分配 req_id，但不登记（不需要去重的请求，例如播放控制）
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// req_id 是该 key 的最新请求时返回 true，并清除 pending
    pub fn accept(&mut self, key: &K, req_id: u64) -> bool {
        match self.pending.get(key) {
            Some(&pending_id) if pending_id == req_id => {
                self.pending.remove(key);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self, key: &K) {
        self.pending.remove(key);
    }

    /// 注销时丢弃所有在途请求
    pub fn reset_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKey {
    Playback,
    Profile,
    Lyrics,
    Translation,
}
