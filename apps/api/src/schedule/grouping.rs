use serde::{Deserialize, Serialize};

use crate::schedule::due::DueStatus;
use crate::schedule::tracks::HorseStatus;

/// Priority bucket on the horse list. Variants are declared in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Urgent,
    Soon,
    RhinoTodo,
    Ok,
}

impl Bucket {
    /// First matching rule wins:
    /// 1. any track overdue
    /// 2. any track due soon
    /// 3. influenza up to date but rhino never started
    /// 4. everything else
    pub fn classify(status: &HorseStatus) -> Bucket {
        let tracks = [status.influenza.status, status.rhino.status];

        if tracks.contains(&DueStatus::Overdue) {
            Bucket::Urgent
        } else if tracks.contains(&DueStatus::DueSoon) {
            Bucket::Soon
        } else if status.influenza.status == DueStatus::UpToDate && !status.rhino.has_doses() {
            Bucket::RhinoTodo
        } else {
            Bucket::Ok
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BucketCounts {
    pub urgent: usize,
    pub soon: usize,
    pub rhino_todo: usize,
    pub ok: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buckets<T> {
    pub urgent: Vec<T>,
    pub soon: Vec<T>,
    pub rhino_todo: Vec<T>,
    pub ok: Vec<T>,
}

impl<T> Default for Buckets<T> {
    fn default() -> Self {
        Self {
            urgent: Vec::new(),
            soon: Vec::new(),
            rhino_todo: Vec::new(),
            ok: Vec::new(),
        }
    }
}

impl<T> Buckets<T> {
    fn slot(&mut self, bucket: Bucket) -> &mut Vec<T> {
        match bucket {
            Bucket::Urgent => &mut self.urgent,
            Bucket::Soon => &mut self.soon,
            Bucket::RhinoTodo => &mut self.rhino_todo,
            Bucket::Ok => &mut self.ok,
        }
    }

    pub fn counts(&self) -> BucketCounts {
        BucketCounts {
            urgent: self.urgent.len(),
            soon: self.soon.len(),
            rhino_todo: self.rhino_todo.len(),
            ok: self.ok.len(),
            total: self.urgent.len() + self.soon.len() + self.rhino_todo.len() + self.ok.len(),
        }
    }
}

/// Places every item in exactly one bucket, keeping input order inside a bucket.
pub fn group_by_bucket<T, F>(items: Vec<T>, status_of: F) -> Buckets<T>
where
    F: Fn(&T) -> &HorseStatus,
{
    let mut buckets = Buckets::default();
    for item in items {
        let bucket = Bucket::classify(status_of(&item));
        buckets.slot(bucket).push(item);
    }
    buckets
}
