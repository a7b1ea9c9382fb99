//! Capacity and placement metrics derived from collected disks and volumes.

use super::types::{ByteSize, Disk, DiskPool, Robustness, Volume, VolumeState};

/// Percentage of a disk's capacity in use.
///
/// Returns 0 when `maximum` is not positive. `available` is clamped into
/// `[0, maximum]` so the result always lies in `[0, 100]`.
pub fn percent_used(maximum: ByteSize, available: ByteSize) -> f64 {
    let max = maximum.as_f64();
    if !(max > 0.0) {
        return 0.0;
    }
    let available = available.as_f64().clamp(0.0, max);
    100.0 * (max - available) / max
}

/// True when every required tag is present on the disk. Case-sensitive.
pub fn tags_satisfied(required: &[String], disk_tags: &[String]) -> bool {
    required.iter().all(|tag| disk_tags.contains(tag))
}

/// Disks whose tags satisfy `required`, with their combined free space.
pub fn disk_pool_satisfying(required: &[String], disks: &[Disk]) -> DiskPool {
    disks
        .iter()
        .filter(|disk| tags_satisfied(required, &disk.tags))
        .fold(DiskPool::default(), |mut pool, disk| {
            pool.disk_count += 1;
            pool.total_available += disk.storage_available;
            pool
        })
}

/// Number of active replicas to report for a volume.
///
/// `observed_rw` is the count of replicas in `RW` mode. When none are
/// observed but the volume is attached and healthy, one is assumed: the
/// volume could not serve I/O otherwise. This is an approximation, not an
/// observation of the replica map.
pub fn active_replica_count(state: &VolumeState, robustness: &Robustness, observed_rw: u32) -> u32 {
    if observed_rw == 0 && *state == VolumeState::Attached && *robustness == Robustness::Healthy {
        1
    } else {
        observed_rw
    }
}

/// Volumes that declare a non-empty disk selector.
pub fn volumes_using_disk_tags(volumes: &[Volume]) -> Vec<&Volume> {
    volumes
        .iter()
        .filter(|v| !v.disk_selector.is_empty())
        .collect()
}
